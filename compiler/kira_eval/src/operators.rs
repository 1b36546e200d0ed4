//! Binary and unary operator evaluation (spec §4.3's operand rules, applied
//! to already-evaluated runtime values instead of resolved types).
//!
//! `and`/`or` are not here: they short-circuit, so the interpreter evaluates
//! their right-hand side lazily instead of calling through this module.

use kira_ir::ast::IntWidth;
use kira_ir::{BinaryOp, Span, UnaryOp};

use crate::error::{Eval, RuntimeAbort};
use crate::value::{KiraInt, Value};

pub fn eval_binary(op: BinaryOp, lhs: Value, rhs: Value, span: Span) -> Eval<Value> {
    match (&lhs, &rhs) {
        (Value::Int(a), Value::Int(b)) => int_binary(*a, *b, op, span),
        (Value::Float(a), Value::Float(b)) => float_binary(*a, *b, op, span),
        (Value::Bool(a), Value::Bool(b)) => bool_binary(*a, *b, op, span),
        (Value::Char(a), Value::Char(b)) => ordered_binary(a, b, op, span, "char"),
        (Value::Str(a), Value::Str(b)) => str_binary(a, b, op, span),
        _ if op.is_equality() => Ok(Value::Bool(equality(op, &lhs, &rhs))),
        _ => Err(RuntimeAbort::new(format!("invalid operands for '{op:?}'"), span).into()),
    }
}

fn equality(op: BinaryOp, lhs: &Value, rhs: &Value) -> bool {
    let eq = lhs == rhs;
    if op == BinaryOp::Eq { eq } else { !eq }
}

fn int_binary(a: KiraInt, b: KiraInt, op: BinaryOp, span: Span) -> Eval<Value> {
    let overflow = |what: &str| RuntimeAbort::new(format!("integer {what} overflowed"), span);
    match op {
        BinaryOp::Add => a.checked_add(b).map(Value::Int).ok_or_else(|| overflow("addition").into()),
        BinaryOp::Sub => a.checked_sub(b).map(Value::Int).ok_or_else(|| overflow("subtraction").into()),
        BinaryOp::Mul => a.checked_mul(b).map(Value::Int).ok_or_else(|| overflow("multiplication").into()),
        BinaryOp::Div => {
            a.checked_div(b).map(Value::Int).ok_or_else(|| RuntimeAbort::new("division by zero", span).into())
        }
        BinaryOp::Mod => {
            a.checked_rem(b).map(Value::Int).ok_or_else(|| RuntimeAbort::new("modulo by zero", span).into())
        }
        BinaryOp::Eq => Ok(Value::Bool(a.value() == b.value())),
        BinaryOp::Ne => Ok(Value::Bool(a.value() != b.value())),
        BinaryOp::Lt => Ok(Value::Bool(a.value() < b.value())),
        BinaryOp::Gt => Ok(Value::Bool(a.value() > b.value())),
        BinaryOp::Le => Ok(Value::Bool(a.value() <= b.value())),
        BinaryOp::Ge => Ok(Value::Bool(a.value() >= b.value())),
        _ => Err(RuntimeAbort::new(format!("invalid operator '{op:?}' on integers"), span).into()),
    }
}

fn float_binary(a: f64, b: f64, op: BinaryOp, span: Span) -> Eval<Value> {
    use std::cmp::Ordering;
    match op {
        BinaryOp::Add => Ok(Value::Float(a + b)),
        BinaryOp::Sub => Ok(Value::Float(a - b)),
        BinaryOp::Mul => Ok(Value::Float(a * b)),
        BinaryOp::Div => Ok(Value::Float(a / b)),
        BinaryOp::Mod => Ok(Value::Float(a % b)),
        BinaryOp::Eq => Ok(Value::Bool(a.partial_cmp(&b) == Some(Ordering::Equal))),
        BinaryOp::Ne => Ok(Value::Bool(a.partial_cmp(&b) != Some(Ordering::Equal))),
        BinaryOp::Lt => Ok(Value::Bool(a.partial_cmp(&b) == Some(Ordering::Less))),
        BinaryOp::Gt => Ok(Value::Bool(a.partial_cmp(&b) == Some(Ordering::Greater))),
        BinaryOp::Le => Ok(Value::Bool(matches!(a.partial_cmp(&b), Some(Ordering::Less | Ordering::Equal)))),
        BinaryOp::Ge => Ok(Value::Bool(matches!(a.partial_cmp(&b), Some(Ordering::Greater | Ordering::Equal)))),
        _ => Err(RuntimeAbort::new(format!("invalid operator '{op:?}' on floats"), span).into()),
    }
}

fn bool_binary(a: bool, b: bool, op: BinaryOp, span: Span) -> Eval<Value> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(a == b)),
        BinaryOp::Ne => Ok(Value::Bool(a != b)),
        _ => Err(RuntimeAbort::new(format!("invalid operator '{op:?}' on bool"), span).into()),
    }
}

fn ordered_binary<T: PartialEq + PartialOrd>(a: &T, b: &T, op: BinaryOp, span: Span, type_name: &str) -> Eval<Value> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(a == b)),
        BinaryOp::Ne => Ok(Value::Bool(a != b)),
        BinaryOp::Lt => Ok(Value::Bool(a < b)),
        BinaryOp::Gt => Ok(Value::Bool(a > b)),
        BinaryOp::Le => Ok(Value::Bool(a <= b)),
        BinaryOp::Ge => Ok(Value::Bool(a >= b)),
        _ => Err(RuntimeAbort::new(format!("invalid operator '{op:?}' on {type_name}"), span).into()),
    }
}

fn str_binary(a: &std::rc::Rc<str>, b: &std::rc::Rc<str>, op: BinaryOp, span: Span) -> Eval<Value> {
    match op {
        BinaryOp::Add => Ok(Value::string(format!("{a}{b}"))),
        _ => ordered_binary(&a.to_string(), &b.to_string(), op, span, "string"),
    }
}

pub fn eval_unary(op: UnaryOp, value: Value, span: Span) -> Eval<Value> {
    match (op, value) {
        (UnaryOp::Neg, Value::Int(n)) => {
            n.checked_neg().map(Value::Int).ok_or_else(|| RuntimeAbort::new("integer negation overflowed", span).into())
        }
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (op, value) => Err(RuntimeAbort::new(format!("invalid unary '{op:?}' on a {}", value.type_name()), span).into()),
    }
}

/// `e as T` (spec §4.3's allowed-cast set: numeric↔numeric, char/bool→int,
/// int→char).
pub fn eval_cast(value: Value, target: &kira_ir::ast::TypeAst, span: Span) -> Eval<Value> {
    use kira_ir::ast::{PrimitiveType, TypeAstKind};
    let TypeAstKind::Primitive(prim) = &target.kind else {
        return Err(RuntimeAbort::new("cast target is not a primitive type", span).into());
    };
    match (value, prim) {
        (Value::Int(n), PrimitiveType::Int(width)) => Ok(Value::Int(n.cast_to(*width))),
        (Value::Int(n), PrimitiveType::Float(_)) => Ok(Value::Float(n.to_f64())),
        (Value::Float(f), PrimitiveType::Int(width)) => Ok(Value::Int(KiraInt::cast_from_f64(f, *width))),
        (Value::Float(f), PrimitiveType::Float(_)) => Ok(Value::Float(f)),
        (Value::Char(c), PrimitiveType::Int(width)) => Ok(Value::Int(KiraInt::new(c as i128, *width))),
        (Value::Bool(b), PrimitiveType::Int(width)) => Ok(Value::Int(KiraInt::new(i128::from(b), *width))),
        (Value::Int(n), PrimitiveType::Char) => {
            let cp = u32::try_from(n.value()).ok().and_then(char::from_u32);
            match cp {
                Some(c) => Ok(Value::Char(c)),
                None => Err(RuntimeAbort::new("integer is not a valid char code point", span).into()),
            }
        }
        (value, _) => Err(RuntimeAbort::new(format!("cannot cast a {} to this type", value.type_name()), span).into()),
    }
}

pub const DEFAULT_INT_WIDTH: IntWidth = KiraInt::DEFAULT_WIDTH;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn int_add_produces_the_wider_width() {
        let a = Value::int(1, IntWidth::I32);
        let b = Value::int(2, IntWidth::I64);
        let result = eval_binary(BinaryOp::Add, a, b, Span::DUMMY).expect("no overflow");
        assert_eq!(result, Value::int(3, IntWidth::I64));
    }

    #[test]
    fn int_division_by_zero_aborts() {
        let a = Value::int(10, IntWidth::I32);
        let z = Value::int(0, IntWidth::I32);
        assert!(eval_binary(BinaryOp::Div, a, z, Span::DUMMY).is_err());
    }

    #[test]
    fn string_equality_compares_contents() {
        let a = Value::string("hi");
        let b = Value::string("hi");
        assert_eq!(eval_binary(BinaryOp::Eq, a, b, Span::DUMMY).unwrap(), Value::Bool(true));
    }

    #[test]
    fn unary_not_flips_bool() {
        assert_eq!(eval_unary(UnaryOp::Not, Value::Bool(true), Span::DUMMY).unwrap(), Value::Bool(false));
    }

    #[test]
    fn cast_truncates_int_to_narrower_width() {
        let v = Value::int(300, IntWidth::I32);
        let ty = kira_ir::ast::TypeAst {
            kind: kira_ir::ast::TypeAstKind::Primitive(kira_ir::ast::PrimitiveType::Int(IntWidth::U8)),
            span: Span::DUMMY,
        };
        let result = eval_cast(v, &ty, Span::DUMMY).unwrap();
        assert_eq!(result, Value::int(44, IntWidth::U8));
    }
}
