//! Type compatibility rules (spec §4.3): mixed-integer-width arithmetic and
//! comparison, and the "wider of the two" result rule.

use kira_ir::ast::{IntWidth, PrimitiveType};

use crate::Type;

/// The result type of an arithmetic op (`+ - * / %`) between two numeric
/// types, or `None` if the operands aren't compatible (different
/// signedness class, or a float paired with anything but an identical
/// float width).
pub fn arithmetic_result(lhs: &Type, rhs: &Type) -> Option<Type> {
    match (lhs, rhs) {
        (Type::Primitive(PrimitiveType::Int(a)), Type::Primitive(PrimitiveType::Int(b))) => {
            if a.is_signed() != b.is_signed() {
                return None;
            }
            let wider = if a.bits() >= b.bits() { *a } else { *b };
            Some(Type::Primitive(PrimitiveType::Int(wider)))
        }
        (Type::Primitive(PrimitiveType::Float(a)), Type::Primitive(PrimitiveType::Float(b))) => {
            if a == b {
                Some(lhs.clone())
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Whether `<, >, <=, >=` are permitted between these two types: both must
/// be numeric, and if both are integers they must share a signedness
/// class; floats must share a width.
pub fn comparison_allowed(lhs: &Type, rhs: &Type) -> bool {
    arithmetic_result(lhs, rhs).is_some()
}

/// Whether `==`/`!=` are permitted: equal types, or two integer primitives
/// of the same signedness class (spec §4.3, "mixed integer widths").
pub fn equality_allowed(lhs: &Type, rhs: &Type) -> bool {
    if lhs.equals(rhs) {
        return true;
    }
    match (lhs, rhs) {
        (Type::Primitive(PrimitiveType::Int(a)), Type::Primitive(PrimitiveType::Int(b))) => {
            a.is_signed() == b.is_signed()
        }
        _ => false,
    }
}

/// The widest of two integer widths in the same signedness class. Panics
/// if the classes differ; callers check with [`arithmetic_result`] first.
pub fn wider(a: IntWidth, b: IntWidth) -> IntWidth {
    if a.bits() >= b.bits() {
        a
    } else {
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kira_ir::ast::FloatWidth;

    fn int(w: IntWidth) -> Type {
        Type::Primitive(PrimitiveType::Int(w))
    }

    #[test]
    fn arithmetic_between_mixed_signed_widths_takes_the_wider() {
        let result = arithmetic_result(&int(IntWidth::I32), &int(IntWidth::I64));
        assert_eq!(result, Some(int(IntWidth::I64)));
    }

    #[test]
    fn arithmetic_between_signed_and_unsigned_is_rejected() {
        assert_eq!(arithmetic_result(&int(IntWidth::I32), &int(IntWidth::U32)), None);
    }

    #[test]
    fn comparison_allows_mixed_integer_widths_same_signedness() {
        assert!(comparison_allowed(&int(IntWidth::I64), &int(IntWidth::I32)));
    }

    #[test]
    fn equality_allows_any_two_same_class_integers() {
        assert!(equality_allowed(&int(IntWidth::I8), &int(IntWidth::I128)));
        assert!(!equality_allowed(&int(IntWidth::I8), &int(IntWidth::U8)));
    }

    #[test]
    fn float_widths_must_match_exactly() {
        let f32_t = Type::Primitive(PrimitiveType::Float(FloatWidth::F32));
        let f64_t = Type::Primitive(PrimitiveType::Float(FloatWidth::F64));
        assert_eq!(arithmetic_result(&f32_t, &f64_t), None);
        assert_eq!(arithmetic_result(&f32_t, &f32_t), Some(f32_t));
    }
}
