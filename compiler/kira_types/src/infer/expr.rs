//! Expression type+effect inference (spec §4.3): binary/unary operator
//! rules (including mixed-integer-width arithmetic/comparison), calls and
//! generic instantiation, constructor application, `?`/null-coalesce, and
//! block-expression typing for `match`/`if` used as a value.

use rustc_hash::FxHashMap;

use kira_diagnostic::{Diagnostic, Kind};
use kira_ir::ast::{ExprKind, IntWidth, PrimitiveType};
use kira_ir::{BinaryOp, ExprId, Name, Span, UnaryOp};
use kira_symbols::{arithmetic_result, comparison_allowed, equality_allowed, SymbolKind, Type};

use crate::checker::Ctx;
use crate::generics::substitute_all;
use crate::resolve::resolve_type;

/// Check one expression, optionally in the context of an `expected` type.
/// `expected` lets integer/float literals and constructor applications take
/// on the width/instantiation the surrounding context demands, without
/// this being general type inference (spec Non-goals): every *binding*
/// still requires an explicit annotation; only a literal or a bare
/// constructor call adapts to its immediate expected type.
pub fn check_expr(ctx: &mut Ctx, id: ExprId, expected: Option<&Type>) -> Type {
    let expr = ctx.arena.expr(id).clone();
    let ty = check_expr_kind(ctx, &expr.kind, expected, expr.span);
    ctx.types.insert(id, ty.clone());
    ty
}

fn check_expr_kind(ctx: &mut Ctx, kind: &ExprKind, expected: Option<&Type>, span: Span) -> Type {
    match kind {
        ExprKind::IntLiteral(_) => literal_int_type(expected),
        ExprKind::FloatLiteral(_) => literal_float_type(expected),
        ExprKind::StringLiteral(_) => Type::Primitive(PrimitiveType::String),
        ExprKind::CharLiteral(_) => Type::Primitive(PrimitiveType::Char),
        ExprKind::BoolLiteral(_) => Type::Primitive(PrimitiveType::Bool),
        ExprKind::Identifier { name, generic_args } => check_identifier(ctx, *name, *generic_args, span),
        ExprKind::SelfExpr => check_self(ctx, span),
        ExprKind::Binary { op, lhs, rhs } => check_binary(ctx, *op, *lhs, *rhs, span),
        ExprKind::Unary { op, operand } => check_unary(ctx, *op, *operand, span),
        ExprKind::Field { base, name } => check_field(ctx, *base, *name, span),
        ExprKind::Index { base, index } => check_index(ctx, *base, *index, span),
        ExprKind::TupleAccess { base, index } => check_tuple_access(ctx, *base, *index, span),
        ExprKind::Call { callee, args } => check_call(ctx, *callee, *args, span),
        ExprKind::MethodCall { receiver, method, generic_args, args } => {
            check_method_call(ctx, *receiver, *method, *generic_args, *args, span)
        }
        ExprKind::Closure { params, return_ty, is_effect, body } => {
            check_closure(ctx, params, *return_ty, *is_effect, *body)
        }
        ExprKind::Match { scrutinee, arms } => crate::infer::stmt::check_match_expr(ctx, *scrutinee, arms),
        ExprKind::Tuple(range) => {
            let ids = ctx.arena.expr_list(*range).to_vec();
            let expected_items = match expected {
                Some(Type::Tuple(items)) if items.len() == ids.len() => Some(items.clone()),
                _ => None,
            };
            let items: Vec<Type> = ids
                .iter()
                .enumerate()
                .map(|(i, &e)| check_expr(ctx, e, expected_items.as_ref().map(|items| &items[i])))
                .collect();
            Type::Tuple(items)
        }
        ExprKind::Array(range) => check_array(ctx, *range, expected, span),
        ExprKind::Record { type_name, fields } => check_record(ctx, *type_name, fields, expected, span),
        ExprKind::Variant { name, positional, fields } => {
            check_variant(ctx, *name, *positional, fields, expected, span)
        }
        ExprKind::Cast { expr, ty } => check_cast(ctx, *expr, *ty, span),
        ExprKind::Range { start, end, .. } => check_range(ctx, *start, *end),
        ExprKind::Grouped(inner) => check_expr(ctx, *inner, expected),
        ExprKind::InterpolatedString(parts) => {
            for part in parts {
                if let kira_ir::ast::TemplatePart::Expr(e) = part {
                    check_expr(ctx, *e, None);
                }
            }
            Type::Primitive(PrimitiveType::String)
        }
        ExprKind::Try(inner) => check_try(ctx, *inner, span),
        ExprKind::NullCoalesce { value, default } => check_null_coalesce(ctx, *value, *default, span),
        ExprKind::Error => Type::Error,
    }
}

fn literal_int_type(expected: Option<&Type>) -> Type {
    match expected {
        Some(Type::Primitive(PrimitiveType::Int(w))) => Type::Primitive(PrimitiveType::Int(*w)),
        _ => Type::Primitive(PrimitiveType::Int(IntWidth::I32)),
    }
}

fn literal_float_type(expected: Option<&Type>) -> Type {
    match expected {
        Some(Type::Primitive(PrimitiveType::Float(w))) => Type::Primitive(PrimitiveType::Float(*w)),
        _ => Type::Primitive(PrimitiveType::Float(kira_ir::ast::FloatWidth::F64)),
    }
}

fn check_identifier(ctx: &mut Ctx, name: Name, generic_args: Option<kira_ir::TypeAstRange>, span: Span) -> Type {
    let Some(sym) = ctx.symbols.lookup(name) else {
        return undefined_symbol(ctx, name, span);
    };
    match ctx.symbols.symbol(sym).kind.clone() {
        SymbolKind::Variable { ty, .. } => ty,
        SymbolKind::Function { generics, params, return_ty, effect, .. } => {
            instantiate_function(ctx, &generics, &params, &return_ty, effect, generic_args, span)
        }
        SymbolKind::TypeDef { .. } => not_callable(ctx, name, "a type", span),
        SymbolKind::Trait { .. } => not_callable(ctx, name, "a trait", span),
        SymbolKind::Module { .. } => not_callable(ctx, name, "a module", span),
    }
}

fn instantiate_function(
    ctx: &mut Ctx,
    generics: &[kira_symbols::GenericParamInfo],
    params: &[(Name, Type)],
    return_ty: &Type,
    effect: kira_ir::EffectTag,
    generic_args: Option<kira_ir::TypeAstRange>,
    span: Span,
) -> Type {
    if generics.is_empty() {
        return Type::function(params.iter().map(|(_, t)| t.clone()).collect(), return_ty.clone(), effect);
    }
    let Some(range) = generic_args else {
        ctx.bag.push(Diagnostic::error(
            Kind::WrongTypeArgCount,
            "generic function called without explicit type arguments".to_string(),
            span,
        ));
        return Type::Error;
    };
    let arg_ids = ctx.arena.type_list(range).to_vec();
    if arg_ids.len() != generics.len() {
        ctx.bag.push(Diagnostic::error(
            Kind::WrongTypeArgCount,
            format!("expected {} type argument(s), found {}", generics.len(), arg_ids.len()),
            span,
        ));
        return Type::Error;
    }
    let type_args: Vec<Type> = arg_ids.iter().map(|&a| resolve_type(ctx, a)).collect();
    let subst: FxHashMap<Name, Type> = generics.iter().map(|g| g.name).zip(type_args).collect();
    let params: Vec<Type> = substitute_all(&params.iter().map(|(_, t)| t.clone()).collect::<Vec<_>>(), &subst);
    let ret = crate::generics::substitute(return_ty, &subst);
    Type::function(params, ret, effect)
}

fn check_self(ctx: &mut Ctx, span: Span) -> Type {
    let self_name = ctx.interner.intern("self");
    match ctx.symbols.lookup(self_name) {
        Some(sym) => match &ctx.symbols.symbol(sym).kind {
            SymbolKind::Variable { ty, .. } => ty.clone(),
            _ => Type::Error,
        },
        None => {
            ctx.bag.push(Diagnostic::error(Kind::SelfOutsideImpl, "'self' used outside an impl method", span));
            Type::Error
        }
    }
}

fn check_binary(ctx: &mut Ctx, op: BinaryOp, lhs: ExprId, rhs: ExprId, span: Span) -> Type {
    let lhs_ty = check_expr(ctx, lhs, None);
    let rhs_ty = check_expr(ctx, rhs, None);
    if lhs_ty.is_error() || rhs_ty.is_error() {
        return Type::Error;
    }
    if op.is_arithmetic() {
        return arithmetic_result(&lhs_ty, &rhs_ty)
            .unwrap_or_else(|| invalid_operand(ctx, "mismatched operand widths/signedness", span));
    }
    if op.is_equality() {
        return if equality_allowed(&lhs_ty, &rhs_ty) {
            Type::Primitive(PrimitiveType::Bool)
        } else {
            invalid_operand(ctx, "equality requires compatible operand types", span)
        };
    }
    if op.is_ordering() {
        return if comparison_allowed(&lhs_ty, &rhs_ty) {
            Type::Primitive(PrimitiveType::Bool)
        } else {
            invalid_operand(ctx, "comparison requires compatible numeric operands", span)
        };
    }
    if op.is_logical() {
        return if lhs_ty.is_bool() && rhs_ty.is_bool() {
            Type::Primitive(PrimitiveType::Bool)
        } else {
            invalid_operand(ctx, "'and'/'or' require bool operands", span)
        };
    }
    match op {
        BinaryOp::Is => Type::Primitive(PrimitiveType::Bool),
        BinaryOp::In => match &rhs_ty {
            Type::Array { elem, .. } if lhs_ty.equals(elem) => Type::Primitive(PrimitiveType::Bool),
            Type::Instantiated { args, .. } if args.len() == 1 && lhs_ty.equals(&args[0]) => {
                Type::Primitive(PrimitiveType::Bool)
            }
            _ => invalid_operand(ctx, "'in' requires a container of compatible elements", span),
        },
        _ => unreachable!("every BinaryOp is covered by one of the predicates above"),
    }
}

fn check_unary(ctx: &mut Ctx, op: UnaryOp, operand: ExprId, span: Span) -> Type {
    let ty = check_expr(ctx, operand, None);
    if ty.is_error() {
        return Type::Error;
    }
    match op {
        UnaryOp::Neg if ty.is_numeric() => ty,
        UnaryOp::Neg => invalid_operand(ctx, "unary '-' requires a numeric operand", span),
        UnaryOp::Not if ty.is_bool() => ty,
        UnaryOp::Not => invalid_operand(ctx, "unary 'not' requires a bool operand", span),
    }
}

fn product_fields(ctx: &Ctx, ty: &Type) -> Option<(Vec<(Name, Type)>, FxHashMap<Name, Type>)> {
    let (sym, args) = match ty {
        Type::Named(sym) => (*sym, Vec::new()),
        Type::Instantiated { base, args } => (*base, args.clone()),
        _ => return None,
    };
    let SymbolKind::TypeDef { generics, kind: kira_symbols::TypeDefKind::Product(fields) } = &ctx.symbols.symbol(sym).kind else {
        return None;
    };
    let subst: FxHashMap<Name, Type> = generics.iter().map(|g| g.name).zip(args).collect();
    Some((fields.clone(), subst))
}

fn check_field(ctx: &mut Ctx, base: ExprId, name: Name, span: Span) -> Type {
    let base_ty = check_expr(ctx, base, None);
    if base_ty.is_error() {
        return Type::Error;
    }
    let Some((fields, subst)) = product_fields(ctx, &base_ty) else {
        return no_such_member(ctx, &base_ty, name, span);
    };
    match fields.iter().find(|(n, _)| *n == name) {
        Some((_, ty)) => crate::generics::substitute(ty, &subst),
        None => no_such_member(ctx, &base_ty, name, span),
    }
}

fn check_index(ctx: &mut Ctx, base: ExprId, index: ExprId, span: Span) -> Type {
    let base_ty = check_expr(ctx, base, None);
    let index_ty = check_expr(ctx, index, Some(&Type::Primitive(PrimitiveType::Int(IntWidth::I64))));
    if !index_ty.is_integer() && !index_ty.is_error() {
        ctx.bag.push(Diagnostic::error(Kind::InvalidOperand, "index must be an integer".to_string(), span));
    }
    match &base_ty {
        Type::Array { elem, .. } => (**elem).clone(),
        Type::Error => Type::Error,
        _ => invalid_operand(ctx, "value is not indexable", span),
    }
}

fn check_tuple_access(ctx: &mut Ctx, base: ExprId, index: u32, span: Span) -> Type {
    let base_ty = check_expr(ctx, base, None);
    match &base_ty {
        Type::Tuple(items) => match items.get(index as usize) {
            Some(t) => t.clone(),
            None => {
                ctx.bag.push(Diagnostic::error(Kind::InvalidTupleIndex, format!("tuple has no element {index}"), span));
                Type::Error
            }
        },
        Type::Error => Type::Error,
        _ => {
            ctx.bag.push(Diagnostic::error(Kind::InvalidTupleIndex, "value is not a tuple".to_string(), span));
            Type::Error
        }
    }
}

fn check_call(ctx: &mut Ctx, callee: ExprId, args: kira_ir::ExprRange, span: Span) -> Type {
    let callee_ty = check_expr(ctx, callee, None);
    let Type::Function { params, ret, effect } = callee_ty else {
        if !callee_ty.is_error() {
            ctx.bag.push(Diagnostic::error(Kind::NotCallable, "value is not callable".to_string(), span));
        }
        let arg_ids = ctx.arena.expr_list(args).to_vec();
        for a in arg_ids {
            check_expr(ctx, a, None);
        }
        return Type::Error;
    };
    let arg_ids = ctx.arena.expr_list(args).to_vec();
    check_call_args(ctx, &arg_ids, &params, span);
    check_effect_call(ctx, effect, span);
    *ret
}

fn check_call_args(ctx: &mut Ctx, arg_ids: &[ExprId], params: &[Type], span: Span) {
    if arg_ids.len() != params.len() {
        ctx.bag.push(Diagnostic::error(
            Kind::WrongArgCount,
            format!("expected {} argument(s), found {}", params.len(), arg_ids.len()),
            span,
        ));
    }
    for (i, &arg_id) in arg_ids.iter().enumerate() {
        let expected = params.get(i);
        let actual = check_expr(ctx, arg_id, expected);
        if let Some(param_ty) = expected {
            if !actual.equals(param_ty) && !actual.is_error() {
                let arg_span = ctx.arena.expr(arg_id).span;
                let d = ctx.type_mismatch(param_ty, &actual, arg_span);
                ctx.bag.push(d);
            }
        }
    }
}

fn check_effect_call(ctx: &mut Ctx, callee_effect: kira_ir::EffectTag, span: Span) {
    if ctx.current_effect.is_pure() && !callee_effect.is_pure() {
        ctx.bag.push(Diagnostic::error(
            Kind::EffectViolation,
            "a pure function cannot call a non-pure function".to_string(),
            span,
        ));
    }
}

fn check_method_call(
    ctx: &mut Ctx,
    receiver: ExprId,
    method: Name,
    generic_args: Option<kira_ir::TypeAstRange>,
    args: kira_ir::ExprRange,
    span: Span,
) -> Type {
    let receiver_ty = check_expr(ctx, receiver, None);
    let (base, ty_args) = match &receiver_ty {
        Type::Named(sym) => (*sym, Vec::new()),
        Type::Instantiated { base, args } => (*base, args.clone()),
        Type::Error => {
            for a in ctx.arena.expr_list(args).to_vec() {
                check_expr(ctx, a, None);
            }
            return Type::Error;
        }
        _ => {
            ctx.bag.push(Diagnostic::error(Kind::NoSuchMember, "value has no methods".to_string(), span));
            for a in ctx.arena.expr_list(args).to_vec() {
                check_expr(ctx, a, None);
            }
            return Type::Error;
        }
    };
    let Some(sig) = ctx.methods.get(base, method) else {
        let name_str = ctx.interner.resolve(method).to_string();
        ctx.bag.push(Diagnostic::error(Kind::NoSuchMember, format!("no method '{name_str}'"), span));
        for a in ctx.arena.expr_list(args).to_vec() {
            check_expr(ctx, a, None);
        }
        return Type::Error;
    };
    let sig = sig.clone();
    let mut subst: FxHashMap<Name, Type> = sig.target_generics.iter().copied().zip(ty_args).collect();
    if !sig.own_generics.is_empty() {
        let Some(range) = generic_args else {
            ctx.bag.push(Diagnostic::error(
                Kind::WrongTypeArgCount,
                "generic method called without explicit type arguments".to_string(),
                span,
            ));
            return Type::Error;
        };
        let arg_ids = ctx.arena.type_list(range).to_vec();
        if arg_ids.len() != sig.own_generics.len() {
            ctx.bag.push(Diagnostic::error(Kind::WrongTypeArgCount, "wrong number of method type arguments".to_string(), span));
            return Type::Error;
        }
        for (g, &a) in sig.own_generics.iter().zip(arg_ids.iter()) {
            subst.insert(g.name, resolve_type(ctx, a));
        }
    }
    let params: Vec<Type> = sig.params.iter().map(|(_, t)| crate::generics::substitute(t, &subst)).collect();
    let ret = crate::generics::substitute(&sig.return_ty, &subst);
    let arg_ids = ctx.arena.expr_list(args).to_vec();
    check_call_args(ctx, &arg_ids, &params, span);
    check_effect_call(ctx, sig.effect, span);
    ret
}

fn check_closure(
    ctx: &mut Ctx,
    params: &[kira_ir::ast::ClosureParam],
    return_ty: Option<kira_ir::TypeAstId>,
    is_effect: bool,
    body: kira_ir::StmtRange,
) -> Type {
    ctx.symbols.enter_scope(kira_symbols::ScopeKind::Function);
    let mut param_types = Vec::with_capacity(params.len());
    for p in params {
        let ty = resolve_type(ctx, p.ty);
        let _ = ctx.symbols.define(kira_symbols::NewSymbol {
            name: p.name,
            kind: SymbolKind::Variable { ty: ty.clone(), mutable: false },
            visibility: kira_ir::ast::Visibility::Private,
            doc: None,
            span: p.span,
        });
        param_types.push(ty);
    }
    let resolved_return = return_ty.map(|t| resolve_type(ctx, t)).unwrap_or(Type::Void);
    let effect =
        (if is_effect { kira_ir::EffectTag::Io } else { kira_ir::EffectTag::Pure }).with_result_return(matches!(resolved_return, Type::Result { .. }));
    let saved_effect = ctx.current_effect;
    let saved_return = ctx.current_return_ty.clone();
    ctx.current_effect = effect;
    ctx.current_return_ty = resolved_return.clone();
    crate::infer::stmt::check_block(ctx, body);
    ctx.current_effect = saved_effect;
    ctx.current_return_ty = saved_return;
    ctx.symbols.leave_scope();
    Type::function(param_types, resolved_return, effect)
}

fn check_array(ctx: &mut Ctx, range: kira_ir::ExprRange, expected: Option<&Type>, span: Span) -> Type {
    let ids = ctx.arena.expr_list(range).to_vec();
    let elem_expected = match expected {
        Some(Type::Array { elem, .. }) => Some((**elem).clone()),
        _ => None,
    };
    if ids.is_empty() {
        let elem = elem_expected.unwrap_or(Type::Void);
        return Type::Array { elem: Box::new(elem), size: 0 };
    }
    let first = check_expr(ctx, ids[0], elem_expected.as_ref());
    for &rest in &ids[1..] {
        let t = check_expr(ctx, rest, Some(&first));
        if !t.equals(&first) && !t.is_error() {
            let rest_span = ctx.arena.expr(rest).span;
            let d = ctx.type_mismatch(&first, &t, rest_span);
            ctx.bag.push(d);
        }
    }
    let _ = span;
    Type::Array { elem: Box::new(first), size: ids.len() as u64 }
}

fn check_record(ctx: &mut Ctx, type_name: Option<Name>, fields: &[(Name, ExprId)], expected: Option<&Type>, span: Span) -> Type {
    let resolved_target = match type_name {
        Some(name) => ctx.symbols.lookup(name).map(Type::Named),
        None => expected.cloned(),
    };
    let Some(target_ty) = resolved_target else {
        for (_, e) in fields {
            check_expr(ctx, *e, None);
        }
        return undefined_symbol(ctx, type_name.unwrap_or(ctx.interner.intern("<record>")), span);
    };
    let Some((product_fields, subst)) = product_fields(ctx, &target_ty) else {
        for (_, e) in fields {
            check_expr(ctx, *e, None);
        }
        return invalid_operand(ctx, "not a record type", span);
    };
    for (name, value) in fields {
        match product_fields.iter().find(|(n, _)| n == name) {
            Some((_, ty)) => {
                let field_ty = crate::generics::substitute(ty, &subst);
                let actual = check_expr(ctx, *value, Some(&field_ty));
                if !actual.equals(&field_ty) && !actual.is_error() {
                    let value_span = ctx.arena.expr(*value).span;
                    let d = ctx.type_mismatch(&field_ty, &actual, value_span);
                    ctx.bag.push(d);
                }
            }
            None => {
                check_expr(ctx, *value, None);
                let name_str = ctx.interner.resolve(*name).to_string();
                ctx.bag.push(Diagnostic::error(Kind::NoSuchMember, format!("no field '{name_str}'"), span));
            }
        }
    }
    target_ty
}

fn check_variant(
    ctx: &mut Ctx,
    name: Name,
    positional: kira_ir::ExprRange,
    fields: &[(Name, ExprId)],
    expected: Option<&Type>,
    span: Span,
) -> Type {
    if let Some(ty) = check_option_result_variant(ctx, name, positional, expected, span) {
        return ty;
    }
    let Some(entry) = ctx.variants.lookup(name).cloned() else {
        return undefined_symbol(ctx, name, span);
    };
    let (ty_args, subst): (Vec<Type>, FxHashMap<Name, Type>) = match expected {
        Some(Type::Instantiated { base, args }) if *base == entry.type_sym => {
            (args.clone(), entry.generics.iter().map(|g| g.name).zip(args.iter().cloned()).collect())
        }
        _ if entry.generics.is_empty() => (Vec::new(), FxHashMap::default()),
        _ => {
            let vars: Vec<Type> = entry.generics.iter().map(|g| Type::Var(g.name)).collect();
            let subst = entry.generics.iter().map(|g| g.name).zip(vars.iter().cloned()).collect();
            (vars, subst)
        }
    };
    let field_types = substitute_all(&entry.field_types, &subst);
    let arg_ids = ctx.arena.expr_list(positional).to_vec();
    if arg_ids.len() != field_types.len() {
        let name_str = ctx.interner.resolve(name).to_string();
        ctx.bag.push(Diagnostic::error(
            Kind::WrongArgCount,
            format!("'{name_str}' expects {} field(s), found {}", field_types.len(), arg_ids.len()),
            span,
        ));
    }
    for (i, &arg_id) in arg_ids.iter().enumerate() {
        let Some(field_ty) = field_types.get(i) else { continue };
        let actual = check_expr(ctx, arg_id, Some(field_ty));
        if matches!(field_ty, Type::Var(_)) {
            continue;
        }
        if !actual.equals(field_ty) && !actual.is_error() {
            let arg_span = ctx.arena.expr(arg_id).span;
            let d = ctx.type_mismatch(field_ty, &actual, arg_span);
            ctx.bag.push(d);
        }
    }
    // Record-variant construction syntax is unreachable from the grammar
    // (spec §9 open question) — still checked so no expression goes
    // silently untyped if it somehow appears.
    for (_, value) in fields {
        check_expr(ctx, *value, None);
    }
    if ty_args.is_empty() {
        Type::Named(entry.type_sym)
    } else {
        Type::Instantiated { base: entry.type_sym, args: ty_args }
    }
}

/// `Some`/`None`/`Ok`/`Err` are ordinary variant-construction syntax but
/// have no `SymbolId` of their own (`Option`/`Result` are built-in `Type`
/// variants, not user type declarations) — so they can't live in
/// `ctx.variants` and are resolved here instead, mirroring the pattern
/// side's handling of the same four names in `infer::pattern::check_constructor`.
/// Returns `None` when `name` isn't one of the four, so the caller falls
/// through to ordinary user-variant lookup.
fn check_option_result_variant(
    ctx: &mut Ctx,
    name: Name,
    positional: kira_ir::ExprRange,
    expected: Option<&Type>,
    span: Span,
) -> Option<Type> {
    let some = ctx.interner.intern("Some");
    let none = ctx.interner.intern("None");
    let ok_name = ctx.interner.intern("Ok");
    let err_name = ctx.interner.intern("Err");
    if name != some && name != none && name != ok_name && name != err_name {
        return None;
    }

    let arg_ids = ctx.arena.expr_list(positional).to_vec();
    let check_arity = |ctx: &mut Ctx, want: usize| {
        if arg_ids.len() != want {
            let name_str = ctx.interner.resolve(name).to_string();
            ctx.bag.push(Diagnostic::error(
                Kind::WrongArgCount,
                format!("'{name_str}' expects {want} field(s), found {}", arg_ids.len()),
                span,
            ));
        }
    };

    if name == none {
        check_arity(ctx, 0);
        let inner = match expected {
            Some(Type::Option(inner)) => (**inner).clone(),
            _ => Type::Error,
        };
        return Some(Type::Option(Box::new(inner)));
    }
    if name == some {
        check_arity(ctx, 1);
        let hint = match expected {
            Some(Type::Option(inner)) => Some((**inner).clone()),
            _ => None,
        };
        let inner = arg_ids.first().map_or(Type::Error, |&id| check_expr(ctx, id, hint.as_ref()));
        return Some(Type::Option(Box::new(inner)));
    }

    check_arity(ctx, 1);
    let (ok_hint, err_hint) = match expected {
        Some(Type::Result { ok, err }) => (Some((**ok).clone()), Some((**err).clone())),
        _ => (None, None),
    };
    if name == ok_name {
        let ok_ty = arg_ids.first().map_or(Type::Error, |&id| check_expr(ctx, id, ok_hint.as_ref()));
        let err_ty = err_hint.unwrap_or(Type::Error);
        Some(Type::Result { ok: Box::new(ok_ty), err: Box::new(err_ty) })
    } else {
        let err_ty = arg_ids.first().map_or(Type::Error, |&id| check_expr(ctx, id, err_hint.as_ref()));
        let ok_ty = ok_hint.unwrap_or(Type::Error);
        Some(Type::Result { ok: Box::new(ok_ty), err: Box::new(err_ty) })
    }
}

fn check_cast(ctx: &mut Ctx, expr: ExprId, ty: kira_ir::TypeAstId, span: Span) -> Type {
    let inner = check_expr(ctx, expr, None);
    let resolved = resolve_type(ctx, ty);
    let castable = inner.is_numeric() && resolved.is_numeric()
        || matches!(inner, Type::Primitive(PrimitiveType::Char | PrimitiveType::Bool)) && resolved.is_integer()
        || inner.is_integer() && matches!(resolved, Type::Primitive(PrimitiveType::Char));
    if !castable && !inner.is_error() {
        ctx.bag.push(Diagnostic::error(
            Kind::InvalidCast,
            format!(
                "cannot cast '{}' to '{}'",
                inner.display(ctx.interner, |s| ctx.symbols.symbol(s).name),
                resolved.display(ctx.interner, |s| ctx.symbols.symbol(s).name)
            ),
            span,
        ));
    }
    resolved
}

/// Ranges have no dedicated resolved-type variant (spec §3 enumerates the
/// resolved `Type` kinds and does not include one); a range's element type
/// is reused as an `Array` with size `0` standing for "finite but unsized
/// at check time", matching how `for`/indexing only need an element type.
fn check_range(ctx: &mut Ctx, start: Option<ExprId>, end: Option<ExprId>) -> Type {
    let int_ty = Type::Primitive(PrimitiveType::Int(IntWidth::I64));
    let mut elem = int_ty.clone();
    if let Some(s) = start {
        elem = check_expr(ctx, s, Some(&int_ty));
    }
    if let Some(e) = end {
        let end_ty = check_expr(ctx, e, Some(&elem));
        if !end_ty.is_error() {
            elem = end_ty;
        }
    }
    Type::Array { elem: Box::new(elem), size: 0 }
}

fn unwrap_io(ty: &Type) -> &Type {
    match ty {
        Type::Io(inner) => inner,
        other => other,
    }
}

fn check_try(ctx: &mut Ctx, inner: ExprId, span: Span) -> Type {
    let inner_ty = check_expr(ctx, inner, None);
    if !ctx.current_effect.admits_try() {
        ctx.bag.push(Diagnostic::error(Kind::InvalidTry, "'?' is only valid in a result/io_result function".to_string(), span));
    }
    match &inner_ty {
        Type::Result { ok, err } => {
            if let Type::Result { err: expected_err, .. } = unwrap_io(&ctx.current_return_ty) {
                if !err.equals(expected_err) && !err.is_error() {
                    let d = ctx.type_mismatch(expected_err, err, span);
                    ctx.bag.push(d);
                }
            }
            (**ok).clone()
        }
        Type::Option(some) => {
            if !matches!(unwrap_io(&ctx.current_return_ty), Type::Option(_)) {
                ctx.bag.push(Diagnostic::error(Kind::InvalidTry, "'?' on Option requires an Option-returning function".to_string(), span));
            }
            (**some).clone()
        }
        Type::Error => Type::Error,
        _ => invalid_operand(ctx, "'?' requires a Result or Option operand", span),
    }
}

fn check_null_coalesce(ctx: &mut Ctx, value: ExprId, default: ExprId, span: Span) -> Type {
    let value_ty = check_expr(ctx, value, None);
    let Type::Option(inner) = &value_ty else {
        check_expr(ctx, default, None);
        if value_ty.is_error() {
            return Type::Error;
        }
        return invalid_operand(ctx, "'??' requires an Option on the left", span);
    };
    let inner = (**inner).clone();
    let default_ty = check_expr(ctx, default, Some(&inner));
    if !default_ty.equals(&inner) && !default_ty.is_error() {
        let d = ctx.type_mismatch(&inner, &default_ty, span);
        ctx.bag.push(d);
    }
    inner
}

fn undefined_symbol(ctx: &mut Ctx, name: Name, span: Span) -> Type {
    let name_str = ctx.interner.resolve(name).to_string();
    let diag = Diagnostic::error(Kind::UndefinedSymbol, format!("undefined symbol '{name_str}'"), span);
    let diag = match kira_diagnostic::nearest_name(&name_str, ctx.value_names_in_scope()) {
        Some(suggestion) => diag.with_untargeted_note(format!("did you mean '{suggestion}'?")),
        None => diag,
    };
    ctx.bag.push(diag);
    Type::Error
}

fn not_callable(ctx: &mut Ctx, name: Name, what: &str, span: Span) -> Type {
    let name_str = ctx.interner.resolve(name).to_string();
    ctx.bag.push(Diagnostic::error(Kind::NotCallable, format!("'{name_str}' is {what}, not a value"), span));
    Type::Error
}

fn no_such_member(ctx: &mut Ctx, base_ty: &Type, name: Name, span: Span) -> Type {
    let name_str = ctx.interner.resolve(name).to_string();
    let ty_str = base_ty.display(ctx.interner, |s| ctx.symbols.symbol(s).name);
    ctx.bag.push(Diagnostic::error(Kind::NoSuchMember, format!("no field or method '{name_str}' on '{ty_str}'"), span));
    Type::Error
}

fn invalid_operand(ctx: &mut Ctx, message: &str, span: Span) -> Type {
    ctx.bag.push(Diagnostic::error(Kind::InvalidOperand, message.to_string(), span));
    Type::Error
}
