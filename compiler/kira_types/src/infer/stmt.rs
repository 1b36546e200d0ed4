//! Statement and block type-checking, including the "block-expression
//! typing" rule (spec §4.3): an `if`/`match` used in tail position within a
//! block still carries a value type out of that block, exactly as if it
//! had been written as an expression.

use kira_diagnostic::{Diagnostic, Kind};
use kira_ir::ast::{AssignTarget, Stmt, StmtKind, StmtMatchArm};
use kira_ir::{Span, StmtId, StmtRange};
use kira_symbols::{NewSymbol, ScopeKind, SymbolKind, Type};

use crate::checker::Ctx;
use crate::infer::expr::check_expr;
use crate::infer::pattern::check_pattern;
use crate::resolve::resolve_type;

/// Check every statement in `range` inside a fresh block scope, returning
/// the tail value's type (`Void` if the block doesn't end in a value-
/// producing statement).
pub fn check_block(ctx: &mut Ctx, range: StmtRange) -> Type {
    ctx.symbols.enter_scope(ScopeKind::Block);
    let ty = check_block_in_current_scope(ctx, range);
    ctx.symbols.leave_scope();
    ty
}

fn check_block_in_current_scope(ctx: &mut Ctx, range: StmtRange) -> Type {
    let ids = ctx.arena.stmt_list(range).to_vec();
    let Some((&last, rest)) = ids.split_last() else {
        return Type::Void;
    };
    for &id in rest {
        check_stmt(ctx, id);
    }
    tail_type(ctx, last)
}

/// The value a statement in tail position contributes to its enclosing
/// block: an expression statement or nested block/if/match propagate their
/// value; every other statement kind contributes `Void`.
fn tail_type(ctx: &mut Ctx, id: StmtId) -> Type {
    let stmt = ctx.arena.stmt(id).clone();
    match &stmt.kind {
        StmtKind::ExprStmt(e) => check_expr(ctx, *e, None),
        StmtKind::Block(inner) => check_block(ctx, *inner),
        StmtKind::If { cond, then_branch, else_branch } => check_tail_if(ctx, *cond, *then_branch, *else_branch, stmt.span),
        StmtKind::Match { scrutinee, arms } => check_match_stmt(ctx, *scrutinee, arms, stmt.span),
        _ => {
            check_stmt_kind(ctx, &stmt.kind, stmt.span);
            Type::Void
        }
    }
}

fn check_tail_if(
    ctx: &mut Ctx,
    cond: kira_ir::ExprId,
    then_branch: StmtRange,
    else_branch: Option<StmtRange>,
    span: Span,
) -> Type {
    check_condition(ctx, cond);
    let then_ty = check_block(ctx, then_branch);
    let Some(else_branch) = else_branch else {
        return Type::Void;
    };
    let else_ty = check_block(ctx, else_branch);
    if then_ty.equals(&else_ty) || then_ty.is_error() || else_ty.is_error() {
        if then_ty.is_error() { else_ty } else { then_ty }
    } else {
        let d = ctx.type_mismatch(&then_ty, &else_ty, span);
        ctx.bag.push(d);
        Type::Error
    }
}

fn check_condition(ctx: &mut Ctx, cond: kira_ir::ExprId) {
    let ty = check_expr(ctx, cond, Some(&Type::Primitive(kira_ir::ast::PrimitiveType::Bool)));
    if !ty.is_bool() && !ty.is_error() {
        let span = ctx.arena.expr(cond).span;
        let d = ctx.type_mismatch(&Type::Primitive(kira_ir::ast::PrimitiveType::Bool), &ty, span);
        ctx.bag.push(d);
    }
}

/// Shared by both tail position (a `match` producing the block's value) and
/// plain statement position (a `match` checked only for internal
/// consistency and exhaustiveness).
pub fn check_match_stmt(ctx: &mut Ctx, scrutinee: kira_ir::ExprId, arms: &[StmtMatchArm], span: Span) -> Type {
    let scrutinee_ty = check_expr(ctx, scrutinee, None);
    let mut result: Option<Type> = None;
    let mut mismatched = false;
    let arm_patterns: Vec<kira_ir::PatternId> = arms.iter().map(|a| a.pattern).collect();
    for arm in arms {
        ctx.symbols.enter_scope(ScopeKind::Block);
        check_pattern(ctx, arm.pattern, &scrutinee_ty);
        let arm_ty = check_block_in_current_scope(ctx, arm.body);
        ctx.symbols.leave_scope();
        match &result {
            None => result = Some(arm_ty),
            Some(prev) if prev.equals(&arm_ty) || arm_ty.is_error() || prev.is_error() => {
                if prev.is_error() {
                    result = Some(arm_ty);
                }
            }
            Some(prev) => {
                if !mismatched {
                    let d = ctx.type_mismatch(prev, &arm_ty, span);
                    ctx.bag.push(d);
                    mismatched = true;
                }
            }
        }
    }
    report_match_exhaustiveness(ctx, &scrutinee_ty, &arm_patterns, span);
    if mismatched { Type::Error } else { result.unwrap_or(Type::Void) }
}

fn report_match_exhaustiveness(ctx: &mut Ctx, scrutinee_ty: &Type, arm_patterns: &[kira_ir::PatternId], span: Span) {
    let report = kira_patterns::analyze_match(ctx.arena, std::slice::from_ref(scrutinee_ty), arm_patterns, ctx.symbols, ctx.interner);
    if !report.exhaustive {
        ctx.bag.push(Diagnostic::error(
            Kind::NonExhaustiveMatch,
            format!("match is not exhaustive; missing: {}", report.missing.join(", ")),
            span,
        ));
    }
    for &arm_idx in &report.unreachable_arms {
        let arm_span = arm_patterns.get(arm_idx).map(|&p| ctx.arena.pattern(p).span).unwrap_or(span);
        ctx.bag.push(Diagnostic::warning(Kind::UnreachablePattern, "unreachable pattern".to_string(), arm_span));
    }
}

/// The expression-bodied form of `match` (spec §4.3 "Block-expression
/// typing" plus ordinary match-as-value use): every arm's body is a single
/// expression rather than a block of statements.
pub fn check_match_expr(ctx: &mut Ctx, scrutinee: kira_ir::ExprId, arms: &[kira_ir::ast::MatchArm]) -> Type {
    let scrutinee_ty = check_expr(ctx, scrutinee, None);
    let mut result: Option<Type> = None;
    let mut mismatched = false;
    let arm_patterns: Vec<kira_ir::PatternId> = arms.iter().map(|a| a.pattern).collect();
    let mut last_span = None;
    for arm in arms {
        ctx.symbols.enter_scope(ScopeKind::Block);
        check_pattern(ctx, arm.pattern, &scrutinee_ty);
        let arm_ty = check_expr(ctx, arm.body, result.as_ref());
        ctx.symbols.leave_scope();
        last_span = Some(arm.span);
        match &result {
            None => result = Some(arm_ty),
            Some(prev) if prev.equals(&arm_ty) || arm_ty.is_error() || prev.is_error() => {
                if prev.is_error() {
                    result = Some(arm_ty);
                }
            }
            Some(prev) => {
                if !mismatched {
                    let d = ctx.type_mismatch(prev, &arm_ty, arm.span);
                    ctx.bag.push(d);
                    mismatched = true;
                }
            }
        }
    }
    if let Some(span) = last_span {
        report_match_exhaustiveness(ctx, &scrutinee_ty, &arm_patterns, span);
    }
    if mismatched { Type::Error } else { result.unwrap_or(Type::Void) }
}

pub fn check_stmt(ctx: &mut Ctx, id: StmtId) {
    let stmt: Stmt = ctx.arena.stmt(id).clone();
    check_stmt_kind(ctx, &stmt.kind, stmt.span);
}

fn check_stmt_kind(ctx: &mut Ctx, kind: &StmtKind, span: Span) {
    match kind {
        StmtKind::Let { pattern, ty, init } => check_let(ctx, *pattern, *ty, *init),
        StmtKind::Var { name, ty, init } => check_var(ctx, *name, *ty, *init, span),
        StmtKind::Assign { target, value } => check_assign(ctx, target, *value, span),
        StmtKind::If { cond, then_branch, else_branch } => {
            check_condition(ctx, *cond);
            check_block(ctx, *then_branch);
            if let Some(else_branch) = else_branch {
                check_block(ctx, *else_branch);
            }
        }
        StmtKind::For { pattern, iter, body } => check_for(ctx, *pattern, *iter, *body),
        StmtKind::Match { scrutinee, arms } => {
            check_match_stmt(ctx, *scrutinee, arms, span);
        }
        StmtKind::Return(value) => check_return(ctx, *value, span),
        StmtKind::Break { .. } => {}
        StmtKind::ExprStmt(e) => {
            check_expr(ctx, *e, None);
        }
        StmtKind::Block(range) => {
            check_block(ctx, *range);
        }
    }
}

fn check_let(ctx: &mut Ctx, pattern: kira_ir::PatternId, ty: kira_ir::TypeAstId, init: kira_ir::ExprId) {
    let declared = resolve_type(ctx, ty);
    let actual = check_expr(ctx, init, Some(&declared));
    if !actual.equals(&declared) && !actual.is_error() {
        let span = ctx.arena.expr(init).span;
        let d = ctx.type_mismatch(&declared, &actual, span);
        ctx.bag.push(d);
    }
    check_pattern(ctx, pattern, &declared);
}

fn check_var(ctx: &mut Ctx, name: kira_ir::Name, ty: kira_ir::TypeAstId, init: Option<kira_ir::ExprId>, span: Span) {
    let declared = resolve_type(ctx, ty);
    if let Some(init) = init {
        let actual = check_expr(ctx, init, Some(&declared));
        if !actual.equals(&declared) && !actual.is_error() {
            let init_span = ctx.arena.expr(init).span;
            let d = ctx.type_mismatch(&declared, &actual, init_span);
            ctx.bag.push(d);
        }
    }
    let _ = ctx.symbols.define(NewSymbol {
        name,
        kind: SymbolKind::Variable { ty: declared, mutable: true },
        visibility: kira_ir::ast::Visibility::Private,
        doc: None,
        span,
    });
}

fn check_assign(ctx: &mut Ctx, target: &AssignTarget, value: kira_ir::ExprId, span: Span) {
    let target_ty = match target {
        AssignTarget::Identifier(name) => check_assign_identifier(ctx, *name, span),
        AssignTarget::Field { base, name } => {
            let base_ty = check_expr(ctx, *base, None);
            field_type(ctx, &base_ty, *name, span)
        }
        AssignTarget::Index { base, index } => {
            let base_ty = check_expr(ctx, *base, None);
            check_expr(ctx, *index, Some(&Type::Primitive(kira_ir::ast::PrimitiveType::Int(kira_ir::ast::IntWidth::I64))));
            match &base_ty {
                Type::Array { elem, .. } => (**elem).clone(),
                other => other.clone(),
            }
        }
    };
    let actual = check_expr(ctx, value, Some(&target_ty));
    if !actual.equals(&target_ty) && !actual.is_error() && !target_ty.is_error() {
        let value_span = ctx.arena.expr(value).span;
        let d = ctx.type_mismatch(&target_ty, &actual, value_span);
        ctx.bag.push(d);
    }
}

fn check_assign_identifier(ctx: &mut Ctx, name: kira_ir::Name, span: Span) -> Type {
    let Some(sym) = ctx.symbols.lookup(name) else {
        let name_str = ctx.interner.resolve(name).to_string();
        ctx.bag.push(Diagnostic::error(Kind::UndefinedSymbol, format!("undefined symbol '{name_str}'"), span));
        return Type::Error;
    };
    match &ctx.symbols.symbol(sym).kind {
        SymbolKind::Variable { ty, mutable } => {
            if !mutable {
                let name_str = ctx.interner.resolve(name).to_string();
                ctx.bag.push(Diagnostic::error(Kind::ConstraintNotSatisfied, format!("cannot assign to immutable '{name_str}'"), span));
            }
            ty.clone()
        }
        _ => {
            ctx.bag.push(Diagnostic::error(Kind::InvalidOperand, "target is not a variable".to_string(), span));
            Type::Error
        }
    }
}

fn field_type(ctx: &mut Ctx, base_ty: &Type, name: kira_ir::Name, span: Span) -> Type {
    let (sym, args) = match base_ty {
        Type::Named(sym) => (*sym, Vec::new()),
        Type::Instantiated { base, args } => (*base, args.clone()),
        Type::Error => return Type::Error,
        _ => {
            ctx.bag.push(Diagnostic::error(Kind::NoSuchMember, "value has no fields".to_string(), span));
            return Type::Error;
        }
    };
    let SymbolKind::TypeDef { generics, kind: kira_symbols::TypeDefKind::Product(fields) } = ctx.symbols.symbol(sym).kind.clone()
    else {
        ctx.bag.push(Diagnostic::error(Kind::NoSuchMember, "value has no fields".to_string(), span));
        return Type::Error;
    };
    match fields.iter().find(|(n, _)| *n == name) {
        Some((_, ty)) => {
            let subst = generics.iter().map(|g| g.name).zip(args).collect();
            crate::generics::substitute(ty, &subst)
        }
        None => {
            let name_str = ctx.interner.resolve(name).to_string();
            ctx.bag.push(Diagnostic::error(Kind::NoSuchMember, format!("no field '{name_str}'"), span));
            Type::Error
        }
    }
}

/// Element type of a `for` loop's iterable: arrays yield their element
/// type directly; any single-type-argument generic (e.g. a user `Range`-
/// like or collection type) yields its sole argument.
fn iterable_elem_type(ctx: &mut Ctx, iter_ty: &Type, span: Span) -> Type {
    match iter_ty {
        Type::Array { elem, .. } => (**elem).clone(),
        Type::Instantiated { args, .. } if args.len() == 1 => args[0].clone(),
        Type::Error => Type::Error,
        _ => {
            ctx.bag.push(Diagnostic::error(Kind::InvalidOperand, "value is not iterable".to_string(), span));
            Type::Error
        }
    }
}

fn check_for(ctx: &mut Ctx, pattern: kira_ir::PatternId, iter: kira_ir::ExprId, body: StmtRange) {
    let iter_ty = check_expr(ctx, iter, None);
    let elem_span = ctx.arena.expr(iter).span;
    let elem_ty = iterable_elem_type(ctx, &iter_ty, elem_span);
    ctx.symbols.enter_scope(ScopeKind::Block);
    check_pattern(ctx, pattern, &elem_ty);
    check_block_in_current_scope(ctx, body);
    ctx.symbols.leave_scope();
}

fn check_return(ctx: &mut Ctx, value: Option<kira_ir::ExprId>, span: Span) {
    let expected = unwrap_effect_return(&ctx.current_return_ty);
    match value {
        Some(e) => {
            let actual = check_expr(ctx, e, Some(&expected));
            if !actual.equals(&expected) && !actual.is_error() {
                let value_span = ctx.arena.expr(e).span;
                let d = ctx.type_mismatch(&expected, &actual, value_span);
                ctx.bag.push(d);
            }
        }
        None => {
            if !matches!(expected, Type::Void) {
                let d = ctx.type_mismatch(&expected, &Type::Void, span);
                ctx.bag.push(d);
            }
        }
    }
}

/// `return` inside an `effect fn` targets the function's declared return
/// type directly; the `Io`/`IoResult` effect tag describes *callability*,
/// not an extra wrapper the return value must match.
fn unwrap_effect_return(ty: &Type) -> Type {
    match ty {
        Type::Io(inner) => (**inner).clone(),
        other => other.clone(),
    }
}
