//! Pattern type-checking and binding extraction (spec §4.3 "Pattern
//! bindings"): the checker annotates every pattern with the types of the
//! names it introduces by defining them directly in the current scope, so
//! the interpreter never has to re-run inference to know what a match arm
//! bound.

use rustc_hash::FxHashMap;

use kira_diagnostic::{Diagnostic, Kind};
use kira_ir::ast::{LiteralPat, PatternKind, Visibility};
use kira_ir::{Name, PatternId, Span};
use kira_symbols::{NewSymbol, SymbolKind, Type, TypeDefKind, VariantFieldsInfo};

use crate::checker::Ctx;
use crate::generics::substitute;

/// Bind every name a pattern introduces, at `expected`'s type, into the
/// current scope. Mismatches between the pattern's shape and `expected`
/// are reported but never abort — the rest of the arm is still checked
/// against whatever bindings could be extracted.
pub fn check_pattern(ctx: &mut Ctx, id: PatternId, expected: &Type) {
    let pat = ctx.arena.pattern(id).clone();
    match &pat.kind {
        PatternKind::Wildcard | PatternKind::Rest => {}
        PatternKind::Identifier { name, is_var } => {
            let _ = ctx.symbols.define(NewSymbol {
                name: *name,
                kind: SymbolKind::Variable { ty: expected.clone(), mutable: *is_var },
                visibility: Visibility::Private,
                doc: None,
                span: pat.span,
            });
        }
        PatternKind::Literal(lit) => check_literal(ctx, lit, expected, pat.span),
        PatternKind::Range { lo, .. } => {
            if !matches!(lo, LiteralPat::Int(_) | LiteralPat::Char(_)) {
                mismatch(ctx, expected, pat.span);
            } else if !expected.is_integer() && !matches!(expected, Type::Primitive(kira_ir::ast::PrimitiveType::Char)) {
                mismatch(ctx, expected, pat.span);
            }
        }
        PatternKind::Constructor { name, args } => check_constructor(ctx, *name, *args, expected, pat.span),
        PatternKind::Record { type_name, fields } => check_record(ctx, *type_name, fields, expected, pat.span),
        PatternKind::Tuple(range) => {
            let ids = ctx.arena.pattern_list(*range).to_vec();
            match expected {
                Type::Tuple(items) if items.len() == ids.len() => {
                    for (&sub_id, item_ty) in ids.iter().zip(items.iter()) {
                        check_pattern(ctx, sub_id, item_ty);
                    }
                }
                _ => {
                    mismatch(ctx, expected, pat.span);
                    for &sub_id in &ids {
                        check_pattern(ctx, sub_id, &Type::Error);
                    }
                }
            }
        }
        PatternKind::Or(range) => {
            let ids = ctx.arena.pattern_list(*range).to_vec();
            // Only the first alternative's bindings are recorded: or-patterns
            // are required to bind identical names in every alternative, and
            // re-defining the same names from later alternatives would be a
            // spurious duplicate-definition error rather than a real one.
            if let Some(&first) = ids.first() {
                check_pattern(ctx, first, expected);
            }
        }
        PatternKind::Guarded { pattern, guard } => {
            check_pattern(ctx, *pattern, expected);
            let guard_ty = crate::infer::expr::check_expr(ctx, *guard, Some(&Type::Primitive(kira_ir::ast::PrimitiveType::Bool)));
            if !guard_ty.is_bool() && !guard_ty.is_error() {
                let span = ctx.arena.expr(*guard).span;
                let d = ctx.type_mismatch(&Type::Primitive(kira_ir::ast::PrimitiveType::Bool), &guard_ty, span);
                ctx.bag.push(d);
            }
        }
        PatternKind::Typed { pattern, ty } => {
            let resolved = crate::resolve::resolve_type(ctx, *ty);
            if !resolved.equals(expected) && !expected.is_error() {
                mismatch(ctx, expected, pat.span);
            }
            check_pattern(ctx, *pattern, &resolved);
        }
    }
}

fn check_literal(ctx: &mut Ctx, lit: &LiteralPat, expected: &Type, span: Span) {
    let ok = match lit {
        LiteralPat::Int(_) => expected.is_integer(),
        LiteralPat::Float(_) => expected.is_float(),
        LiteralPat::Str(_) => matches!(expected, Type::Primitive(kira_ir::ast::PrimitiveType::String)),
        LiteralPat::Char(_) => matches!(expected, Type::Primitive(kira_ir::ast::PrimitiveType::Char)),
        LiteralPat::Bool(_) => expected.is_bool(),
    };
    if !ok && !expected.is_error() {
        mismatch(ctx, expected, span);
    }
}

/// Resolve a constructor pattern's variant fields against `expected`: the
/// well-known `Option`/`Result` shapes, or a user sum type's declared
/// variants (with generic substitution for an instantiated base).
fn check_constructor(ctx: &mut Ctx, name: Name, args: Option<kira_ir::PatternRange>, expected: &Type, span: Span) {
    let some = ctx.interner.intern("Some");
    let none = ctx.interner.intern("None");
    let ok_name = ctx.interner.intern("Ok");
    let err_name = ctx.interner.intern("Err");

    let field_types: Option<Vec<Type>> = match expected {
        Type::Option(inner) if name == some => Some(vec![(**inner).clone()]),
        Type::Option(_) if name == none => Some(Vec::new()),
        Type::Result { ok, .. } if name == ok_name => Some(vec![(**ok).clone()]),
        Type::Result { err, .. } if name == err_name => Some(vec![(**err).clone()]),
        Type::Named(sym) => sum_variant_fields(ctx, *sym, &[], name),
        Type::Instantiated { base, args: ty_args } => sum_variant_fields(ctx, *base, ty_args, name),
        Type::Error => None,
        _ => {
            mismatch(ctx, expected, span);
            None
        }
    };

    let Some(field_types) = field_types else {
        if !expected.is_error() {
            let name_str = ctx.interner.resolve(name).to_string();
            ctx.bag.push(Diagnostic::error(
                Kind::PatternTypeMismatch,
                format!("'{name_str}' is not a variant of '{}'", expected.display(ctx.interner, |s| ctx.symbols.symbol(s).name)),
                span,
            ));
        }
        if let Some(range) = args {
            for &sub_id in ctx.arena.pattern_list(range).to_vec().iter() {
                check_pattern(ctx, sub_id, &Type::Error);
            }
        }
        return;
    };

    let arg_ids: Vec<PatternId> = args.map(|r| ctx.arena.pattern_list(r).to_vec()).unwrap_or_default();
    if arg_ids.len() != field_types.len() {
        let name_str = ctx.interner.resolve(name).to_string();
        ctx.bag.push(Diagnostic::error(
            Kind::PatternTypeMismatch,
            format!("'{name_str}' expects {} field(s), found {}", field_types.len(), arg_ids.len()),
            span,
        ));
    }
    for (sub_id, field_ty) in arg_ids.iter().zip(field_types.iter()) {
        check_pattern(ctx, *sub_id, field_ty);
    }
}

fn sum_variant_fields(ctx: &Ctx, sym: kira_symbols::SymbolId, args: &[Type], name: Name) -> Option<Vec<Type>> {
    let SymbolKind::TypeDef { generics, kind: TypeDefKind::Sum(variants) } = &ctx.symbols.symbol(sym).kind else {
        return None;
    };
    let variant = variants.iter().find(|v| v.name == name)?;
    let subst: FxHashMap<Name, Type> = generics.iter().map(|g| g.name).zip(args.iter().cloned()).collect();
    Some(match &variant.fields {
        VariantFieldsInfo::Unit => Vec::new(),
        VariantFieldsInfo::Positional(tys) => tys.iter().map(|t| substitute(t, &subst)).collect(),
        VariantFieldsInfo::Record(fields) => fields.iter().map(|(_, t)| substitute(t, &subst)).collect(),
    })
}

fn check_record(ctx: &mut Ctx, type_name: Name, fields: &[(Name, PatternId)], expected: &Type, span: Span) {
    let sym = match expected {
        Type::Named(sym) => Some((*sym, Vec::new())),
        Type::Instantiated { base, args } => Some((*base, args.clone())),
        _ => None,
    };
    let Some((sym, args)) = sym else {
        if !expected.is_error() {
            mismatch(ctx, expected, span);
        }
        for (_, sub_id) in fields {
            check_pattern(ctx, *sub_id, &Type::Error);
        }
        return;
    };
    let _ = type_name;
    let SymbolKind::TypeDef { generics, kind: TypeDefKind::Product(product_fields) } = ctx.symbols.symbol(sym).kind.clone() else {
        mismatch(ctx, expected, span);
        for (_, sub_id) in fields {
            check_pattern(ctx, *sub_id, &Type::Error);
        }
        return;
    };
    let subst: FxHashMap<Name, Type> = generics.iter().map(|g| g.name).zip(args.iter().cloned()).collect();
    for (field_name, sub_id) in fields {
        match product_fields.iter().find(|(n, _)| n == field_name) {
            Some((_, ty)) => {
                let field_ty = substitute(ty, &subst);
                check_pattern(ctx, *sub_id, &field_ty);
            }
            None => {
                let name_str = ctx.interner.resolve(*field_name).to_string();
                ctx.bag.push(Diagnostic::error(Kind::NoSuchMember, format!("no field '{name_str}'"), span));
                check_pattern(ctx, *sub_id, &Type::Error);
            }
        }
    }
}

fn mismatch(ctx: &mut Ctx, expected: &Type, span: Span) {
    let d = Diagnostic::error(
        Kind::PatternTypeMismatch,
        format!("pattern does not match type '{}'", expected.display(ctx.interner, |s| ctx.symbols.symbol(s).name)),
        span,
    );
    ctx.bag.push(d);
}
