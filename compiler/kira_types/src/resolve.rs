//! Resolve a `kira_ir::ast::TypeAst` (what the user wrote) into a
//! `kira_symbols::Type` (what the checker reasons about) — spec §3.

use kira_diagnostic::{Diagnostic, Kind};
use kira_ir::ast::{TypeAst, TypeAstKind};
use kira_ir::{EffectTag, Name, TypeAstId};
use kira_symbols::{SymbolKind, Type};

use crate::checker::Ctx;

pub fn resolve_type(ctx: &mut Ctx, id: TypeAstId) -> Type {
    let ty_ast: TypeAst = ctx.arena.ty(id).clone();
    match &ty_ast.kind {
        TypeAstKind::Primitive(p) => Type::Primitive(*p),
        TypeAstKind::SelfType => Type::SelfType,
        TypeAstKind::TypeVar { name, .. } => Type::Var(*name),
        TypeAstKind::Named(name) => resolve_named(ctx, *name, ty_ast.span, &[]),
        TypeAstKind::Generic { base, args } => {
            let arg_ids = ctx.arena.type_list(*args).to_vec();
            let resolved_args: Vec<Type> = arg_ids.iter().map(|&a| resolve_type(ctx, a)).collect();
            resolve_named(ctx, *base, ty_ast.span, &resolved_args)
        }
        TypeAstKind::Function { params, ret, effect } => {
            let param_ids = ctx.arena.type_list(*params).to_vec();
            let params = param_ids.iter().map(|&p| resolve_type(ctx, p)).collect();
            let ret = resolve_type(ctx, *ret);
            let base = if *effect { EffectTag::Io } else { EffectTag::Pure };
            let tag = base.with_result_return(matches!(ret, Type::Result { .. }));
            Type::function(params, ret, tag)
        }
        TypeAstKind::Tuple(range) => {
            let ids = ctx.arena.type_list(*range).to_vec();
            Type::Tuple(ids.iter().map(|&i| resolve_type(ctx, i)).collect())
        }
        TypeAstKind::Array { elem, size } => Type::Array {
            elem: Box::new(resolve_type(ctx, *elem)),
            size: *size,
        },
        TypeAstKind::Io(inner) => Type::io(resolve_type(ctx, *inner)),
        TypeAstKind::Result { ok, err } => Type::result(resolve_type(ctx, *ok), resolve_type(ctx, *err)),
        TypeAstKind::Option(inner) => Type::option(resolve_type(ctx, *inner)),
        TypeAstKind::Path(segments) => resolve_path(ctx, segments, ty_ast.span),
    }
}

fn resolve_named(ctx: &mut Ctx, name: Name, span: kira_ir::Span, args: &[Type]) -> Type {
    let Some(sym) = ctx.symbols.lookup(name) else {
        let name_str = ctx.interner.resolve(name).to_string();
        ctx.bag.push(undefined_type(ctx, &name_str, span));
        return Type::Error;
    };
    let SymbolKind::TypeDef { generics, .. } = &ctx.symbols.symbol(sym).kind else {
        let name_str = ctx.interner.resolve(name).to_string();
        ctx.bag.push(Diagnostic::error(
            Kind::UndefinedType,
            format!("'{name_str}' is not a type"),
            span,
        ));
        return Type::Error;
    };
    if generics.len() != args.len() {
        ctx.bag.push(Diagnostic::error(
            Kind::WrongTypeArgCount,
            format!(
                "expected {} type argument(s), found {}",
                generics.len(),
                args.len()
            ),
            span,
        ));
        return Type::Error;
    }
    if args.is_empty() {
        Type::Named(sym)
    } else {
        Type::Instantiated {
            base: sym,
            args: args.to_vec(),
        }
    }
}

fn resolve_path(ctx: &mut Ctx, segments: &[Name], span: kira_ir::Span) -> Type {
    if segments.len() <= 1 {
        let Some(&name) = segments.first() else {
            return Type::Error;
        };
        return resolve_named(ctx, name, span, &[]);
    }
    let (module_path, name) = segments.split_at(segments.len() - 1);
    let name = name[0];
    let Some(module_scope) = ctx.symbols.resolve_module(module_path) else {
        ctx.bag.push(Diagnostic::error(Kind::UndefinedType, "module not loaded", span));
        return Type::Error;
    };
    let Some(sym) = ctx.symbols.lookup_qualified(module_scope, name) else {
        let name_str = ctx.interner.resolve(name).to_string();
        ctx.bag.push(undefined_type(ctx, &name_str, span));
        return Type::Error;
    };
    match &ctx.symbols.symbol(sym).kind {
        SymbolKind::TypeDef { generics, .. } if generics.is_empty() => Type::Named(sym),
        SymbolKind::TypeDef { .. } => {
            ctx.bag.push(Diagnostic::error(
                Kind::WrongTypeArgCount,
                "generic type used without type arguments",
                span,
            ));
            Type::Error
        }
        _ => {
            ctx.bag.push(Diagnostic::error(Kind::UndefinedType, "path does not name a type", span));
            Type::Error
        }
    }
}

fn undefined_type(ctx: &Ctx, name: &str, span: kira_ir::Span) -> Diagnostic {
    let diag = Diagnostic::error(Kind::UndefinedType, format!("undefined type '{name}'"), span);
    match kira_diagnostic::nearest_name(name, ctx.type_names_in_scope()) {
        Some(suggestion) => diag.with_untargeted_note(format!("did you mean '{suggestion}'?")),
        None => diag,
    }
}
