//! Orchestration: walk a [`Program`]'s declarations in two passes —
//! signatures (types, then impls/variants, then function/const/let
//! signatures) before bodies — so forward references across the whole
//! module are allowed (spec §4.3).

use rustc_hash::FxHashMap;

use kira_diagnostic::{Bag, Diagnostic, Kind};
use kira_ir::ast::{Decl, TypeDeclKind, Visibility};
use kira_ir::{Arena, EffectTag, ExprId, Program, StringInterner};
use kira_symbols::{
    GenericParamInfo, NewSymbol, ScopeId, SymbolKind, SymbolTable, Type, TypeDefKind, VariantFieldsInfo, VariantInfo,
};

use crate::tables::{MethodSig, MethodTable, VariantEntry, VariantTable};
use crate::{infer, resolve::resolve_type};

/// Resolved types keyed by expression identity — the checker never mutates
/// the AST to carry its answers (spec §9: "Arena-owned ASTs" are immutable
/// once built).
#[derive(Default)]
pub struct TypeTable(FxHashMap<ExprId, Type>);

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ExprId, ty: Type) {
        self.0.insert(id, ty);
    }

    pub fn get(&self, id: ExprId) -> Option<&Type> {
        self.0.get(&id)
    }
}

/// Everything a checking function needs, threaded by mutable reference
/// through every `infer`/`resolve` call instead of living on a struct with
/// dozens of methods — mirrors the teacher's stateless-function-over-
/// shared-context style.
pub struct Ctx<'a> {
    pub arena: &'a Arena,
    pub interner: &'a mut StringInterner,
    pub symbols: &'a mut SymbolTable,
    pub bag: &'a mut Bag,
    pub types: &'a mut TypeTable,
    pub methods: &'a MethodTable,
    pub variants: &'a VariantTable,
    /// The enclosing function's effect tag, for `?`/call-effect checks.
    /// `EffectTag::IoResult` (the most permissive) outside any function
    /// body, e.g. while checking a top-level `const` initializer or a test.
    pub current_effect: EffectTag,
    /// The enclosing function's declared return type, for `return` checks.
    pub current_return_ty: Type,
}

impl Ctx<'_> {
    /// Type names visible from the current scope outward, for "did you
    /// mean" suggestions.
    pub fn type_names_in_scope(&self) -> Vec<&str> {
        names_in_scope(self.symbols, self.interner, self.symbols.current(), |k| {
            matches!(k, SymbolKind::TypeDef { .. })
        })
    }

    pub fn value_names_in_scope(&self) -> Vec<&str> {
        names_in_scope(self.symbols, self.interner, self.symbols.current(), |k| {
            matches!(k, SymbolKind::Variable { .. } | SymbolKind::Function { .. })
        })
    }

    pub fn type_mismatch(&self, expected: &Type, actual: &Type, span: kira_ir::Span) -> Diagnostic {
        Diagnostic::error(
            Kind::TypeMismatch,
            format!(
                "type mismatch: expected '{}', found '{}'",
                expected.display(self.interner, |s| self.symbols.symbol(s).name),
                actual.display(self.interner, |s| self.symbols.symbol(s).name)
            ),
            span,
        )
    }
}

fn names_in_scope<'a>(
    symbols: &SymbolTable,
    interner: &'a StringInterner,
    start: ScopeId,
    matches_kind: impl Fn(&SymbolKind) -> bool,
) -> Vec<&'a str> {
    let mut names = Vec::new();
    let mut scope = Some(start);
    while let Some(id) = scope {
        let s = symbols.scope(id);
        for &symbol_id in s.declared_in_order() {
            let symbol = symbols.symbol(symbol_id);
            if matches_kind(&symbol.kind) {
                names.push(interner.resolve(symbol.name));
            }
        }
        scope = s.parent;
    }
    names
}

/// Check a whole program: register every top-level declaration's signature,
/// then check every function body, test body, and top-level initializer.
/// Diagnostics are accumulated in the returned [`Bag`] — a failure in one
/// declaration never stops the rest from being checked (spec §7).
pub fn check_program(program: &mut Program, symbols: &mut SymbolTable) -> (TypeTable, Bag) {
    let mut bag = Bag::new();
    let mut types = TypeTable::new();
    let mut methods = MethodTable::new();
    let mut variants = VariantTable::new();
    let decls = program.decls.clone();

    register_types(program, symbols, &mut bag, &mut types, &MethodTable::new(), &variants, &decls);
    register_variants(program, symbols, &decls, &mut variants);
    register_impls(program, symbols, &mut bag, &mut types, &variants, &decls, &mut methods);
    register_signatures(program, symbols, &mut bag, &mut types, &methods, &variants, &decls);
    for &decl_id in &decls {
        check_decl(program, symbols, &mut bag, &mut types, &methods, &variants, decl_id);
    }

    (types, bag)
}

fn register_types(
    program: &mut Program,
    symbols: &mut SymbolTable,
    bag: &mut Bag,
    types: &mut TypeTable,
    methods: &MethodTable,
    variants: &VariantTable,
    decls: &[kira_ir::DeclId],
) {
    // Pass 1: pre-register every type name with a placeholder body, so
    // mutually- and self-referential type definitions resolve.
    let mut type_symbols = Vec::new();
    for &decl_id in decls {
        if let Decl::Type(type_decl) = program.arena.decl(decl_id) {
            let generics: Vec<GenericParamInfo> = type_decl
                .generics
                .iter()
                .map(|g| GenericParamInfo { name: g.name, bounds: Vec::new() })
                .collect();
            let placeholder = match &type_decl.kind {
                TypeDeclKind::Sum(_) => TypeDefKind::Sum(Vec::new()),
                TypeDeclKind::Product(_) => TypeDefKind::Product(Vec::new()),
                TypeDeclKind::Alias(_) => TypeDefKind::Alias(Type::Void),
            };
            match symbols.define(NewSymbol {
                name: type_decl.name,
                kind: SymbolKind::TypeDef { generics, kind: placeholder },
                visibility: type_decl.visibility,
                doc: type_decl.doc.clone(),
                span: type_decl.span,
            }) {
                Ok(id) => type_symbols.push((decl_id, id)),
                Err(_existing) => bag.push(duplicate(&program.interner, type_decl.name, type_decl.span)),
            }
        }
    }

    // Pass 2: resolve each type's real field/variant types, now that every
    // type name in the module is visible.
    for (decl_id, sym) in &type_symbols {
        let Decl::Type(type_decl) = program.arena.decl(*decl_id).clone() else {
            continue;
        };
        symbols.enter_scope(kira_symbols::ScopeKind::Block);
        for g in &type_decl.generics {
            let _ = symbols.define(NewSymbol {
                name: g.name,
                kind: SymbolKind::TypeDef { generics: Vec::new(), kind: TypeDefKind::Alias(Type::Var(g.name)) },
                visibility: Visibility::Private,
                doc: None,
                span: g.span,
            });
        }
        let mut ctx = Ctx {
            arena: &program.arena,
            interner: &mut program.interner,
            symbols: &mut *symbols,
            bag: &mut *bag,
            types: &mut *types,
            methods,
            variants,
            current_effect: EffectTag::IoResult,
            current_return_ty: Type::Void,
        };
        let kind = resolve_type_decl_kind(&mut ctx, &type_decl.kind);
        ctx.symbols.leave_scope();
        let generics = match &symbols.symbol(*sym).kind {
            SymbolKind::TypeDef { generics, .. } => generics.clone(),
            _ => Vec::new(),
        };
        symbols.symbol_mut(*sym).kind = SymbolKind::TypeDef { generics, kind };
    }
}

fn resolve_type_decl_kind(ctx: &mut Ctx, kind: &TypeDeclKind) -> TypeDefKind {
    match kind {
        TypeDeclKind::Sum(variants) => TypeDefKind::Sum(
            variants
                .iter()
                .map(|v| VariantInfo {
                    name: v.name,
                    fields: match &v.fields {
                        kira_ir::ast::VariantFields::Unit => VariantFieldsInfo::Unit,
                        kira_ir::ast::VariantFields::Positional(tys) => {
                            VariantFieldsInfo::Positional(tys.iter().map(|&t| resolve_type(ctx, t)).collect())
                        }
                        kira_ir::ast::VariantFields::Record(fields) => {
                            VariantFieldsInfo::Record(fields.iter().map(|f| (f.name, resolve_type(ctx, f.ty))).collect())
                        }
                    },
                })
                .collect(),
        ),
        TypeDeclKind::Product(fields) => {
            TypeDefKind::Product(fields.iter().map(|f| (f.name, resolve_type(ctx, f.ty))).collect())
        }
        TypeDeclKind::Alias(ty) => TypeDefKind::Alias(resolve_type(ctx, *ty)),
    }
}

/// Populate [`VariantTable`] from every sum type's now-resolved variants
/// (run after [`register_types`]'s second pass), so `Variant` expressions
/// and constructor patterns can look up a bare variant name without first
/// knowing which type declared it.
fn register_variants(program: &Program, symbols: &SymbolTable, decls: &[kira_ir::DeclId], variants: &mut VariantTable) {
    for &decl_id in decls {
        let Decl::Type(type_decl) = program.arena.decl(decl_id) else { continue };
        let Some(sym) = symbols.lookup(type_decl.name) else { continue };
        let SymbolKind::TypeDef { generics, kind: TypeDefKind::Sum(variant_infos) } = &symbols.symbol(sym).kind else {
            continue;
        };
        for v in variant_infos {
            let field_types = match &v.fields {
                VariantFieldsInfo::Unit => Vec::new(),
                VariantFieldsInfo::Positional(tys) => tys.clone(),
                VariantFieldsInfo::Record(fields) => fields.iter().map(|(_, t)| t.clone()).collect(),
            };
            variants.insert(v.name, VariantEntry { type_sym: sym, generics: generics.clone(), field_types });
        }
    }
}

fn register_signatures(
    program: &mut Program,
    symbols: &mut SymbolTable,
    bag: &mut Bag,
    types: &mut TypeTable,
    methods: &MethodTable,
    variants: &VariantTable,
    decls: &[kira_ir::DeclId],
) {
    for &decl_id in decls {
        let decl = program.arena.decl(decl_id).clone();
        let mut ctx = Ctx {
            arena: &program.arena,
            interner: &mut program.interner,
            symbols: &mut *symbols,
            bag: &mut *bag,
            types: &mut *types,
            methods,
            variants,
            current_effect: EffectTag::IoResult,
            current_return_ty: Type::Void,
        };
        match decl {
            Decl::Function(f) => {
                let generics = f.generics.iter().map(|g| GenericParamInfo { name: g.name, bounds: Vec::new() }).collect();
                let params: Vec<(kira_ir::Name, Type)> = f.params.iter().map(|p| (p.name, resolve_type(&mut ctx, p.ty))).collect();
                let return_ty = resolve_type(&mut ctx, f.return_ty);
                let effect = (if f.is_effect { EffectTag::Io } else { EffectTag::Pure })
                    .with_result_return(matches!(return_ty, Type::Result { .. }));
                if ctx.interner.resolve(f.name) == "main" && !effect.valid_for_main() {
                    ctx.bag.push(Diagnostic::error(
                        Kind::EffectViolation,
                        "'main' must be declared 'effect fn' and may not be pure".to_string(),
                        f.span,
                    ));
                }
                if ctx
                    .symbols
                    .define(NewSymbol {
                        name: f.name,
                        kind: SymbolKind::Function { generics, params, return_ty, effect, has_body: f.body.is_some() },
                        visibility: f.visibility,
                        doc: f.doc.clone(),
                        span: f.span,
                    })
                    .is_err()
                {
                    let d = duplicate(ctx.interner, f.name, f.span);
                    ctx.bag.push(d);
                }
            }
            Decl::Const(c) => {
                let ty = resolve_type(&mut ctx, c.ty);
                if ctx
                    .symbols
                    .define(NewSymbol {
                        name: c.name,
                        kind: SymbolKind::Variable { ty, mutable: false },
                        visibility: c.visibility,
                        doc: None,
                        span: c.span,
                    })
                    .is_err()
                {
                    let d = duplicate(ctx.interner, c.name, c.span);
                    ctx.bag.push(d);
                }
            }
            Decl::Let(l) => {
                let ty = resolve_type(&mut ctx, l.ty);
                if ctx
                    .symbols
                    .define(NewSymbol {
                        name: l.name,
                        kind: SymbolKind::Variable { ty, mutable: false },
                        visibility: l.visibility,
                        doc: None,
                        span: l.span,
                    })
                    .is_err()
                {
                    let d = duplicate(ctx.interner, l.name, l.span);
                    ctx.bag.push(d);
                }
            }
            _ => {}
        }
    }
}

/// Populate [`MethodTable`] from every `impl` block's method signatures, so
/// `MethodCall` expressions can resolve `receiver.method(...)` without a
/// separate body-checking pass having to know about every impl in the
/// module up front.
fn register_impls(
    program: &mut Program,
    symbols: &mut SymbolTable,
    bag: &mut Bag,
    types: &mut TypeTable,
    variants: &VariantTable,
    decls: &[kira_ir::DeclId],
    out: &mut MethodTable,
) {
    let empty_methods = MethodTable::new();
    for &decl_id in decls {
        let Decl::Impl(impl_decl) = program.arena.decl(decl_id).clone() else { continue };
        let mut ctx = Ctx {
            arena: &program.arena,
            interner: &mut program.interner,
            symbols: &mut *symbols,
            bag: &mut *bag,
            types: &mut *types,
            methods: &empty_methods,
            variants,
            current_effect: EffectTag::IoResult,
            current_return_ty: Type::Void,
        };
        let target_ty = resolve_type(&mut ctx, impl_decl.target);
        let (target_sym, target_generics) = match &target_ty {
            Type::Named(sym) => (*sym, Vec::new()),
            Type::Instantiated { base, args } => {
                let names: Vec<kira_ir::Name> = args
                    .iter()
                    .filter_map(|a| if let Type::Var(n) = a { Some(*n) } else { None })
                    .collect();
                (*base, names)
            }
            _ => continue,
        };
        for method in &impl_decl.methods {
            let own_generics: Vec<GenericParamInfo> =
                method.generics.iter().map(|g| GenericParamInfo { name: g.name, bounds: Vec::new() }).collect();
            let params: Vec<(kira_ir::Name, Type)> =
                method.params.iter().map(|p| (p.name, resolve_type(&mut ctx, p.ty))).collect();
            let return_ty = resolve_type(&mut ctx, method.return_ty);
            let effect = (if method.is_effect { EffectTag::Io } else { EffectTag::Pure })
                .with_result_return(matches!(return_ty, Type::Result { .. }));
            out.insert(
                target_sym,
                method.name,
                MethodSig { target_generics: target_generics.clone(), own_generics, params, return_ty, effect },
            );
        }
    }
}

fn check_decl(
    program: &mut Program,
    symbols: &mut SymbolTable,
    bag: &mut Bag,
    types: &mut TypeTable,
    methods: &MethodTable,
    variants: &VariantTable,
    decl_id: kira_ir::DeclId,
) {
    let decl = program.arena.decl(decl_id).clone();
    match decl {
        Decl::Function(f) => {
            let Some(name_sym) = symbols.lookup(f.name) else { return };
            let (params, return_ty, effect) = match &symbols.symbol(name_sym).kind {
                SymbolKind::Function { params, return_ty, effect, .. } => (params.clone(), return_ty.clone(), *effect),
                _ => return,
            };
            let Some(body) = f.body else {
                bag.push(Diagnostic::error(
                    Kind::MissingBody,
                    format!("function '{}' has no body", program.interner.resolve(f.name)),
                    f.span,
                ));
                return;
            };
            symbols.enter_scope(kira_symbols::ScopeKind::Function);
            bind_generics_and_params(symbols, &f.generics, &params, f.span);
            let mut ctx = Ctx {
                arena: &program.arena,
                interner: &mut program.interner,
                symbols: &mut *symbols,
                bag: &mut *bag,
                types: &mut *types,
                methods,
                variants,
                current_effect: effect,
                current_return_ty: return_ty,
            };
            infer::stmt::check_block(&mut ctx, body);
            symbols.leave_scope();
        }
        Decl::Const(c) => {
            let Some(sym) = symbols.lookup(c.name) else { return };
            let declared_ty = match &symbols.symbol(sym).kind {
                SymbolKind::Variable { ty, .. } => ty.clone(),
                _ => return,
            };
            let mut ctx = Ctx {
                arena: &program.arena,
                interner: &mut program.interner,
                symbols: &mut *symbols,
                bag: &mut *bag,
                types: &mut *types,
                methods,
                variants,
                current_effect: EffectTag::IoResult,
                current_return_ty: Type::Void,
            };
            let actual = infer::expr::check_expr(&mut ctx, c.value, Some(&declared_ty));
            if !actual.equals(&declared_ty) && !actual.is_error() {
                let span = ctx.arena.expr(c.value).span;
                let d = ctx.type_mismatch(&declared_ty, &actual, span);
                ctx.bag.push(d);
            }
        }
        Decl::Let(l) => {
            let Some(sym) = symbols.lookup(l.name) else { return };
            let declared_ty = match &symbols.symbol(sym).kind {
                SymbolKind::Variable { ty, .. } => ty.clone(),
                _ => return,
            };
            let mut ctx = Ctx {
                arena: &program.arena,
                interner: &mut program.interner,
                symbols: &mut *symbols,
                bag: &mut *bag,
                types: &mut *types,
                methods,
                variants,
                current_effect: EffectTag::IoResult,
                current_return_ty: Type::Void,
            };
            let actual = infer::expr::check_expr(&mut ctx, l.init, Some(&declared_ty));
            if !actual.equals(&declared_ty) && !actual.is_error() {
                let span = ctx.arena.expr(l.init).span;
                let d = ctx.type_mismatch(&declared_ty, &actual, span);
                ctx.bag.push(d);
            }
        }
        Decl::Test(t) => {
            symbols.enter_scope(kira_symbols::ScopeKind::Function);
            let mut ctx = Ctx {
                arena: &program.arena,
                interner: &mut program.interner,
                symbols: &mut *symbols,
                bag: &mut *bag,
                types: &mut *types,
                methods,
                variants,
                current_effect: EffectTag::IoResult,
                current_return_ty: Type::Void,
            };
            infer::stmt::check_block(&mut ctx, t.body);
            symbols.leave_scope();
        }
        Decl::Impl(impl_decl) => {
            for method in &impl_decl.methods {
                check_impl_method(program, symbols, bag, types, methods, variants, impl_decl.target, method);
            }
        }
        _ => {}
    }
}

fn bind_generics_and_params(
    symbols: &mut SymbolTable,
    generics: &[kira_ir::ast::GenericParam],
    params: &[(kira_ir::Name, Type)],
    span: kira_ir::Span,
) {
    for g in generics {
        let _ = symbols.define(NewSymbol {
            name: g.name,
            kind: SymbolKind::TypeDef { generics: Vec::new(), kind: TypeDefKind::Alias(Type::Var(g.name)) },
            visibility: Visibility::Private,
            doc: None,
            span: g.span,
        });
    }
    for (name, ty) in params {
        let _ = symbols.define(NewSymbol {
            name: *name,
            kind: SymbolKind::Variable { ty: ty.clone(), mutable: false },
            visibility: Visibility::Private,
            doc: None,
            span,
        });
    }
}

fn check_impl_method(
    program: &mut Program,
    symbols: &mut SymbolTable,
    bag: &mut Bag,
    types: &mut TypeTable,
    methods: &MethodTable,
    variants: &VariantTable,
    target: kira_ir::TypeAstId,
    method: &kira_ir::ast::FunctionDecl,
) {
    symbols.enter_scope(kira_symbols::ScopeKind::Function);
    let mut ctx = Ctx {
        arena: &program.arena,
        interner: &mut program.interner,
        symbols: &mut *symbols,
        bag: &mut *bag,
        types: &mut *types,
        methods,
        variants,
        current_effect: EffectTag::IoResult,
        current_return_ty: Type::Void,
    };
    let self_ty = resolve_type(&mut ctx, target);
    let self_name = ctx.interner.intern("self");
    let _ = ctx.symbols.define(NewSymbol {
        name: self_name,
        kind: SymbolKind::Variable { ty: self_ty, mutable: false },
        visibility: Visibility::Private,
        doc: None,
        span: method.span,
    });
    for g in &method.generics {
        let _ = ctx.symbols.define(NewSymbol {
            name: g.name,
            kind: SymbolKind::TypeDef { generics: Vec::new(), kind: TypeDefKind::Alias(Type::Var(g.name)) },
            visibility: Visibility::Private,
            doc: None,
            span: g.span,
        });
    }
    let params: Vec<(kira_ir::Name, Type)> = method.params.iter().map(|p| (p.name, resolve_type(&mut ctx, p.ty))).collect();
    let return_ty = resolve_type(&mut ctx, method.return_ty);
    let effect =
        (if method.is_effect { EffectTag::Io } else { EffectTag::Pure }).with_result_return(matches!(return_ty, Type::Result { .. }));
    for (name, ty) in &params {
        let _ = ctx.symbols.define(NewSymbol {
            name: *name,
            kind: SymbolKind::Variable { ty: ty.clone(), mutable: false },
            visibility: Visibility::Private,
            doc: None,
            span: method.span,
        });
    }
    if let Some(body) = method.body {
        ctx.current_effect = effect;
        ctx.current_return_ty = return_ty;
        infer::stmt::check_block(&mut ctx, body);
    }
    symbols.leave_scope();
}

fn duplicate(interner: &StringInterner, name: kira_ir::Name, span: kira_ir::Span) -> Diagnostic {
    Diagnostic::error(Kind::DuplicateDefinition, format!("duplicate definition of '{}'", interner.resolve(name)), span)
}
