//! Top-level declarations.

use crate::interner::Name;
use crate::span::Span;
use crate::{ExprId, StmtRange, TypeAstId};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

#[derive(Clone, Debug)]
pub struct GenericParam {
    pub name: Name,
    pub bounds: Vec<Name>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Param {
    pub name: Name,
    pub ty: TypeAstId,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct WherePredicate {
    pub type_var: Name,
    pub bounds: Vec<Name>,
}

#[derive(Clone, Debug)]
pub struct FunctionDecl {
    pub name: Name,
    pub generics: Vec<GenericParam>,
    pub params: Vec<Param>,
    pub return_ty: TypeAstId,
    pub is_effect: bool,
    pub visibility: Visibility,
    /// `None` for a trait method signature with no default body.
    pub body: Option<StmtRange>,
    pub where_clause: Vec<WherePredicate>,
    pub doc: Option<String>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct FieldDecl {
    pub name: Name,
    pub ty: TypeAstId,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum VariantFields {
    Unit,
    Positional(Vec<TypeAstId>),
    /// Record-style variant fields (`| Wrapped { value: T }`). Representable
    /// here but not reachable from surface syntax — spec §9 open question.
    Record(Vec<FieldDecl>),
}

#[derive(Clone, Debug)]
pub struct VariantDecl {
    pub name: Name,
    pub fields: VariantFields,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum TypeDeclKind {
    Sum(Vec<VariantDecl>),
    Product(Vec<FieldDecl>),
    Alias(TypeAstId),
}

#[derive(Clone, Debug)]
pub struct TypeDecl {
    pub name: Name,
    pub generics: Vec<GenericParam>,
    pub kind: TypeDeclKind,
    pub visibility: Visibility,
    pub doc: Option<String>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct TraitMethodSig {
    pub name: Name,
    pub generics: Vec<GenericParam>,
    pub params: Vec<Param>,
    pub return_ty: TypeAstId,
    pub is_effect: bool,
    pub default_body: Option<StmtRange>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct TraitDecl {
    pub name: Name,
    pub super_traits: Vec<Name>,
    pub methods: Vec<TraitMethodSig>,
    pub visibility: Visibility,
    pub doc: Option<String>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ImplDecl {
    pub trait_name: Option<Name>,
    pub target: TypeAstId,
    pub methods: Vec<FunctionDecl>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ModuleDecl {
    pub path: Vec<Name>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ImportItem {
    pub name: Name,
    pub alias: Option<Name>,
}

#[derive(Clone, Debug)]
pub struct ImportDecl {
    pub path: Vec<Name>,
    /// `None` for `import a.b.c` (binds the module namespace); `Some` for
    /// `import a.b.c.{x, y as z}` (binds selected items).
    pub items: Option<Vec<ImportItem>>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ConstDecl {
    pub name: Name,
    pub ty: TypeAstId,
    pub value: ExprId,
    pub visibility: Visibility,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct TopLevelLet {
    pub name: Name,
    pub ty: TypeAstId,
    pub init: ExprId,
    pub visibility: Visibility,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct TestDecl {
    pub name: Name,
    pub body: StmtRange,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum Decl {
    Function(FunctionDecl),
    Type(TypeDecl),
    Trait(TraitDecl),
    Impl(ImplDecl),
    Module(ModuleDecl),
    Import(ImportDecl),
    Const(ConstDecl),
    Let(TopLevelLet),
    Test(TestDecl),
}

impl Decl {
    pub fn span(&self) -> Span {
        match self {
            Decl::Function(d) => d.span,
            Decl::Type(d) => d.span,
            Decl::Trait(d) => d.span,
            Decl::Impl(d) => d.span,
            Decl::Module(d) => d.span,
            Decl::Import(d) => d.span,
            Decl::Const(d) => d.span,
            Decl::Let(d) => d.span,
            Decl::Test(d) => d.span,
        }
    }

    pub fn visibility(&self) -> Visibility {
        match self {
            Decl::Function(d) => d.visibility,
            Decl::Type(d) => d.visibility,
            Decl::Trait(d) => d.visibility,
            Decl::Const(d) => d.visibility,
            Decl::Let(d) => d.visibility,
            Decl::Impl(_) | Decl::Module(_) | Decl::Import(_) | Decl::Test(_) => {
                Visibility::Private
            }
        }
    }
}
