//! Symbols: the named entities a [`crate::Scope`] binds.

use kira_ir::ast::Visibility;
use kira_ir::{EffectTag, Name, Span};

use crate::{ScopeId, Type};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct SymbolId(pub u32);

#[derive(Clone, Debug)]
pub struct GenericParamInfo {
    pub name: Name,
    /// Trait bounds, resolved to the defining trait's `SymbolId` where the
    /// trait is known; left empty for bounds the checker couldn't resolve
    /// (poisoned, not aborted).
    pub bounds: Vec<SymbolId>,
}

#[derive(Clone, Debug)]
pub enum VariantFieldsInfo {
    Unit,
    Positional(Vec<Type>),
    /// See `kira_ir::ast::VariantFields::Record` — representable, not
    /// reachable from surface syntax.
    Record(Vec<(Name, Type)>),
}

#[derive(Clone, Debug)]
pub struct VariantInfo {
    pub name: Name,
    pub fields: VariantFieldsInfo,
}

#[derive(Clone, Debug)]
pub enum TypeDefKind {
    Sum(Vec<VariantInfo>),
    Product(Vec<(Name, Type)>),
    Alias(Type),
}

#[derive(Clone, Debug)]
pub enum SymbolKind {
    Variable {
        ty: Type,
        mutable: bool,
    },
    Function {
        generics: Vec<GenericParamInfo>,
        params: Vec<(Name, Type)>,
        return_ty: Type,
        effect: EffectTag,
        has_body: bool,
    },
    TypeDef {
        generics: Vec<GenericParamInfo>,
        kind: TypeDefKind,
    },
    Trait {
        super_traits: Vec<SymbolId>,
        methods: Vec<(Name, Type)>,
    },
    /// A module namespace bound by `import a.b.c` (without a `.{...}`
    /// selector) — looked up as `alias.member`.
    Module {
        scope: ScopeId,
    },
}

#[derive(Clone, Debug)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: Name,
    pub kind: SymbolKind,
    pub visibility: Visibility,
    pub doc: Option<String>,
    pub span: Span,
    /// The scope the symbol is defined *in* (its own scope, for a
    /// function/module, is a separate, child `ScopeId`).
    pub defining_scope: ScopeId,
}

impl Symbol {
    pub fn is_pub(&self) -> bool {
        matches!(self.visibility, Visibility::Public)
    }
}
