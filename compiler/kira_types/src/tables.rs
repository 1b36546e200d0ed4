//! Side tables the checker builds once, before checking any body: impl
//! methods keyed by `(target type symbol, method name)`, and sum-type
//! variant constructors keyed by variant name — neither is part of
//! `kira_symbols::SymbolTable` itself, since a bare variant name or a
//! method name is not a scope-visible identifier the way a function or
//! variable is (spec §4.1 only defines variable/function/type/trait/module
//! symbols).

use rustc_hash::FxHashMap;

use kira_ir::{EffectTag, Name};
use kira_symbols::{GenericParamInfo, SymbolId, Type};

#[derive(Clone, Debug)]
pub struct MethodSig {
    /// The `impl` target type's own generic parameters, substituted from
    /// the receiver's concrete instantiation arguments at a call site.
    pub target_generics: Vec<Name>,
    pub own_generics: Vec<GenericParamInfo>,
    pub params: Vec<(Name, Type)>,
    pub return_ty: Type,
    pub effect: EffectTag,
}

#[derive(Default)]
pub struct MethodTable(FxHashMap<(SymbolId, Name), MethodSig>);

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, target: SymbolId, method: Name, sig: MethodSig) {
        self.0.insert((target, method), sig);
    }

    pub fn get(&self, target: SymbolId, method: Name) -> Option<&MethodSig> {
        self.0.get(&(target, method))
    }
}

#[derive(Clone, Debug)]
pub struct VariantEntry {
    pub type_sym: SymbolId,
    pub generics: Vec<GenericParamInfo>,
    /// Field types as declared on the variant, with the *type definition's*
    /// generics left as `Type::Var` — callers substitute concrete
    /// instantiation args in themselves (spec §4.3 generic instantiation).
    pub field_types: Vec<Type>,
}

#[derive(Default)]
pub struct VariantTable(FxHashMap<Name, VariantEntry>);

impl VariantTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: Name, entry: VariantEntry) {
        self.0.insert(name, entry);
    }

    pub fn lookup(&self, name: Name) -> Option<&VariantEntry> {
        self.0.get(&name)
    }
}
