//! Lexical scopes.

use rustc_hash::FxHashMap;

use kira_ir::Name;

use crate::SymbolId;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct ScopeId(pub u32);

impl ScopeId {
    /// Every `SymbolTable` starts with this scope already created.
    pub const GLOBAL: ScopeId = ScopeId(0);
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ScopeKind {
    Global,
    Module,
    Function,
    Block,
}

/// A lexical scope: a name→symbol table, a parent pointer, and the order
/// symbols were declared in (so iteration over "everything in this module"
/// is deterministic and matches source order).
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// The nearest enclosing `Module` (or `Global`) scope — itself, for a
    /// module/global scope. Used to enforce the visibility rule without
    /// re-walking the parent chain on every lookup.
    pub owning_module: ScopeId,
    names: FxHashMap<Name, SymbolId>,
    order: Vec<SymbolId>,
}

impl Scope {
    pub(crate) fn new(
        id: ScopeId,
        kind: ScopeKind,
        parent: Option<ScopeId>,
        owning_module: ScopeId,
    ) -> Self {
        Scope {
            id,
            kind,
            parent,
            owning_module,
            names: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    /// `Err(())` if `name` is already bound in this exact scope
    /// (duplicate-definition — spec §4.1, "within the same scope,
    /// redefinition of the same name is a duplicate-definition error").
    pub(crate) fn define(&mut self, name: Name, symbol: SymbolId) -> Result<(), ()> {
        if self.names.contains_key(&name) {
            return Err(());
        }
        self.names.insert(name, symbol);
        self.order.push(symbol);
        Ok(())
    }

    /// Overwrite (or insert) a binding regardless of prior occupancy. Used
    /// only for `import ... as alias` re-binding into the importing scope,
    /// which is allowed to shadow an outer name without being a
    /// duplicate-definition error (it's a fresh, inner scope entry).
    pub(crate) fn bind(&mut self, name: Name, symbol: SymbolId) {
        if self.names.insert(name, symbol).is_none() {
            self.order.push(symbol);
        }
    }

    pub fn get_local(&self, name: Name) -> Option<SymbolId> {
        self.names.get(&name).copied()
    }

    pub fn declared_in_order(&self) -> &[SymbolId] {
        &self.order
    }
}
