//! The symbol table: nested scopes, symbol definitions, lookup with
//! shadowing and visibility, and the module registry (spec §4.1).

use rustc_hash::FxHashMap;

use kira_ir::{Name, Span};

use crate::scope::{Scope, ScopeKind};
use crate::symbol::{Symbol, SymbolKind};
use crate::{ScopeId, SymbolId};

/// Data needed to define a new symbol, minus the `SymbolId`/`defining_scope`
/// the table assigns.
pub struct NewSymbol {
    pub name: Name,
    pub kind: SymbolKind,
    pub visibility: kira_ir::ast::Visibility,
    pub doc: Option<String>,
    pub span: Span,
}

pub struct SymbolTable {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    current: ScopeId,
    stack: Vec<ScopeId>,
    module_registry: FxHashMap<Vec<Name>, ScopeId>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        let global = Scope::new(ScopeId::GLOBAL, ScopeKind::Global, None, ScopeId::GLOBAL);
        SymbolTable {
            scopes: vec![global],
            symbols: Vec::new(),
            current: ScopeId::GLOBAL,
            stack: Vec::new(),
            module_registry: FxHashMap::default(),
        }
    }

    pub fn current(&self) -> ScopeId {
        self.current
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn owning_module(&self, id: ScopeId) -> ScopeId {
        self.scope(id).owning_module
    }

    /// Create a new child of the current scope and make it current. Mirrors
    /// the reference compiler's scope-stack convention (push on enter, pop
    /// on leave) rather than requiring callers to pass parents explicitly.
    pub fn enter_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let parent = self.current;
        let id = ScopeId(self.scopes.len() as u32);
        let owning_module = match kind {
            ScopeKind::Module => id,
            _ => self.scope(parent).owning_module,
        };
        self.scopes.push(Scope::new(id, kind, Some(parent), owning_module));
        self.stack.push(self.current);
        self.current = id;
        id
    }

    /// Return to the scope that was current before the matching
    /// `enter_scope`. A no-op at the global scope (nothing to leave).
    pub fn leave_scope(&mut self) {
        if let Some(previous) = self.stack.pop() {
            self.current = previous;
        }
    }

    /// Jump directly to a previously created scope (used by the module
    /// loader to re-enter a module scope while populating it, and by a
    /// checker re-visiting a function body after signatures have all been
    /// registered).
    pub fn set_current(&mut self, id: ScopeId) {
        self.current = id;
    }

    /// Define a new symbol in the current scope.
    ///
    /// `Err` carries the `SymbolId` of the symbol already occupying that
    /// name in this exact scope (spec: shadowing is fine across nested
    /// scopes, but redefinition *within* one scope is a duplicate
    /// definition error).
    pub fn define(&mut self, new: NewSymbol) -> Result<SymbolId, SymbolId> {
        let current = self.current;
        if let Some(existing) = self.scope(current).get_local(new.name) {
            return Err(existing);
        }
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            id,
            name: new.name,
            kind: new.kind,
            visibility: new.visibility,
            doc: new.doc,
            span: new.span,
            defining_scope: current,
        });
        // Already confirmed absent above; `bind` performs the same
        // insert-and-record-order work as `define` without re-checking.
        self.scopes[current.0 as usize].bind(new.name, id);
        Ok(id)
    }

    /// Look up `name` starting at the current scope and walking outward,
    /// honoring shadowing (innermost wins) and cross-module visibility
    /// (private symbols defined in a different module are skipped).
    pub fn lookup(&self, name: Name) -> Option<SymbolId> {
        self.lookup_from(self.current, name)
    }

    pub fn lookup_from(&self, start: ScopeId, name: Name) -> Option<SymbolId> {
        let requester_module = self.owning_module(start);
        let mut scope = Some(start);
        while let Some(id) = scope {
            let s = self.scope(id);
            if let Some(symbol_id) = s.get_local(name) {
                let symbol = self.symbol(symbol_id);
                if s.owning_module == requester_module || symbol.is_pub() {
                    return Some(symbol_id);
                }
                // Same name, but private and defined in a different
                // module's scope tree: invisible from here. Keep walking
                // outward in case an outer, visible binding shadows it.
            }
            scope = s.parent;
        }
        None
    }

    /// Look up a `pub` item directly inside a module (used to resolve
    /// `import a.b.c.{x}` — never sees private symbols, since the request
    /// always originates outside the module).
    pub fn lookup_qualified(&self, module: ScopeId, name: Name) -> Option<SymbolId> {
        let symbol_id = self.scope(module).get_local(name)?;
        let symbol = self.symbol(symbol_id);
        if symbol.is_pub() {
            Some(symbol_id)
        } else {
            None
        }
    }

    pub fn register_module(&mut self, path: Vec<Name>, scope: ScopeId) {
        self.module_registry.insert(path, scope);
    }

    pub fn resolve_module(&self, path: &[Name]) -> Option<ScopeId> {
        self.module_registry.get(path).copied()
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.0 as usize]
    }

    /// Bind `name` to `symbol` directly in the current scope, overwriting
    /// any existing binding. Used for `import a.b.c.{x, y as z}`, which is
    /// allowed to rebind a name the importing scope already shadows from
    /// further out (it's not a duplicate-definition in the `define` sense:
    /// the name is new *to this scope's declaration list* in source order,
    /// even if the hash map slot was already touched by a wider-scope
    /// lookup path).
    pub fn bind_in_current(&mut self, name: Name, symbol: SymbolId) {
        let current = self.current;
        self.scopes[current.0 as usize].bind(name, symbol);
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "Tests use expect for clarity")]
mod tests {
    use super::*;
    use kira_ir::ast::Visibility;
    use kira_ir::{Span, StringInterner};

    fn variable(interner: &mut StringInterner, table: &mut SymbolTable, name: &str, visibility: Visibility) -> SymbolId {
        let name = interner.intern(name);
        table
            .define(NewSymbol {
                name,
                kind: SymbolKind::Variable {
                    ty: crate::Type::Void,
                    mutable: false,
                },
                visibility,
                doc: None,
                span: Span::DUMMY,
            })
            .expect("not a duplicate")
    }

    #[test]
    fn redefining_in_the_same_scope_is_an_error() {
        let mut interner = StringInterner::new();
        let mut table = SymbolTable::new();
        let name = interner.intern("x");
        let first = table
            .define(NewSymbol {
                name,
                kind: SymbolKind::Variable {
                    ty: crate::Type::Void,
                    mutable: false,
                },
                visibility: Visibility::Private,
                doc: None,
                span: Span::DUMMY,
            })
            .expect("first definition succeeds");
        let second = table.define(NewSymbol {
            name,
            kind: SymbolKind::Variable {
                ty: crate::Type::Void,
                mutable: false,
            },
            visibility: Visibility::Private,
            doc: None,
            span: Span::DUMMY,
        });
        assert_eq!(second, Err(first));
    }

    #[test]
    fn inner_scope_shadows_outer() {
        let mut interner = StringInterner::new();
        let mut table = SymbolTable::new();
        let outer = variable(&mut interner, &mut table, "x", Visibility::Private);
        table.enter_scope(ScopeKind::Block);
        let inner = variable(&mut interner, &mut table, "x", Visibility::Private);
        let name = interner.intern("x");
        assert_eq!(table.lookup(name), Some(inner));
        table.leave_scope();
        assert_eq!(table.lookup(name), Some(outer));
    }

    #[test]
    fn private_symbol_in_another_module_is_invisible() {
        let mut interner = StringInterner::new();
        let mut table = SymbolTable::new();
        table.enter_scope(ScopeKind::Module);
        let private_name = variable(&mut interner, &mut table, "secret", Visibility::Private);
        let module_scope = table.current();
        table.leave_scope();

        table.enter_scope(ScopeKind::Module);
        let name = interner.intern("secret");
        assert_eq!(table.lookup_qualified(module_scope, name), None);
        let _ = private_name;
    }

    #[test]
    fn pub_symbol_in_another_module_is_visible_via_qualified_lookup() {
        let mut interner = StringInterner::new();
        let mut table = SymbolTable::new();
        table.enter_scope(ScopeKind::Module);
        let public = variable(&mut interner, &mut table, "shared", Visibility::Public);
        let module_scope = table.current();
        table.leave_scope();

        let name = interner.intern("shared");
        assert_eq!(table.lookup_qualified(module_scope, name), Some(public));
    }
}
