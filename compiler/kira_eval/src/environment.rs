//! The interpreter's environment (spec §4.5): "A singly-linked chain of
//! frames. Each frame is a name→map and a parent pointer."
//!
//! Lexical scoping within one call (`if`/`for`/`match`-arm blocks) is a
//! live, shared chain — `push_scope`/`pop_scope` mirror the reference
//! compiler's `environment.rs` exactly. Closure creation freezes a
//! snapshot of the whole chain instead of keeping it alive (`capture`),
//! matching the reference compiler's `FunctionValue.captures`, which is
//! "frozen at creation" rather than a live reference.

use std::cell::RefCell;
use std::rc::Rc;

use kira_ir::Name;
use rustc_hash::FxHashMap;

use crate::Value;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Mutability {
    Mutable,
    Immutable,
}

#[derive(Clone, Debug)]
struct Binding {
    value: Value,
    mutability: Mutability,
}

struct Scope {
    bindings: FxHashMap<Name, Binding>,
    parent: Option<Rc<RefCell<Scope>>>,
}

impl Scope {
    fn new(parent: Option<Rc<RefCell<Scope>>>) -> Self {
        Scope { bindings: FxHashMap::default(), parent }
    }
}

#[derive(Eq, PartialEq, Debug)]
pub enum AssignError {
    Immutable,
    Undefined,
}

/// A live chain of frames. Cloning an `Environment` clones the `Rc`
/// pointer to the innermost frame, not the frame's contents — two clones
/// see each other's `define`/`assign` calls, the way a closure and its
/// defining block share bindings until the closure snapshots them.
#[derive(Clone)]
pub struct Environment {
    top: Rc<RefCell<Scope>>,
}

impl Environment {
    /// A fresh environment with one empty frame and no parent — the root
    /// environment for a whole program (module-level declarations land
    /// here).
    pub fn new_root() -> Self {
        Environment { top: Rc::new(RefCell::new(Scope::new(None))) }
    }

    /// Enter a new nested block scope.
    pub fn push_scope(&mut self) {
        let parent = self.top.clone();
        self.top = Rc::new(RefCell::new(Scope::new(Some(parent))));
    }

    /// Leave the innermost scope, returning to its parent. A no-op on the
    /// root frame, which has no parent.
    pub fn pop_scope(&mut self) {
        if let Some(parent) = self.top.borrow().parent.clone() {
            self.top = parent;
        }
    }

    /// Define `name` in the innermost frame.
    pub fn define(&self, name: Name, value: Value, mutability: Mutability) {
        self.top.borrow_mut().bindings.insert(name, Binding { value, mutability });
    }

    /// Walk the chain outward looking for `name`.
    pub fn lookup(&self, name: Name) -> Option<Value> {
        let mut frame = Some(self.top.clone());
        while let Some(f) = frame {
            let scope = f.borrow();
            if let Some(binding) = scope.bindings.get(&name) {
                return Some(binding.value.clone());
            }
            frame = scope.parent.clone();
        }
        None
    }

    /// Walk the chain outward to the frame that defines `name` and update
    /// it in place. `Err(Immutable)` if the binding was declared with
    /// `let`; `Err(Undefined)` if no frame defines it at all.
    pub fn assign(&self, name: Name, value: Value) -> Result<(), AssignError> {
        let mut frame = Some(self.top.clone());
        while let Some(f) = frame {
            let mut scope = f.borrow_mut();
            if let Some(binding) = scope.bindings.get_mut(&name) {
                if binding.mutability == Mutability::Immutable {
                    return Err(AssignError::Immutable);
                }
                binding.value = value;
                return Ok(());
            }
            frame = scope.parent.clone();
        }
        Err(AssignError::Undefined)
    }

    /// Flatten every binding visible from here outward into one map —
    /// the frozen snapshot a closure captures at creation time. Outer
    /// bindings are applied first so inner ones correctly shadow them.
    pub fn capture(&self) -> FxHashMap<Name, Value> {
        let mut chain = Vec::new();
        let mut frame = Some(self.top.clone());
        while let Some(f) = frame {
            frame = f.borrow().parent.clone();
            chain.push(f);
        }
        let mut out = FxHashMap::default();
        for f in chain.into_iter().rev() {
            for (name, binding) in &f.borrow().bindings {
                out.insert(*name, binding.value.clone());
            }
        }
        out
    }

    /// Build a fresh call frame pre-populated with a closure's captured
    /// snapshot (spec §4.5's call protocol: "allocate a new frame whose
    /// parent is `fn_val.captured_env`" — realized here by seeding the
    /// new frame directly with the flattened snapshot rather than
    /// re-linking to a live parent, since captures are frozen).
    pub fn from_captures(captures: &FxHashMap<Name, Value>) -> Self {
        let env = Environment::new_root();
        for (name, value) in captures {
            env.define(*name, value.clone(), Mutability::Immutable);
        }
        env
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "Tests use expect for clarity")]
mod tests {
    use super::*;
    use kira_ir::StringInterner;
    use pretty_assertions::assert_eq;

    fn name(interner: &mut StringInterner, s: &str) -> Name {
        interner.intern(s)
    }

    #[test]
    fn lookup_finds_bindings_in_the_current_frame() {
        let mut interner = StringInterner::new();
        let x = name(&mut interner, "x");
        let env = Environment::new_root();
        env.define(x, Value::Unit, Mutability::Immutable);
        assert!(matches!(env.lookup(x), Some(Value::Unit)));
    }

    #[test]
    fn inner_scope_shadows_outer_and_pop_restores_it() {
        let mut interner = StringInterner::new();
        let x = name(&mut interner, "x");
        let mut env = Environment::new_root();
        env.define(x, Value::Bool(true), Mutability::Immutable);
        env.push_scope();
        env.define(x, Value::Bool(false), Mutability::Immutable);
        assert!(matches!(env.lookup(x), Some(Value::Bool(false))));
        env.pop_scope();
        assert!(matches!(env.lookup(x), Some(Value::Bool(true))));
    }

    #[test]
    fn assign_updates_the_defining_frame_through_nested_scopes() {
        let mut interner = StringInterner::new();
        let x = name(&mut interner, "x");
        let mut env = Environment::new_root();
        env.define(x, Value::Bool(true), Mutability::Mutable);
        env.push_scope();
        env.assign(x, Value::Bool(false)).expect("defined in an outer frame");
        env.pop_scope();
        assert!(matches!(env.lookup(x), Some(Value::Bool(false))));
    }

    #[test]
    fn assigning_an_immutable_binding_is_an_error() {
        let mut interner = StringInterner::new();
        let x = name(&mut interner, "x");
        let env = Environment::new_root();
        env.define(x, Value::Unit, Mutability::Immutable);
        assert_eq!(env.assign(x, Value::Unit), Err(AssignError::Immutable));
    }

    #[test]
    fn assigning_an_undefined_name_is_an_error() {
        let mut interner = StringInterner::new();
        let x = name(&mut interner, "x");
        let env = Environment::new_root();
        assert_eq!(env.assign(x, Value::Unit), Err(AssignError::Undefined));
    }

    #[test]
    fn capture_flattens_nested_scopes_with_inner_bindings_winning() {
        let mut interner = StringInterner::new();
        let x = name(&mut interner, "x");
        let y = name(&mut interner, "y");
        let mut env = Environment::new_root();
        env.define(x, Value::Bool(true), Mutability::Immutable);
        env.push_scope();
        env.define(y, Value::Bool(false), Mutability::Immutable);
        let snapshot = env.capture();
        assert_eq!(snapshot.len(), 2);
        assert!(matches!(snapshot.get(&x), Some(Value::Bool(true))));
        assert!(matches!(snapshot.get(&y), Some(Value::Bool(false))));
    }

    #[test]
    fn a_call_frame_built_from_captures_sees_only_the_snapshot() {
        let mut interner = StringInterner::new();
        let x = name(&mut interner, "x");
        let mut captures = FxHashMap::default();
        captures.insert(x, Value::Bool(true));
        let env = Environment::from_captures(&captures);
        assert!(matches!(env.lookup(x), Some(Value::Bool(true))));
    }
}
