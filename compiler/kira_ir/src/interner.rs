//! Interned identifiers.
//!
//! Identifiers (variable names, function names, module path segments, field
//! names) are interned to a [`Name`] so that equality and hashing in the
//! symbol table and environment are `u32` comparisons rather than string
//! comparisons.

use rustc_hash::FxHashMap;
use std::fmt;

/// An interned identifier. Cheap to copy, compare and hash.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Name(u32);

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

/// Owns the string backing every [`Name`] ever interned.
///
/// One `StringInterner` is shared by a whole [`crate::Program`] (and, in a
/// multi-module session, by the whole `Session`) so that names interned
/// while loading one module compare equal to the same spelling interned
/// while loading another.
#[derive(Default, Clone)]
pub struct StringInterner {
    strings: Vec<Box<str>>,
    lookup: FxHashMap<Box<str>, Name>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `s`, returning the existing `Name` if it was already interned.
    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(name) = self.lookup.get(s) {
            return *name;
        }
        let id = Name(self.strings.len() as u32);
        let boxed: Box<str> = s.into();
        self.strings.push(boxed.clone());
        self.lookup.insert(boxed, id);
        id
    }

    /// Resolve a `Name` back to its text.
    ///
    /// # Panics
    /// Panics if `name` was not produced by this interner.
    pub fn resolve(&self, name: Name) -> &str {
        &self.strings[name.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_the_same_spelling_twice_returns_the_same_name() {
        let mut interner = StringInterner::new();
        let a = interner.intern("foo");
        let b = interner.intern("foo");
        assert_eq!(a, b);
    }

    #[test]
    fn different_spellings_intern_to_different_names() {
        let mut interner = StringInterner::new();
        let a = interner.intern("foo");
        let b = interner.intern("bar");
        assert_ne!(a, b);
    }

    #[test]
    fn resolve_round_trips() {
        let mut interner = StringInterner::new();
        let name = interner.intern("hello");
        assert_eq!(interner.resolve(name), "hello");
    }
}
