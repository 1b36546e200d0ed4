//! Accumulates diagnostics instead of short-circuiting on the first one.
//!
//! Spec §7: "Checker diagnostics are accumulated, not thrown — checking
//! continues after a local failure by poisoning the offending subexpression
//! with `error` type". A [`Bag`] is the accumulator every checker pass and
//! the module loader share.

use crate::diagnostic::Diagnostic;

#[derive(Default)]
pub struct Bag {
    diagnostics: Vec<Diagnostic>,
}

impl Bag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: Bag) {
        self.diagnostics.extend(other.diagnostics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::Kind;
    use kira_ir::Span;

    #[test]
    fn has_errors_ignores_warnings_and_hints() {
        let mut bag = Bag::new();
        bag.push(Diagnostic::warning(Kind::UnreachablePattern, "x", Span::DUMMY));
        bag.push(Diagnostic::hint(Kind::UndefinedSymbol, "y", Span::DUMMY));
        assert!(!bag.has_errors());
        bag.push(Diagnostic::error(Kind::TypeMismatch, "z", Span::DUMMY));
        assert!(bag.has_errors());
    }
}
