//! Source locations.
//!
//! Every AST node, symbol, and diagnostic in Kira carries a [`Span`], which
//! in turn carries a [`Position`] at both ends so diagnostics can print
//! `line:col` without re-scanning the source file.

use std::fmt;

/// A single point in a source file.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Position {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number (in UTF-8 bytes, not grapheme clusters).
    pub col: u32,
    /// 0-based byte offset from the start of the file.
    pub offset: u32,
}

impl Position {
    pub const fn new(line: u32, col: u32, offset: u32) -> Self {
        Position { line, col, offset }
    }

    /// The position a freshly parsed program starts at.
    pub const START: Position = Position::new(1, 1, 0);
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A source range, `[start, end)`, used on every AST node, symbol and
/// diagnostic.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    /// Dummy span for synthesized nodes (builtins, desugared code) that have
    /// no real source location.
    pub const DUMMY: Span = Span {
        start: Position::START,
        end: Position::START,
    };

    pub const fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    /// Combine two spans into the smallest span covering both. Used to build
    /// a parent node's span from its first and last child.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start, other.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start.line, self.start.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_spans_first_start_to_last_end() {
        let a = Span::new(Position::new(1, 1, 0), Position::new(1, 4, 3));
        let b = Span::new(Position::new(2, 1, 10), Position::new(2, 6, 15));
        let combined = a.to(b);
        assert_eq!(combined.start, a.start);
        assert_eq!(combined.end, b.end);
    }

    #[test]
    fn display_is_line_colon_col() {
        let s = Span::new(Position::new(3, 7, 20), Position::new(3, 9, 22));
        assert_eq!(s.to_string(), "3:7");
    }
}
