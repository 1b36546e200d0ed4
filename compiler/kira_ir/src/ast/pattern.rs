//! Pattern nodes, matched by the pattern compiler (`kira_patterns`) and
//! bound by the interpreter.

use crate::interner::Name;
use crate::span::Span;
use crate::{ExprId, PatternId, PatternRange, TypeAstId};

#[derive(Clone, Debug)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum LiteralPat {
    Int(i128),
    Float(u64),
    Str(Name),
    Char(char),
    Bool(bool),
}

#[derive(Clone, Debug)]
pub enum PatternKind {
    Wildcard,
    Identifier {
        name: Name,
        is_var: bool,
    },
    Literal(LiteralPat),
    /// A sum-type variant pattern, `Some(x)`, `Nil`, `Cons(h, t)`.
    /// `args: None` is a bare unit variant (`Nil`); `Some(vec![])` is an
    /// explicitly-empty argument list, which is distinct in surface syntax
    /// from a bare name (`Nil` vs. `Nil()`), though both match the same
    /// values.
    Constructor {
        name: Name,
        args: Option<PatternRange>,
    },
    Record {
        type_name: Name,
        fields: Vec<(Name, PatternId)>,
    },
    Tuple(PatternRange),
    Or(PatternRange),
    /// `pat if expr`.
    Guarded {
        pattern: PatternId,
        guard: ExprId,
    },
    /// `lo..hi` or `lo..=hi` over int or char literals.
    Range {
        lo: LiteralPat,
        hi: LiteralPat,
        inclusive: bool,
    },
    /// `..` inside a tuple/record pattern's field list.
    Rest,
    Typed {
        pattern: PatternId,
        ty: TypeAstId,
    },
}
