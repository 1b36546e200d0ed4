//! Statement nodes.

use crate::interner::Name;
use crate::span::Span;
use crate::{ExprId, PatternId, StmtRange, TypeAstId};

#[derive(Clone, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum AssignTarget {
    Identifier(Name),
    Field { base: ExprId, name: Name },
    Index { base: ExprId, index: ExprId },
}

/// An arm of a `match` used in *statement* position: its body is a block
/// of statements rather than a single expression. When such a match (or an
/// `if`) is the last statement of a block, the checker and interpreter
/// treat its arms' own trailing expression-statements as the block's
/// value — see `kira_types::infer::blocks` ("block-expression typing",
/// spec §4.3).
#[derive(Clone, Debug)]
pub struct StmtMatchArm {
    pub pattern: PatternId,
    pub body: StmtRange,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum StmtKind {
    Let {
        pattern: PatternId,
        ty: TypeAstId,
        init: ExprId,
    },
    Var {
        name: Name,
        ty: TypeAstId,
        init: Option<ExprId>,
    },
    Assign {
        target: AssignTarget,
        value: ExprId,
    },
    If {
        cond: ExprId,
        then_branch: StmtRange,
        /// An `else if` is represented as an `else` block whose sole
        /// statement is another `If` — no separate "else-if" variant is
        /// needed.
        else_branch: Option<StmtRange>,
    },
    For {
        pattern: PatternId,
        iter: ExprId,
        body: StmtRange,
    },
    Match {
        scrutinee: ExprId,
        arms: Vec<StmtMatchArm>,
    },
    Return(Option<ExprId>),
    Break {
        label: Option<Name>,
    },
    ExprStmt(ExprId),
    Block(StmtRange),
}
