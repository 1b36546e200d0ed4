//! Expression nodes.

use crate::interner::Name;
use crate::span::Span;
use crate::{
    BinaryOp, ExprId, ExprRange, PatternId, StmtRange, TypeAstId, TypeAstRange, UnaryOp,
};

#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// One piece of an interpolated string literal: either a literal chunk or
/// an embedded expression to format and splice in.
#[derive(Clone, Debug)]
pub enum TemplatePart {
    Literal(Name),
    Expr(ExprId),
}

/// An arm of a `match` used in *expression* position (every arm's body is
/// an expression, not a block of statements — see `kira_ir::ast::stmt` for
/// the statement-position form whose arm bodies are blocks).
#[derive(Clone, Debug)]
pub struct MatchArm {
    pub pattern: PatternId,
    pub body: ExprId,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    IntLiteral(i128),
    FloatLiteral(u64), // f64 bits, for Eq/Hash
    StringLiteral(Name),
    CharLiteral(char),
    BoolLiteral(bool),
    Identifier {
        name: Name,
        generic_args: Option<TypeAstRange>,
    },
    SelfExpr,
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Field {
        base: ExprId,
        name: Name,
    },
    Index {
        base: ExprId,
        index: ExprId,
    },
    TupleAccess {
        base: ExprId,
        index: u32,
    },
    Call {
        callee: ExprId,
        args: ExprRange,
    },
    MethodCall {
        receiver: ExprId,
        method: Name,
        generic_args: Option<TypeAstRange>,
        args: ExprRange,
    },
    Closure {
        params: Vec<ClosureParam>,
        return_ty: Option<TypeAstId>,
        is_effect: bool,
        body: StmtRange,
    },
    Match {
        scrutinee: ExprId,
        arms: Vec<MatchArm>,
    },
    Tuple(ExprRange),
    Array(ExprRange),
    Record {
        type_name: Option<Name>,
        fields: Vec<(Name, ExprId)>,
    },
    /// A sum-type variant constructor applied to arguments, e.g. `Cons(1, Nil)`.
    ///
    /// `fields` is only ever non-empty for the record-variant form
    /// (`Wrapped { value: x }`), which is not reachable from surface syntax
    /// (spec §9 open questions) — kept here so the checker/interpreter have
    /// a documented, deliberately-untested dead branch rather than an
    /// unrepresentable case.
    Variant {
        name: Name,
        positional: ExprRange,
        fields: Vec<(Name, ExprId)>,
    },
    Cast {
        expr: ExprId,
        ty: TypeAstId,
    },
    Range {
        start: Option<ExprId>,
        end: Option<ExprId>,
        inclusive: bool,
    },
    Grouped(ExprId),
    InterpolatedString(Vec<TemplatePart>),
    Try(ExprId),
    NullCoalesce {
        value: ExprId,
        default: ExprId,
    },
    /// A poisoned expression: the parser or an earlier check step could not
    /// make sense of this node. Carries no further structure; the checker
    /// assigns it the `error` resolved type and never re-diagnoses it.
    Error,
}

#[derive(Clone, Debug)]
pub struct ClosureParam {
    pub name: Name,
    pub ty: TypeAstId,
    pub span: Span,
}
