//! AST, spans, arena allocation and name interning for the Kira compiler.
//!
//! This crate holds the value-type tree the (external) parser produces:
//! expressions, statements, patterns, types-as-written and declarations,
//! all allocated from a per-[`Program`] [`Arena`] and indexed by small
//! integer ids rather than boxed pointers, so a whole program's AST is
//! contiguous and drops in one shot.
//!
//! Nothing in this crate resolves names, assigns types, or evaluates
//! anything — it is pure data. `kira_symbols` builds a scope tree over it;
//! `kira_types` assigns resolved types to it; `kira_eval` walks it.

pub mod arena;
pub mod ast;
mod effect;
mod ids;
mod interner;
mod operators;
mod program;
pub mod span;

pub use arena::Arena;
pub use effect::EffectTag;
pub use ids::{
    DeclId, DeclRange, ExprId, ExprRange, PatternId, PatternRange, StmtId, StmtRange, TypeAstId,
    TypeAstRange,
};
pub use interner::{Name, StringInterner};
pub use operators::{BinaryOp, UnaryOp};
pub use program::Program;
pub use span::{Position, Span};
