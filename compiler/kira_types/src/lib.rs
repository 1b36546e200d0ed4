//! Type and effect checker: resolves `TypeAst` syntax into [`Type`]s,
//! checks every declaration and expression against the rules in spec §4.3,
//! and hands the pattern-exhaustiveness pass (`kira_patterns`) the
//! scrutinee types it needs for match diagnostics.

mod checker;
mod generics;
mod infer;
mod resolve;
mod tables;

pub use checker::{check_program, Ctx, TypeTable};
pub use generics::{substitute, substitute_all};
pub use infer::{expr::check_expr, pattern::check_pattern, stmt::check_block};
pub use resolve::resolve_type;
pub use tables::{MethodSig, MethodTable, VariantEntry, VariantTable};
