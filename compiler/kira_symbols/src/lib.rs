//! Resolved types, the symbol table, and scope tree that unify module
//! loading, type checking, pattern compilation, and evaluation.
//!
//! This crate owns the one representation of "what a name means" that the
//! rest of the pipeline shares: [`Type`] is the checker's output type (as
//! opposed to `kira_ir::ast::TypeAst`, the as-written syntax), and
//! [`SymbolTable`] is the single source of truth for scoping and visibility.

mod compat;
mod scope;
mod symbol;
mod table;
mod ty;

pub use compat::{arithmetic_result, comparison_allowed, equality_allowed, wider};
pub use scope::{Scope, ScopeId, ScopeKind};
pub use symbol::{GenericParamInfo, Symbol, SymbolId, SymbolKind, TypeDefKind, VariantFieldsInfo, VariantInfo};
pub use table::{NewSymbol, SymbolTable};
pub use ty::Type;
