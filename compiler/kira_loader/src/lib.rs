//! Project configuration and module loading.
//!
//! Resolves dotted module paths to `.ki` files (`kira.toml` first, then
//! configured search directories, then the current directory), loads each
//! module's own imports before the module itself is checked, and populates
//! one shared [`kira_symbols::SymbolTable`] and [`kira_ir::StringInterner`]
//! across a whole loading session.
//!
//! This crate does not parse or type-check Kira source itself — both are
//! injected into [`Session::load_module`] as closures, so that loading
//! order (imports depth-first, then the importer) is enforced here while
//! the actual grammar and type rules live in their own crates.

mod config;
mod error;
mod resolve;
mod session;

pub use config::ProjectConfig;
pub use error::LoadError;
pub use session::{CheckFn, ParseFn, Session};
