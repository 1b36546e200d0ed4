//! Structured diagnostics for the Kira compiler.
//!
//! A [`Diagnostic`] carries a severity, a [`Kind`] from the spec's
//! taxonomy (§7), a message, a primary span, and any number of secondary
//! [`Note`]s. [`Bag`] is the accumulator the checker and loader share so
//! that one failure never aborts a whole pass (§7, "propagation policy").

mod bag;
mod diagnostic;
mod kind;
mod suggest;

pub use bag::Bag;
pub use diagnostic::{Diagnostic, Note, Severity};
pub use kind::Kind;
pub use suggest::nearest_name;
