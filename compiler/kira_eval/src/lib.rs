//! Kira Eval - the tree-walking interpreter and standard library for the
//! Kira language (spec §2, "Interpreter + stdlib").
//!
//! # Architecture
//!
//! - [`environment`]: the lexical frame chain, `capture`/`from_captures`
//!   realizing closure-capture semantics.
//! - [`value`]: the runtime value domain (`Value`, `KiraInt`, `Closure`).
//! - [`operators`]/[`pattern`]: binary/unary/cast evaluation and pattern
//!   unification, both pure functions over `Value`.
//! - [`host`]: the injectable `std.io`/`std.fs` service boundary.
//! - [`interpreter`]: expression/statement evaluation and the call
//!   protocol.
//! - [`stdlib`]: `std.string`, `std.list`, `std.map`, `std.char`, `std.io`,
//!   `std.fs`.

mod environment;
mod error;
pub mod host;
pub mod interpreter;
mod operators;
mod pattern;
mod stdlib;
pub mod value;

pub use environment::{AssignError, Environment, Mutability};
pub use error::{Eval, RuntimeAbort, Unwind};
pub use host::{BufferHost, Host, HostResult, NativeHost, SharedHost};
pub use interpreter::Interpreter;
pub use value::{Builtin, BuiltinFn, Closure, KiraInt, RecordData, Value, VariantData};
