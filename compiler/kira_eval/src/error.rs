//! Runtime aborts and the non-local control-flow signal every evaluation
//! step threads through with `?` (spec §7: "Interpreter runtime errors ...
//! are surfaced as aborts with a message and the offending span").

use kira_diagnostic::{Diagnostic, Kind};
use kira_ir::Span;
use thiserror::Error;

use crate::Value;

/// An interpreter abort: division by zero, a match with no matching arm,
/// an out-of-range index, a call to a non-function value, and the like.
/// `Result`/`Option` values are never converted into one of these
/// implicitly — only genuine runtime faults are.
#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub struct RuntimeAbort {
    pub message: String,
    pub span: Span,
}

impl RuntimeAbort {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        RuntimeAbort { message: message.into(), span }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(Kind::RuntimeAbort, self.message.clone(), self.span)
    }
}

/// What evaluating a statement or expression produced besides an ordinary
/// value: a non-local exit. All three propagate identically through `?`;
/// only the frame (`call`) or loop (`exec_for`) boundary that owns the
/// exit catches its own kind.
#[derive(Clone, Debug)]
pub enum Unwind {
    /// `return expr;`, or the unwinding form of `?` on `Err`/`None` —
    /// both only ever cross back out to the nearest enclosing `call`
    /// (spec §4.5, "`?` ... never crosses into a different function
    /// frame").
    Return(Value),
    /// `break;` inside a `for` loop.
    Break,
    Abort(RuntimeAbort),
}

impl From<RuntimeAbort> for Unwind {
    fn from(abort: RuntimeAbort) -> Self {
        Unwind::Abort(abort)
    }
}

pub type Eval<T> = Result<T, Unwind>;
