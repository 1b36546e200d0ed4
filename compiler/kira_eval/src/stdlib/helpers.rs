//! Argument validation shared by every `std.*` dispatch function (spec
//! §4.5's standard-library shapes), in the same spirit as the reference
//! compiler's `methods::helpers` module.

use kira_ir::Span;

use crate::error::{Eval, RuntimeAbort};
use crate::value::{KiraInt, Value};

pub fn require_args(qualified_name: &str, expected: usize, args: &[Value], span: Span) -> Eval<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(RuntimeAbort::new(
            format!("'{qualified_name}' expects {expected} argument(s), got {}", args.len()),
            span,
        )
        .into())
    }
}

pub fn require_str<'a>(qualified_name: &str, args: &'a [Value], index: usize, span: Span) -> Eval<&'a str> {
    match &args[index] {
        Value::Str(s) => Ok(s.as_ref()),
        other => Err(RuntimeAbort::new(
            format!("'{qualified_name}' expects a string argument, got a {}", other.type_name()),
            span,
        )
        .into()),
    }
}

pub fn require_int(qualified_name: &str, args: &[Value], index: usize, span: Span) -> Eval<KiraInt> {
    match &args[index] {
        Value::Int(n) => Ok(*n),
        other => Err(RuntimeAbort::new(
            format!("'{qualified_name}' expects an integer argument, got a {}", other.type_name()),
            span,
        )
        .into()),
    }
}

pub fn require_char(qualified_name: &str, args: &[Value], index: usize, span: Span) -> Eval<char> {
    match &args[index] {
        Value::Char(c) => Ok(*c),
        other => Err(RuntimeAbort::new(
            format!("'{qualified_name}' expects a char argument, got a {}", other.type_name()),
            span,
        )
        .into()),
    }
}
