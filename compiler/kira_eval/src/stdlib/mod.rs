//! The standard library (spec §4.5's "standard-library shapes the checker
//! knows"): `std.string`, `std.list`, `std.map`, `std.char`, `std.io`,
//! `std.fs`. Reached only through `std.namespace.function(args...)` call
//! syntax (`Interpreter::std_path`); there is no method-call or bare-value
//! form, matching every example in the specification.

mod char;
mod fs;
mod helpers;
mod io;
mod list;
mod map;
mod string;

use kira_ir::Span;

use crate::error::{Eval, RuntimeAbort};
use crate::interpreter::Interpreter;
use crate::value::Value;

pub fn dispatch(interp: &Interpreter, segments: &[&str], args: &[Value], span: Span) -> Eval<Value> {
    let [_std, namespace, function] = segments else {
        return Err(RuntimeAbort::new(format!("unknown standard-library path 'std.{}'", segments[1..].join(".")), span).into());
    };
    match *namespace {
        "string" => string::dispatch(interp, function, args, span),
        "list" => list::dispatch(interp, function, args, span),
        "map" => map::dispatch(interp, function, args, span),
        "char" => char::dispatch(interp, function, args, span),
        "io" => io::dispatch(interp, function, args, span),
        "fs" => fs::dispatch(interp, function, args, span),
        _ => Err(RuntimeAbort::new(format!("unknown standard-library module 'std.{namespace}'"), span).into()),
    }
}

fn no_such_function(namespace: &str, name: &str, span: Span) -> Eval<Value> {
    Err(RuntimeAbort::new(format!("no such function '{namespace}.{name}'"), span).into())
}
