//! `std.fs` (spec §4.5). Failures are reported as `Err(string)`, never as a
//! runtime abort — a missing file is an ordinary, expected outcome a Kira
//! program is meant to handle with `?`/`match`, not a programmer error.

use kira_ir::Span;

use crate::error::Eval;
use crate::interpreter::Interpreter;
use crate::value::Value;

use super::helpers::{require_args, require_str};

pub fn dispatch(interp: &Interpreter, name: &str, args: &[Value], span: Span) -> Eval<Value> {
    let qualified = || format!("std.fs.{name}");
    let host = interp.host();
    match name {
        "read_file" => {
            require_args(&qualified(), 1, args, span)?;
            let path = require_str(&qualified(), args, 0, span)?;
            match host.read_file(path) {
                Ok(contents) => Ok(interp.ok(Value::string(contents))),
                Err(message) => Ok(interp.err(Value::string(message))),
            }
        }
        "write_file" => {
            require_args(&qualified(), 2, args, span)?;
            let path = require_str(&qualified(), args, 0, span)?;
            let contents = require_str(&qualified(), args, 1, span)?;
            match host.write_file(path, contents) {
                Ok(()) => Ok(interp.ok(Value::Unit)),
                Err(message) => Ok(interp.err(Value::string(message))),
            }
        }
        "append_file" => {
            require_args(&qualified(), 2, args, span)?;
            let path = require_str(&qualified(), args, 0, span)?;
            let contents = require_str(&qualified(), args, 1, span)?;
            match host.append_file(path, contents) {
                Ok(()) => Ok(interp.ok(Value::Unit)),
                Err(message) => Ok(interp.err(Value::string(message))),
            }
        }
        "exists" => {
            require_args(&qualified(), 1, args, span)?;
            let path = require_str(&qualified(), args, 0, span)?;
            Ok(Value::Bool(host.exists(path)))
        }
        "remove" => {
            require_args(&qualified(), 1, args, span)?;
            let path = require_str(&qualified(), args, 0, span)?;
            match host.remove(path) {
                Ok(()) => Ok(interp.ok(Value::Unit)),
                Err(message) => Ok(interp.err(Value::string(message))),
            }
        }
        "read_dir" => {
            require_args(&qualified(), 1, args, span)?;
            let path = require_str(&qualified(), args, 0, span)?;
            match host.read_dir(path) {
                Ok(names) => Ok(interp.ok(interp.make_list(names.into_iter().map(Value::string)))),
                Err(message) => Ok(interp.err(Value::string(message))),
            }
        }
        "is_file" => {
            require_args(&qualified(), 1, args, span)?;
            let path = require_str(&qualified(), args, 0, span)?;
            Ok(Value::Bool(host.is_file(path)))
        }
        "is_dir" => {
            require_args(&qualified(), 1, args, span)?;
            let path = require_str(&qualified(), args, 0, span)?;
            Ok(Value::Bool(host.is_dir(path)))
        }
        "create_dir" => {
            require_args(&qualified(), 1, args, span)?;
            let path = require_str(&qualified(), args, 0, span)?;
            match host.create_dir(path) {
                Ok(()) => Ok(interp.ok(Value::Unit)),
                Err(message) => Ok(interp.err(Value::string(message))),
            }
        }
        _ => super::no_such_function("std.fs", name, span),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use kira_ir::{Arena, Program, StringInterner};
    use kira_symbols::SymbolTable;
    use kira_types::TypeTable;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    use crate::host::BufferHost;
    use crate::interpreter::Interpreter;

    fn test_interp(host: Rc<BufferHost>) -> (Program, TypeTable, SymbolTable, Rc<BufferHost>) {
        (Program::new(Arena::new(), StringInterner::new(), String::new()), TypeTable::new(), SymbolTable::new(), host)
    }

    #[test]
    fn write_then_read_file_round_trips_through_the_buffer_host() {
        let (mut program, types, symbols, host) = test_interp(Rc::new(BufferHost::new()));
        let interp = Interpreter::new(&mut program, &types, &symbols, host).unwrap();
        dispatch(&interp, "write_file", &[Value::string("a.txt"), Value::string("hi")], Span::DUMMY).unwrap();
        let result = dispatch(&interp, "read_file", &[Value::string("a.txt")], Span::DUMMY).unwrap();
        assert_eq!(result, interp.ok(Value::string("hi")));
    }

    #[test]
    fn read_file_reports_a_missing_file_as_err_not_an_abort() {
        let (mut program, types, symbols, host) = test_interp(Rc::new(BufferHost::new()));
        let interp = Interpreter::new(&mut program, &types, &symbols, host).unwrap();
        let result = dispatch(&interp, "read_file", &[Value::string("missing.txt")], Span::DUMMY).unwrap();
        assert!(matches!(result, Value::Variant(data) if data.name == interp.err_name()));
    }

    #[test]
    fn exists_reflects_the_buffer_host_file_set() {
        let (mut program, types, symbols, host) = test_interp(Rc::new(BufferHost::new()));
        let interp = Interpreter::new(&mut program, &types, &symbols, host).unwrap();
        assert_eq!(dispatch(&interp, "exists", &[Value::string("a.txt")], Span::DUMMY).unwrap(), Value::Bool(false));
        dispatch(&interp, "write_file", &[Value::string("a.txt"), Value::string("x")], Span::DUMMY).unwrap();
        assert_eq!(dispatch(&interp, "exists", &[Value::string("a.txt")], Span::DUMMY).unwrap(), Value::Bool(true));
    }
}
