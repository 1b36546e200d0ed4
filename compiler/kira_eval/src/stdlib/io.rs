//! `std.io` (spec §4.5). Every function here is effectful and delegates to
//! the interpreter's injected `Host`.

use kira_ir::Span;

use crate::error::Eval;
use crate::interpreter::Interpreter;
use crate::value::Value;

use super::helpers::{require_args, require_str};

pub fn dispatch(interp: &Interpreter, name: &str, args: &[Value], span: Span) -> Eval<Value> {
    let qualified = || format!("std.io.{name}");
    match name {
        "print" => {
            require_args(&qualified(), 1, args, span)?;
            let s = require_str(&qualified(), args, 0, span)?;
            interp.host().print(s);
            Ok(Value::Unit)
        }
        "println" => {
            require_args(&qualified(), 1, args, span)?;
            let s = require_str(&qualified(), args, 0, span)?;
            interp.host().println(s);
            Ok(Value::Unit)
        }
        "eprintln" => {
            require_args(&qualified(), 1, args, span)?;
            let s = require_str(&qualified(), args, 0, span)?;
            interp.host().eprintln(s);
            Ok(Value::Unit)
        }
        "read_line" => {
            require_args(&qualified(), 0, args, span)?;
            match interp.host().read_line() {
                Some(line) => Ok(interp.some(Value::string(line))),
                None => Ok(interp.none()),
            }
        }
        _ => super::no_such_function("std.io", name, span),
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

    use crate::host::BufferHost;
    use crate::interpreter::Interpreter;
    use std::rc::Rc;

    #[test]
    fn println_writes_a_trailing_newline_to_the_host() {
        let mut program = Program::new(Arena::new(), StringInterner::new(), String::new());
        let types = TypeTable::new();
        let symbols = SymbolTable::new();
        let host: Rc<BufferHost> = Rc::new(BufferHost::new());
        let interp = Interpreter::new(&mut program, &types, &symbols, host.clone()).unwrap();
        dispatch(&interp, "println", &[Value::string("hi")], Span::DUMMY).unwrap();
        assert_eq!(*host.stdout.borrow(), "hi\n");
    }

    #[test]
    fn read_line_returns_none_once_the_queue_is_drained() {
        let mut program = Program::new(Arena::new(), StringInterner::new(), String::new());
        let types = TypeTable::new();
        let symbols = SymbolTable::new();
        let host: Rc<BufferHost> = Rc::new(BufferHost::new());
        host.feed_line("hello");
        let interp = Interpreter::new(&mut program, &types, &symbols, host.clone()).unwrap();
        assert_eq!(dispatch(&interp, "read_line", &[], Span::DUMMY).unwrap(), interp.some(Value::string("hello")));
        assert_eq!(dispatch(&interp, "read_line", &[], Span::DUMMY).unwrap(), interp.none());
    }
}
