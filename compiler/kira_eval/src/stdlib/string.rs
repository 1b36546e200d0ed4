//! `std.string` (spec §4.5's standard-library shapes).

use kira_ir::Span;

use crate::error::Eval;
use crate::interpreter::Interpreter;
use crate::operators::DEFAULT_INT_WIDTH;
use crate::value::Value;

use super::helpers::{require_args, require_int, require_str};

pub fn dispatch(interp: &Interpreter, name: &str, args: &[Value], span: Span) -> Eval<Value> {
    let qualified = || format!("std.string.{name}");
    match name {
        "length" => {
            require_args(&qualified(), 1, args, span)?;
            let s = require_str(&qualified(), args, 0, span)?;
            Ok(Value::int(s.chars().count() as i128, DEFAULT_INT_WIDTH))
        }
        "substring" => {
            require_args(&qualified(), 3, args, span)?;
            let s = require_str(&qualified(), args, 0, span)?;
            let start = require_int(&qualified(), args, 1, span)?.value();
            let end = require_int(&qualified(), args, 2, span)?.value();
            let chars: Vec<char> = s.chars().collect();
            let (start, end) = (usize::try_from(start).ok(), usize::try_from(end).ok());
            match (start, end) {
                (Some(start), Some(end)) if start <= end && end <= chars.len() => {
                    Ok(interp.some(Value::string(chars[start..end].iter().collect::<String>())))
                }
                _ => Ok(interp.none()),
            }
        }
        "parse_int" => {
            require_args(&qualified(), 1, args, span)?;
            let s = require_str(&qualified(), args, 0, span)?;
            match s.parse::<i128>() {
                Ok(n) => Ok(interp.some(Value::int(n, DEFAULT_INT_WIDTH))),
                Err(_) => Ok(interp.none()),
            }
        }
        "parse_float" => {
            require_args(&qualified(), 1, args, span)?;
            let s = require_str(&qualified(), args, 0, span)?;
            match s.parse::<f64>() {
                Ok(f) => Ok(interp.some(Value::Float(f))),
                Err(_) => Ok(interp.none()),
            }
        }
        "starts_with" => {
            require_args(&qualified(), 2, args, span)?;
            let s = require_str(&qualified(), args, 0, span)?;
            let prefix = require_str(&qualified(), args, 1, span)?;
            Ok(Value::Bool(s.starts_with(prefix)))
        }
        "ends_with" => {
            require_args(&qualified(), 2, args, span)?;
            let s = require_str(&qualified(), args, 0, span)?;
            let suffix = require_str(&qualified(), args, 1, span)?;
            Ok(Value::Bool(s.ends_with(suffix)))
        }
        "contains" => {
            require_args(&qualified(), 2, args, span)?;
            let s = require_str(&qualified(), args, 0, span)?;
            let needle = require_str(&qualified(), args, 1, span)?;
            Ok(Value::Bool(s.contains(needle)))
        }
        "chars" => {
            require_args(&qualified(), 1, args, span)?;
            let s = require_str(&qualified(), args, 0, span)?;
            Ok(interp.make_list(s.chars().map(Value::Char).collect::<Vec<_>>().into_iter()))
        }
        "index_of" => {
            require_args(&qualified(), 2, args, span)?;
            let s = require_str(&qualified(), args, 0, span)?;
            let needle = require_str(&qualified(), args, 1, span)?;
            match s.find(needle) {
                Some(byte_idx) => {
                    let char_idx = s[..byte_idx].chars().count();
                    Ok(interp.some(Value::int(char_idx as i128, DEFAULT_INT_WIDTH)))
                }
                None => Ok(interp.none()),
            }
        }
        _ => super::no_such_function("std.string", name, span),
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

    use crate::host::native_host;
    use crate::interpreter::Interpreter;

    fn test_interp() -> (Program, TypeTable, SymbolTable) {
        (Program::new(Arena::new(), StringInterner::new(), String::new()), TypeTable::new(), SymbolTable::new())
    }

    #[test]
    fn length_counts_chars_not_bytes() {
        let (mut program, types, symbols) = test_interp();
        let interp = Interpreter::new(&mut program, &types, &symbols, native_host()).unwrap();
        let result = dispatch(&interp, "length", &[Value::string("héllo")], Span::DUMMY).unwrap();
        assert_eq!(result, Value::int(5, DEFAULT_INT_WIDTH));
    }

    #[test]
    fn parse_int_fails_gracefully_on_non_numeric_input() {
        let (mut program, types, symbols) = test_interp();
        let interp = Interpreter::new(&mut program, &types, &symbols, native_host()).unwrap();
        let result = dispatch(&interp, "parse_int", &[Value::string("nope")], Span::DUMMY).unwrap();
        assert_eq!(result, interp.none());
    }

    #[test]
    fn substring_out_of_range_is_none() {
        let (mut program, types, symbols) = test_interp();
        let interp = Interpreter::new(&mut program, &types, &symbols, native_host()).unwrap();
        let args = [Value::string("hi"), Value::int(0, DEFAULT_INT_WIDTH), Value::int(5, DEFAULT_INT_WIDTH)];
        let result = dispatch(&interp, "substring", &args, Span::DUMMY).unwrap();
        assert_eq!(result, interp.none());
    }

    #[test]
    fn index_of_finds_a_multibyte_needle_by_char_position() {
        let (mut program, types, symbols) = test_interp();
        let interp = Interpreter::new(&mut program, &types, &symbols, native_host()).unwrap();
        let args = [Value::string("héllo"), Value::string("llo")];
        let result = dispatch(&interp, "index_of", &args, Span::DUMMY).unwrap();
        assert_eq!(result, interp.some(Value::int(2, DEFAULT_INT_WIDTH)));
    }
}
