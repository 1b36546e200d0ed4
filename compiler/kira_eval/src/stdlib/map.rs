//! `std.map` (spec §4.5). `Map[K, V]` has no dedicated runtime
//! representation — there's no map literal syntax and no `Value::Map`
//! variant, so a map is just an association list: a `Value::Array` of
//! 2-element `(key, value)` tuples, scanned linearly by `get`/`contains`.

use kira_ir::Span;

use crate::error::{Eval, RuntimeAbort};
use crate::interpreter::Interpreter;
use crate::value::Value;

use super::helpers::require_args;

fn entries<'a>(qualified_name: &str, args: &'a [Value], span: Span) -> Eval<std::cell::Ref<'a, Vec<Value>>> {
    match &args[0] {
        Value::Array(items) => Ok(items.borrow()),
        other => Err(RuntimeAbort::new(
            format!("'{qualified_name}' expects a map value, got a {}", other.type_name()),
            span,
        )
        .into()),
    }
}

fn find<'a>(entries: &'a [Value], key: &Value) -> Option<&'a Value> {
    entries.iter().find_map(|entry| match entry {
        Value::Tuple(pair) if pair.len() == 2 && pair[0] == *key => Some(&pair[1]),
        _ => None,
    })
}

pub fn dispatch(interp: &Interpreter, name: &str, args: &[Value], span: Span) -> Eval<Value> {
    let qualified = || format!("std.map.{name}");
    match name {
        "get" => {
            require_args(&qualified(), 2, args, span)?;
            let entries = entries(&qualified(), args, span)?;
            match find(&entries, &args[1]) {
                Some(v) => Ok(interp.some(v.clone())),
                None => Ok(interp.none()),
            }
        }
        "contains" => {
            require_args(&qualified(), 2, args, span)?;
            let entries = entries(&qualified(), args, span)?;
            Ok(Value::Bool(find(&entries, &args[1]).is_some()))
        }
        _ => super::no_such_function("std.map", name, span),
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

    fn a_map() -> Value {
        Value::array(vec![
            Value::tuple(vec![Value::string("a"), Value::Bool(true)]),
            Value::tuple(vec![Value::string("b"), Value::Bool(false)]),
        ])
    }

    #[test]
    fn get_finds_an_existing_key() {
        let (mut program, types, symbols) = test_interp();
        let interp = Interpreter::new(&mut program, &types, &symbols, native_host()).unwrap();
        let result = dispatch(&interp, "get", &[a_map(), Value::string("b")], Span::DUMMY).unwrap();
        assert_eq!(result, interp.some(Value::Bool(false)));
    }

    #[test]
    fn get_is_none_for_a_missing_key() {
        let (mut program, types, symbols) = test_interp();
        let interp = Interpreter::new(&mut program, &types, &symbols, native_host()).unwrap();
        let result = dispatch(&interp, "get", &[a_map(), Value::string("z")], Span::DUMMY).unwrap();
        assert_eq!(result, interp.none());
    }

    #[test]
    fn contains_reports_key_presence() {
        let (mut program, types, symbols) = test_interp();
        let interp = Interpreter::new(&mut program, &types, &symbols, native_host()).unwrap();
        assert_eq!(dispatch(&interp, "contains", &[a_map(), Value::string("a")], Span::DUMMY).unwrap(), Value::Bool(true));
        assert_eq!(dispatch(&interp, "contains", &[a_map(), Value::string("z")], Span::DUMMY).unwrap(), Value::Bool(false));
    }
}
