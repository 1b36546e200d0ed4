//! `std.list` (spec §4.5 lists `length` as the checker-known shape; `reverse`,
//! `concat`, and `fold` are supplemented from §8's round-trip properties and
//! §9's recursion example, which both presuppose them).

use kira_ir::Span;

use crate::error::Eval;
use crate::interpreter::Interpreter;
use crate::operators::DEFAULT_INT_WIDTH;
use crate::value::Value;

use super::helpers::require_args;

pub fn dispatch(interp: &Interpreter, name: &str, args: &[Value], span: Span) -> Eval<Value> {
    let qualified = || format!("std.list.{name}");
    match name {
        "length" => {
            require_args(&qualified(), 1, args, span)?;
            let items = interp.list_to_vec(&args[0], span)?;
            Ok(Value::int(items.len() as i128, DEFAULT_INT_WIDTH))
        }
        "reverse" => {
            require_args(&qualified(), 1, args, span)?;
            let mut items = interp.list_to_vec(&args[0], span)?;
            items.reverse();
            Ok(interp.make_list(items.into_iter()))
        }
        "concat" => {
            require_args(&qualified(), 2, args, span)?;
            let mut front = interp.list_to_vec(&args[0], span)?;
            let back = interp.list_to_vec(&args[1], span)?;
            front.extend(back);
            Ok(interp.make_list(front.into_iter()))
        }
        "fold" => {
            require_args(&qualified(), 3, args, span)?;
            let items = interp.list_to_vec(&args[0], span)?;
            let mut acc = args[1].clone();
            let f = &args[2];
            for item in items {
                acc = interp.call(f, vec![acc, item], span)?;
            }
            Ok(acc)
        }
        _ => super::no_such_function("std.list", name, span),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use kira_ir::ast::IntWidth;
    use kira_ir::{Arena, Program, StringInterner};
    use kira_symbols::SymbolTable;
    use kira_types::TypeTable;
    use pretty_assertions::assert_eq;

    use crate::host::native_host;
    use crate::interpreter::Interpreter;

    fn test_interp() -> (Program, TypeTable, SymbolTable) {
        (Program::new(Arena::new(), StringInterner::new(), String::new()), TypeTable::new(), SymbolTable::new())
    }

    fn ints(interp: &Interpreter, values: &[i128]) -> Value {
        interp.make_list(values.iter().map(|&n| Value::int(n, IntWidth::I32)))
    }

    #[test]
    fn length_counts_the_elements_of_a_cons_chain() {
        let (mut program, types, symbols) = test_interp();
        let interp = Interpreter::new(&mut program, &types, &symbols, native_host()).unwrap();
        let xs = ints(&interp, &[1, 2, 3]);
        let result = dispatch(&interp, "length", &[xs], Span::DUMMY).unwrap();
        assert_eq!(result, Value::int(3, DEFAULT_INT_WIDTH));
    }

    #[test]
    fn reverse_twice_is_the_identity() {
        let (mut program, types, symbols) = test_interp();
        let interp = Interpreter::new(&mut program, &types, &symbols, native_host()).unwrap();
        let xs = ints(&interp, &[1, 2, 3]);
        let once = dispatch(&interp, "reverse", &[xs.clone()], Span::DUMMY).unwrap();
        let twice = dispatch(&interp, "reverse", &[once], Span::DUMMY).unwrap();
        assert_eq!(twice, xs);
    }

    #[test]
    fn concat_length_is_the_sum_of_both_lengths() {
        let (mut program, types, symbols) = test_interp();
        let interp = Interpreter::new(&mut program, &types, &symbols, native_host()).unwrap();
        let xs = ints(&interp, &[1, 2]);
        let ys = ints(&interp, &[3, 4, 5]);
        let combined = dispatch(&interp, "concat", &[xs, ys], Span::DUMMY).unwrap();
        let length = dispatch(&interp, "length", &[combined], Span::DUMMY).unwrap();
        assert_eq!(length, Value::int(5, DEFAULT_INT_WIDTH));
    }

    #[test]
    fn fold_sums_with_a_builtin_callback() {
        fn add(_interp: &Interpreter, args: &[Value], span: Span) -> Result<Value, crate::RuntimeAbort> {
            let (Value::Int(a), Value::Int(b)) = (&args[0], &args[1]) else {
                return Err(crate::RuntimeAbort::new("expected ints", span));
            };
            Ok(Value::int(a.value() + b.value(), IntWidth::I32))
        }

        let (mut program, types, symbols) = test_interp();
        let interp = Interpreter::new(&mut program, &types, &symbols, native_host()).unwrap();
        let xs = ints(&interp, &[1, 2, 3, 4]);
        let callback = Value::Builtin(crate::value::Builtin { name: "add", func: add });
        let sum = dispatch(&interp, "fold", &[xs, Value::int(0, IntWidth::I32), callback], Span::DUMMY).unwrap();
        assert_eq!(sum, Value::int(10, DEFAULT_INT_WIDTH));
    }
}
