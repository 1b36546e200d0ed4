//! `std.char` (spec §4.5: `to_i32 -> i64`).

use kira_ir::ast::IntWidth;
use kira_ir::Span;

use crate::error::Eval;
use crate::interpreter::Interpreter;
use crate::value::Value;

use super::helpers::{require_args, require_char};

pub fn dispatch(_interp: &Interpreter, name: &str, args: &[Value], span: Span) -> Eval<Value> {
    let qualified = || format!("std.char.{name}");
    match name {
        "to_i32" => {
            require_args(&qualified(), 1, args, span)?;
            let c = require_char(&qualified(), args, 0, span)?;
            Ok(Value::int(c as i128, IntWidth::I64))
        }
        _ => super::no_such_function("std.char", name, span),
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

    #[test]
    fn to_i32_yields_the_unicode_code_point() {
        let mut program = Program::new(Arena::new(), StringInterner::new(), String::new());
        let types = TypeTable::new();
        let symbols = SymbolTable::new();
        let interp = Interpreter::new(&mut program, &types, &symbols, native_host()).unwrap();
        let result = dispatch(&interp, "to_i32", &[Value::Char('A')], Span::DUMMY).unwrap();
        assert_eq!(result, Value::int(65, IntWidth::I64));
    }
}
