//! The runtime value domain (spec §4.5).

mod int;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use kira_ir::{Name, Span, StmtRange, StringInterner};
use rustc_hash::FxHashMap;

pub use int::KiraInt;

/// A function value created from a named declaration or a `fn(...) {...}`
/// closure expression.
///
/// `captures` is a frozen snapshot of every binding visible in the
/// defining scope at creation time, not a live pointer into it (spec §4.5,
/// "the current environment is captured by reference with the defining
/// scope as its lifetime parent" — realized here the way the reference
/// compiler's own function values do it, as an eagerly-copied map of
/// `Value`s rather than a shared mutable frame).
#[derive(Clone, Debug, PartialEq)]
pub struct Closure {
    pub params: Vec<Name>,
    pub body: StmtRange,
    pub captures: Rc<FxHashMap<Name, Value>>,
    /// The function's own name, for diagnostics (`<closure>` if anonymous).
    pub name: Option<Name>,
}

/// A built-in function. Takes the already-evaluated argument values, the
/// call site's span (for abort messages), and the interpreter (for access
/// to the host and for calling back into user code, e.g.
/// `std.list.fold`'s callback argument). Only shared access is needed —
/// the interpreter never mutates itself, all mutation happens through the
/// interior-mutable `Rc<RefCell<...>>` cells inside `Value`/`Environment`.
pub type BuiltinFn = fn(&crate::Interpreter, &[Value], Span) -> Result<Value, crate::RuntimeAbort>;

#[derive(Clone, PartialEq)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

/// An ordered field map (spec §4.5, "record (ordered field map)"),
/// mutable in place so `obj.field = x` (`AssignTarget::Field`) can update
/// it without rebuilding the whole record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordData {
    pub type_name: Option<Name>,
    pub fields: Vec<(Name, Value)>,
}

impl RecordData {
    pub fn get(&self, name: Name) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn set(&mut self, name: Name, value: Value) {
        if let Some(entry) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }
}

/// A sum-type instance: a variant name and its positional arguments (spec
/// §4.5). `Some`/`None`/`Ok`/`Err` are ordinary instances of this shape —
/// there is no separate `Option`/`Result` runtime representation.
#[derive(Clone, Debug, PartialEq)]
pub struct VariantData {
    pub name: Name,
    pub args: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(KiraInt),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(Rc<str>),
    Unit,
    Tuple(Rc<Vec<Value>>),
    /// Interior-mutable so `arr[i] = x` can mutate in place.
    Array(Rc<RefCell<Vec<Value>>>),
    Record(Rc<RefCell<RecordData>>),
    Variant(Rc<VariantData>),
    Closure(Rc<Closure>),
    Builtin(Builtin),
    /// A named recursive binding, resolved lazily on first call (spec §2
    /// supplement: "a dedicated `Value::Recursive` wrapper the environment
    /// resolves lazily on first call"). Populated once the closure it
    /// wraps has finished being built, so self-reference inside the
    /// closure's own captured snapshot works without a separate
    /// environment placeholder.
    Recursive(Rc<RefCell<Option<Value>>>),
    /// A namespace: `std`, `std.string`, a user module, ... (spec §4.5,
    /// "module namespace (a map name→value)").
    Module(Rc<FxHashMap<Name, Value>>),
}

impl Value {
    pub fn int(value: i128, width: kira_ir::ast::IntWidth) -> Value {
        Value::Int(KiraInt::new(value, width))
    }

    pub fn string(s: impl Into<Rc<str>>) -> Value {
        Value::Str(s.into())
    }

    pub fn tuple(items: Vec<Value>) -> Value {
        Value::Tuple(Rc::new(items))
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn variant(name: Name, args: Vec<Value>) -> Value {
        Value::Variant(Rc::new(VariantData { name, args }))
    }

    pub fn record(type_name: Option<Name>, fields: Vec<(Name, Value)>) -> Value {
        Value::Record(Rc::new(RefCell::new(RecordData { type_name, fields })))
    }

    /// Truthiness used by `and`/`or` short-circuiting (spec §5): only
    /// `bool` participates, never truthy-coerced from other types.
    pub fn is_truthy(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Str(_) => "string",
            Value::Unit => "unit",
            Value::Tuple(_) => "tuple",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
            Value::Variant(_) => "variant",
            Value::Closure(_) | Value::Builtin(_) | Value::Recursive(_) => "function",
            Value::Module(_) => "module",
        }
    }

    /// Render a value the way `std.io.print`/interpolated strings do.
    /// Not a `Display` impl: printing a closure or module needs the
    /// interner to resolve names, which `Display` doesn't have access to.
    pub fn format(&self, interner: &StringInterner) -> String {
        match self {
            Value::Int(i) => i.value().to_string(),
            Value::Float(f) => format_float(*f),
            Value::Bool(b) => b.to_string(),
            Value::Char(c) => c.to_string(),
            Value::Str(s) => s.to_string(),
            Value::Unit => "()".to_string(),
            Value::Tuple(items) => {
                let inner = items.iter().map(|v| v.format(interner)).collect::<Vec<_>>().join(", ");
                format!("({inner})")
            }
            Value::Array(items) => {
                let inner = items.borrow().iter().map(|v| v.format(interner)).collect::<Vec<_>>().join(", ");
                format!("[{inner}]")
            }
            Value::Record(data) => {
                let data = data.borrow();
                let inner = data
                    .fields
                    .iter()
                    .map(|(name, v)| format!("{}: {}", interner.resolve(*name), v.format(interner)))
                    .collect::<Vec<_>>()
                    .join(", ");
                match data.type_name {
                    Some(name) => format!("{} {{ {inner} }}", interner.resolve(name)),
                    None => format!("{{ {inner} }}"),
                }
            }
            Value::Variant(v) => {
                if v.args.is_empty() {
                    interner.resolve(v.name).to_string()
                } else {
                    let inner = v.args.iter().map(|a| a.format(interner)).collect::<Vec<_>>().join(", ");
                    format!("{}({inner})", interner.resolve(v.name))
                }
            }
            Value::Closure(c) => match c.name {
                Some(name) => format!("<fn {}>", interner.resolve(name)),
                None => "<closure>".to_string(),
            },
            Value::Builtin(b) => format!("<builtin {}>", b.name),
            Value::Recursive(cell) => match &*cell.borrow() {
                Some(inner) => inner.format(interner),
                None => "<fn>".to_string(),
            },
            Value::Module(_) => "<module>".to_string(),
        }
    }
}

fn format_float(f: f64) -> String {
    if f == f.trunc() && f.is_finite() {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}
