//! Resolved types: what the checker assigns to expressions, as opposed to
//! `kira_ir::ast::TypeAst`, what the user wrote.
//!
//! No structural type is interned — equality is plain recursive
//! `PartialEq` (spec §3: "The checker interns no structural types —
//! equality is by structural recursion").

use std::fmt;

use kira_ir::ast::PrimitiveType;
use kira_ir::{EffectTag, Name, StringInterner};

use crate::SymbolId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Type {
    Primitive(PrimitiveType),
    Void,
    /// A poisoned type: the result of an earlier failure. Equal to nothing,
    /// including itself by `==`; use [`Type::is_error`] to test for it
    /// rather than comparing.
    Error,
    SelfType,
    /// An unresolved generic parameter reference (only appears inside an
    /// un-instantiated function/type signature).
    Var(Name),
    /// A reference to a user type/trait definition with no type arguments.
    Named(SymbolId),
    /// A generic base instantiated with concrete arguments.
    Instantiated { base: SymbolId, args: Vec<Type> },
    Function {
        params: Vec<Type>,
        ret: Box<Type>,
        effect: EffectTag,
    },
    Tuple(Vec<Type>),
    Array { elem: Box<Type>, size: u64 },
    Io(Box<Type>),
    Result { ok: Box<Type>, err: Box<Type> },
    Option(Box<Type>),
}

impl Type {
    pub fn option(inner: Type) -> Type {
        Type::Option(Box::new(inner))
    }

    pub fn result(ok: Type, err: Type) -> Type {
        Type::Result {
            ok: Box::new(ok),
            err: Box::new(err),
        }
    }

    pub fn io(inner: Type) -> Type {
        Type::Io(Box::new(inner))
    }

    pub fn function(params: Vec<Type>, ret: Type, effect: EffectTag) -> Type {
        Type::Function {
            params,
            ret: Box::new(ret),
            effect,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveType::Int(_)))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveType::Float(_)))
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveType::Bool))
    }

    /// Structural equality for assignment/comparison purposes, after the
    /// `error` type is excluded (an `error` type is never equal to
    /// anything, including itself, so it never manufactures a spurious
    /// "matches" verdict and also never by itself re-triggers a
    /// diagnostic — see spec §7).
    pub fn equals(&self, other: &Type) -> bool {
        if self.is_error() || other.is_error() {
            return false;
        }
        self == other
    }

    /// Render a resolved type for diagnostics, per spec §6: function types
    /// as `fn(T1, T2) -> R` prefixed by `IO`/`Result` where applicable,
    /// instantiated types as `Base[Arg, ...]`.
    pub fn display(&self, interner: &StringInterner, symbol_name: impl Fn(SymbolId) -> Name) -> String {
        match self {
            Type::Primitive(p) => display_primitive(*p),
            Type::Void => "void".to_string(),
            Type::Error => "<error>".to_string(),
            Type::SelfType => "Self".to_string(),
            Type::Var(name) => interner.resolve(*name).to_string(),
            Type::Named(sym) => interner.resolve(symbol_name(*sym)).to_string(),
            Type::Instantiated { base, args } => {
                let base_name = interner.resolve(symbol_name(*base));
                let args = args
                    .iter()
                    .map(|a| a.display(interner, &symbol_name))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{base_name}[{args}]")
            }
            Type::Function { params, ret, effect } => {
                let params = params
                    .iter()
                    .map(|p| p.display(interner, &symbol_name))
                    .collect::<Vec<_>>()
                    .join(", ");
                let ret = ret.display(interner, &symbol_name);
                match effect {
                    EffectTag::Pure => format!("fn({params}) -> {ret}"),
                    EffectTag::Io => format!("IO fn({params}) -> {ret}"),
                    EffectTag::Result => format!("Result fn({params}) -> {ret}"),
                    EffectTag::IoResult => format!("IO Result fn({params}) -> {ret}"),
                }
            }
            Type::Tuple(items) => {
                let items = items
                    .iter()
                    .map(|t| t.display(interner, &symbol_name))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("({items})")
            }
            Type::Array { elem, size } => {
                format!("[{}; {size}]", elem.display(interner, &symbol_name))
            }
            Type::Io(inner) => format!("IO[{}]", inner.display(interner, &symbol_name)),
            Type::Result { ok, err } => format!(
                "Result[{}, {}]",
                ok.display(interner, &symbol_name),
                err.display(interner, &symbol_name)
            ),
            Type::Option(inner) => format!("Option[{}]", inner.display(interner, &symbol_name)),
        }
    }
}

fn display_primitive(p: PrimitiveType) -> String {
    use kira_ir::ast::{FloatWidth, IntWidth};
    match p {
        PrimitiveType::Int(w) => match w {
            IntWidth::I8 => "i8",
            IntWidth::I16 => "i16",
            IntWidth::I32 => "i32",
            IntWidth::I64 => "i64",
            IntWidth::I128 => "i128",
            IntWidth::U8 => "u8",
            IntWidth::U16 => "u16",
            IntWidth::U32 => "u32",
            IntWidth::U64 => "u64",
            IntWidth::U128 => "u128",
        }
        .to_string(),
        PrimitiveType::Float(w) => match w {
            FloatWidth::F32 => "f32",
            FloatWidth::F64 => "f64",
        }
        .to_string(),
        PrimitiveType::Bool => "bool".to_string(),
        PrimitiveType::Char => "char".to_string(),
        PrimitiveType::String => "string".to_string(),
        PrimitiveType::Void => "void".to_string(),
    }
}

impl fmt::Display for Type {
    /// A plain rendering with no symbol-name resolution, for contexts
    /// without access to the table's interner (e.g. some test assertions).
    /// Named/instantiated types fall back to printing their `SymbolId`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => write!(f, "{}", display_primitive(*p)),
            Type::Void => write!(f, "void"),
            Type::Error => write!(f, "<error>"),
            Type::SelfType => write!(f, "Self"),
            Type::Var(_) => write!(f, "?"),
            Type::Named(sym) => write!(f, "{sym:?}"),
            Type::Instantiated { base, args } => {
                write!(f, "{base:?}[")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, "]")
            }
            Type::Function { params, ret, .. } => {
                write!(f, "fn(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ") -> {ret}")
            }
            Type::Tuple(items) => {
                write!(f, "(")?;
                for (i, t) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, ")")
            }
            Type::Array { elem, size } => write!(f, "[{elem}; {size}]"),
            Type::Io(inner) => write!(f, "IO[{inner}]"),
            Type::Result { ok, err } => write!(f, "Result[{ok}, {err}]"),
            Type::Option(inner) => write!(f, "Option[{inner}]"),
        }
    }
}
