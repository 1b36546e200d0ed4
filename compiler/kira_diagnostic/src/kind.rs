//! The diagnostic taxonomy (spec §7) — kinds, not exception types. Every
//! diagnostic the checker, loader, or interpreter can produce carries one
//! of these so callers can filter/count by category without parsing
//! messages.

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Kind {
    TypeMismatch,
    InvalidOperand,
    NotCallable,
    WrongArgCount,
    NoSuchMember,
    InvalidTupleIndex,
    PatternTypeMismatch,
    NonExhaustiveMatch,
    UnreachablePattern,
    WrongTypeArgCount,
    ConstraintNotSatisfied,
    EffectViolation,
    InvalidTry,
    DuplicateDefinition,
    UndefinedSymbol,
    UndefinedType,
    InvalidCast,
    CyclicType,
    SelfOutsideImpl,
    ModuleNotFound,
    CircularDependency,
    ParseError,
    ResolveError,
    FileReadError,
    TotalBytesExceeded,
    MaxImportDepthExceeded,
    InvalidPath,
    /// A non-trait top-level function declared with no body.
    MissingBody,
    /// Interpreter runtime abort: division by zero, no-arm match, index
    /// out of range. Never produced by the checker.
    RuntimeAbort,
}

impl Kind {
    /// A short, stable, human-readable name — used in tests and as a
    /// fallback when a message doesn't otherwise name the problem.
    pub fn label(self) -> &'static str {
        match self {
            Kind::TypeMismatch => "type mismatch",
            Kind::InvalidOperand => "invalid operand",
            Kind::NotCallable => "not callable",
            Kind::WrongArgCount => "wrong argument count",
            Kind::NoSuchMember => "no such field or method",
            Kind::InvalidTupleIndex => "invalid tuple index",
            Kind::PatternTypeMismatch => "pattern type mismatch",
            Kind::NonExhaustiveMatch => "non-exhaustive match",
            Kind::UnreachablePattern => "unreachable pattern",
            Kind::WrongTypeArgCount => "wrong type argument count",
            Kind::ConstraintNotSatisfied => "constraint not satisfied",
            Kind::EffectViolation => "effect violation",
            Kind::InvalidTry => "missing or invalid try",
            Kind::DuplicateDefinition => "duplicate definition",
            Kind::UndefinedSymbol => "undefined symbol",
            Kind::UndefinedType => "undefined type",
            Kind::InvalidCast => "invalid cast",
            Kind::CyclicType => "cyclic type",
            Kind::SelfOutsideImpl => "self outside impl",
            Kind::ModuleNotFound => "module not found",
            Kind::CircularDependency => "circular dependency",
            Kind::ParseError => "parse error",
            Kind::ResolveError => "resolve error",
            Kind::FileReadError => "file read error",
            Kind::TotalBytesExceeded => "total bytes exceeded",
            Kind::MaxImportDepthExceeded => "max import depth exceeded",
            Kind::InvalidPath => "invalid path",
            Kind::MissingBody => "missing body",
            Kind::RuntimeAbort => "runtime abort",
        }
    }
}
