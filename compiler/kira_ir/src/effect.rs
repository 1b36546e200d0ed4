//! Effect tags.
//!
//! An effect tag is a property of a function *signature*, tracked alongside
//! types at every call site (§4.3 of the spec). It is computed, not
//! declared in full: a `fn` is `Pure` unless marked `effect fn` (giving
//! `Io`), and a `Result[_,_]` return type raises whatever tag the `effect`
//! keyword already produced to include `Result`.

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum EffectTag {
    #[default]
    Pure,
    Io,
    Result,
    IoResult,
}

impl EffectTag {
    /// Fold in whether the return type is `Result[_, _]` (or `IO[Result[_,_]]`).
    pub fn with_result_return(self, returns_result: bool) -> EffectTag {
        if !returns_result {
            return self;
        }
        match self {
            EffectTag::Pure => EffectTag::Result,
            EffectTag::Io => EffectTag::IoResult,
            EffectTag::Result | EffectTag::IoResult => self,
        }
    }

    /// A pure caller may only call other pure callees.
    pub fn is_pure(self) -> bool {
        matches!(self, EffectTag::Pure)
    }

    /// Whether `?` is permitted in a function with this effect tag (it
    /// requires the underlying return type to be `Result`, which is
    /// checked separately; this only tells you the tag admits it at all).
    pub fn admits_try(self) -> bool {
        matches!(self, EffectTag::Result | EffectTag::IoResult)
    }

    /// Whether `main` may carry this tag.
    pub fn valid_for_main(self) -> bool {
        matches!(self, EffectTag::Io | EffectTag::IoResult)
    }
}

impl fmt::Display for EffectTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EffectTag::Pure => "pure",
            EffectTag::Io => "io",
            EffectTag::Result => "result",
            EffectTag::IoResult => "io_result",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_plus_result_return_is_result() {
        assert_eq!(
            EffectTag::Pure.with_result_return(true),
            EffectTag::Result
        );
    }

    #[test]
    fn io_plus_result_return_is_io_result() {
        assert_eq!(EffectTag::Io.with_result_return(true), EffectTag::IoResult);
    }

    #[test]
    fn non_result_return_leaves_tag_unchanged() {
        assert_eq!(EffectTag::Io.with_result_return(false), EffectTag::Io);
    }

    #[test]
    fn only_io_and_io_result_are_valid_for_main() {
        assert!(EffectTag::Io.valid_for_main());
        assert!(EffectTag::IoResult.valid_for_main());
        assert!(!EffectTag::Pure.valid_for_main());
        assert!(!EffectTag::Result.valid_for_main());
    }
}
