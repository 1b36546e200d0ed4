//! The [`Diagnostic`] type and its terminal rendering.

use std::fmt;

use kira_ir::Span;

use crate::kind::Kind;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Hint => "hint",
        };
        f.write_str(s)
    }
}

/// A secondary message attached to a diagnostic, e.g. "did you mean `foo`?"
/// or the span of an earlier arm that subsumes an unreachable one.
#[derive(Clone, Debug)]
pub struct Note {
    pub message: String,
    pub span: Option<Span>,
}

/// A single diagnostic: spec §6's `error|warning|hint: <message> at
/// line:col` plus any `note: <message> at line:col` lines.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: Kind,
    pub message: String,
    pub span: Span,
    pub notes: Vec<Note>,
}

impl Diagnostic {
    pub fn new(severity: Severity, kind: Kind, message: impl Into<String>, span: Span) -> Self {
        Diagnostic {
            severity,
            kind,
            message: message.into(),
            span,
            notes: Vec::new(),
        }
    }

    pub fn error(kind: Kind, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Error, kind, message, span)
    }

    pub fn warning(kind: Kind, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Warning, kind, message, span)
    }

    pub fn hint(kind: Kind, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Hint, kind, message, span)
    }

    #[must_use]
    pub fn with_note(mut self, message: impl Into<String>, span: Span) -> Self {
        self.notes.push(Note {
            message: message.into(),
            span: Some(span),
        });
        self
    }

    /// A note with no specific location, e.g. a list of search paths tried.
    #[must_use]
    pub fn with_untargeted_note(mut self, message: impl Into<String>) -> Self {
        self.notes.push(Note {
            message: message.into(),
            span: None,
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    /// Renders exactly the spec §6 format:
    /// `error|warning|hint: <message> at line:col`, with any notes on
    /// their own following lines.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} at {}",
            self.severity, self.message, self.span.start
        )?;
        for (i, note) in self.notes.iter().enumerate() {
            let suffix = match note.span {
                Some(span) => format!(" at {}", span.start),
                None => String::new(),
            };
            if i + 1 == self.notes.len() {
                write!(f, "note: {}{}", note.message, suffix)?;
            } else {
                writeln!(f, "note: {}{}", note.message, suffix)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kira_ir::Position;

    fn span_at(line: u32, col: u32) -> Span {
        Span::new(Position::new(line, col, 0), Position::new(line, col, 0))
    }

    #[test]
    fn display_matches_the_spec_format() {
        let diag = Diagnostic::error(
            Kind::TypeMismatch,
            "type mismatch: expected 'i32', found 'bool'",
            span_at(4, 9),
        );
        assert_eq!(
            diag.to_string(),
            "error: type mismatch: expected 'i32', found 'bool' at 4:9"
        );
    }

    #[test]
    fn notes_render_on_their_own_lines() {
        let diag = Diagnostic::warning(Kind::UnreachablePattern, "unreachable pattern", span_at(10, 1))
            .with_note("subsumed by the arm here", span_at(9, 1));
        let rendered = diag.to_string();
        assert!(rendered.starts_with("warning: unreachable pattern at 10:1\n"));
        assert!(rendered.ends_with("note: subsumed by the arm here at 9:1"));
    }
}
