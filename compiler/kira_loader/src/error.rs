//! Module-loader failure modes (spec §4.2, §7).
//!
//! Every variant maps to exactly one [`kira_diagnostic::Kind`] so a caller
//! can turn a `LoadError` into a `Diagnostic` without re-deriving which
//! kind it is from the message text.

use std::path::PathBuf;

use kira_diagnostic::{Diagnostic, Kind};
use kira_ir::Span;

#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    #[error("module '{path}' not found")]
    ModuleNotFound { path: String, searched: Vec<PathBuf> },

    #[error("circular dependency loading module '{path}'")]
    CircularDependency { path: String },

    #[error("parse error in '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("module '{path}' has no 'module' declaration")]
    ResolveError { path: String },

    #[error("could not read '{path}': {message}")]
    FileReadError { path: PathBuf, message: String },

    #[error("loading '{path}' would exceed the total byte budget ({attempted} > {remaining} remaining)")]
    TotalBytesExceeded { path: String, attempted: u64, remaining: u64 },

    #[error("loading '{path}' exceeds the maximum import depth ({max})")]
    MaxImportDepthExceeded { path: String, max: usize },

    #[error("invalid module path segment '{segment}' in '{path}'")]
    InvalidPath { path: String, segment: String },

    #[error("invalid project configuration: {0}")]
    ConfigError(String),
}

impl LoadError {
    pub fn kind(&self) -> Kind {
        match self {
            LoadError::ModuleNotFound { .. } => Kind::ModuleNotFound,
            LoadError::CircularDependency { .. } => Kind::CircularDependency,
            LoadError::ParseError { .. } => Kind::ParseError,
            LoadError::ResolveError { .. } => Kind::ResolveError,
            LoadError::FileReadError { .. } => Kind::FileReadError,
            LoadError::TotalBytesExceeded { .. } => Kind::TotalBytesExceeded,
            LoadError::MaxImportDepthExceeded { .. } => Kind::MaxImportDepthExceeded,
            LoadError::InvalidPath { .. } => Kind::InvalidPath,
            // No dedicated kind exists for a malformed kira.toml; it leaves
            // the same module unresolvable a bad file read would.
            LoadError::ConfigError(_) => Kind::FileReadError,
        }
    }

    /// Render as a [`Diagnostic`] at `span` (the `import`/`module` span that
    /// triggered the load, or [`Span::DUMMY`] for the initial entry point).
    pub fn to_diagnostic(&self, span: Span) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.kind(), self.to_string(), span);
        match self {
            LoadError::ModuleNotFound { searched, .. } if !searched.is_empty() => {
                let list = searched.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ");
                diagnostic.with_untargeted_note(format!("searched: {list}"))
            }
            _ => diagnostic,
        }
    }
}
