//! Error types for template building and rendering
//!
//! Every failure that points at code carries [`ErrorDetail`]s whose locations
//! are expressed in the *template* text, never in the synthesized unit.

use crate::location::Location;

/// A single diagnostic message tied to a template location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub message: String,
    pub location: Location,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

/// Rejected configuration, reported before any template text is read.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid template configuration: {}", .failures.join("; "))]
pub struct ConfigError {
    /// All validation failures, not just the first.
    pub failures: Vec<String>,
}

/// The template text itself is malformed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    pub details: Vec<ErrorDetail>,
}

impl SyntaxError {
    pub(crate) fn at(message: impl Into<String>, location: Location) -> Self {
        let message = message.into();
        let details = vec![ErrorDetail::new(message.clone(), location)];
        Self { message, details }
    }
}

/// The synthesized unit was rejected by the toolchain.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct CompilerError {
    pub message: String,
    pub details: Vec<ErrorDetail>,
}

/// The compiled template failed while rendering.
#[derive(Debug, thiserror::Error)]
#[error("{message} (template {location})")]
pub struct RuntimeError {
    pub message: String,
    /// Template position of the failing code, best effort.
    pub location: Location,
    #[source]
    pub cause: Box<dyn std::error::Error + Send + Sync>,
}

/// Any failure from building or rendering a template.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Compiler(#[from] CompilerError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
