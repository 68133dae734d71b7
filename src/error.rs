//! Unified error types for sbom-export.
//!
//! Errors carry a context string describing what the tool was doing plus a
//! kind enum describing what went wrong, so failures against the remote API
//! surface with enough detail to act on.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sbom-export operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SbomExportError {
    /// Errors talking to the Endor Labs API
    #[error("API request failed: {context}")]
    Api {
        context: String,
        #[source]
        source: ApiErrorKind,
    },

    /// Errors parsing SBOM documents or API responses
    #[error("Failed to parse document: {context}")]
    Parse {
        context: String,
        #[source]
        source: ParseErrorKind,
    },

    /// IO errors with path context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors (missing credentials, bad flags)
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Specific API error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiErrorKind {
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API returned status {status}: {body}")]
    ErrorStatus { status: u16, body: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Expected data missing from response: {0}")]
    MissingData(String),
}

/// Specific parse error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Missing required field: {field} in {context}")]
    MissingField { field: String, context: String },
}

/// Convenient Result type for sbom-export operations
pub type Result<T> = std::result::Result<T, SbomExportError>;

impl SbomExportError {
    /// Create an API error with context
    pub fn api(context: impl Into<String>, source: ApiErrorKind) -> Self {
        Self::Api {
            context: context.into(),
            source,
        }
    }

    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, source: ParseErrorKind) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create a parse error for a missing field
    pub fn missing_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::parse(
            "missing required field",
            ParseErrorKind::MissingField {
                field: field.into(),
                context: context.into(),
            },
        )
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<std::io::Error> for SbomExportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for SbomExportError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(
            "JSON deserialization",
            ParseErrorKind::InvalidJson(err.to_string()),
        )
    }
}

/// Extension trait for adding context to errors.
///
/// The context string is prepended to the error's existing context, creating
/// a chain that shows the path through the code.
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure (lazy evaluation).
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<SbomExportError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: SbomExportError, new_ctx: &str) -> SbomExportError {
    match err {
        SbomExportError::Api {
            context: existing,
            source,
        } => SbomExportError::Api {
            context: chain_context(new_ctx, &existing),
            source,
        },
        SbomExportError::Parse {
            context: existing,
            source,
        } => SbomExportError::Parse {
            context: chain_context(new_ctx, &existing),
            source,
        },
        SbomExportError::Io {
            path,
            message,
            source,
        } => SbomExportError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        SbomExportError::Config(msg) => SbomExportError::Config(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together.
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}
