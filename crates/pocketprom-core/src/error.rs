//! Shared error type across pocketprom crates.

use thiserror::Error;

/// Stable error classes, used as log field values and in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Configuration could not be parsed or failed validation.
    Config,
    /// The exposition socket could not be bound.
    Bind,
    /// The persisted counter document could not be read, decoded or written.
    Persistence,
    /// Any other I/O failure.
    Io,
}

impl ErrorKind {
    /// String representation used in structured log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Config => "CONFIG",
            ErrorKind::Bind => "BIND",
            ErrorKind::Persistence => "PERSISTENCE",
            ErrorKind::Io => "IO",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, PocketPromError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum PocketPromError {
    #[error("config: {0}")]
    Config(String),
    #[error("bind {endpoint} failed: {source}")]
    Bind {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },
    #[error("persistence: {0}")]
    Persistence(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl PocketPromError {
    /// Map the error to its stable class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PocketPromError::Config(_) => ErrorKind::Config,
            PocketPromError::Bind { .. } => ErrorKind::Bind,
            PocketPromError::Persistence(_) => ErrorKind::Persistence,
            PocketPromError::Io(_) => ErrorKind::Io,
        }
    }
}
