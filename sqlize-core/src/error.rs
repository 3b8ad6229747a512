//! Error types for sqlize

use thiserror::Error;

/// The main error type for sqlize operations
#[derive(Error, Debug)]
pub enum Error {
    /// A structural invariant of the statement was violated while building it
    #[error("Build error: {message}")]
    Build { message: String },

    /// The target dialect has no rendering for the requested construct
    #[error("Dialect error ({dialect}): {message}")]
    Dialect { dialect: String, message: String },

    /// The statement was used improperly, e.g. rendered while incomplete
    #[error("Usage error: {message}")]
    Usage { message: String },

    /// Invalid dialect configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification of an [`Error`], handy for matching in callers and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Build,
    Dialect,
    Usage,
    Config,
    Serialization,
}

/// Convenience Result type for sqlize operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new build error
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }

    /// Create a new dialect error
    pub fn dialect(dialect: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Dialect {
            dialect: dialect.into(),
            message: message.into(),
        }
    }

    /// Create a new usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Build { .. } => ErrorKind::Build,
            Error::Dialect { .. } => ErrorKind::Dialect,
            Error::Usage { .. } => ErrorKind::Usage,
            Error::Config { .. } => ErrorKind::Config,
            Error::Serialization(_) => ErrorKind::Serialization,
        }
    }
}
