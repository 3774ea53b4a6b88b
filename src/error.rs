use std::fmt;
use thiserror::Error;

/// Coarse classification of a session error, for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Exhausted,
    Validation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Network => write!(f, "network"),
            ErrorKind::Exhausted => write!(f, "exhausted"),
            ErrorKind::Validation => write!(f, "validation"),
        }
    }
}

/// User-facing session errors. None of these are fatal; the worst case is
/// an exhausted session waiting for a refresh or a filter change.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Failed to load stocks: {0}")]
    Network(String),

    #[error("{0}")]
    Exhausted(String),

    #[error("Invalid input: {0}")]
    Validation(String),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Network(_) => ErrorKind::Network,
            SessionError::Exhausted(_) => ErrorKind::Exhausted,
            SessionError::Validation(_) => ErrorKind::Validation,
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Corrupt value under key '{key}': {reason}")]
    Corrupt { key: String, reason: String },

    #[error("Invalid store key: {0}")]
    InvalidKey(String),
}
