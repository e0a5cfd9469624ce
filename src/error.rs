use std::path::PathBuf;
use thiserror::Error;

/// Result type for snake_duel operations
pub type Result<T> = std::result::Result<T, SnakeError>;

/// Main error type for the snake_duel library
#[derive(Debug, Error)]
pub enum SnakeError {
    /// Invalid dimensions for operations
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Asked for more transitions than the buffer holds
    #[error("Insufficient data: requested {requested} transitions, only {available} stored")]
    InsufficientData {
        requested: usize,
        available: usize,
    },

    /// Invalid action
    #[error("Invalid action {action}: must be less than {max_actions}")]
    InvalidAction {
        action: usize,
        max_actions: usize,
    },

    /// `step` called after the episode reached a terminal state
    #[error("Episode is over: reset the environment before stepping again")]
    EpisodeOver,

    /// IO errors (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A persisted file exists but could not be decoded
    #[error("Corrupt file {path:?}: {reason}")]
    CorruptFile {
        path: PathBuf,
        reason: String,
    },

    /// A persisted file was written by an incompatible format version
    #[error("Incompatible format version in {path:?}: found {found}, expected {expected}")]
    IncompatibleVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
}

impl From<bincode::Error> for SnakeError {
    fn from(err: bincode::Error) -> Self {
        SnakeError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for SnakeError {
    fn from(err: serde_json::Error) -> Self {
        SnakeError::Serialization(err.to_string())
    }
}

// Helper functions for common error patterns
impl SnakeError {
    pub fn dimension_mismatch<E: Into<String>, A: Into<String>>(expected: E, actual: A) -> Self {
        SnakeError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        SnakeError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
