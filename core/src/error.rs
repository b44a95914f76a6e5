//! Error types for skeleton execution

use thiserror::Error;

/// Error returned by a user-supplied muscle
pub type MuscleError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for interpreting and scheduling skeleton programs
#[derive(Error, Debug)]
pub enum SkeletonError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Muscle '{muscle}' failed: {source}")]
    Muscle {
        muscle: String,
        #[source]
        source: MuscleError,
    },

    #[error("Structural violation: {0}")]
    Structural(String),

    #[error("Task join failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl SkeletonError {
    pub fn muscle(name: &str, source: MuscleError) -> Self {
        SkeletonError::Muscle {
            muscle: name.to_string(),
            source,
        }
    }

    pub fn structural(message: impl Into<String>) -> Self {
        SkeletonError::Structural(message.into())
    }

    /// Whether this is a fatal configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, SkeletonError::Configuration(_))
    }
}

/// Fatal, non-retryable errors in how a program is put together
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Invalid number of divisions. Expected {expected} but was {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("Split input must be a list, got {0}")]
    NotASequence(String),

    #[error("Malformed branch trace: {0}")]
    MalformedTrace(String),

    #[error("Split nesting exceeded the maximum depth of {0}")]
    DepthExceeded(usize),
}

pub type SkeletonResult<T> = Result<T, SkeletonError>;
