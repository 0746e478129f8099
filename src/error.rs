use thiserror::Error;

/// Unified error type for merge-up operations
#[derive(Error, Debug)]
pub enum MergeUpError {
    #[error("Invalid repository reference: {0}")]
    InvalidReference(String),

    #[error("Could not work out what default platform major version for {0}")]
    UnresolvableMajor(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Constraint parsing error: {0}")]
    Constraint(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in merge-up
pub type Result<T> = std::result::Result<T, MergeUpError>;

impl MergeUpError {
    /// Create an invalid reference error
    pub fn invalid_reference(msg: impl Into<String>) -> Self {
        MergeUpError::InvalidReference(msg.into())
    }

    /// Create an unresolvable major error naming the repository
    pub fn unresolvable_major(name: impl Into<String>) -> Self {
        MergeUpError::UnresolvableMajor(name.into())
    }

    /// Create a catalog error with context
    pub fn catalog(msg: impl Into<String>) -> Self {
        MergeUpError::Catalog(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        MergeUpError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        MergeUpError::Version(msg.into())
    }

    /// Create a constraint error with context
    pub fn constraint(msg: impl Into<String>) -> Self {
        MergeUpError::Constraint(msg.into())
    }

    /// Create a snapshot error with context
    pub fn snapshot(msg: impl Into<String>) -> Self {
        MergeUpError::Snapshot(msg.into())
    }
}
