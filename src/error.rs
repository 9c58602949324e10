use thiserror::Error;

/// Unified error type for semrel operations
#[derive(Error, Debug)]
pub enum SemrelError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Commit parse error: {0}")]
    CommitParse(String),

    #[error("No version bump: {0}")]
    NoVersionBump(String),

    #[error("Not a release branch: {0}")]
    NotAReleaseBranch(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in semrel
pub type Result<T> = std::result::Result<T, SemrelError>;

impl SemrelError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        SemrelError::Config(msg.into())
    }

    /// Create an invalid-version error with context
    pub fn invalid_version(msg: impl Into<String>) -> Self {
        SemrelError::InvalidVersion(msg.into())
    }

    /// Create a commit-parse error with context
    pub fn commit_parse(msg: impl Into<String>) -> Self {
        SemrelError::CommitParse(msg.into())
    }

    /// Create a no-version-bump error with context
    pub fn no_bump(msg: impl Into<String>) -> Self {
        SemrelError::NoVersionBump(msg.into())
    }

    /// Create a not-a-release-branch error with context
    pub fn not_a_release_branch(msg: impl Into<String>) -> Self {
        SemrelError::NotAReleaseBranch(msg.into())
    }

    /// Create an internal invariant-violation error with context
    pub fn internal(msg: impl Into<String>) -> Self {
        SemrelError::Internal(msg.into())
    }
}
