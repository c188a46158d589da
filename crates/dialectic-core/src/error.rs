//! Error types for debate orchestration.

use std::path::PathBuf;

use thiserror::Error;

/// Core error type for debate operations.
#[derive(Debug, Error)]
pub enum DebateError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The configuration file could not be read.
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`crate::DebateConfig`].
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Debate state violates a model invariant.
    #[error("Invalid debate state: {0}")]
    InvalidState(String),

    /// Voting error passthrough.
    #[error("Voting error: {0}")]
    Voting(#[from] dialectic_voting::VotingError),
}

/// Failures reported by, or on behalf of, a generation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    /// The call did not finish within the configured timeout.
    #[error("timed out after {0}s")]
    Timeout(u64),

    /// The collaborator reported a failure (transport, provider, ...).
    #[error("generation failed: {0}")]
    Failed(String),

    /// The collaborator answered but the answer is unusable.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The collaborator does not implement this capability.
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),

    /// The debate was cancelled while the call was in flight.
    #[error("cancelled")]
    Cancelled,
}

impl From<dialectic_voting::VoteError> for AgentError {
    fn from(err: dialectic_voting::VoteError) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// A persistence collaborator failed to store a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("persistence failed: {message}")]
pub struct PersistError {
    /// Description of the failure.
    pub message: String,
}

impl PersistError {
    /// Creates a persistence error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
