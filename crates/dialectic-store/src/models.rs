//! # Store Data Models
//!
//! Shared types for both debate stores: the digest type used for
//! integrity checks, the listing summary, and the store error.
//!
//! ## Integrity
//!
//! The sled store keeps a SHA-256 digest of every stored record next
//! to it. A record whose bytes no longer hash to the stored digest is
//! reported as [`StoreError::DigestMismatch`] instead of being decoded.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use dialectic_core::{DebateError, DebateState};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// SHA-256 digest size in bytes.
pub const DIGEST_SIZE: usize = 32;

/// A 32-byte SHA-256 digest of a stored record.
pub type Digest = [u8; DIGEST_SIZE];

/// Listing metadata for one saved debate.
///
/// Built from a full [`DebateState`]; carries just enough to pick a
/// debate out of a list without rendering it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateSummary {
    /// Debate identifier.
    pub id: Uuid,

    /// The question under debate.
    pub question: String,

    /// Title shown in listings (explicit title or derived from the question).
    pub title: String,

    /// Participants in speaking order.
    pub participants: Vec<String>,

    /// Number of completed rounds.
    pub iterations: usize,

    /// Whether the judge delivered a verdict.
    pub has_verdict: bool,

    /// Consensus winner, if any round reached consensus.
    pub winner: Option<String>,

    /// When the debate started.
    pub started_at: DateTime<Utc>,

    /// Save file backing this entry, for file-based stores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl DebateSummary {
    /// Summarizes a debate state.
    pub fn from_state(state: &DebateState) -> Self {
        Self {
            id: state.id,
            question: state.question.clone(),
            title: state.display_title(),
            participants: state.participants.clone(),
            iterations: state.rounds_completed(),
            has_verdict: state.verdict.is_some(),
            winner: state.winner().map(str::to_string),
            started_at: state.started_at,
            path: None,
        }
    }

    /// Attaches the backing file path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// File name of the backing file, if any.
    pub fn file_name(&self) -> Option<String> {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }
}

/// Errors that can occur while saving or loading debates.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to open, read or write the sled database.
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// Failed to encode or decode a debate record.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem failure on a save file or directory.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No debate exists under the given id or file name.
    #[error("Debate not found: {0}")]
    NotFound(String),

    /// The stored record does not match its digest.
    #[error("Stored debate {id} failed digest verification")]
    DigestMismatch { id: Uuid },

    /// The decoded record violates the debate invariants.
    #[error("Invalid debate record: {0}")]
    InvalidState(#[from] DebateError),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
