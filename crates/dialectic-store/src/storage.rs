//! # Sled Debate Store
//!
//! Embedded, crash-safe storage for debate records using Sled. Each
//! record is stored as JSON next to a SHA-256 digest of the stored bytes,
//! so a record modified outside the store is detected on load.
//!
//! ## Storage Structure
//!
//! The database uses two trees (namespaces):
//!
//! | Tree | Key | Value | Purpose |
//! |------|-----|-------|---------|
//! | `debates` | debate id (16 bytes) | JSON `DebateState` | Record storage |
//! | `digests` | debate id (16 bytes) | 32-byte SHA-256 | Tamper detection |
//!
//! ## Load Path
//!
//! ```text
//! bytes ──▶ SHA-256 ──▶ compare with stored digest ──▶ decode ──▶ validate
//!                              │ mismatch
//!                              ▼
//!                     StoreError::DigestMismatch
//! ```
//!
//! ## References
//!
//! - Sled documentation: <https://sled.rs/>

use std::path::Path;

use dialectic_core::{DebateState, PersistError, Persister};
use sha2::{Digest as _, Sha256};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{DebateSummary, Digest, Result, StoreError};

/// Tree name for storing debate records.
const DEBATE_TREE: &str = "debates";

/// Tree name for storing record digests.
const DIGEST_TREE: &str = "digests";

/// Computes the SHA-256 digest of a stored record.
pub fn digest_bytes(bytes: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// Sled-backed store for complete debate records.
///
/// Saving the same debate twice replaces the earlier record, so the
/// orchestrator can persist after every round and the store always holds
/// the latest snapshot.
///
/// # Thread Safety
///
/// The underlying Sled database is thread-safe; the store is `Clone` and
/// clones share the same database.
///
/// # Example
///
/// ```rust
/// use dialectic_core::{DebateConfig, DebateState};
/// use dialectic_store::SledStore;
///
/// let store = SledStore::temporary().unwrap();
/// let state = DebateState::new(
///     "Is chess a sport?",
///     vec!["Optimist".to_string(), "Skeptic".to_string()],
///     DebateConfig::default(),
/// )
/// .unwrap();
///
/// store.save(&state).unwrap();
/// let loaded = store.load(&state.id).unwrap().unwrap();
/// assert_eq!(loaded, state);
/// ```
#[derive(Clone)]
pub struct SledStore {
    /// The underlying Sled database.
    db: sled::Db,

    /// Serialized debate records.
    debates: sled::Tree,

    /// Digests of the serialized records.
    digests: sled::Tree,
}

impl SledStore {
    /// Opens or creates a store at the given path.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the path is invalid, permissions
    /// are insufficient or the database is corrupted.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use dialectic_store::SledStore;
    ///
    /// let store = SledStore::open("./data/debates.db").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Creates a temporary store that is discarded when dropped.
    pub fn temporary() -> Result<Self> {
        let config = sled::Config::new().temporary(true);
        Self::from_db(config.open()?)
    }

    fn from_db(db: sled::Db) -> Result<Self> {
        let debates = db.open_tree(DEBATE_TREE)?;
        let digests = db.open_tree(DIGEST_TREE)?;
        Ok(SledStore {
            db,
            debates,
            digests,
        })
    }

    /// Stores a debate, replacing any earlier snapshot with the same id.
    ///
    /// # Returns
    ///
    /// The digest recorded for the stored bytes.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if the state cannot be encoded
    /// and `StoreError::Database` if the write fails.
    pub fn save(&self, state: &DebateState) -> Result<Digest> {
        let key = state.id.as_bytes();
        let bytes = serde_json::to_vec(state)?;
        let digest = digest_bytes(&bytes);

        // Digest goes in first; an interrupted save then fails verification.
        self.digests.insert(key, digest.as_slice())?;
        self.debates.insert(key, bytes)?;

        debug!(
            "Stored debate {} ({} rounds)",
            state.id,
            state.rounds_completed()
        );
        Ok(digest)
    }

    /// Loads a debate by id.
    ///
    /// # Returns
    ///
    /// `Some(state)` if found, `None` if no record exists.
    ///
    /// # Errors
    ///
    /// - `StoreError::DigestMismatch` if the record bytes do not match the
    ///   stored digest, or the digest is missing
    /// - `StoreError::Serialization` if the record cannot be decoded
    /// - `StoreError::InvalidState` if the decoded debate is inconsistent
    pub fn load(&self, id: &Uuid) -> Result<Option<DebateState>> {
        let key = id.as_bytes();

        let bytes = match self.debates.get(key)? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };

        let expected = self
            .load_digest(id)?
            .ok_or(StoreError::DigestMismatch { id: *id })?;
        if digest_bytes(&bytes) != expected {
            warn!("Debate {} failed digest verification", id);
            return Err(StoreError::DigestMismatch { id: *id });
        }

        let state: DebateState = serde_json::from_slice(&bytes)?;
        state.validate()?;
        Ok(Some(state))
    }

    /// Loads only the stored digest for a debate.
    pub fn load_digest(&self, id: &Uuid) -> Result<Option<Digest>> {
        match self.digests.get(id.as_bytes())? {
            Some(bytes) => {
                let digest: Digest = bytes
                    .as_ref()
                    .try_into()
                    .map_err(|_| StoreError::DigestMismatch { id: *id })?;
                Ok(Some(digest))
            }
            None => Ok(None),
        }
    }

    /// Summaries of every stored debate, most recent first.
    ///
    /// Records that fail verification or decoding are skipped with a
    /// warning so one bad record does not hide the rest.
    pub fn list(&self) -> Result<Vec<DebateSummary>> {
        let mut summaries = Vec::new();

        for entry in self.debates.iter() {
            let (key, _) = entry?;
            let id = match Uuid::from_slice(&key) {
                Ok(id) => id,
                Err(e) => {
                    warn!("Skipping record with malformed key: {}", e);
                    continue;
                }
            };
            match self.load(&id) {
                Ok(Some(state)) => summaries.push(DebateSummary::from_state(&state)),
                Ok(None) => {}
                Err(e) => warn!("Skipping debate {}: {}", id, e),
            }
        }

        summaries.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(summaries)
    }

    /// Checks whether a debate is stored.
    pub fn contains(&self, id: &Uuid) -> Result<bool> {
        Ok(self.debates.contains_key(id.as_bytes())?)
    }

    /// Removes a debate.
    ///
    /// # Returns
    ///
    /// `true` if the debate was removed, `false` if it didn't exist.
    pub fn remove(&self, id: &Uuid) -> Result<bool> {
        let key = id.as_bytes();
        let existed = self.debates.remove(key)?.is_some();
        self.digests.remove(key)?;
        Ok(existed)
    }

    /// Returns the number of stored debates.
    pub fn len(&self) -> usize {
        self.debates.len()
    }

    /// Returns true if no debates are stored.
    pub fn is_empty(&self) -> bool {
        self.debates.is_empty()
    }

    /// Flushes all pending writes to disk.
    ///
    /// # Returns
    ///
    /// The number of bytes flushed.
    pub fn flush(&self) -> Result<usize> {
        Ok(self.db.flush()?)
    }

    #[cfg(test)]
    pub(crate) fn overwrite_raw(&self, id: &Uuid, bytes: &[u8]) -> Result<()> {
        self.debates.insert(id.as_bytes(), bytes)?;
        Ok(())
    }
}

impl Persister for SledStore {
    fn persist(&self, state: &DebateState) -> std::result::Result<(), PersistError> {
        self.save(state)
            .map(|_| ())
            .map_err(|e| PersistError::new(e.to_string()))
    }
}

impl std::fmt::Debug for SledStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledStore")
            .field("debates_count", &self.len())
            .finish()
    }
}
