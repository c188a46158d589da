//! # Save Directory Store
//!
//! Debates saved as pretty-printed JSON files in a directory, one file
//! per debate, named after the debate's start time and title:
//!
//! ```text
//! debates/
//! ├── 20260314_091502_Should_cities_ban_cars_downtown.json
//! └── 20260314_102233_Is_math_discovered_or_invented.json
//! ```
//!
//! The name is derived from the debate itself, so saving the same debate
//! after every round keeps rewriting one file. Writes go to a temporary
//! sibling first and are renamed into place.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use dialectic_core::{DebateState, PersistError, Persister};
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{DebateSummary, Result, StoreError};

/// Longest sanitized title kept in a file name.
pub const MAX_FILENAME_TITLE: usize = 100;

const EXTENSION: &str = "json";

/// Makes `text` safe to embed in a file name.
///
/// Path separators and colons become `-`, shell-hostile characters and
/// control characters are dropped, and runs of whitespace collapse to a
/// single `_`. Results longer than [`MAX_FILENAME_TITLE`] characters are
/// cut and end in `...`.
///
/// # Example
///
/// ```rust
/// use dialectic_store::sanitize_filename;
///
/// assert_eq!(sanitize_filename("AI: friend or foe?"), "AI-_friend_or_foe");
/// ```
pub fn sanitize_filename(text: &str) -> String {
    let replaced: String = text
        .chars()
        .filter_map(|c| match c {
            '/' | '\\' | ':' => Some('-'),
            '?' | '*' | '"' | '<' | '>' | '|' => None,
            c if c.is_control() && !c.is_whitespace() => None,
            c => Some(c),
        })
        .collect();

    let joined = replaced.split_whitespace().collect::<Vec<_>>().join("_");
    let joined = joined.trim_start_matches('.');

    if joined.is_empty() {
        return "debate".to_string();
    }
    if joined.chars().count() > MAX_FILENAME_TITLE {
        let cut: String = joined.chars().take(MAX_FILENAME_TITLE - 3).collect();
        format!("{}...", cut)
    } else {
        joined.to_string()
    }
}

/// Enough of a save file to tell which debate it holds.
#[derive(Deserialize)]
struct SavedId {
    id: Uuid,
}

/// JSON file store rooted at a save directory.
///
/// The directory is created on first save.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    directory: PathBuf,
}

impl DirectoryStore {
    /// Creates a store rooted at `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// The save directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Base file name for a debate: `<YYYYmmdd_HHMMSS>_<title>.json`.
    pub fn file_name_for(state: &DebateState) -> String {
        format!(
            "{}_{}.{}",
            state.started_at.format("%Y%m%d_%H%M%S"),
            sanitize_filename(&state.display_title()),
            EXTENSION
        )
    }

    /// Writes the debate and returns the path of its file.
    ///
    /// If a different debate already owns the derived file name, a numeric
    /// suffix is added rather than overwriting it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the directory or file cannot be written
    /// and `StoreError::Serialization` if encoding fails.
    pub fn save(&self, state: &DebateState) -> Result<PathBuf> {
        fs::create_dir_all(&self.directory)
            .map_err(|e| StoreError::io(&self.directory, e))?;

        let path = self.path_for(state);
        let json = serde_json::to_string_pretty(state)?;

        let staging = path.with_extension("json.tmp");
        fs::write(&staging, json).map_err(|e| StoreError::io(&staging, e))?;
        fs::rename(&staging, &path).map_err(|e| StoreError::io(&path, e))?;

        debug!("Saved debate {} to {}", state.id, path.display());
        Ok(path)
    }

    /// Loads a debate by file name (relative to the save directory) or path.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the file does not exist
    /// - `StoreError::Serialization` if the file is not a debate record
    /// - `StoreError::InvalidState` if the record is inconsistent
    pub fn load(&self, file: impl AsRef<Path>) -> Result<DebateState> {
        let path = self.resolve(file.as_ref());
        if !path.is_file() {
            return Err(StoreError::NotFound(path.display().to_string()));
        }

        let text = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
        let state: DebateState = serde_json::from_str(&text)?;
        state.validate()?;
        Ok(state)
    }

    /// Summaries of saved debates, most recently written first.
    ///
    /// Files that cannot be read or decoded are skipped with a warning.
    /// A missing save directory lists as empty.
    pub fn list(&self, limit: Option<usize>) -> Result<Vec<DebateSummary>> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.directory, e)),
        };

        let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.directory, e))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            files.push((modified, path));
        }
        files.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));

        let limit = limit.unwrap_or(usize::MAX);
        let mut summaries = Vec::new();
        for (_, path) in files {
            if summaries.len() >= limit {
                break;
            }
            match self.load(&path) {
                Ok(state) => summaries.push(DebateSummary::from_state(&state).with_path(path)),
                Err(e) => warn!("Could not read {}: {}", path.display(), e),
            }
        }
        Ok(summaries)
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() || file.components().count() > 1 {
            file.to_path_buf()
        } else {
            self.directory.join(file)
        }
    }

    /// First path, base name then numbered variants, that is free or
    /// already holds this debate.
    ///
    /// After a [`save`](Self::save) this is where the debate lives.
    pub fn path_for(&self, state: &DebateState) -> PathBuf {
        let base = Self::file_name_for(state);
        let stem = base.trim_end_matches(".json");

        let mut candidate = self.directory.join(&base);
        let mut n = 2;
        while let Some(owner) = saved_id(&candidate) {
            if owner == state.id {
                break;
            }
            candidate = self.directory.join(format!("{}_{}.{}", stem, n, EXTENSION));
            n += 1;
        }
        candidate
    }
}

/// Id of the debate stored at `path`, if it holds a readable record.
fn saved_id(path: &Path) -> Option<Uuid> {
    let text = fs::read_to_string(path).ok()?;
    serde_json::from_str::<SavedId>(&text).ok().map(|s| s.id)
}

impl Persister for DirectoryStore {
    fn persist(&self, state: &DebateState) -> std::result::Result<(), PersistError> {
        self.save(state)
            .map(|_| ())
            .map_err(|e| PersistError::new(e.to_string()))
    }
}
