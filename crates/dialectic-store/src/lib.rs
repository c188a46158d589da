//! # Dialectic Store - Debate Persistence
//!
//! Two interchangeable homes for finished and in-progress debates, both
//! usable as the orchestrator's [`Persister`](dialectic_core::Persister):
//!
//! | Store | Backing | Integrity | Use |
//! |-------|---------|-----------|-----|
//! | [`SledStore`] | embedded Sled database | SHA-256 digest per record | long-lived archives |
//! | [`DirectoryStore`] | one JSON file per debate | state validation on load | human-readable save files |
//!
//! Both store the full [`DebateState`](dialectic_core::DebateState), which
//! is the authoritative schema: a stored debate reloads with identical
//! rounds, votes and verdict, so its scores can be recomputed exactly.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐   persist()   ┌─────────────────────────────┐
//! │  DebateOrchestrator  │──────────────▶│  SledStore │ DirectoryStore │
//! └──────────────────────┘  each round   └──────┬──────────────┬───────┘
//!                                               │              │
//!                                   ┌───────────▼───┐   ┌──────▼────────────────┐
//!                                   │ debates tree  │   │ 20260314_091502_      │
//!                                   │ digests tree  │   │   <title>.json        │
//!                                   └───────────────┘   └───────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dialectic_store::DirectoryStore;
//!
//! let store = DirectoryStore::new("debates");
//! for summary in store.list(Some(10)).unwrap() {
//!     println!("{}  {} ({} rounds)", summary.started_at, summary.title, summary.iterations);
//! }
//! ```
//!
//! ## References
//!
//! - **NIST FIPS 180-4** - "Secure Hash Standard (SHS)" - SHA-256 specification.
//!   <https://csrc.nist.gov/publications/detail/fips/180/4/final>
//! - **Sled Documentation** - Embedded database for persistent storage.
//!   <https://sled.rs/>

pub mod files;
pub mod models;
pub mod storage;

pub use files::{sanitize_filename, DirectoryStore, MAX_FILENAME_TITLE};
pub use models::{DebateSummary, Digest, Result, StoreError, DIGEST_SIZE};
pub use storage::{digest_bytes, SledStore};

#[cfg(test)]
mod tests;
