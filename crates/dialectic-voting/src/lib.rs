//! # Dialectic Voting
//!
//! Ranked-choice voting and consensus detection for multi-agent debates.
//!
//! ## Overview
//!
//! Once a debate has run long enough for positions to settle, every
//! participant submits a full or partial ranking of all participants,
//! themselves included. Rankings are turned into points with a
//! configurable scoring table, and consensus is declared when the top
//! scorer reaches a fixed fraction of the maximum achievable score.
//!
//! ## Scoring
//!
//! With the default table and four participants:
//!
//! | Rank | Points |
//! |------|--------|
//! | 1st  | 4      |
//! | 2nd  | 3      |
//! | 3rd  | 2      |
//! | 4th  | 1      |
//!
//! The maximum is `participants × points[1] = 16`; at the default 75%
//! threshold an agent needs 12 points, for example three first places
//! and a last place, or every voter placing it first or second with at
//! least two firsts.
//!
//! ## Failure Model
//!
//! ### Self-promotion
//! Each voter must rank themselves, so an agent cannot sink its own
//! score by omission. A bloc of self-serving voters splits the points
//! evenly and consensus does not form.
//!
//! ### Malformed ballots
//! Votes are validated against the roster. The session refuses invalid
//! votes outright; the caller decides whether to substitute a
//! [`Vote::fallback`] or abort.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐  ┌──────────┐  ┌──────────┐
//! │  Vote A  │  │  Vote B  │  │  Vote C  │
//! └────┬─────┘  └────┬─────┘  └────┬─────┘
//!      └─────────────┼─────────────┘
//!                    ▼
//!             ┌─────────────┐
//!             │   SCORING   │  rank → points
//!             └──────┬──────┘
//!                    ▼
//!             ┌─────────────┐
//!             │  CONSENSUS  │  top ≥ threshold × max
//!             └──────┬──────┘
//!                    ▼
//!             ┌─────────────┐
//!             │   SESSION   │  history, summaries, trends
//!             └─────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use dialectic_voting::{Vote, VotingConfig, VotingSession};
//!
//! let roster: Vec<String> = ["Optimist", "Skeptic", "Visionary", "Critic"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//! let mut session = VotingSession::new(VotingConfig::default(), roster.clone()).unwrap();
//!
//! let votes = vec![
//!     Vote::new("Optimist", vec!["Visionary".into(), "Optimist".into()], "", 2),
//!     Vote::new("Skeptic", vec!["Visionary".into(), "Skeptic".into()], "", 2),
//!     Vote::new("Visionary", vec!["Visionary".into()], "", 2),
//!     Vote::new("Critic", vec!["Critic".into(), "Visionary".into()], "", 2),
//! ];
//!
//! let summary = session.record_round(2, votes).unwrap();
//! assert_eq!(summary.score_of("Visionary"), 15);
//! assert_eq!(summary.winner(), Some("Visionary"));
//! ```
//!
//! ## References
//!
//! - [Borda count](https://en.wikipedia.org/wiki/Borda_count) - Positional voting
//! - [Consensus decision-making](https://en.wikipedia.org/wiki/Consensus_decision-making)

pub mod config;
pub mod consensus;
pub mod error;
pub mod scoring;
pub mod session;
pub mod vote;

pub use config::{ScoringTable, VotingConfig, MAX_ITERATIONS_CAP};
pub use consensus::{ConsensusEvaluator, ConsensusOutcome};
pub use error::{VoteError, VotingError};
pub use scoring::{calculate_scores, rank_by_score, ScoreMap};
pub use session::{validate_roster, RoundSummary, ScoreTrend, VoterReasoning, VotingSession};
pub use vote::{Vote, VoteResponse, FALLBACK_REASONING};

/// Result type for voting operations.
pub type Result<T> = std::result::Result<T, VotingError>;
