//! # Dialectic Core
//!
//! Multi-round, multi-agent debate orchestration with consensus voting
//! and per-agent belief revision.
//!
//! ## Overview
//!
//! A debate is a fixed roster of [`Debater`]s arguing one question in
//! rounds. Every participant speaks once per round in speaking order,
//! seeing the full history and what earlier speakers said this round.
//! From a configured round onward every participant also ranks all
//! participants; the [`dialectic_voting`] engine scores the rankings and
//! ends the debate once one participant reaches the consensus threshold.
//! A [`Judge`] closes the debate with a verdict.
//!
//! | Concern | Module |
//! |---------|--------|
//! | Debate record | [`model`] |
//! | Belief revision policy | [`belief`] |
//! | Collaborator interfaces | [`agent`] |
//! | State machine | [`orchestrator`] |
//! | Configuration | [`config`] |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     DEBATE ORCHESTRATOR                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │   ┌──────────┐   arguments   ┌──────────┐   votes   ┌────────┐  │
//! │   │ Debaters │──────────────▶│  Round   │──────────▶│ Voting │  │
//! │   └──────────┘◀──────────────│  Record  │           │Session │  │
//! │        ▲        context      └──────────┘           └───┬────┘  │
//! │        │                                                │       │
//! │   ┌──────────┐                               consensus? │       │
//! │   │  Belief  │                                          ▼       │
//! │   │ Ledgers  │                      ┌───────┐    ┌───────────┐  │
//! │   └──────────┘                      │ Judge │◀───│ Finalize  │  │
//! │                                     └───────┘    └───────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dialectic_core::{DebateConfig, DebateOrchestrator, Debater, ScriptedDebater, ScriptedJudge};
//!
//! # async fn demo() -> dialectic_core::Result<()> {
//! let debaters: Vec<Arc<dyn Debater>> = ["Optimist", "Skeptic", "Visionary", "Critic"]
//!     .into_iter()
//!     .map(|name| Arc::new(ScriptedDebater::new(name)) as Arc<dyn Debater>)
//!     .collect();
//!
//! let mut orchestrator = DebateOrchestrator::new(DebateConfig::default(), debaters)?
//!     .with_judge(Arc::new(ScriptedJudge::new()));
//!
//! let outcome = orchestrator.run("Should cities ban cars downtown?").await?;
//! println!("{}", outcome.reason);
//! # Ok(())
//! # }
//! ```
//!
//! ## Robustness Notes
//!
//! - Every collaborator call has a timeout and observes cancellation
//! - Bad or missing votes become visible fallback votes
//! - Only complete rounds are ever recorded
//! - Persistence failures are counted, never fatal

pub mod agent;
pub mod belief;
pub mod config;
pub mod error;
pub mod model;
pub mod orchestrator;

pub use agent::{ArgumentRequest, Debater, Judge, Persister, ScriptedDebater, ScriptedJudge, ScriptedVote};
pub use belief::{
    BeliefHistoryEntry, BeliefLedger, BeliefSnapshot, BeliefTraits, EvidenceAssessment,
    RevisionOutcome,
};
pub use config::{ArgumentFailurePolicy, DebateConfig, SaveConfig, CLASSIC_ROUNDS};
pub use error::{AgentError, DebateError, PersistError};
pub use model::{Argument, ArgumentKind, DebateState, IterationRecord};
pub use orchestrator::{DebateOrchestrator, DebateOutcome, DebatePhase, TerminationReason};

// Re-export voting types for convenience
pub use dialectic_voting::{
    RoundSummary, ScoreTrend, ScoringTable, Vote, VoteResponse, VotingConfig,
};

/// Core result type for debate operations.
pub type Result<T> = std::result::Result<T, DebateError>;
