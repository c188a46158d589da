//! Error types for the voting engine.
//!
//! Configuration problems are fatal and surface before any round
//! starts. Vote malformations are recoverable: the orchestrator
//! inspects a [`VoteError`] and substitutes a fallback vote.

use thiserror::Error;

/// Errors that can occur during voting operations.
#[derive(Debug, Error)]
pub enum VotingError {
    /// Consensus threshold outside `[0, 1]`.
    #[error("Consensus threshold must be between 0.0 and 1.0, got {0}")]
    InvalidThreshold(f64),

    /// The scoring table is empty, has gaps, or awards non-positive points.
    #[error("Invalid scoring table: {0}")]
    InvalidScoring(String),

    /// Iteration bounds are inconsistent.
    #[error("Invalid iteration bounds: {0}")]
    InvalidIterations(String),

    /// The scoring table ranks more positions than there are participants.
    #[error("Scoring table covers {ranks} ranks but only {participants} participants are debating")]
    ScoringExceedsParticipants {
        /// Number of ranks in the scoring table.
        ranks: usize,
        /// Number of participants.
        participants: usize,
    },

    /// The participant roster is unusable.
    #[error("Invalid participants: {0}")]
    InvalidParticipants(String),

    /// A round was submitted out of order or twice.
    #[error("Round {iteration} cannot be recorded after round {last}")]
    RoundOutOfOrder {
        /// The iteration that was submitted.
        iteration: u32,
        /// The most recently recorded iteration.
        last: u32,
    },

    /// A vote in a submitted round failed validation.
    #[error("Invalid vote from '{voter}': {source}")]
    InvalidVote {
        /// Who cast the vote.
        voter: String,
        /// Why it was rejected.
        #[source]
        source: VoteError,
    },

    /// Requested round has not been recorded.
    #[error("No votes recorded for round {0}")]
    RoundNotAvailable(u32),
}

/// Reasons a vote is considered malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoteError {
    /// The ranking list is empty.
    #[error("rankings are empty")]
    EmptyRankings,

    /// A participant appears more than once.
    #[error("'{0}' appears more than once in the rankings")]
    DuplicateEntry(String),

    /// The voter did not rank themselves.
    #[error("voter '{0}' is missing from their own rankings")]
    VoterMissing(String),

    /// A ranked name is not a debate participant.
    #[error("'{0}' is not a debate participant")]
    UnknownParticipant(String),

    /// The vote was cast for a different round.
    #[error("vote was cast for round {found}, expected round {expected}")]
    IterationMismatch {
        /// Iteration being recorded.
        expected: u32,
        /// Iteration carried by the vote.
        found: u32,
    },

    /// The collaborator output could not be decoded.
    #[error("vote could not be parsed: {0}")]
    Unparseable(String),
}
