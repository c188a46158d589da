//! Voting session: per-debate vote history and round summaries.
//!
//! A session is an owned value; each debate carries its own, so any
//! number of debates can vote side by side in one process.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::VotingConfig;
use crate::consensus::{ConsensusEvaluator, ConsensusOutcome};
use crate::error::{VoteError, VotingError};
use crate::scoring::{calculate_scores, rank_by_score, ScoreMap};
use crate::vote::Vote;
use crate::Result;

/// One voter's ranking and reasoning, as recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterReasoning {
    /// Who voted.
    pub voter: String,
    /// Their ranking, best first.
    pub rankings: Vec<String>,
    /// Verbatim reasoning.
    pub reasoning: String,
    /// Whether the vote was substituted.
    pub fallback: bool,
}

/// Everything known about a single voting round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    /// Iteration the votes belong to.
    pub iteration: u32,
    /// Raw scores; unscored participants are absent.
    pub scores: ScoreMap,
    /// Every participant by score, highest first, ties in roster order.
    pub ranking: Vec<(String, u32)>,
    /// Consensus evaluation.
    pub consensus: ConsensusOutcome,
    /// Per-voter rankings and reasoning.
    pub votes: Vec<VoterReasoning>,
}

impl RoundSummary {
    /// Whether this round reached consensus.
    pub fn consensus_reached(&self) -> bool {
        self.consensus.reached
    }

    /// The consensus winner, if any.
    pub fn winner(&self) -> Option<&str> {
        self.consensus.winner.as_deref()
    }

    /// Score required for consensus.
    pub fn threshold_score(&self) -> f64 {
        self.consensus.threshold_score
    }

    /// Score for a participant, zero if they earned nothing.
    pub fn score_of(&self, participant: &str) -> u32 {
        self.scores.get(participant).copied().unwrap_or(0)
    }
}

/// Score history for one participant across recorded rounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTrend {
    /// Participant name.
    pub participant: String,
    /// Score in each recorded round, in recording order.
    pub scores: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecordedRound {
    iteration: u32,
    votes: Vec<Vote>,
}

/// Stateful collector of per-round vote sets.
///
/// Rounds must arrive in strictly increasing iteration order. Every
/// submitted vote is validated against the roster; the orchestrator is
/// expected to have replaced malformed votes with fallbacks beforehand.
///
/// # Example
///
/// ```rust
/// use dialectic_voting::{Vote, VotingConfig, VotingSession};
///
/// let roster: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
/// let mut session = VotingSession::new(VotingConfig::default(), roster.clone()).unwrap();
///
/// let votes: Vec<Vote> = roster
///     .iter()
///     .map(|voter| Vote::new(voter.clone(), roster.clone(), "", 2))
///     .collect();
/// let summary = session.record_round(2, votes).unwrap();
///
/// assert!(summary.consensus_reached());
/// assert_eq!(summary.winner(), Some("A"));
/// ```
#[derive(Debug, Clone)]
pub struct VotingSession {
    config: VotingConfig,
    participants: Vec<String>,
    evaluator: ConsensusEvaluator,
    rounds: Vec<RecordedRound>,
}

impl VotingSession {
    /// Creates a session for a fixed roster.
    ///
    /// # Errors
    ///
    /// - [`VotingError::InvalidParticipants`] for fewer than two or duplicate names
    /// - any error from [`VotingConfig::validate_for`]
    pub fn new(config: VotingConfig, participants: Vec<String>) -> Result<Self> {
        validate_roster(&participants)?;
        config.validate_for(participants.len())?;

        let evaluator = ConsensusEvaluator::new(
            config.consensus_threshold,
            config.max_score(participants.len()),
        );

        debug!(
            "Voting session created for {} participants (max score {}, threshold {:.2})",
            participants.len(),
            config.max_score(participants.len()),
            evaluator.threshold_score()
        );

        Ok(Self {
            config,
            participants,
            evaluator,
            rounds: Vec::new(),
        })
    }

    /// The voting configuration.
    pub fn config(&self) -> &VotingConfig {
        &self.config
    }

    /// Participants in roster order.
    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    /// Maximum achievable score.
    pub fn max_score(&self) -> u32 {
        self.config.max_score(self.participants.len())
    }

    /// Score required for consensus.
    pub fn threshold_score(&self) -> f64 {
        self.evaluator.threshold_score()
    }

    /// Number of recorded rounds.
    pub fn rounds_recorded(&self) -> usize {
        self.rounds.len()
    }

    /// Most recently recorded iteration.
    pub fn last_iteration(&self) -> Option<u32> {
        self.rounds.last().map(|r| r.iteration)
    }

    /// Iterations that have votes, in order.
    pub fn recorded_iterations(&self) -> Vec<u32> {
        self.rounds.iter().map(|r| r.iteration).collect()
    }

    /// Scores a round of votes without recording it.
    pub fn calculate_scores(&self, votes: &[Vote]) -> ScoreMap {
        calculate_scores(votes, &self.config.scoring)
    }

    /// Evaluates consensus for an arbitrary score map.
    pub fn check_consensus(&self, scores: &ScoreMap) -> ConsensusOutcome {
        self.evaluator.evaluate(scores, &self.participants)
    }

    /// Records a round of votes and returns its summary.
    ///
    /// # Errors
    ///
    /// - [`VotingError::RoundOutOfOrder`] if `iteration` is not after the last recorded one
    /// - [`VotingError::InvalidVote`] if any vote fails roster validation
    ///   or was cast for another iteration
    pub fn record_round(&mut self, iteration: u32, votes: Vec<Vote>) -> Result<RoundSummary> {
        if let Some(last) = self.last_iteration() {
            if iteration <= last {
                return Err(VotingError::RoundOutOfOrder { iteration, last });
            }
        }

        for vote in &votes {
            let checked = if vote.iteration == iteration {
                vote.validate(&self.participants)
            } else {
                Err(VoteError::IterationMismatch {
                    expected: iteration,
                    found: vote.iteration,
                })
            };
            checked.map_err(|source| VotingError::InvalidVote {
                voter: vote.voter.clone(),
                source,
            })?;
        }

        self.rounds.push(RecordedRound { iteration, votes });
        let summary = self.summarize(self.rounds.len() - 1);

        info!(
            "Round {} scored: leader {:?} with {}/{} (threshold {:.1}), consensus: {}",
            iteration + 1,
            summary.consensus.leader,
            summary.consensus.top_score,
            summary.consensus.max_score,
            summary.consensus.threshold_score,
            summary.consensus.reached
        );

        Ok(summary)
    }

    /// Summary for a recorded iteration.
    ///
    /// # Errors
    ///
    /// Returns [`VotingError::RoundNotAvailable`] when no votes were
    /// recorded for `iteration`.
    pub fn summary(&self, iteration: u32) -> Result<RoundSummary> {
        self.rounds
            .iter()
            .position(|r| r.iteration == iteration)
            .map(|index| self.summarize(index))
            .ok_or(VotingError::RoundNotAvailable(iteration))
    }

    /// Summary of the most recent round, if any.
    pub fn latest_summary(&self) -> Option<RoundSummary> {
        self.rounds
            .len()
            .checked_sub(1)
            .map(|index| self.summarize(index))
    }

    /// Per-participant scores across every recorded round.
    ///
    /// Participants appear in roster order; a round in which a
    /// participant earned nothing contributes zero.
    pub fn trends(&self) -> Vec<ScoreTrend> {
        let per_round: Vec<ScoreMap> = self
            .rounds
            .iter()
            .map(|round| self.calculate_scores(&round.votes))
            .collect();

        self.participants
            .iter()
            .map(|participant| ScoreTrend {
                participant: participant.clone(),
                scores: per_round
                    .iter()
                    .map(|scores| scores.get(participant).copied().unwrap_or(0))
                    .collect(),
            })
            .collect()
    }

    fn summarize(&self, index: usize) -> RoundSummary {
        let round = &self.rounds[index];
        let scores = self.calculate_scores(&round.votes);
        let consensus = self.check_consensus(&scores);
        let ranking = rank_by_score(&scores, &self.participants);

        RoundSummary {
            iteration: round.iteration,
            ranking,
            consensus,
            votes: round
                .votes
                .iter()
                .map(|v| VoterReasoning {
                    voter: v.voter.clone(),
                    rankings: v.rankings.clone(),
                    reasoning: v.reasoning.clone(),
                    fallback: v.fallback,
                })
                .collect(),
            scores,
        }
    }
}

/// Checks that a roster has at least two unique, non-blank names.
pub fn validate_roster(participants: &[String]) -> Result<()> {
    if participants.len() < 2 {
        return Err(VotingError::InvalidParticipants(format!(
            "at least 2 participants are required, got {}",
            participants.len()
        )));
    }
    for (i, name) in participants.iter().enumerate() {
        if name.trim().is_empty() {
            return Err(VotingError::InvalidParticipants(
                "participant names cannot be empty".to_string(),
            ));
        }
        if participants[..i].contains(name) {
            return Err(VotingError::InvalidParticipants(format!(
                "participant '{}' appears more than once",
                name
            )));
        }
    }
    Ok(())
}
