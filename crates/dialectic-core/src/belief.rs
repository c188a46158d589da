//! Belief revision.
//!
//! Each agent may hold a private [`BeliefSnapshot`] alongside its public
//! arguments. After a round the agent rates how strong the other
//! participants' evidence was, and the policy here decides whether the
//! proposed replacement snapshot is adopted.
//!
//! ## Policy
//!
//! ```text
//! threshold = belief_persistence × 10 − truth_seeking × 5
//! accept    ⇔ evidence_strength ≥ threshold
//! ```
//!
//! | persistence | truth seeking | threshold |
//! |-------------|---------------|-----------|
//! | 9           | 6             | 60        |
//! | 6           | 8             | 20        |
//! | 1           | 10            | −40 (always accept) |
//!
//! A negative threshold accepts everything; a threshold above the rating
//! scale accepts nothing. Both are valid settings.
//!
//! Accepted snapshots replace the current one wholesale. The replaced
//! snapshot is kept in the ledger history with the iteration it was
//! replaced in.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AgentError;

/// Lowest valid confidence level.
pub const MIN_CONFIDENCE: u8 = 1;
/// Highest valid confidence level.
pub const MAX_CONFIDENCE: u8 = 10;

/// An agent's private stance on the debate question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeliefSnapshot {
    /// The position in one or two sentences.
    pub core_position: String,
    /// Confidence from 1 to 10.
    pub confidence: u8,
    /// Principles the position rests on.
    #[serde(default)]
    pub principles: Vec<String>,
    /// Evidence supporting the position.
    #[serde(default)]
    pub supporting_evidence: Vec<String>,
    /// Weaknesses the agent acknowledges.
    #[serde(default)]
    pub weaknesses: Vec<String>,
    /// The agent's view of what is actually true.
    #[serde(default)]
    pub truth_assessment: String,
    /// Iteration the snapshot was adopted in.
    #[serde(default)]
    pub last_updated: u32,
}

impl BeliefSnapshot {
    /// Creates a snapshot with just a position and confidence.
    pub fn new(core_position: impl Into<String>, confidence: u8) -> Self {
        Self {
            core_position: core_position.into(),
            confidence,
            principles: Vec::new(),
            supporting_evidence: Vec::new(),
            weaknesses: Vec::new(),
            truth_assessment: String::new(),
            last_updated: 0,
        }
    }

    /// Checks that the snapshot is usable.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Malformed`] for an empty position or a
    /// confidence outside `1..=10`.
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.core_position.trim().is_empty() {
            return Err(AgentError::Malformed(
                "belief has no core position".to_string(),
            ));
        }
        if !(MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&self.confidence) {
            return Err(AgentError::Malformed(format!(
                "belief confidence {} is outside {}..={}",
                self.confidence, MIN_CONFIDENCE, MAX_CONFIDENCE
            )));
        }
        Ok(())
    }
}

/// Personality parameters that drive belief revision.
///
/// Both values are on a 1 to 10 scale by convention; the policy itself
/// accepts any integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeliefTraits {
    /// How strongly existing beliefs resist change.
    pub belief_persistence: i32,
    /// Commitment to following the evidence.
    pub truth_seeking: i32,
}

impl Default for BeliefTraits {
    fn default() -> Self {
        Self {
            belief_persistence: 6,
            truth_seeking: 8,
        }
    }
}

impl BeliefTraits {
    /// Creates traits.
    pub fn new(belief_persistence: i32, truth_seeking: i32) -> Self {
        Self {
            belief_persistence,
            truth_seeking,
        }
    }

    /// Evidence strength needed to change this agent's mind.
    pub fn acceptance_threshold(&self) -> i32 {
        self.belief_persistence * 10 - self.truth_seeking * 5
    }

    /// Whether evidence of the given strength is enough.
    pub fn should_update(&self, evidence_strength: i32) -> bool {
        evidence_strength >= self.acceptance_threshold()
    }
}

/// An agent's rating of new evidence plus the belief it would adopt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceAssessment {
    /// Strength of the new evidence, typically 1 to 100.
    pub evidence_strength: i32,
    /// Replacement snapshot if the evidence is accepted.
    pub proposed: BeliefSnapshot,
    /// Why the agent rated the evidence this way.
    #[serde(default)]
    pub reasoning: String,
}

/// A replaced snapshot and when it was replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeliefHistoryEntry {
    /// Iteration in which the replacement happened.
    pub iteration: u32,
    /// The snapshot that was replaced.
    pub previous: BeliefSnapshot,
}

/// Result of one revision attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionOutcome {
    /// The proposal was adopted.
    Accepted {
        /// Required strength.
        threshold: i32,
        /// Offered strength.
        evidence_strength: i32,
    },
    /// The current snapshot was kept.
    Rejected {
        /// Required strength.
        threshold: i32,
        /// Offered strength.
        evidence_strength: i32,
    },
    /// The agent holds no belief to revise.
    NoBelief,
}

impl RevisionOutcome {
    /// Whether the belief changed.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Current belief and replacement history for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeliefLedger {
    /// Agent the ledger belongs to.
    pub agent: String,
    /// Revision parameters.
    pub traits: BeliefTraits,
    /// Current snapshot, if one has been established.
    pub current: Option<BeliefSnapshot>,
    /// Replaced snapshots, oldest first.
    pub history: Vec<BeliefHistoryEntry>,
    /// Revision attempts that were turned down.
    pub rejected_attempts: u32,
}

impl BeliefLedger {
    /// Creates an empty ledger.
    pub fn new(agent: impl Into<String>, traits: BeliefTraits) -> Self {
        Self {
            agent: agent.into(),
            traits,
            current: None,
            history: Vec::new(),
            rejected_attempts: 0,
        }
    }

    /// Sets the initial snapshot. Does not touch history.
    pub fn establish(&mut self, mut snapshot: BeliefSnapshot, iteration: u32) {
        snapshot.last_updated = iteration;
        self.current = Some(snapshot);
    }

    /// Applies the revision policy to an assessment.
    pub fn revise(&mut self, assessment: EvidenceAssessment, iteration: u32) -> RevisionOutcome {
        let Some(current) = self.current.take() else {
            return RevisionOutcome::NoBelief;
        };

        let threshold = self.traits.acceptance_threshold();
        let evidence_strength = assessment.evidence_strength;

        if self.traits.should_update(evidence_strength) {
            self.history.push(BeliefHistoryEntry {
                iteration,
                previous: current,
            });
            let mut proposed = assessment.proposed;
            proposed.last_updated = iteration;
            self.current = Some(proposed);

            debug!(
                "{} revised belief in iteration {} (strength {} >= {})",
                self.agent, iteration, evidence_strength, threshold
            );
            RevisionOutcome::Accepted {
                threshold,
                evidence_strength,
            }
        } else {
            self.current = Some(current);
            self.rejected_attempts += 1;

            debug!(
                "{} kept belief in iteration {} (strength {} < {})",
                self.agent, iteration, evidence_strength, threshold
            );
            RevisionOutcome::Rejected {
                threshold,
                evidence_strength,
            }
        }
    }

    /// Number of accepted revisions.
    pub fn revisions(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessment(strength: i32, position: &str) -> EvidenceAssessment {
        EvidenceAssessment {
            evidence_strength: strength,
            proposed: BeliefSnapshot::new(position, 6),
            reasoning: String::new(),
        }
    }

    #[test]
    fn test_threshold_formula() {
        assert_eq!(BeliefTraits::new(9, 6).acceptance_threshold(), 60);
        assert_eq!(BeliefTraits::default().acceptance_threshold(), 20);
        assert_eq!(BeliefTraits::new(1, 10).acceptance_threshold(), -40);
    }

    #[test]
    fn test_boundary_accepts() {
        let traits = BeliefTraits::new(9, 6);
        assert!(traits.should_update(60));
        assert!(!traits.should_update(59));
    }

    #[test]
    fn test_negative_threshold_accepts_everything() {
        let traits = BeliefTraits::new(1, 10);
        assert!(traits.should_update(0));
        assert!(traits.should_update(-10));
    }

    #[test]
    fn test_unreachable_threshold() {
        let traits = BeliefTraits::new(15, 0);
        assert!(!traits.should_update(100));
    }

    #[test]
    fn test_revise_accepts_and_records_history() {
        let mut ledger = BeliefLedger::new("Skeptic", BeliefTraits::new(9, 6));
        ledger.establish(BeliefSnapshot::new("Doubtful", 8), 0);

        let outcome = ledger.revise(assessment(60, "Persuaded"), 2);
        assert!(outcome.is_accepted());

        let current = ledger.current.as_ref().unwrap();
        assert_eq!(current.core_position, "Persuaded");
        assert_eq!(current.last_updated, 2);
        assert_eq!(ledger.history.len(), 1);
        assert_eq!(ledger.history[0].iteration, 2);
        assert_eq!(ledger.history[0].previous.core_position, "Doubtful");
    }

    #[test]
    fn test_revise_rejects_and_keeps_snapshot() {
        let mut ledger = BeliefLedger::new("Skeptic", BeliefTraits::new(9, 6));
        ledger.establish(BeliefSnapshot::new("Doubtful", 8), 0);

        let outcome = ledger.revise(assessment(59, "Persuaded"), 1);
        assert_eq!(
            outcome,
            RevisionOutcome::Rejected {
                threshold: 60,
                evidence_strength: 59
            }
        );
        assert_eq!(ledger.current.as_ref().unwrap().core_position, "Doubtful");
        assert!(ledger.history.is_empty());
        assert_eq!(ledger.rejected_attempts, 1);
    }

    #[test]
    fn test_revise_without_belief() {
        let mut ledger = BeliefLedger::new("Critic", BeliefTraits::default());
        assert_eq!(
            ledger.revise(assessment(100, "Anything"), 1),
            RevisionOutcome::NoBelief
        );
        assert!(ledger.current.is_none());
    }

    #[test]
    fn test_snapshot_validation() {
        assert!(BeliefSnapshot::new("Position", 5).validate().is_ok());
        assert!(BeliefSnapshot::new("Position", 0).validate().is_err());
        assert!(BeliefSnapshot::new("Position", 11).validate().is_err());
        assert!(BeliefSnapshot::new("  ", 5).validate().is_err());
    }
}
