//! Consensus detection over a round's score map.
//!
//! Consensus is reached when the top scorer's total meets or exceeds
//! `threshold × max_score`, where `max_score = participants × points[1]`
//! is the total an agent earns when every voter ranks it first.
//!
//! # Tie-break
//!
//! When several agents share the top score, the winner is the first of
//! them in roster (speaking) order. The roster order is part of the
//! configuration, so the outcome is deterministic and reproducible from a
//! saved debate.

use serde::{Deserialize, Serialize};

use crate::scoring::ScoreMap;

/// Outcome of a consensus check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusOutcome {
    /// Whether the top score met the threshold.
    pub reached: bool,
    /// Winning participant, set iff `reached`.
    pub winner: Option<String>,
    /// Highest score observed (after tie-break, the leader's score).
    pub top_score: u32,
    /// Leading participant regardless of whether consensus was reached.
    pub leader: Option<String>,
    /// Score required for consensus.
    pub threshold_score: f64,
    /// Maximum achievable score.
    pub max_score: u32,
}

impl ConsensusOutcome {
    /// Points the leader still needs; zero once consensus is reached.
    pub fn shortfall(&self) -> f64 {
        if self.reached {
            return 0.0;
        }
        (self.threshold_score - f64::from(self.top_score)).max(0.0)
    }

    /// Top score as a fraction of the maximum.
    pub fn top_ratio(&self) -> f64 {
        if self.max_score == 0 {
            0.0
        } else {
            f64::from(self.top_score) / f64::from(self.max_score)
        }
    }
}

/// Stateless consensus evaluator.
///
/// # Example
///
/// ```rust
/// use dialectic_voting::{ConsensusEvaluator, ScoreMap};
///
/// let evaluator = ConsensusEvaluator::new(0.75, 16);
/// let roster = vec!["A".to_string(), "B".to_string()];
/// let scores = ScoreMap::from([("A".to_string(), 12)]);
///
/// let outcome = evaluator.evaluate(&scores, &roster);
/// assert!(outcome.reached);
/// assert_eq!(outcome.winner.as_deref(), Some("A"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsensusEvaluator {
    threshold: f64,
    max_score: u32,
}

impl ConsensusEvaluator {
    /// Creates an evaluator for a given threshold fraction and maximum score.
    pub fn new(threshold: f64, max_score: u32) -> Self {
        Self {
            threshold,
            max_score,
        }
    }

    /// Score required for consensus.
    pub fn threshold_score(&self) -> f64 {
        f64::from(self.max_score) * self.threshold
    }

    fn ratio(&self, score: u32) -> f64 {
        f64::from(score) / f64::from(self.max_score)
    }

    /// Evaluates a score map.
    ///
    /// Candidates are visited in roster order, then any scored names
    /// outside the roster in name order; the first strictly greater
    /// score takes the lead. An empty map, or one whose best score is
    /// zero, never yields consensus.
    pub fn evaluate(&self, scores: &ScoreMap, roster: &[String]) -> ConsensusOutcome {
        let candidates = roster
            .iter()
            .filter_map(|name| scores.get(name).map(|s| (name, *s)))
            .chain(
                scores
                    .iter()
                    .filter(|(name, _)| !roster.contains(name))
                    .map(|(name, s)| (name, *s)),
            );

        let mut leader: Option<(&String, u32)> = None;
        for (name, score) in candidates {
            match leader {
                Some((_, best)) if score <= best => {}
                _ => leader = Some((name, score)),
            }
        }

        let threshold_score = self.threshold_score();
        let (leader, top_score) = match leader {
            Some((name, score)) => (Some(name.clone()), score),
            None => (None, 0),
        };

        // Compare ratios: `top / max` and the threshold round from the same
        // rational at the boundary, where `max × threshold` may round up.
        let reached =
            top_score > 0 && self.max_score > 0 && self.ratio(top_score) >= self.threshold;

        ConsensusOutcome {
            reached,
            winner: if reached { leader.clone() } else { None },
            top_score,
            leader,
            threshold_score,
            max_score: self.max_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn scores(entries: &[(&str, u32)]) -> ScoreMap {
        entries.iter().map(|(n, s)| (n.to_string(), *s)).collect()
    }

    #[test]
    fn test_empty_scores_no_consensus() {
        let evaluator = ConsensusEvaluator::new(0.0, 16);
        let outcome = evaluator.evaluate(&ScoreMap::new(), &roster(&["A", "B"]));
        assert!(!outcome.reached);
        assert_eq!(outcome.winner, None);
        assert_eq!(outcome.leader, None);
    }

    #[test]
    fn test_unanimous_winner() {
        let evaluator = ConsensusEvaluator::new(1.0, 16);
        let outcome = evaluator.evaluate(
            &scores(&[("Fair", 16), ("Bold", 12)]),
            &roster(&["Bold", "Fair", "Calm", "Wry"]),
        );
        assert!(outcome.reached);
        assert_eq!(outcome.winner.as_deref(), Some("Fair"));
        assert!((outcome.top_ratio() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_below_threshold() {
        // 11 / 16 = 68.75% < 75%
        let evaluator = ConsensusEvaluator::new(0.75, 16);
        let outcome = evaluator.evaluate(&scores(&[("A", 11), ("B", 9)]), &roster(&["A", "B"]));
        assert!(!outcome.reached);
        assert_eq!(outcome.winner, None);
        assert_eq!(outcome.leader.as_deref(), Some("A"));
        assert!((outcome.shortfall() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_boundary_counts_as_reached() {
        let evaluator = ConsensusEvaluator::new(0.75, 16);
        let outcome = evaluator.evaluate(&scores(&[("A", 12)]), &roster(&["A", "B"]));
        assert!(outcome.reached);
        assert_eq!(outcome.shortfall(), 0.0);
    }

    #[test]
    fn test_boundary_reached_when_product_rounds_up() {
        // 25 × 0.28 evaluates to 7.000000000000001, but 7 / 25 is exactly 28%.
        let evaluator = ConsensusEvaluator::new(0.28, 25);
        assert!(evaluator.threshold_score() > 7.0);

        let outcome = evaluator.evaluate(&scores(&[("P0", 7), ("P1", 6)]), &roster(&["P0", "P1"]));
        assert!(outcome.reached);
        assert_eq!(outcome.winner.as_deref(), Some("P0"));

        let outcome = evaluator.evaluate(&scores(&[("P0", 6)]), &roster(&["P0", "P1"]));
        assert!(!outcome.reached);
    }

    #[test]
    fn test_zero_max_score_never_reached() {
        let evaluator = ConsensusEvaluator::new(0.0, 0);
        let outcome = evaluator.evaluate(&scores(&[("A", 3)]), &roster(&["A"]));
        assert!(!outcome.reached);
    }

    #[test]
    fn test_tie_goes_to_roster_order() {
        let evaluator = ConsensusEvaluator::new(0.5, 16);
        let outcome = evaluator.evaluate(
            &scores(&[("Alpha", 10), ("Zed", 10)]),
            &roster(&["Zed", "Alpha"]),
        );
        assert_eq!(outcome.winner.as_deref(), Some("Zed"));
    }

    #[test]
    fn test_zero_threshold_requires_some_points() {
        let evaluator = ConsensusEvaluator::new(0.0, 16);
        let outcome = evaluator.evaluate(&scores(&[("A", 0)]), &roster(&["A"]));
        assert!(!outcome.reached);

        let outcome = evaluator.evaluate(&scores(&[("A", 1)]), &roster(&["A"]));
        assert!(outcome.reached);
    }

    #[test]
    fn test_unlisted_names_follow_roster() {
        let evaluator = ConsensusEvaluator::new(0.5, 8);
        let outcome = evaluator.evaluate(&scores(&[("Ghost", 6), ("A", 6)]), &roster(&["A"]));
        assert_eq!(outcome.winner.as_deref(), Some("A"));
    }
}
