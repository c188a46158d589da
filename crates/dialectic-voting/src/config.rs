//! Voting configuration: the scoring table and consensus bounds.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::VotingError;
use crate::Result;

/// Hard upper bound on debate length.
pub const MAX_ITERATIONS_CAP: u32 = 50;

/// Mapping from 1-based rank position to the points that rank earns.
///
/// Always valid once constructed: keys cover `1..=K` without gaps and
/// every value is positive. Ranks beyond `K` earn nothing.
///
/// Serialized as a string-keyed map (`{"1": 4, "2": 3}`) so the same
/// schema reads from both JSON and TOML.
///
/// # Example
///
/// ```rust
/// use dialectic_voting::ScoringTable;
///
/// let table = ScoringTable::from_points(vec![4, 3, 2, 1]).unwrap();
/// assert_eq!(table.points_for(1), 4);
/// assert_eq!(table.points_for(5), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, u32>", into = "BTreeMap<String, u32>")]
pub struct ScoringTable {
    /// `points[r - 1]` is the value of rank `r`.
    points: Vec<u32>,
}

impl ScoringTable {
    /// Builds a table from an explicit rank → points map.
    ///
    /// # Errors
    ///
    /// Returns [`VotingError::InvalidScoring`] if the map is empty, its
    /// keys are not exactly `1..=K`, or any value is zero.
    pub fn new(table: BTreeMap<u32, u32>) -> Result<Self> {
        if table.is_empty() {
            return Err(VotingError::InvalidScoring(
                "scoring table cannot be empty".to_string(),
            ));
        }

        let mut points = Vec::with_capacity(table.len());
        for (expected, (rank, value)) in (1u32..).zip(table) {
            if rank != expected {
                return Err(VotingError::InvalidScoring(format!(
                    "ranks must be sequential from 1, found {} where {} was expected",
                    rank, expected
                )));
            }
            points.push(value);
        }

        Self::from_points(points)
    }

    /// Builds a table from points listed in rank order (rank 1 first).
    pub fn from_points(points: Vec<u32>) -> Result<Self> {
        if points.is_empty() {
            return Err(VotingError::InvalidScoring(
                "scoring table cannot be empty".to_string(),
            ));
        }
        if let Some(rank) = points.iter().position(|&p| p == 0) {
            return Err(VotingError::InvalidScoring(format!(
                "points for rank {} must be positive",
                rank + 1
            )));
        }
        Ok(Self { points })
    }

    /// Points awarded for a 1-based rank; zero for unscored ranks.
    pub fn points_for(&self, rank: usize) -> u32 {
        if rank == 0 {
            return 0;
        }
        self.points.get(rank - 1).copied().unwrap_or(0)
    }

    /// Points awarded for first place.
    pub fn top_points(&self) -> u32 {
        self.points[0]
    }

    /// Number of scored ranks (`K`).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; a valid table has at least one rank.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates `(rank, points)` pairs in rank order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.points.iter().enumerate().map(|(i, &p)| (i + 1, p))
    }
}

impl Default for ScoringTable {
    fn default() -> Self {
        Self {
            points: vec![4, 3, 2, 1],
        }
    }
}

impl TryFrom<BTreeMap<String, u32>> for ScoringTable {
    type Error = VotingError;

    fn try_from(raw: BTreeMap<String, u32>) -> Result<Self> {
        let mut table = BTreeMap::new();
        for (key, points) in raw {
            let rank: u32 = key.trim().parse().map_err(|_| {
                VotingError::InvalidScoring(format!("rank '{}' is not a positive integer", key))
            })?;
            table.insert(rank, points);
        }
        Self::new(table)
    }
}

impl From<ScoringTable> for BTreeMap<String, u32> {
    fn from(table: ScoringTable) -> Self {
        table
            .iter()
            .map(|(rank, points)| (rank.to_string(), points))
            .collect()
    }
}

impl fmt::Display for ScoringTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(rank, points)| format!("#{}={}pts", rank, points))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Configuration for the voting system.
///
/// Defaults: 75% threshold, `{1:4, 2:3, 3:2, 4:1}` scoring, voting from
/// iteration 2 (the third round), at most 10 iterations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VotingConfig {
    /// Fraction of the maximum achievable score needed for consensus.
    pub consensus_threshold: f64,

    /// Rank position to points mapping.
    pub scoring: ScoringTable,

    /// First iteration (0-indexed) in which votes are collected.
    pub voting_start_iteration: u32,

    /// Hard cap on the number of iterations.
    pub max_iterations: u32,
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            consensus_threshold: 0.75,
            scoring: ScoringTable::default(),
            voting_start_iteration: 2,
            max_iterations: 10,
        }
    }
}

impl VotingConfig {
    /// Sets the consensus threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.consensus_threshold = threshold;
        self
    }

    /// Sets the scoring table.
    #[must_use]
    pub fn with_scoring(mut self, scoring: ScoringTable) -> Self {
        self.scoring = scoring;
        self
    }

    /// Sets the first voting iteration.
    #[must_use]
    pub fn with_voting_start(mut self, iteration: u32) -> Self {
        self.voting_start_iteration = iteration;
        self
    }

    /// Sets the iteration cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Checks threshold range and iteration bounds.
    ///
    /// # Errors
    ///
    /// - [`VotingError::InvalidThreshold`] if the threshold is outside `[0, 1]` or NaN
    /// - [`VotingError::InvalidIterations`] if `max_iterations` is outside
    ///   `1..=MAX_ITERATIONS_CAP` or below `voting_start_iteration`
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.consensus_threshold) {
            return Err(VotingError::InvalidThreshold(self.consensus_threshold));
        }
        if self.max_iterations == 0 || self.max_iterations > MAX_ITERATIONS_CAP {
            return Err(VotingError::InvalidIterations(format!(
                "max_iterations must be between 1 and {}, got {}",
                MAX_ITERATIONS_CAP, self.max_iterations
            )));
        }
        if self.voting_start_iteration > self.max_iterations {
            return Err(VotingError::InvalidIterations(format!(
                "voting_start_iteration ({}) cannot exceed max_iterations ({})",
                self.voting_start_iteration, self.max_iterations
            )));
        }
        Ok(())
    }

    /// Validates the configuration against a concrete roster size.
    pub fn validate_for(&self, participants: usize) -> Result<()> {
        self.validate()?;
        if self.scoring.len() > participants {
            return Err(VotingError::ScoringExceedsParticipants {
                ranks: self.scoring.len(),
                participants,
            });
        }
        if self.checked_max_score(participants).is_none() {
            return Err(VotingError::InvalidScoring(format!(
                "{} participants × {} points overflows the score range",
                participants,
                self.scoring.top_points()
            )));
        }
        Ok(())
    }

    fn checked_max_score(&self, participant_count: usize) -> Option<u32> {
        u32::try_from(participant_count)
            .ok()?
            .checked_mul(self.scoring.top_points())
    }

    /// Maximum achievable score: every participant ranks the same agent first.
    ///
    /// Saturates at `u32::MAX`; [`validate_for`](Self::validate_for)
    /// rejects rosters where that would happen.
    pub fn max_score(&self, participant_count: usize) -> u32 {
        self.checked_max_score(participant_count)
            .unwrap_or(u32::MAX)
    }

    /// Score the top agent must reach for consensus.
    pub fn threshold_score(&self, participant_count: usize) -> f64 {
        f64::from(self.max_score(participant_count)) * self.consensus_threshold
    }
}
