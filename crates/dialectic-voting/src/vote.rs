//! Ranked votes and the collaborator response they are built from.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::VoteError;

/// Reasoning attached to votes substituted after a failed or malformed response.
pub const FALLBACK_REASONING: &str = "Vote could not be obtained; default participant order used";

/// A single ranked vote from one participant.
///
/// Rankings are ordered best → worst. A ranking need not list every
/// participant; omitted participants simply earn nothing from this voter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Name of the voter.
    pub voter: String,
    /// Participants ordered from best to worst.
    pub rankings: Vec<String>,
    /// Free-text explanation; may be empty.
    pub reasoning: String,
    /// Iteration the vote was cast in.
    pub iteration: u32,
    /// True when the orchestrator substituted this vote.
    #[serde(default)]
    pub fallback: bool,
}

impl Vote {
    /// Creates a new vote.
    pub fn new(
        voter: impl Into<String>,
        rankings: Vec<String>,
        reasoning: impl Into<String>,
        iteration: u32,
    ) -> Self {
        Self {
            voter: voter.into(),
            rankings,
            reasoning: reasoning.into(),
            iteration,
            fallback: false,
        }
    }

    /// Creates a fallback vote ranking participants in their default order.
    ///
    /// `detail` is appended to the standard placeholder so the record
    /// shows why the substitution happened.
    pub fn fallback(
        voter: impl Into<String>,
        participants: &[String],
        detail: &str,
        iteration: u32,
    ) -> Self {
        let reasoning = if detail.is_empty() {
            FALLBACK_REASONING.to_string()
        } else {
            format!("{} ({})", FALLBACK_REASONING, detail)
        };
        Self {
            voter: voter.into(),
            rankings: participants.to_vec(),
            reasoning,
            iteration,
            fallback: true,
        }
    }

    /// Checks the vote against the debate roster.
    ///
    /// # Errors
    ///
    /// - [`VoteError::EmptyRankings`] if nothing was ranked
    /// - [`VoteError::UnknownParticipant`] for a name outside the roster
    /// - [`VoteError::DuplicateEntry`] if a name repeats
    /// - [`VoteError::VoterMissing`] if the voter did not rank themselves
    pub fn validate(&self, participants: &[String]) -> Result<(), VoteError> {
        if self.rankings.is_empty() {
            return Err(VoteError::EmptyRankings);
        }

        let mut seen = HashSet::with_capacity(self.rankings.len());
        for name in &self.rankings {
            if !participants.iter().any(|p| p == name) {
                return Err(VoteError::UnknownParticipant(name.clone()));
            }
            if !seen.insert(name.as_str()) {
                return Err(VoteError::DuplicateEntry(name.clone()));
            }
        }

        if !seen.contains(self.voter.as_str()) {
            return Err(VoteError::VoterMissing(self.voter.clone()));
        }

        Ok(())
    }

    /// 1-based position of `participant` in this ranking.
    pub fn rank_of(&self, participant: &str) -> Option<usize> {
        self.rankings
            .iter()
            .position(|p| p == participant)
            .map(|i| i + 1)
    }
}

/// The structured answer a collaborator gives when asked to vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResponse {
    /// Participants ordered from best to worst.
    pub rankings: Vec<String>,
    /// Explanation for the ranking.
    #[serde(default)]
    pub reasoning: String,
}

fn json_object_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("static regex is valid"))
}

impl VoteResponse {
    /// Creates a response.
    pub fn new(rankings: Vec<String>, reasoning: impl Into<String>) -> Self {
        Self {
            rankings,
            reasoning: reasoning.into(),
        }
    }

    /// Extracts a vote from free-form model output.
    ///
    /// Models often wrap the requested JSON in prose or code fences, so the
    /// outermost `{ ... }` span is located first and then decoded.
    ///
    /// # Errors
    ///
    /// Returns [`VoteError::Unparseable`] if no object is present or it
    /// does not match the `{"rankings": [...], "reasoning": "..."}` shape.
    pub fn parse(raw: &str) -> Result<Self, VoteError> {
        let span = json_object_pattern()
            .find(raw)
            .ok_or_else(|| VoteError::Unparseable("no JSON object in response".to_string()))?;

        serde_json::from_str(span.as_str()).map_err(|e| VoteError::Unparseable(e.to_string()))
    }

    /// Turns the response into a vote for `voter` in `iteration`.
    pub fn into_vote(self, voter: impl Into<String>, iteration: u32) -> Vote {
        Vote::new(voter, self.rankings, self.reasoning, iteration)
    }
}
