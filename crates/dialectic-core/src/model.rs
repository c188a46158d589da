//! Debate data model.
//!
//! [`DebateState`] is the authoritative record of a debate and the schema
//! every persistence format round-trips. Iteration records are appended
//! whole; the only later change is attaching a consensus winner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dialectic_voting::{validate_roster, Vote};

use crate::config::DebateConfig;
use crate::error::DebateError;
use crate::Result;

/// Longest generated title before truncation.
pub const TITLE_MAX_CHARS: usize = 50;

/// Rhetorical role of an argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentKind {
    /// First statement of a position.
    Opening,
    /// Response to earlier arguments.
    Rebuttal,
    /// Final statement.
    Closing,
    /// Anything else.
    #[default]
    General,
}

impl ArgumentKind {
    /// Role for an argument in `iteration` of a debate limited to `round_limit` rounds.
    pub fn for_iteration(iteration: u32, round_limit: u32) -> Self {
        if iteration == 0 {
            Self::Opening
        } else if iteration + 1 >= round_limit {
            Self::Closing
        } else {
            Self::Rebuttal
        }
    }
}

/// One agent's contribution to one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    /// Who spoke.
    pub speaker: String,
    /// What they said.
    pub content: String,
    /// Round the argument belongs to.
    pub iteration: u32,
    /// Rhetorical role.
    #[serde(default)]
    pub kind: ArgumentKind,
    /// Set when the orchestrator substituted the text after a failure.
    #[serde(default)]
    pub placeholder: bool,
}

impl Argument {
    /// Creates an argument.
    pub fn new(
        speaker: impl Into<String>,
        content: impl Into<String>,
        iteration: u32,
        kind: ArgumentKind,
    ) -> Self {
        Self {
            speaker: speaker.into(),
            content: content.into(),
            iteration,
            kind,
            placeholder: false,
        }
    }

    /// Creates a visible placeholder for an argument that could not be generated.
    pub fn placeholder(
        speaker: impl Into<String>,
        iteration: u32,
        kind: ArgumentKind,
        reason: &str,
    ) -> Self {
        Self {
            speaker: speaker.into(),
            content: format!("[No argument: {}]", reason),
            iteration,
            kind,
            placeholder: true,
        }
    }
}

/// Everything recorded for one completed round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// Round index, starting at zero.
    pub iteration: u32,
    /// Arguments in speaking order, one per participant.
    pub arguments: Vec<Argument>,
    /// Votes cast this round, if voting ran.
    #[serde(default)]
    pub votes: Option<Vec<Vote>>,
    /// Whether this round reached consensus.
    #[serde(default)]
    pub consensus_reached: bool,
    /// Winner, present iff consensus was reached.
    #[serde(default)]
    pub winner: Option<String>,
    /// When the round finished.
    pub completed_at: DateTime<Utc>,
}

impl IterationRecord {
    /// Creates a record for a round whose arguments are complete.
    pub fn new(iteration: u32, arguments: Vec<Argument>) -> Self {
        Self {
            iteration,
            arguments,
            votes: None,
            consensus_reached: false,
            winner: None,
            completed_at: Utc::now(),
        }
    }

    /// Attaches the round's votes.
    #[must_use]
    pub fn with_votes(mut self, votes: Vec<Vote>) -> Self {
        self.votes = Some(votes);
        self
    }

    /// Marks the round as having reached consensus.
    pub fn set_winner(&mut self, winner: impl Into<String>) {
        self.consensus_reached = true;
        self.winner = Some(winner.into());
    }

    /// Argument by `speaker`, if present.
    pub fn argument_by(&self, speaker: &str) -> Option<&Argument> {
        self.arguments.iter().find(|a| a.speaker == speaker)
    }
}

/// The complete record of one debate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateState {
    /// Unique identifier.
    pub id: Uuid,
    /// The question under debate.
    pub question: String,
    /// Optional display title.
    #[serde(default)]
    pub title: Option<String>,
    /// Participants in speaking order.
    pub participants: Vec<String>,
    /// Completed rounds, oldest first.
    pub iterations: Vec<IterationRecord>,
    /// Configuration the debate ran with.
    pub config: DebateConfig,
    /// When the debate started.
    pub started_at: DateTime<Utc>,
    /// When the debate was finalized.
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    /// The judge's verdict.
    #[serde(default)]
    pub verdict: Option<String>,
}

impl DebateState {
    /// Starts a new, empty debate record.
    ///
    /// # Errors
    ///
    /// - [`DebateError::InvalidState`] for a blank question
    /// - [`DebateError::Voting`] for a roster with fewer than two or duplicate names
    pub fn new(
        question: impl Into<String>,
        participants: Vec<String>,
        config: DebateConfig,
    ) -> Result<Self> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(DebateError::InvalidState(
                "question cannot be empty".to_string(),
            ));
        }
        validate_roster(&participants)?;

        Ok(Self {
            id: Uuid::new_v4(),
            question,
            title: None,
            participants,
            iterations: Vec::new(),
            config,
            started_at: Utc::now(),
            ended_at: None,
            verdict: None,
        })
    }

    /// Sets the display title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Title for display and file naming.
    ///
    /// Falls back to the question without question marks, cut to
    /// [`TITLE_MAX_CHARS`] characters.
    pub fn display_title(&self) -> String {
        if let Some(title) = self.title.as_deref().filter(|t| !t.trim().is_empty()) {
            return title.to_string();
        }

        let base = self.question.replace('?', "");
        let base = base.trim();
        if base.chars().count() > TITLE_MAX_CHARS {
            let cut: String = base.chars().take(TITLE_MAX_CHARS - 3).collect();
            format!("{}...", cut)
        } else {
            base.to_string()
        }
    }

    /// Appends a completed round.
    ///
    /// # Errors
    ///
    /// Returns [`DebateError::InvalidState`] if the round is out of order,
    /// the debate is already finalized, or the record is inconsistent with
    /// the roster.
    pub fn push_iteration(&mut self, record: IterationRecord) -> Result<()> {
        if self.is_finalized() {
            return Err(DebateError::InvalidState(
                "cannot add rounds to a finalized debate".to_string(),
            ));
        }
        if let Some(last) = self.iterations.last() {
            if record.iteration <= last.iteration {
                return Err(DebateError::InvalidState(format!(
                    "round {} cannot follow round {}",
                    record.iteration, last.iteration
                )));
            }
        }
        self.check_record(&record)?;
        self.iterations.push(record);
        Ok(())
    }

    /// Closes the debate, attaching the verdict if one was produced.
    pub fn finalize(&mut self, verdict: Option<String>) {
        self.verdict = verdict;
        self.ended_at = Some(Utc::now());
    }

    /// Whether [`finalize`](Self::finalize) has run.
    pub fn is_finalized(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Record for a given iteration number.
    pub fn iteration(&self, iteration: u32) -> Option<&IterationRecord> {
        self.iterations.iter().find(|r| r.iteration == iteration)
    }

    /// Most recent completed round.
    pub fn latest(&self) -> Option<&IterationRecord> {
        self.iterations.last()
    }

    /// Number of completed rounds.
    pub fn rounds_completed(&self) -> usize {
        self.iterations.len()
    }

    /// Winner of the round that reached consensus, if any.
    pub fn winner(&self) -> Option<&str> {
        self.iterations
            .iter()
            .rev()
            .find_map(|r| r.winner.as_deref())
    }

    /// Checks every model invariant. Used after loading from storage.
    pub fn validate(&self) -> Result<()> {
        if self.question.trim().is_empty() {
            return Err(DebateError::InvalidState(
                "question cannot be empty".to_string(),
            ));
        }
        validate_roster(&self.participants)?;

        let mut previous: Option<u32> = None;
        for record in &self.iterations {
            if previous.is_some_and(|p| record.iteration <= p) {
                return Err(DebateError::InvalidState(format!(
                    "round {} is out of order",
                    record.iteration
                )));
            }
            self.check_record(record)?;
            previous = Some(record.iteration);
        }
        Ok(())
    }

    fn check_record(&self, record: &IterationRecord) -> Result<()> {
        for argument in &record.arguments {
            if !self.participants.contains(&argument.speaker) {
                return Err(DebateError::InvalidState(format!(
                    "'{}' spoke in round {} but is not a participant",
                    argument.speaker, record.iteration
                )));
            }
            if argument.iteration != record.iteration {
                return Err(DebateError::InvalidState(format!(
                    "argument by '{}' belongs to round {}, not {}",
                    argument.speaker, argument.iteration, record.iteration
                )));
            }
            if argument.content.trim().is_empty() {
                return Err(DebateError::InvalidState(format!(
                    "argument by '{}' in round {} is empty",
                    argument.speaker, record.iteration
                )));
            }
        }

        if record.consensus_reached != record.winner.is_some() {
            return Err(DebateError::InvalidState(format!(
                "round {} has inconsistent consensus and winner",
                record.iteration
            )));
        }

        if let Some(votes) = &record.votes {
            for vote in votes {
                if vote.iteration != record.iteration {
                    return Err(DebateError::InvalidState(format!(
                        "vote by '{}' belongs to round {}, not {}",
                        vote.voter, vote.iteration, record.iteration
                    )));
                }
                vote.validate(&self.participants).map_err(|e| {
                    DebateError::InvalidState(format!(
                        "vote by '{}' in round {}: {}",
                        vote.voter, record.iteration, e
                    ))
                })?;
            }
        }
        Ok(())
    }

    /// Plain-text history of the debate so far, oldest round first.
    ///
    /// `current` holds arguments already produced in a round that is still
    /// in progress; they are appended after the completed rounds.
    pub fn transcript(&self, current: &[Argument]) -> String {
        let mut out = String::new();
        for record in &self.iterations {
            out.push_str(&format!("=== Round {} ===\n", record.iteration + 1));
            for argument in &record.arguments {
                out.push_str(&format!("{}: {}\n\n", argument.speaker, argument.content));
            }
        }
        if !current.is_empty() {
            let round = current[0].iteration + 1;
            out.push_str(&format!("=== Round {} (in progress) ===\n", round));
            for argument in current {
                out.push_str(&format!("{}: {}\n\n", argument.speaker, argument.content));
            }
        }
        out
    }
}
