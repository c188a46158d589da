//! Collaborator interfaces and scripted implementations.
//!
//! The orchestrator never produces text itself. Arguments, votes, belief
//! assessments and verdicts come from collaborators behind the traits in
//! this module; provider integrations implement them, and the scripted
//! versions drive the demo and the tests.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use dialectic_voting::{RoundSummary, VoteResponse};

use crate::belief::{BeliefSnapshot, BeliefTraits, EvidenceAssessment};
use crate::error::{AgentError, PersistError};
use crate::model::{Argument, ArgumentKind, DebateState, IterationRecord};

/// Everything a debater sees when asked for an argument.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentRequest {
    /// The debate question.
    pub question: String,
    /// Round being played.
    pub iteration: u32,
    /// Rhetorical role expected.
    pub kind: ArgumentKind,
    /// Prior rounds plus this round's earlier speakers; empty in round zero.
    pub context: String,
    /// Arguments already given this round, in speaking order.
    pub current_round: Vec<Argument>,
    /// The speaker's current private belief, when tracked.
    pub belief: Option<BeliefSnapshot>,
}

/// A debate participant.
#[async_trait]
pub trait Debater: Send + Sync {
    /// Unique display name.
    fn name(&self) -> &str;

    /// Belief revision parameters.
    fn belief_traits(&self) -> BeliefTraits {
        BeliefTraits::default()
    }

    /// Produces this round's argument.
    async fn generate_argument(&self, request: &ArgumentRequest) -> Result<String, AgentError>;

    /// Ranks all participants, best first, after round `iteration`.
    async fn generate_vote(
        &self,
        participants: &[String],
        context: &str,
        iteration: u32,
    ) -> Result<VoteResponse, AgentError>;

    /// Forms an initial private belief.
    async fn generate_belief(&self, _question: &str) -> Result<BeliefSnapshot, AgentError> {
        Err(AgentError::Unsupported("generate_belief"))
    }

    /// Rates new arguments against the current belief.
    async fn assess_evidence(
        &self,
        _current: &BeliefSnapshot,
        _new_arguments: &[Argument],
    ) -> Result<EvidenceAssessment, AgentError> {
        Err(AgentError::Unsupported("assess_evidence"))
    }
}

/// Produces the closing verdict.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Reviews the whole debate.
    async fn generate_verdict(
        &self,
        question: &str,
        history: &[IterationRecord],
        final_votes: Option<&RoundSummary>,
    ) -> Result<String, AgentError>;
}

/// Stores debate snapshots. Failures never affect the debate.
pub trait Persister: Send + Sync {
    /// Saves a snapshot of the debate.
    fn persist(&self, state: &DebateState) -> Result<(), PersistError>;
}

/// Scripted vote behavior for one iteration.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedVote {
    /// Rank self first, then everyone else in roster order.
    SelfFirst,
    /// Return this ranking.
    Ranking(Vec<String>),
    /// Return raw text that is run through [`VoteResponse::parse`].
    Raw(String),
    /// Fail with [`AgentError::Failed`].
    Fail(String),
}

/// A deterministic debater with canned output.
///
/// Arguments are taken from the script by iteration (the last line
/// repeats once the script runs out). Votes default to ranking self
/// first; per-iteration overrides can return a fixed ranking, raw model
/// output, or a failure. Optional delays simulate slow providers.
///
/// # Example
///
/// ```rust
/// use dialectic_core::{ScriptedDebater, ScriptedVote};
///
/// let skeptic = ScriptedDebater::new("Skeptic")
///     .with_arguments(["Show me the data.", "The data is thin."])
///     .with_vote(2, ScriptedVote::Ranking(vec!["Skeptic".into(), "Optimist".into()]));
/// ```
#[derive(Debug)]
pub struct ScriptedDebater {
    name: String,
    traits: BeliefTraits,
    arguments: Vec<String>,
    failing_arguments: Vec<u32>,
    votes: BTreeMap<u32, ScriptedVote>,
    default_vote: ScriptedVote,
    belief: Option<BeliefSnapshot>,
    assessments: BTreeMap<u32, EvidenceAssessment>,
    argument_delay: Option<Duration>,
    vote_delay: Option<Duration>,
    requests: Mutex<Vec<ArgumentRequest>>,
}

impl ScriptedDebater {
    /// Creates a debater that says the same generic line every round.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            traits: BeliefTraits::default(),
            arguments: Vec::new(),
            failing_arguments: Vec::new(),
            votes: BTreeMap::new(),
            default_vote: ScriptedVote::SelfFirst,
            belief: None,
            assessments: BTreeMap::new(),
            argument_delay: None,
            vote_delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Sets the per-round argument script.
    #[must_use]
    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    /// Makes argument generation fail in the given iteration.
    #[must_use]
    pub fn failing_argument_at(mut self, iteration: u32) -> Self {
        self.failing_arguments.push(iteration);
        self
    }

    /// Overrides the vote for one iteration.
    #[must_use]
    pub fn with_vote(mut self, iteration: u32, vote: ScriptedVote) -> Self {
        self.votes.insert(iteration, vote);
        self
    }

    /// Sets the vote used when no per-iteration override exists.
    #[must_use]
    pub fn with_default_vote(mut self, vote: ScriptedVote) -> Self {
        self.default_vote = vote;
        self
    }

    /// Sets belief revision traits.
    #[must_use]
    pub fn with_traits(mut self, traits: BeliefTraits) -> Self {
        self.traits = traits;
        self
    }

    /// Enables belief generation with this initial snapshot.
    #[must_use]
    pub fn with_belief(mut self, belief: BeliefSnapshot) -> Self {
        self.belief = Some(belief);
        self
    }

    /// Sets the evidence assessment returned after `iteration`.
    #[must_use]
    pub fn with_assessment(mut self, iteration: u32, assessment: EvidenceAssessment) -> Self {
        self.assessments.insert(iteration, assessment);
        self
    }

    /// Delays every argument by `delay`.
    #[must_use]
    pub fn with_argument_delay(mut self, delay: Duration) -> Self {
        self.argument_delay = Some(delay);
        self
    }

    /// Delays every vote by `delay`.
    #[must_use]
    pub fn with_vote_delay(mut self, delay: Duration) -> Self {
        self.vote_delay = Some(delay);
        self
    }

    /// Argument requests received so far.
    pub fn requests(&self) -> Vec<ArgumentRequest> {
        self.requests
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }

    fn script_line(&self, iteration: u32) -> String {
        match self.arguments.get(iteration as usize).or(self.arguments.last()) {
            Some(line) => line.clone(),
            None => format!("{} holds their position in round {}.", self.name, iteration + 1),
        }
    }
}

#[async_trait]
impl Debater for ScriptedDebater {
    fn name(&self) -> &str {
        &self.name
    }

    fn belief_traits(&self) -> BeliefTraits {
        self.traits
    }

    async fn generate_argument(&self, request: &ArgumentRequest) -> Result<String, AgentError> {
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request.clone());
        }
        if let Some(delay) = self.argument_delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_arguments.contains(&request.iteration) {
            return Err(AgentError::Failed(format!(
                "{} has nothing to say",
                self.name
            )));
        }
        Ok(self.script_line(request.iteration))
    }

    async fn generate_vote(
        &self,
        participants: &[String],
        _context: &str,
        iteration: u32,
    ) -> Result<VoteResponse, AgentError> {
        if let Some(delay) = self.vote_delay {
            tokio::time::sleep(delay).await;
        }

        let script = self.votes.get(&iteration).unwrap_or(&self.default_vote);

        match script {
            ScriptedVote::SelfFirst => {
                let mut rankings = vec![self.name.clone()];
                rankings.extend(participants.iter().filter(|p| **p != self.name).cloned());
                Ok(VoteResponse::new(rankings, format!("{} trusts their own case", self.name)))
            }
            ScriptedVote::Ranking(rankings) => Ok(VoteResponse::new(
                rankings.clone(),
                format!("{} ranked on the merits", self.name),
            )),
            ScriptedVote::Raw(raw) => Ok(VoteResponse::parse(raw)?),
            ScriptedVote::Fail(reason) => Err(AgentError::Failed(reason.clone())),
        }
    }

    async fn generate_belief(&self, _question: &str) -> Result<BeliefSnapshot, AgentError> {
        self.belief
            .clone()
            .ok_or(AgentError::Unsupported("generate_belief"))
    }

    async fn assess_evidence(
        &self,
        _current: &BeliefSnapshot,
        new_arguments: &[Argument],
    ) -> Result<EvidenceAssessment, AgentError> {
        let iteration = new_arguments.first().map(|a| a.iteration).unwrap_or(0);
        self.assessments
            .get(&iteration)
            .cloned()
            .ok_or_else(|| AgentError::Failed(format!("no assessment for round {}", iteration)))
    }
}

/// A judge that returns a fixed verdict, or a summary of the final vote.
#[derive(Debug, Clone, Default)]
pub struct ScriptedJudge {
    verdict: Option<String>,
    fail: bool,
}

impl ScriptedJudge {
    /// Creates a judge that summarizes the final vote.
    pub fn new() -> Self {
        Self::default()
    }

    /// Always returns `verdict`.
    #[must_use]
    pub fn with_verdict(mut self, verdict: impl Into<String>) -> Self {
        self.verdict = Some(verdict.into());
        self
    }

    /// Creates a judge whose every call fails.
    pub fn failing() -> Self {
        Self {
            verdict: None,
            fail: true,
        }
    }
}

#[async_trait]
impl Judge for ScriptedJudge {
    async fn generate_verdict(
        &self,
        question: &str,
        history: &[IterationRecord],
        final_votes: Option<&RoundSummary>,
    ) -> Result<String, AgentError> {
        if self.fail {
            return Err(AgentError::Failed("judge unavailable".to_string()));
        }
        if let Some(verdict) = &self.verdict {
            return Ok(verdict.clone());
        }

        let verdict = match final_votes {
            Some(summary) => match summary.winner() {
                Some(winner) => format!(
                    "After {} rounds on \"{}\", the participants converged on {} ({} of {} points).",
                    history.len(),
                    question,
                    winner,
                    summary.consensus.top_score,
                    summary.consensus.max_score
                ),
                None => format!(
                    "After {} rounds on \"{}\", no position earned consensus; {} led with {} of {} points.",
                    history.len(),
                    question,
                    summary.consensus.leader.as_deref().unwrap_or("nobody"),
                    summary.consensus.top_score,
                    summary.consensus.max_score
                ),
            },
            None => format!(
                "After {} rounds on \"{}\", the question remains open.",
                history.len(),
                question
            ),
        };
        Ok(verdict)
    }
}
