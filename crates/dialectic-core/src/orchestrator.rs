//! The debate state machine.
//!
//! ## Phases
//!
//! ```text
//! INIT ──▶ ROUND ──▶ BELIEF_REVISION ──▶ VOTE_COLLECTION ──▶ CONSENSUS_CHECK
//!            ▲          (optional)        (iteration ≥ start)        │
//!            └──────────────────── continue ◀────────────────────────┤
//!                                                                    ▼
//!                                  TERMINATED ◀── JUDGE_REVIEW ◀── FINALIZE
//! ```
//!
//! Classic mode plays exactly three rounds and never votes.
//!
//! ## Failure Handling
//!
//! | Failure | Effect |
//! |---------|--------|
//! | Vote missing, late or malformed | Fallback vote, round continues |
//! | Belief assessment fails | Belief kept, round continues |
//! | Argument fails | Per [`ArgumentFailurePolicy`] |
//! | Persister fails | Counted and logged |
//! | Judge fails | Verdict left empty |
//! | Cancellation | Incomplete round discarded, judge skipped |
//!
//! A round is appended to the [`DebateState`] only once every argument
//! (and every vote, when voting) is in hand.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use dialectic_voting::{validate_roster, RoundSummary, ScoreTrend, Vote, VotingSession};

use crate::agent::{ArgumentRequest, Debater, Judge, Persister};
use crate::belief::{BeliefLedger, EvidenceAssessment};
use crate::config::{ArgumentFailurePolicy, DebateConfig};
use crate::error::AgentError;
use crate::model::{Argument, ArgumentKind, DebateState, IterationRecord};
use crate::Result;

/// Where the orchestrator is in the debate lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebatePhase {
    /// Setting up state and initial beliefs.
    Init,
    /// Collecting arguments.
    Round,
    /// Asking agents to reassess their beliefs.
    BeliefRevision,
    /// Collecting votes.
    VoteCollection,
    /// Scoring and checking for consensus.
    ConsensusCheck,
    /// Closing the record.
    Finalize,
    /// Waiting for the judge.
    JudgeReview,
    /// Done.
    Terminated,
}

/// Why a debate stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// A participant reached the consensus threshold.
    Consensus {
        /// The consensus winner.
        winner: String,
    },
    /// The iteration cap was reached without consensus.
    IterationCap,
    /// All classic-mode rounds were played.
    ClassicComplete,
    /// The debate was cancelled or ran out of time.
    Cancelled,
    /// A speaker failed and the policy is to abort.
    ArgumentFailure {
        /// The speaker.
        agent: String,
        /// Round that was abandoned.
        iteration: u32,
        /// What went wrong.
        error: AgentError,
    },
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Consensus { winner } => write!(f, "consensus reached ({})", winner),
            Self::IterationCap => write!(f, "iteration cap reached"),
            Self::ClassicComplete => write!(f, "classic rounds complete"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::ArgumentFailure {
                agent,
                iteration,
                error,
            } => write!(
                f,
                "argument from {} failed in round {}: {}",
                agent,
                iteration + 1,
                error
            ),
        }
    }
}

/// Everything a finished debate produced.
#[derive(Debug, Clone)]
pub struct DebateOutcome {
    /// The finalized record.
    pub state: DebateState,
    /// Why the debate stopped.
    pub reason: TerminationReason,
    /// Summary of the last voting round, if any.
    pub final_votes: Option<RoundSummary>,
    /// Per-participant scores across voting rounds.
    pub trends: Vec<ScoreTrend>,
    /// Belief ledgers in speaking order; empty when beliefs are not tracked.
    pub beliefs: Vec<BeliefLedger>,
    /// Number of snapshots the persister failed to store.
    pub persistence_failures: u32,
}

impl DebateOutcome {
    /// Whether consensus ended the debate.
    pub fn consensus_reached(&self) -> bool {
        matches!(self.reason, TerminationReason::Consensus { .. })
    }

    /// The consensus winner, if any.
    pub fn winner(&self) -> Option<&str> {
        match &self.reason {
            TerminationReason::Consensus { winner } => Some(winner),
            _ => None,
        }
    }
}

enum RoundArguments {
    Complete(Vec<Argument>),
    Failed { agent: String, error: AgentError },
    Cancelled,
}

struct Cancelled;

/// Runs debates between a fixed roster of debaters.
///
/// The orchestrator owns the voting session and debate state for the
/// duration of [`run`](Self::run); nothing is shared between runs, so
/// separate orchestrators can debate concurrently in one process.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use dialectic_core::{DebateConfig, DebateOrchestrator, Debater, ScriptedDebater, ScriptedJudge};
///
/// # async fn demo() -> dialectic_core::Result<()> {
/// let debaters: Vec<Arc<dyn Debater>> = vec![
///     Arc::new(ScriptedDebater::new("Optimist")),
///     Arc::new(ScriptedDebater::new("Skeptic")),
/// ];
/// let config = DebateConfig::default().with_classic_mode(true);
///
/// let mut orchestrator = DebateOrchestrator::new(config, debaters)?
///     .with_judge(Arc::new(ScriptedJudge::new()));
/// let outcome = orchestrator.run("Is remote work here to stay?").await?;
/// assert_eq!(outcome.state.rounds_completed(), 3);
/// # Ok(())
/// # }
/// ```
pub struct DebateOrchestrator {
    config: DebateConfig,
    debaters: Vec<Arc<dyn Debater>>,
    participants: Vec<String>,
    judge: Option<Arc<dyn Judge>>,
    persister: Option<Arc<dyn Persister>>,
    title: Option<String>,
    cancel: CancellationToken,
    phase: DebatePhase,
}

impl DebateOrchestrator {
    /// Creates an orchestrator.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the roster has
    /// fewer than two or duplicate names, or the scoring table ranks more
    /// positions than there are debaters.
    pub fn new(config: DebateConfig, debaters: Vec<Arc<dyn Debater>>) -> Result<Self> {
        config.validate()?;

        let participants: Vec<String> = debaters.iter().map(|d| d.name().to_string()).collect();
        validate_roster(&participants)?;
        if config.voting_active() {
            config.voting.validate_for(participants.len())?;
        }

        info!(
            "Debate orchestrator ready: {} participants, up to {} rounds, voting {}",
            participants.len(),
            config.round_limit(),
            if config.voting_active() { "on" } else { "off" }
        );

        Ok(Self {
            config,
            debaters,
            participants,
            judge: None,
            persister: None,
            title: None,
            cancel: CancellationToken::new(),
            phase: DebatePhase::Init,
        })
    }

    /// Sets the judge consulted after the final round.
    #[must_use]
    pub fn with_judge(mut self, judge: Arc<dyn Judge>) -> Self {
        self.judge = Some(judge);
        self
    }

    /// Sets the persister called after each round and at the end.
    #[must_use]
    pub fn with_persister(mut self, persister: Arc<dyn Persister>) -> Self {
        self.persister = Some(persister);
        self
    }

    /// Sets the debate's display title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Uses an externally owned cancellation token.
    #[must_use]
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that aborts the debate when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current phase.
    pub fn phase(&self) -> DebatePhase {
        self.phase
    }

    /// Participants in speaking order.
    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    /// The configuration in use.
    pub fn config(&self) -> &DebateConfig {
        &self.config
    }

    /// Runs a debate on `question` to completion.
    ///
    /// Collaborator failures never surface here; they degrade as
    /// described in the module docs and are reflected in the outcome.
    ///
    /// # Errors
    ///
    /// Returns an error only for an invalid question or an internal
    /// invariant violation.
    pub async fn run(&mut self, question: &str) -> Result<DebateOutcome> {
        self.set_phase(DebatePhase::Init);

        let mut state = DebateState::new(question, self.participants.clone(), self.config.clone())?;
        if let Some(title) = &self.title {
            state.title = Some(title.clone());
        }

        let mut session = if self.config.voting_active() {
            Some(VotingSession::new(
                self.config.voting.clone(),
                self.participants.clone(),
            )?)
        } else {
            None
        };

        let mut ledgers: Vec<BeliefLedger> = self
            .debaters
            .iter()
            .map(|d| BeliefLedger::new(d.name(), d.belief_traits()))
            .collect();

        let token = self.cancel.child_token();
        let timer = self.config.max_duration().map(|budget| {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(budget).await;
                warn!("Debate time budget of {}s exhausted", budget.as_secs());
                token.cancel();
            })
        });

        info!(
            "Debate {} started: \"{}\" with {}",
            state.id,
            state.question,
            self.participants.join(", ")
        );

        let mut persistence_failures = 0u32;
        let mut final_votes: Option<RoundSummary> = None;
        let mut reason: Option<TerminationReason> = None;

        if self.config.track_beliefs && self.establish_beliefs(question, &mut ledgers, &token).await.is_err() {
            reason = Some(TerminationReason::Cancelled);
        }

        let limit = self.config.round_limit();
        let mut iteration = 0;
        while reason.is_none() && iteration < limit {
            if token.is_cancelled() {
                reason = Some(TerminationReason::Cancelled);
                break;
            }

            self.set_phase(DebatePhase::Round);
            let arguments = match self
                .collect_arguments(&state, &ledgers, iteration, limit, &token)
                .await
            {
                RoundArguments::Complete(arguments) => arguments,
                RoundArguments::Cancelled => {
                    reason = Some(TerminationReason::Cancelled);
                    break;
                }
                RoundArguments::Failed { agent, error } => {
                    warn!(
                        "Aborting debate: {} could not argue in round {} ({})",
                        agent,
                        iteration + 1,
                        error
                    );
                    reason = Some(TerminationReason::ArgumentFailure {
                        agent,
                        iteration,
                        error,
                    });
                    break;
                }
            };

            let mut record = IterationRecord::new(iteration, arguments);

            if self.config.track_beliefs {
                self.set_phase(DebatePhase::BeliefRevision);
                if self
                    .revise_beliefs(&mut ledgers, &record.arguments, iteration, &token)
                    .await
                    .is_err()
                {
                    reason = Some(TerminationReason::Cancelled);
                    break;
                }
            }

            if let Some(session) = session.as_mut() {
                if iteration >= self.config.voting.voting_start_iteration {
                    self.set_phase(DebatePhase::VoteCollection);
                    let context = state.transcript(&record.arguments);
                    let Ok(votes) = self.collect_votes(&context, iteration, &token).await else {
                        reason = Some(TerminationReason::Cancelled);
                        break;
                    };

                    self.set_phase(DebatePhase::ConsensusCheck);
                    let summary = session.record_round(iteration, votes.clone())?;
                    record = record.with_votes(votes);
                    if let Some(winner) = summary.winner() {
                        info!(
                            "Consensus reached in round {}: {} with {}/{}",
                            iteration + 1,
                            winner,
                            summary.consensus.top_score,
                            summary.consensus.max_score
                        );
                        record.set_winner(winner);
                        reason = Some(TerminationReason::Consensus {
                            winner: winner.to_string(),
                        });
                    }
                    final_votes = Some(summary);
                }
            }

            state.push_iteration(record)?;
            info!("Round {} of {} complete", iteration + 1, limit);
            self.persist(&state, &mut persistence_failures);

            iteration += 1;
        }

        let reason = reason.unwrap_or(if self.config.classic_mode {
            TerminationReason::ClassicComplete
        } else {
            TerminationReason::IterationCap
        });

        self.set_phase(DebatePhase::Finalize);
        let verdict = if reason == TerminationReason::Cancelled {
            debug!("Skipping judge review after cancellation");
            None
        } else {
            self.judge_review(&state, final_votes.as_ref(), &token).await
        };

        if let Some(handle) = timer {
            handle.abort();
        }

        state.finalize(verdict);
        self.persist(&state, &mut persistence_failures);
        self.set_phase(DebatePhase::Terminated);

        info!(
            "Debate {} finished after {} rounds: {}",
            state.id,
            state.rounds_completed(),
            reason
        );

        let trends = session.as_ref().map(VotingSession::trends).unwrap_or_default();
        let beliefs = if self.config.track_beliefs {
            ledgers
        } else {
            Vec::new()
        };

        Ok(DebateOutcome {
            state,
            reason,
            final_votes,
            trends,
            beliefs,
            persistence_failures,
        })
    }

    fn set_phase(&mut self, phase: DebatePhase) {
        if self.phase != phase {
            debug!("Phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    async fn establish_beliefs(
        &self,
        question: &str,
        ledgers: &mut [BeliefLedger],
        token: &CancellationToken,
    ) -> std::result::Result<(), Cancelled> {
        for (debater, ledger) in self.debaters.iter().zip(ledgers.iter_mut()) {
            let result = self
                .guarded(token, debater.generate_belief(question))
                .await
                .and_then(|belief| belief.validate().map(|()| belief));

            match result {
                Ok(belief) => {
                    debug!("{} holds an initial belief", debater.name());
                    ledger.establish(belief, 0);
                }
                Err(AgentError::Cancelled) => return Err(Cancelled),
                Err(AgentError::Unsupported(_)) => {
                    debug!("{} does not track beliefs", debater.name());
                }
                Err(e) => warn!("No initial belief for {}: {}", debater.name(), e),
            }
        }
        Ok(())
    }

    async fn collect_arguments(
        &self,
        state: &DebateState,
        ledgers: &[BeliefLedger],
        iteration: u32,
        limit: u32,
        token: &CancellationToken,
    ) -> RoundArguments {
        let kind = ArgumentKind::for_iteration(iteration, limit);
        let mut arguments: Vec<Argument> = Vec::with_capacity(self.debaters.len());

        for (debater, ledger) in self.debaters.iter().zip(ledgers) {
            let (context, current_round) = if iteration == 0 {
                (String::new(), Vec::new())
            } else {
                (state.transcript(&arguments), arguments.clone())
            };

            let request = ArgumentRequest {
                question: state.question.clone(),
                iteration,
                kind,
                context,
                current_round,
                belief: ledger.current.clone(),
            };

            let result = self
                .guarded(token, debater.generate_argument(&request))
                .await
                .and_then(|text| {
                    let text = text.trim().to_string();
                    if text.is_empty() {
                        Err(AgentError::Malformed("empty argument".to_string()))
                    } else {
                        Ok(text)
                    }
                });

            match result {
                Ok(text) => {
                    debug!(
                        "{} argued in round {} ({} chars)",
                        debater.name(),
                        iteration + 1,
                        text.len()
                    );
                    arguments.push(Argument::new(debater.name(), text, iteration, kind));
                }
                Err(AgentError::Cancelled) => return RoundArguments::Cancelled,
                Err(error) => match self.config.argument_failure {
                    ArgumentFailurePolicy::AbortDebate => {
                        return RoundArguments::Failed {
                            agent: debater.name().to_string(),
                            error,
                        };
                    }
                    ArgumentFailurePolicy::Placeholder => {
                        warn!(
                            "{} failed to argue in round {}, recording placeholder: {}",
                            debater.name(),
                            iteration + 1,
                            error
                        );
                        arguments.push(Argument::placeholder(
                            debater.name(),
                            iteration,
                            kind,
                            &error.to_string(),
                        ));
                    }
                },
            }
        }

        RoundArguments::Complete(arguments)
    }

    async fn revise_beliefs(
        &self,
        ledgers: &mut [BeliefLedger],
        arguments: &[Argument],
        iteration: u32,
        token: &CancellationToken,
    ) -> std::result::Result<(), Cancelled> {
        // Gather every assessment before touching a ledger so a cancelled
        // round leaves beliefs as they were.
        let mut accepted: Vec<(usize, EvidenceAssessment)> = Vec::new();

        for (index, (debater, ledger)) in self.debaters.iter().zip(ledgers.iter()).enumerate() {
            let Some(current) = ledger.current.as_ref() else {
                continue;
            };
            let others: Vec<Argument> = arguments
                .iter()
                .filter(|a| a.speaker != debater.name())
                .cloned()
                .collect();

            let result = self
                .guarded(token, debater.assess_evidence(current, &others))
                .await
                .and_then(|a| a.proposed.validate().map(|()| a));

            match result {
                Ok(assessment) => accepted.push((index, assessment)),
                Err(AgentError::Cancelled) => return Err(Cancelled),
                Err(AgentError::Unsupported(_)) => {}
                Err(e) => warn!(
                    "{} could not assess round {}: {}",
                    debater.name(),
                    iteration + 1,
                    e
                ),
            }
        }

        for (index, assessment) in accepted {
            let ledger = &mut ledgers[index];
            if ledger.revise(assessment, iteration).is_accepted() {
                info!("{} changed their belief in round {}", ledger.agent, iteration + 1);
            }
        }
        Ok(())
    }

    async fn collect_votes(
        &self,
        context: &str,
        iteration: u32,
        token: &CancellationToken,
    ) -> std::result::Result<Vec<Vote>, Cancelled> {
        let participants = &self.participants;

        let responses = if self.config.parallel_votes {
            join_all(self.debaters.iter().map(|d| {
                self.guarded(token, d.generate_vote(participants, context, iteration))
            }))
            .await
        } else {
            let mut responses = Vec::with_capacity(self.debaters.len());
            for debater in &self.debaters {
                responses.push(
                    self.guarded(token, debater.generate_vote(participants, context, iteration))
                        .await,
                );
            }
            responses
        };

        let mut votes = Vec::with_capacity(responses.len());
        for (debater, response) in self.debaters.iter().zip(responses) {
            let voter = debater.name();
            let vote = match response {
                Ok(response) => {
                    let vote = response.into_vote(voter, iteration);
                    match vote.validate(participants) {
                        Ok(()) => vote,
                        Err(e) => {
                            warn!("Invalid vote from {}: {}; using fallback", voter, e);
                            Vote::fallback(voter, participants, &e.to_string(), iteration)
                        }
                    }
                }
                Err(AgentError::Cancelled) => return Err(Cancelled),
                Err(e) => {
                    warn!("No vote from {}: {}; using fallback", voter, e);
                    Vote::fallback(voter, participants, &e.to_string(), iteration)
                }
            };
            debug!("{} ranked {:?}", voter, vote.rankings);
            votes.push(vote);
        }
        Ok(votes)
    }

    async fn judge_review(
        &mut self,
        state: &DebateState,
        final_votes: Option<&RoundSummary>,
        token: &CancellationToken,
    ) -> Option<String> {
        let judge = self.judge.clone()?;
        self.set_phase(DebatePhase::JudgeReview);

        match self
            .guarded(
                token,
                judge.generate_verdict(&state.question, &state.iterations, final_votes),
            )
            .await
        {
            Ok(verdict) => {
                info!("Judge delivered a verdict");
                Some(verdict)
            }
            Err(e) => {
                warn!("Judge review failed: {}", e);
                None
            }
        }
    }

    fn persist(&self, state: &DebateState, failures: &mut u32) {
        if !self.config.save.enabled {
            return;
        }
        let Some(persister) = &self.persister else {
            return;
        };
        if let Err(e) = persister.persist(state) {
            *failures += 1;
            warn!("Could not save debate {}: {}", state.id, e);
        }
    }

    async fn guarded<T, F>(
        &self,
        token: &CancellationToken,
        call: F,
    ) -> std::result::Result<T, AgentError>
    where
        F: Future<Output = std::result::Result<T, AgentError>>,
    {
        guarded_call(token, self.config.agent_timeout(), call).await
    }
}

/// Runs a collaborator call under a timeout, racing cancellation.
async fn guarded_call<T, F>(
    token: &CancellationToken,
    timeout: Duration,
    call: F,
) -> std::result::Result<T, AgentError>
where
    F: Future<Output = std::result::Result<T, AgentError>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(AgentError::Cancelled),
        result = tokio::time::timeout(timeout, call) => match result {
            Ok(inner) => inner,
            Err(_) => Err(AgentError::Timeout(timeout.as_secs())),
        },
    }
}
