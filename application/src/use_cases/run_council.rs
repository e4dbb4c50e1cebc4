//! Run Council use case
//!
//! Drives one conversation from the user's question to termination:
//! scheduled discussion turns, human checkpoints between cycles, consensus
//! rounds and the chair's final answer. Every agent reply is validated
//! before it reaches the message store; rejected or failed attempts are
//! retried up to the policy's bound.
//!
//! The driver is the only writer of the [`ConversationState`]. It awaits
//! one agent or the human at a time.

use crate::config::BehaviorConfig;
use crate::ports::agent_invoker::{
    AgentInvoker, AgentReply, AgentRequest, InvocationError, TurnFailure, TurnPurpose,
};
use crate::ports::human_feedback::{
    Checkpoint, HumanFeedbackError, HumanFeedbackPort, NoHumanFeedback,
};
use crate::ports::progress::{CouncilProgressNotifier, NoProgress};
use crate::ports::transcript::{NoTranscript, TranscriptSink};
use roundtable_domain::{
    AgentId, AgentProfile, AgentRoster, ConsensusRound, ConversationState, CouncilPolicy,
    DomainError, FeedbackOutcome, HUMAN_LABEL, Message, MessageValidator, PhaseKind,
    PromptTemplate, Question, TokenUsage, UsageLedger, Vote, estimate_tokens, parse_vote,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that end a run abnormally
#[derive(Error, Debug)]
pub enum RunCouncilError {
    #[error("Agent '{agent}' failed after {attempts} attempt(s): {failure}")]
    RetriesExhausted {
        agent: AgentId,
        attempts: u32,
        failure: TurnFailure,
    },

    #[error("Human feedback failed: {0}")]
    HumanFeedback(HumanFeedbackError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The human gave no feedback at a checkpoint
    HumanEnded,
    /// Consensus was reached and the chair wrote the final answer
    FinalAnswer,
    /// The configured cycle limit was reached
    CycleLimit,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::HumanEnded => write!(f, "ended by the human"),
            Termination::FinalAnswer => write!(f, "consensus reached, final answer written"),
            Termination::CycleLimit => write!(f, "cycle limit reached"),
        }
    }
}

/// Input for the RunCouncil use case
#[derive(Debug, Clone)]
pub struct RunCouncilInput {
    pub question: Question,
    pub roster: AgentRoster,
    pub policy: CouncilPolicy,
}

impl RunCouncilInput {
    pub fn new(question: Question, roster: AgentRoster) -> Self {
        Self {
            question,
            roster,
            policy: CouncilPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CouncilPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Result of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub state: ConversationState,
    pub termination: Termination,
    pub usage: UsageLedger,
}

impl RunOutput {
    pub fn messages(&self) -> &[Message] {
        self.state.history()
    }

    /// The chair's final answer, when the run reached one
    pub fn final_answer(&self) -> Option<&Message> {
        match self.termination {
            Termination::FinalAnswer => self.state.store().last(),
            _ => None,
        }
    }
}

/// Per-run values shared by every step
struct RunContext<'a> {
    roster: &'a AgentRoster,
    policy: &'a CouncilPolicy,
    validator: MessageValidator,
    progress: &'a dyn CouncilProgressNotifier,
    usage: UsageLedger,
}

/// Use case for running a council discussion
pub struct RunCouncilUseCase<I: AgentInvoker + 'static> {
    invoker: Arc<I>,
    human: Arc<dyn HumanFeedbackPort>,
    transcript: Arc<dyn TranscriptSink>,
    behavior: BehaviorConfig,
}

impl<I: AgentInvoker + 'static> RunCouncilUseCase<I> {
    pub fn new(invoker: Arc<I>) -> Self {
        Self {
            invoker,
            human: Arc::new(NoHumanFeedback),
            transcript: Arc::new(NoTranscript),
            behavior: BehaviorConfig::default(),
        }
    }

    pub fn with_human_feedback(mut self, human: Arc<dyn HumanFeedbackPort>) -> Self {
        self.human = human;
        self
    }

    pub fn with_transcript(mut self, transcript: Arc<dyn TranscriptSink>) -> Self {
        self.transcript = transcript;
        self
    }

    pub fn with_behavior(mut self, behavior: BehaviorConfig) -> Self {
        self.behavior = behavior;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RunCouncilInput) -> Result<RunOutput, RunCouncilError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunCouncilInput,
        progress: &dyn CouncilProgressNotifier,
    ) -> Result<RunOutput, RunCouncilError> {
        let RunCouncilInput {
            question,
            roster,
            policy,
        } = input;

        info!(
            agents = roster.len(),
            max_iterations = policy.max_iterations,
            chair = %roster.chair().id,
            "Starting council"
        );

        let mut ctx = RunContext {
            roster: &roster,
            policy: &policy,
            validator: MessageValidator::new(roster.ids().cloned(), policy.final_answer.clone()),
            progress,
            usage: UsageLedger::new(),
        };
        let mut state = ConversationState::new(&question, policy.max_iterations);
        for message in state.history() {
            let usage = TokenUsage::new(estimate_tokens(&message.content), 0);
            self.transcript.record(message, Some(usage));
        }

        let termination = loop {
            match state.kind() {
                PhaseKind::Discussion => {
                    if state.at_cycle_opening() {
                        debug_assert!(state.invariant_holds());

                        if let Some(reason) = policy.trigger.evaluate(&state) {
                            info!(phase = state.phase(), %reason, "Entering consensus");
                            state.enter_consensus()?;
                            continue;
                        }
                        if policy.cycle_limit_reached(state.phase()) {
                            info!(phase = state.phase(), "Cycle limit reached");
                            state.halt()?;
                            break Termination::CycleLimit;
                        }
                    }

                    if state.cycle_complete() {
                        debug!(phase = state.phase(), "Cycle complete, awaiting human");
                        state.open_checkpoint()?;
                        progress.on_checkpoint(state.phase());
                        continue;
                    }

                    self.discussion_turn(&mut ctx, &mut state).await?;
                }
                PhaseKind::AwaitingHuman => {
                    if let Some(termination) = self.checkpoint(&mut ctx, &mut state).await? {
                        break termination;
                    }
                }
                PhaseKind::Consensus => {
                    let round = self.consensus_round(&mut ctx, &state).await?;
                    state.resolve_consensus(round)?;
                }
                PhaseKind::FinalAnswer => {
                    self.final_answer(&mut ctx, &mut state).await?;
                    break Termination::FinalAnswer;
                }
                PhaseKind::Terminated => break Termination::HumanEnded,
            }
        };

        info!(
            %termination,
            phase = state.phase(),
            messages = state.history().len(),
            "Council finished"
        );

        Ok(RunOutput {
            state,
            termination,
            usage: ctx.usage,
        })
    }

    async fn discussion_turn(
        &self,
        ctx: &mut RunContext<'_>,
        state: &mut ConversationState,
    ) -> Result<(), RunCouncilError> {
        let roster = ctx.roster;
        let speaker = ctx.policy.scheduler().next_speaker(roster, state);
        let latest_round = state
            .latest_round()
            .filter(|round| round.phase == state.phase());
        let instruction = PromptTemplate::discussion_instruction(
            speaker,
            state.iteration(),
            state.max_iterations(),
            latest_round,
            ctx.policy.trigger.readiness_marker.as_deref(),
        );

        let (text, usage) = self
            .take_turn(ctx, state, speaker, TurnPurpose::Discussion, &instruction)
            .await?;

        let message = state.record_agent_message(&speaker.id, text)?;
        self.transcript.record(message, Some(usage));
        ctx.progress.on_message(message);
        Ok(())
    }

    /// Ask the human for feedback. Returns the termination when the run ends.
    async fn checkpoint(
        &self,
        ctx: &mut RunContext<'_>,
        state: &mut ConversationState,
    ) -> Result<Option<Termination>, RunCouncilError> {
        let checkpoint = Checkpoint {
            history: state.history(),
            phase: state.phase(),
            latest_round: state.latest_round(),
        };

        let feedback = match self.human.request_feedback(&checkpoint).await {
            Ok(feedback) => feedback,
            Err(HumanFeedbackError::Cancelled) => {
                debug!("Feedback prompt cancelled");
                None
            }
            Err(e) => return Err(RunCouncilError::HumanFeedback(e)),
        };

        match state.absorb_feedback(feedback.as_deref())? {
            FeedbackOutcome::Ended => {
                info!(phase = state.phase(), "No feedback, ending run");
                Ok(Some(Termination::HumanEnded))
            }
            FeedbackOutcome::Resumed { phase } => {
                if let Some(message) = state.store().last() {
                    let usage = TokenUsage::new(estimate_tokens(&message.content), 0);
                    ctx.usage.record(HUMAN_LABEL, usage);
                    self.transcript.record(message, Some(usage));
                    ctx.progress.on_message(message);
                }
                info!(phase, "Feedback received, opening next cycle");
                Ok(None)
            }
        }
    }

    async fn consensus_round(
        &self,
        ctx: &mut RunContext<'_>,
        state: &ConversationState,
    ) -> Result<ConsensusRound, RunCouncilError> {
        let round_number = state.consensus_rounds().len() + 1;
        let proposal = state
            .store()
            .last_agent_message()
            .or_else(|| state.store().last())
            .map(|m| m.content.clone())
            .unwrap_or_default();

        info!(round = round_number, phase = state.phase(), "Consensus round");
        ctx.progress.on_consensus_start(round_number, &proposal);

        let instruction = PromptTemplate::vote_instruction(&proposal);
        let roster = ctx.roster;
        let mut votes = Vec::with_capacity(roster.len());

        for agent in roster.agents() {
            let (text, _) = self
                .take_turn(ctx, state, agent, TurnPurpose::Vote, &instruction)
                .await?;
            let parsed = parse_vote(&text).map_err(|e| DomainError::InvalidVote(e.to_string()))?;
            let vote = Vote::from_parsed(agent.id.clone(), parsed);

            debug!(agent = %vote.agent, decision = %vote.decision, "Vote cast");
            self.transcript.record_vote(round_number, state.phase(), &vote);
            ctx.progress.on_vote(&vote);
            votes.push(vote);
        }

        let outcome = ctx.policy.evaluator.evaluate(&votes, roster.len());
        let round = ConsensusRound::new(round_number, state.phase(), proposal, votes, outcome);

        info!(
            round = round_number,
            %outcome,
            votes = %round.vote_summary(),
            "Consensus round decided"
        );
        ctx.progress.on_consensus_complete(&round);
        Ok(round)
    }

    async fn final_answer(
        &self,
        ctx: &mut RunContext<'_>,
        state: &mut ConversationState,
    ) -> Result<(), RunCouncilError> {
        let roster = ctx.roster;
        let chair = roster.chair();
        let instruction = PromptTemplate::final_answer_instruction(&ctx.policy.final_answer);

        let (text, usage) = self
            .take_turn(ctx, state, chair, TurnPurpose::FinalAnswer, &instruction)
            .await?;

        let message = state.complete_with_final_answer(&chair.id, text)?;
        info!(chair = %chair.id, "Final answer written");
        self.transcript.record(message, Some(usage));
        ctx.progress.on_message(message);
        Ok(())
    }

    /// Invoke `agent` until a reply passes validation or attempts run out.
    /// Returns the accepted text and the usage of the accepting attempt.
    async fn take_turn(
        &self,
        ctx: &mut RunContext<'_>,
        state: &ConversationState,
        agent: &AgentProfile,
        purpose: TurnPurpose,
        instruction: &str,
    ) -> Result<(String, TokenUsage), RunCouncilError> {
        let system_prompt = PromptTemplate::system_prompt(agent, ctx.roster);
        let history = state.store().history_for_agent(&agent.id);
        let max_attempts = ctx.policy.max_attempts();
        let mut retry_notice: Option<String> = None;
        let mut attempt = 0;

        loop {
            attempt += 1;
            ctx.progress.on_turn_start(&agent.id, purpose, attempt);

            let request = AgentRequest {
                agent,
                history,
                system_prompt: &system_prompt,
                instruction,
                retry_notice: retry_notice.as_deref(),
                purpose,
            };

            let failure = match self.invoke(&request).await {
                Ok(reply) => {
                    let usage = reply
                        .usage
                        .unwrap_or_else(|| TokenUsage::estimate(&request.render(), &reply.text));
                    ctx.usage.record(agent.id.as_str(), usage);

                    let result = ctx
                        .validator
                        .validate(&reply.text, &agent.id, history, state.kind());
                    if result.accepted {
                        return Ok((reply.text.trim().to_string(), usage));
                    }
                    retry_notice = Some(PromptTemplate::retry_notice(&result));
                    TurnFailure::Rejected(result)
                }
                Err(e) => TurnFailure::Invocation(e),
            };

            warn!(
                agent = %agent.id,
                attempt,
                max_attempts,
                kind = failure.kind_name(),
                "Turn attempt failed: {}",
                failure
            );
            ctx.progress.on_attempt_failed(&agent.id, attempt, &failure);

            if attempt >= max_attempts {
                return Err(RunCouncilError::RetriesExhausted {
                    agent: agent.id.clone(),
                    attempts: attempt,
                    failure,
                });
            }
        }
    }

    async fn invoke(&self, request: &AgentRequest<'_>) -> Result<AgentReply, InvocationError> {
        match self.behavior.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.invoker.invoke(request))
                .await
                .unwrap_or(Err(InvocationError::Timeout(timeout))),
            None => self.invoker.invoke(request).await,
        }
    }
}
