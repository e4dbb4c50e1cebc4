//! Run policy
//!
//! [`CouncilPolicy`] gathers every knob that shapes a run. It is built once
//! from configuration and never changes during the run.

use super::scheduler::TurnScheduler;
use super::trigger::ConsensusTrigger;
use crate::quorum::ConsensusEvaluator;
use crate::validation::FinalAnswerSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_ITERATIONS: u32 = 5;
pub const DEFAULT_MAX_RETRIES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouncilPolicy {
    /// Agent turns per discussion cycle
    pub max_iterations: u32,
    /// Extra attempts after a rejected or failed turn
    pub max_retries: u32,
    /// Rotate the opening speaker with each cycle
    pub rotate_opener: bool,
    /// Stop after this many completed feedback cycles
    pub max_cycles: Option<u32>,
    pub trigger: ConsensusTrigger,
    pub evaluator: ConsensusEvaluator,
    pub final_answer: FinalAnswerSchema,
}

impl Default for CouncilPolicy {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_retries: DEFAULT_MAX_RETRIES,
            rotate_opener: false,
            max_cycles: None,
            trigger: ConsensusTrigger::default(),
            evaluator: ConsensusEvaluator::default(),
            final_answer: FinalAnswerSchema::default(),
        }
    }
}

impl CouncilPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Builder Methods ====================

    /// Zero is raised to one: a cycle always has at least one turn.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_rotate_opener(mut self, rotate: bool) -> Self {
        self.rotate_opener = rotate;
        self
    }

    pub fn with_max_cycles(mut self, cycles: Option<u32>) -> Self {
        self.max_cycles = cycles;
        self
    }

    pub fn with_trigger(mut self, trigger: ConsensusTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_max_abstentions(mut self, max: usize) -> Self {
        self.evaluator = ConsensusEvaluator::new(max);
        self
    }

    pub fn with_final_answer(mut self, schema: FinalAnswerSchema) -> Self {
        self.final_answer = schema;
        self
    }

    // ==================== Derived ====================

    pub fn scheduler(&self) -> TurnScheduler {
        TurnScheduler::new(self.rotate_opener)
    }

    /// Total attempts allowed for a single turn
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Whether the run must stop at the opening of the cycle for `phase`
    pub fn cycle_limit_reached(&self, phase: u32) -> bool {
        self.max_cycles.is_some_and(|max| phase >= max)
    }
}
