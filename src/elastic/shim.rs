//! Training loop gate
//!
//! The embedding training loop polls a [`StepGate`] each step. Once a scale
//! flag is up the gate yields and the loop must stop iterating so the
//! process-level termination path can run; how many in-flight steps complete
//! first is the embedder's contract.

use std::sync::Arc;

use super::state::CoordinationState;

/// Direction of a pending scale event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDirection {
    Up,
    Down,
}

/// Per-step decision for the embedding training loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDecision {
    /// No scale event pending; keep training
    Continue,
    /// A scale event is pending; stop iterating and return control
    Yield(ScaleDirection),
}

/// Read-only view of the coordination state for the training loop
#[derive(Debug, Clone)]
pub struct StepGate {
    state: Arc<CoordinationState>,
}

impl StepGate {
    /// Create a gate over the shared coordination state
    pub fn new(state: Arc<CoordinationState>) -> Self {
        Self { state }
    }

    /// Inspect the coordination state for this step
    pub fn check(&self) -> StepDecision {
        if self.state.scale_up() {
            StepDecision::Yield(ScaleDirection::Up)
        } else if self.state.scale_down() {
            StepDecision::Yield(ScaleDirection::Down)
        } else {
            StepDecision::Continue
        }
    }

    /// True once the loop must stop iterating
    pub fn should_yield(&self) -> bool {
        self.state.scale_pending()
    }
}
