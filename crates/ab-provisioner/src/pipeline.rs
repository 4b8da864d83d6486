//! Pipeline state tracking.
//!
//! ```text
//! Idle -> Authenticating -> Resolving -> Creating -> Mutating -> Done
//!                                     -> Deleting -> Done
//!                                     -> Done          (already exists)
//! any non-terminal state -> Failed(reason)
//! ```

use std::fmt;
use tracing::{debug, warn};

use crate::{ProvisionError, ProvisionResult};

/// Stage of a create or delete pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Authenticating,
    Resolving,
    Creating,
    Mutating,
    Deleting,
    Done,
    Failed(String),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed(_))
    }

    fn can_advance_to(&self, next: &PipelineState) -> bool {
        use PipelineState::*;
        match (self, next) {
            (Done, _) | (Failed(_), _) => false,
            (_, Failed(_)) => true,
            (Idle, Authenticating) => true,
            (Authenticating, Resolving) => true,
            (Resolving, Creating | Deleting | Done) => true,
            (Creating, Mutating | Done) => true,
            (Mutating, Done) => true,
            (Deleting, Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => write!(f, "idle"),
            PipelineState::Authenticating => write!(f, "authenticating"),
            PipelineState::Resolving => write!(f, "resolving"),
            PipelineState::Creating => write!(f, "creating"),
            PipelineState::Mutating => write!(f, "mutating"),
            PipelineState::Deleting => write!(f, "deleting"),
            PipelineState::Done => write!(f, "done"),
            PipelineState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Records the states a single pipeline run goes through.
#[derive(Debug, Clone)]
pub struct PipelineTracker {
    pipeline: &'static str,
    history: Vec<PipelineState>,
}

impl PipelineTracker {
    pub fn new(pipeline: &'static str) -> Self {
        Self {
            pipeline,
            history: vec![PipelineState::Idle],
        }
    }

    pub fn state(&self) -> &PipelineState {
        // history always holds at least Idle
        self.history.last().unwrap_or(&PipelineState::Idle)
    }

    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    /// Move to `next`, rejecting transitions the pipeline does not allow.
    pub fn advance(&mut self, next: PipelineState) -> ProvisionResult<()> {
        let current = self.state().clone();
        if !current.can_advance_to(&next) {
            return Err(ProvisionError::InvalidTransition {
                from: current,
                to: next,
            });
        }
        debug!(pipeline = self.pipeline, from = %current, to = %next, "Pipeline transition");
        self.history.push(next);
        Ok(())
    }

    /// Record a failure. A pipeline that already finished keeps its state.
    pub fn fail(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        if self.state().is_terminal() {
            return;
        }
        warn!(pipeline = self.pipeline, from = %self.state(), reason = %reason, "Pipeline failed");
        self.history.push(PipelineState::Failed(reason));
    }
}
