//! Trainer states

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a [`Trainer`](super::Trainer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainerState {
    Initializing,
    Running,
    Checkpointing,
    Evaluating,
    Done,
}

impl TrainerState {
    /// Whether the state machine allows moving from `self` to `next`
    pub fn can_transition_to(self, next: TrainerState) -> bool {
        use TrainerState::*;
        matches!(
            (self, next),
            (Initializing, Running)
                | (Running, Checkpointing)
                | (Checkpointing, Running)
                | (Running, Evaluating)
                | (Evaluating, Done)
        )
    }
}

impl fmt::Display for TrainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrainerState::Initializing => "initializing",
            TrainerState::Running => "running",
            TrainerState::Checkpointing => "checkpointing",
            TrainerState::Evaluating => "evaluating",
            TrainerState::Done => "done",
        };
        f.write_str(name)
    }
}
