//! Work queued from the page loop to the backend worker.

use std::time::Duration;

use shared::{
    domain::ContactSubmission,
    protocol::{Effect, TimerId},
};
use uuid::Uuid;

#[derive(Debug)]
pub enum BackendCommand {
    StartTimer { timer: TimerId, after: Duration },
    RequestFrame,
    Submit { submission: ContactSubmission },
    CancelSubmission { submission_id: Uuid },
    Shutdown,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartTimer { .. } => "start_timer",
            Self::RequestFrame => "request_frame",
            Self::Submit { .. } => "submit",
            Self::CancelSubmission { .. } => "cancel_submission",
            Self::Shutdown => "shutdown",
        }
    }
}

impl From<Effect> for BackendCommand {
    fn from(effect: Effect) -> Self {
        match effect {
            Effect::StartTimer { timer, after_ms } => Self::StartTimer {
                timer,
                after: Duration::from_millis(after_ms),
            },
            Effect::RequestAnimationFrame => Self::RequestFrame,
            Effect::Submit { submission } => Self::Submit { submission },
            Effect::CancelSubmission { submission_id } => Self::CancelSubmission { submission_id },
        }
    }
}
