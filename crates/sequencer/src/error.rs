use sequencer_core::{CoreError, PromptId};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SequencerError {
    #[error("Sequence already started for session {0}")]
    AlreadyStarted(Uuid),

    #[error("Invalid sequence: {0}")]
    InvalidSequence(#[from] CoreError),

    #[error("Sequence engine has stopped")]
    EngineStopped,
}

pub type Result<T> = std::result::Result<T, SequencerError>;

/// Failure reported by an availability oracle.
///
/// The engine never propagates these; the prompt is treated as unavailable.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Availability check failed for {prompt}: {reason}")]
    CheckFailed { prompt: PromptId, reason: String },
}

impl OracleError {
    pub fn check_failed(prompt: PromptId, reason: impl Into<String>) -> Self {
        Self::CheckFailed {
            prompt,
            reason: reason.into(),
        }
    }
}

/// Failure reported by a presenter.
///
/// The presentation cursor has already moved when this surfaces, so the
/// prompt is lost but the sequence keeps processing signals.
#[derive(Debug, Error)]
pub enum PresentError {
    #[error("Failed to render {prompt}: {reason}")]
    RenderFailed { prompt: PromptId, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PresentError {
    pub fn render_failed(prompt: PromptId, reason: impl Into<String>) -> Self {
        Self::RenderFailed {
            prompt,
            reason: reason.into(),
        }
    }
}
