//! The seam between the engine and whatever draws prompts.

use async_trait::async_trait;
use sequencer_core::{ContextToken, PromptId};

use crate::error::PresentError;

/// Displays a prompt.
///
/// The engine spawns `present` and never awaits it. Implementations hold a
/// [`events::SignalBus`] handle and must, for every call:
///
/// 1. emit `Evaluate(context)` before rendering, so the engine can look
///    ahead while the prompt is visible;
/// 2. emit `Resume(context)` exactly once when the user dismisses it.
///
/// [`crate::DismissGuard`] does both. A presenter that never emits `Resume`
/// stalls the sequence for good.
#[async_trait]
pub trait Presenter: Send + Sync {
    async fn present(&self, prompt: PromptId, context: ContextToken) -> Result<(), PresentError>;
}
