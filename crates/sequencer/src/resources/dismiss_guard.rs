//! RAII guard for the lifetime of one on-screen prompt.

use tracing::{debug, warn};

use events::{emit, DismissAction, Signal, SignalBus};
use sequencer_core::{ContextToken, PromptId};

/// Guard held by a presenter while its prompt is visible.
///
/// Creating it emits `Evaluate`; dismissing it emits `Resume`. If the guard
/// is dropped without [`dismiss`](DismissGuard::dismiss) (the presenter
/// errored or panicked) it still releases the slot, recording the dismissal
/// as [`DismissAction::Failed`].
///
/// # Example
///
/// ```ignore
/// let guard = DismissGuard::begin(bus.clone(), prompt, context);
/// let action = render_and_wait(prompt).await?;
/// guard.dismiss(action);
/// ```
pub struct DismissGuard {
    bus: SignalBus,
    prompt: PromptId,
    context: ContextToken,
    dismissed: bool,
}

impl DismissGuard {
    /// Announce that `prompt` is about to be shown.
    pub fn begin(bus: SignalBus, prompt: PromptId, context: ContextToken) -> Self {
        emit(&bus, Signal::evaluate(context.clone()));
        emit(
            &bus,
            Signal::PromptShown {
                prompt,
                context: context.clone(),
            },
        );

        debug!(
            prompt = %prompt,
            session_id = %context.session_id,
            "Prompt shown"
        );

        Self {
            bus,
            prompt,
            context,
            dismissed: false,
        }
    }

    /// Report that the user dismissed the prompt.
    pub fn dismiss(mut self, action: DismissAction) {
        self.release(action);
    }

    pub fn prompt(&self) -> PromptId {
        self.prompt
    }

    pub fn context(&self) -> &ContextToken {
        &self.context
    }

    fn release(&mut self, action: DismissAction) {
        if self.dismissed {
            return;
        }
        self.dismissed = true;

        debug!(
            prompt = %self.prompt,
            action = action.as_str(),
            "Prompt dismissed"
        );

        emit(
            &self.bus,
            Signal::PromptDismissed {
                prompt: self.prompt,
                action,
                context: self.context.clone(),
            },
        );
        emit(&self.bus, Signal::resume(self.context.clone()));
    }
}

impl Drop for DismissGuard {
    fn drop(&mut self) {
        if !self.dismissed {
            warn!(
                prompt = %self.prompt,
                session_id = %self.context.session_id,
                "Prompt guard dropped without dismissal - releasing slot"
            );
            self.release(DismissAction::Failed);
        }
    }
}
