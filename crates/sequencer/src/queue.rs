//! Signal queue with a single-drainer guard.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use events::Signal;
use sequencer_core::ContextToken;

/// The subset of bus signals the engine acts on.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineSignal {
    Evaluate(ContextToken),
    Resume(ContextToken),
}

impl EngineSignal {
    /// Keep `Evaluate` and `Resume`, drop everything else.
    pub fn from_signal(signal: Signal) -> Option<Self> {
        match signal {
            Signal::Evaluate { context } => Some(Self::Evaluate(context)),
            Signal::Resume { context } => Some(Self::Resume(context)),
            Signal::PromptShown { .. } | Signal::PromptDismissed { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Evaluate(_) => "evaluate",
            Self::Resume(_) => "resume",
        }
    }
}

/// FIFO of pending engine signals.
///
/// Pushing is always allowed. Draining is exclusive: [`try_begin_drain`]
/// hands out at most one [`DrainGuard`] at a time.
///
/// [`try_begin_drain`]: SignalQueue::try_begin_drain
#[derive(Debug, Default)]
pub struct SignalQueue {
    items: Mutex<VecDeque<EngineSignal>>,
    draining: AtomicBool,
}

impl SignalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, signal: EngineSignal) {
        self.items().push_back(signal);
    }

    pub fn pop(&self) -> Option<EngineSignal> {
        self.items().pop_front()
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    /// Claim the right to drain, or `None` if a drain is already running.
    pub fn try_begin_drain(&self) -> Option<DrainGuard<'_>> {
        self.draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| DrainGuard { queue: self })
    }

    fn items(&self) -> MutexGuard<'_, VecDeque<EngineSignal>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive drain permission; clears the draining flag when dropped.
#[derive(Debug)]
pub struct DrainGuard<'a> {
    queue: &'a SignalQueue,
}

impl DrainGuard<'_> {
    pub fn next(&self) -> Option<EngineSignal> {
        self.queue.pop()
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.queue.draining.store(false, Ordering::Release);
    }
}
