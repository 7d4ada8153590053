//! Signal bus implementation using tokio broadcast channels

use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;

use crate::types::{Signal, SignalEnvelope};

/// Capacity for the broadcast channel
const DEFAULT_CAPACITY: usize = 256;

/// Bus for publishing and subscribing to signals
///
/// Every subscriber sees signals in emission order. Handles are cheap to
/// clone and all clones share one channel, so an engine and its presenters
/// can each hold their own.
#[derive(Clone)]
pub struct SignalBus {
    sender: broadcast::Sender<SignalEnvelope>,
    /// Next sequence number, doubles as the count of published signals.
    /// Held across the send so sequence order matches channel order.
    sequence: Arc<Mutex<u64>>,
}

impl SignalBus {
    /// Create a new signal bus with default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new signal bus with specified capacity
    ///
    /// Capacity must cover the worst-case backlog a subscriber can build up
    /// while it is busy, e.g. every signal emitted while the engine awaits a
    /// slow availability check. A subscriber that falls further behind gets
    /// `RecvError::Lagged` and the skipped signals are gone.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            sequence: Arc::new(Mutex::new(0)),
        }
    }

    /// Publish a signal to all subscribers
    ///
    /// Returns the number of subscribers that received the signal.
    /// If there are no subscribers, returns 0 (the signal is dropped).
    pub fn publish(&self, signal: Signal) -> usize {
        let mut next = self.sequence.lock().unwrap_or_else(PoisonError::into_inner);
        let sequence = *next;
        *next += 1;
        self.sender
            .send(SignalEnvelope::new(sequence, signal))
            .unwrap_or(0)
    }

    /// Subscribe to signals
    ///
    /// Signals published before subscribing will not be received.
    pub fn subscribe(&self) -> broadcast::Receiver<SignalEnvelope> {
        self.sender.subscribe()
    }

    /// Get the number of current subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the total number of signals published
    pub fn signal_count(&self) -> u64 {
        *self.sequence.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalBus")
            .field("subscriber_count", &self.subscriber_count())
            .field("signal_count", &self.signal_count())
            .finish()
    }
}

/// Emit a signal on the bus.
///
/// This is the only way components put signals on the bus; signal values
/// themselves carry no transport behavior.
pub fn emit(bus: &SignalBus, signal: Signal) {
    let kind = signal.kind();
    let delivered = bus.publish(signal);
    tracing::trace!(?kind, delivered, "Signal emitted");
}
