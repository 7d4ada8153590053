//! The sequence engine: a signal-driven queue that shows prompts one at a time.
//!
//! The engine subscribes to the bus when it is constructed. Every `Evaluate`
//! or `Resume` it receives is appended to its [`SignalQueue`] and the queue is
//! drained in FIFO order:
//!
//! - `Evaluate` scans forward from the evaluation cursor and stops at the
//!   first prompt the oracle reports available.
//! - `Resume` hands the next available prompt to the presenter, without
//!   waiting for it to be dismissed.
//!
//! Presenters feed the loop by emitting their own `Evaluate` before rendering
//! and `Resume` after dismissal.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use events::{emit, Signal, SignalBus, SignalEnvelope};
use sequencer_core::{ContextToken, PromptId};

use crate::error::{Result, SequencerError};
use crate::oracle::AvailabilityOracle;
use crate::presenter::Presenter;
use crate::queue::{EngineSignal, SignalQueue};
use crate::state::SequenceState;

/// Configuration for a sequence engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Prompts in presentation priority order
    pub sequence: Vec<PromptId>,
}

impl EngineConfig {
    pub fn with_sequence(sequence: Vec<PromptId>) -> Self {
        Self { sequence }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sequence: PromptId::sequence(),
        }
    }
}

/// Point-in-time view of an engine's progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SequenceSnapshot {
    pub sequence_len: usize,
    pub evaluation_cursor: usize,
    pub available: Vec<PromptId>,
    pub presentation_cursor: usize,
    /// Signals waiting in the engine queue
    pub queued: usize,
    pub draining: bool,
    pub started: bool,
    pub resumes_handled: usize,
}

impl SequenceSnapshot {
    /// Prompts handed to the presenter so far, in order.
    pub fn presented(&self) -> &[PromptId] {
        &self.available[..self.presentation_cursor]
    }

    /// Whether the session has run to its end.
    ///
    /// Every prompt has been checked, every available prompt has been
    /// presented and dismissed, and no signal is pending.
    pub fn is_complete(&self) -> bool {
        self.started
            && self.queued == 0
            && !self.draining
            && self.evaluation_cursor == self.sequence_len
            && self.presentation_cursor == self.available.len()
            && self.resumes_handled > self.presentation_cursor
    }
}

struct EngineInner {
    bus: SignalBus,
    oracle: Arc<dyn AvailabilityOracle>,
    presenter: Arc<dyn Presenter>,
    state: Mutex<SequenceState>,
    queue: SignalQueue,
    started: Mutex<Option<ContextToken>>,
    resumes_handled: AtomicUsize,
    progress: watch::Sender<SequenceSnapshot>,
    shutdown: watch::Sender<bool>,
}

impl EngineInner {
    fn lock_state(&self) -> MutexGuard<'_, SequenceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_started(&self) -> MutexGuard<'_, Option<ContextToken>> {
        self.started.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> SequenceSnapshot {
        let started = self.lock_started().is_some();
        let state = self.lock_state();
        SequenceSnapshot {
            sequence_len: state.sequence().len(),
            evaluation_cursor: state.evaluation_cursor(),
            available: state.available().to_vec(),
            presentation_cursor: state.presentation_cursor(),
            queued: self.queue.len(),
            draining: self.queue.is_draining(),
            started,
            resumes_handled: self.resumes_handled.load(Ordering::SeqCst),
        }
    }

    fn publish_progress(&self) {
        self.progress.send_replace(self.snapshot());
    }

    /// Bus handler: queue recognized signals and drain.
    async fn on_signal(&self, signal: Signal) {
        let Some(signal) = EngineSignal::from_signal(signal) else {
            trace!("Ignoring signal not addressed to the engine");
            return;
        };

        self.queue.push(signal);
        self.drain().await;
    }

    /// Process queued signals until the queue is empty.
    ///
    /// Returns immediately if another drain is in progress; that drain will
    /// pick up anything pushed meanwhile.
    async fn drain(&self) {
        loop {
            {
                let Some(guard) = self.queue.try_begin_drain() else {
                    trace!("Drain already in progress");
                    return;
                };

                // Handlers may cause more signals to be queued, so re-check
                // the queue after every dispatch.
                while let Some(signal) = guard.next() {
                    trace!(signal = signal.name(), "Dispatching signal");
                    self.dispatch(signal).await;
                    self.publish_progress();
                }
            }

            // A push that raced with releasing the guard would otherwise sit
            // in the queue until the next signal arrives.
            if self.queue.is_empty() {
                break;
            }
        }

        self.publish_progress();
    }

    async fn dispatch(&self, signal: EngineSignal) {
        match signal {
            EngineSignal::Evaluate(context) => self.handle_evaluate(&context).await,
            EngineSignal::Resume(context) => self.handle_resume(context),
        }
    }

    fn next_unchecked(&self) -> Option<PromptId> {
        self.lock_state().next_unchecked()
    }

    /// Scan forward for the next available prompt.
    ///
    /// Stops at the first available prompt. Prompts found unavailable on the
    /// way are skipped for the rest of the session; prompts past the match
    /// wait for the next `Evaluate`.
    async fn handle_evaluate(&self, context: &ContextToken) {
        while let Some(prompt) = self.next_unchecked() {
            let available = match self.oracle.is_available(prompt, context).await {
                Ok(available) => available,
                Err(e) => {
                    warn!(
                        prompt = %prompt,
                        session_id = %context.session_id,
                        error = %e,
                        "Availability check failed, treating prompt as unavailable"
                    );
                    false
                }
            };

            self.lock_state().record_availability(available);

            if available {
                debug!(prompt = %prompt, "Prompt available");
                return;
            }
            debug!(prompt = %prompt, "Prompt unavailable, skipping");
        }

        trace!("Evaluation reached end of sequence");
    }

    /// Present the next available prompt, if any.
    fn handle_resume(&self, context: ContextToken) {
        let resumes = self.resumes_handled.fetch_add(1, Ordering::SeqCst) + 1;
        let next = self.lock_state().take_next_presentation();

        let Some(prompt) = next else {
            debug!(
                session_id = %context.session_id,
                resumes,
                "No prompt left to present"
            );
            return;
        };

        info!(
            prompt = %prompt,
            session_id = %context.session_id,
            "Presenting prompt"
        );

        let presenter = Arc::clone(&self.presenter);
        tokio::spawn(async move {
            if let Err(e) = presenter.present(prompt, context).await {
                warn!(
                    prompt = %prompt,
                    error = %e,
                    "Presenter failed, prompt is lost"
                );
            }
        });
    }
}

/// Signal-driven prompt sequencer for one session.
///
/// Build one per session with [`SequenceEngine::new`], keep an
/// [`EngineHandle`] to start and observe it, then drive it with
/// [`run`](SequenceEngine::run) or [`spawn`](SequenceEngine::spawn).
pub struct SequenceEngine {
    inner: Arc<EngineInner>,
    receiver: broadcast::Receiver<SignalEnvelope>,
}

impl SequenceEngine {
    /// Create an engine and subscribe it to `bus`.
    ///
    /// Signals emitted after this call are buffered until the engine runs.
    pub fn new(
        bus: SignalBus,
        config: EngineConfig,
        oracle: Arc<dyn AvailabilityOracle>,
        presenter: Arc<dyn Presenter>,
    ) -> Result<Self> {
        let state = SequenceState::new(config.sequence)?;
        let receiver = bus.subscribe();
        let (progress, _) = watch::channel(SequenceSnapshot::default());
        let (shutdown, _) = watch::channel(false);

        let inner = Arc::new(EngineInner {
            bus,
            oracle,
            presenter,
            state: Mutex::new(state),
            queue: SignalQueue::new(),
            started: Mutex::new(None),
            resumes_handled: AtomicUsize::new(0),
            progress,
            shutdown,
        });
        inner.publish_progress();

        Ok(Self { inner, receiver })
    }

    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Receive and process signals until [`EngineHandle::shutdown`] is called.
    pub async fn run(self) {
        let SequenceEngine {
            inner,
            mut receiver,
        } = self;
        let mut shutdown = inner.shutdown.subscribe();

        debug!(prompts = inner.lock_state().sequence().len(), "Sequence engine running");

        while !*shutdown.borrow_and_update() {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                received = receiver.recv() => match received {
                    Ok(envelope) => inner.on_signal(envelope.signal).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        error!(skipped, "Sequence engine fell behind the bus, signals were lost");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }

        debug!("Sequence engine stopped");
    }

    /// Run the engine on the current tokio runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

/// Cloneable handle for starting and observing a [`SequenceEngine`].
#[derive(Clone)]
pub struct EngineHandle {
    inner: Arc<EngineInner>,
}

impl EngineHandle {
    /// Kick off the sequence by emitting `Evaluate` then `Resume`.
    ///
    /// A session can be started once; later calls fail with
    /// [`SequencerError::AlreadyStarted`] and emit nothing.
    pub fn start(&self, context: ContextToken) -> Result<()> {
        {
            let mut started = self.inner.lock_started();
            if let Some(existing) = started.as_ref() {
                warn!(
                    session_id = %existing.session_id,
                    "Sequence already started, ignoring second start"
                );
                return Err(SequencerError::AlreadyStarted(existing.session_id));
            }
            *started = Some(context.clone());
        }

        info!(
            session_id = %context.session_id,
            scope = %context.scope,
            "Starting prompt sequence"
        );

        emit(&self.inner.bus, Signal::evaluate(context.clone()));
        emit(&self.inner.bus, Signal::resume(context));
        self.inner.publish_progress();

        Ok(())
    }

    pub fn snapshot(&self) -> SequenceSnapshot {
        self.inner.snapshot()
    }

    /// Subscribe to progress snapshots, published after every handled signal.
    pub fn progress(&self) -> watch::Receiver<SequenceSnapshot> {
        self.inner.progress.subscribe()
    }

    /// Wait until the sequence is complete.
    ///
    /// Fails with [`SequencerError::EngineStopped`] if the engine is shut
    /// down first. Never returns if a presented prompt is never dismissed.
    pub async fn wait_for_completion(&self) -> Result<SequenceSnapshot> {
        let mut progress = self.progress();
        let mut shutdown = self.inner.shutdown.subscribe();

        tokio::select! {
            biased;
            snapshot = progress.wait_for(SequenceSnapshot::is_complete) => snapshot
                .map(|snapshot| SequenceSnapshot::clone(&snapshot))
                .map_err(|_| SequencerError::EngineStopped),
            _ = shutdown.wait_for(|stopped| *stopped) => Err(SequencerError::EngineStopped),
        }
    }

    /// Stop the engine's receive loop. Prompts already on screen are unaffected.
    pub fn shutdown(&self) {
        self.inner.shutdown.send_replace(true);
    }

    pub fn is_shut_down(&self) -> bool {
        *self.inner.shutdown.borrow()
    }

    /// The bus this engine listens on.
    pub fn bus(&self) -> &SignalBus {
        &self.inner.bus
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}
