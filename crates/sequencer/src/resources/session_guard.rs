//! RAII guard for one sequencing session.
//!
//! A session starts when the guard is created and ends when it is finished
//! or dropped. Either way the engine task is told to stop, so per-session
//! state never outlives the session.

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use sequencer_core::ContextToken;

use crate::engine::{EngineHandle, SequenceEngine, SequenceSnapshot};
use crate::error::Result;

/// Owns a running engine for the duration of one session.
///
/// # Example
///
/// ```ignore
/// let engine = SequenceEngine::new(bus, config, oracle, presenter)?;
/// let session = SessionGuard::start(engine, ContextToken::new("home"))?;
/// let snapshot = session.finish().await?;
/// ```
pub struct SessionGuard {
    handle: EngineHandle,
    context: ContextToken,
    task: Option<JoinHandle<()>>,
    finished: bool,
}

impl SessionGuard {
    /// Start the sequence and spawn the engine on the current runtime.
    pub fn start(engine: SequenceEngine, context: ContextToken) -> Result<Self> {
        let handle = engine.handle();
        handle.start(context.clone())?;
        let task = engine.spawn();

        debug!(
            session_id = %context.session_id,
            "Session guard created"
        );

        Ok(Self {
            handle,
            context,
            task: Some(task),
            finished: false,
        })
    }

    /// Wait for the sequence to complete, then stop the engine.
    pub async fn finish(mut self) -> Result<SequenceSnapshot> {
        let snapshot = self.handle.wait_for_completion().await?;
        self.finished = true;
        self.handle.shutdown();

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Sequence engine task ended abnormally");
            }
        }

        debug!(
            session_id = %self.context.session_id,
            presented = snapshot.presentation_cursor,
            "Session finished"
        );

        Ok(snapshot)
    }

    pub fn handle(&self) -> &EngineHandle {
        &self.handle
    }

    pub fn context(&self) -> &ContextToken {
        &self.context
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if !self.finished {
            warn!(
                session_id = %self.context.session_id,
                snapshot = ?self.handle.snapshot(),
                "Session ended before the sequence completed"
            );
        }
        self.handle.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::oracle::StaticOracle;
    use crate::presenter::Presenter;
    use crate::error::PresentError;
    use async_trait::async_trait;
    use events::SignalBus;
    use sequencer_core::PromptId;
    use std::sync::Arc;

    struct NeverPresenter;

    #[async_trait]
    impl Presenter for NeverPresenter {
        async fn present(
            &self,
            _prompt: PromptId,
            _context: ContextToken,
        ) -> std::result::Result<(), PresentError> {
            Ok(())
        }
    }

    fn engine(oracle: StaticOracle) -> SequenceEngine {
        SequenceEngine::new(
            SignalBus::new(),
            EngineConfig::default(),
            Arc::new(oracle),
            Arc::new(NeverPresenter),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_finish_empty_sequence() {
        let session = SessionGuard::start(engine(StaticOracle::new()), ContextToken::new("test"))
            .unwrap();
        assert!(!session.is_finished());
        let handle = session.handle().clone();

        let snapshot = session.finish().await.unwrap();
        assert!(snapshot.is_complete());
        assert!(snapshot.available.is_empty());
        assert!(handle.is_shut_down());
    }

    #[tokio::test]
    async fn test_drop_shuts_engine_down() {
        let oracle = StaticOracle::new().with(PromptId::RateApp, true);
        let session = SessionGuard::start(engine(oracle), ContextToken::new("test")).unwrap();
        let handle = session.handle().clone();
        assert_eq!(session.context().scope, "test");

        drop(session);
        assert!(handle.is_shut_down());
    }
}
