//! Availability oracles decide whether a prompt may be shown right now.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sequencer_core::{ContextToken, PromptId};

use crate::error::OracleError;

/// Runtime check deciding whether a prompt is showable.
///
/// Answers need not be stable between calls. The engine asks about each
/// prompt at most once per session and treats any error as "unavailable".
#[async_trait]
pub trait AvailabilityOracle: Send + Sync {
    async fn is_available(
        &self,
        prompt: PromptId,
        context: &ContextToken,
    ) -> Result<bool, OracleError>;
}

/// Oracle with fixed answers, typically loaded from configuration.
///
/// Prompts without an answer are unavailable.
#[derive(Debug, Clone, Default)]
pub struct StaticOracle {
    answers: HashMap<PromptId, bool>,
    failing: HashSet<PromptId>,
}

impl StaticOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, prompt: PromptId, available: bool) -> Self {
        self.answers.insert(prompt, available);
        self
    }

    /// Make checks for `prompt` fail instead of answering.
    pub fn failing(mut self, prompt: PromptId) -> Self {
        self.failing.insert(prompt);
        self
    }

    pub fn answer(&self, prompt: PromptId) -> Option<bool> {
        self.answers.get(&prompt).copied()
    }
}

impl FromIterator<(PromptId, bool)> for StaticOracle {
    fn from_iter<I: IntoIterator<Item = (PromptId, bool)>>(iter: I) -> Self {
        Self {
            answers: iter.into_iter().collect(),
            failing: HashSet::new(),
        }
    }
}

#[async_trait]
impl AvailabilityOracle for StaticOracle {
    async fn is_available(
        &self,
        prompt: PromptId,
        _context: &ContextToken,
    ) -> Result<bool, OracleError> {
        if self.failing.contains(&prompt) {
            return Err(OracleError::check_failed(prompt, "configured to fail"));
        }
        Ok(self.answer(prompt).unwrap_or(false))
    }
}
