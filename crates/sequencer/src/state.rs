//! Cursor bookkeeping for one sequencing session.
//!
//! `SequenceState` is plain data: it knows nothing about signals, oracles or
//! presenters. The engine feeds it availability answers and asks it which
//! prompt to show next.

use sequencer_core::{validate_sequence, CoreError, PromptId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceState {
    sequence: Vec<PromptId>,
    /// Next position in `sequence` whose availability is unknown
    evaluation_cursor: usize,
    /// Prompts confirmed available, in sequence order
    available: Vec<PromptId>,
    /// Next position in `available` to present
    presentation_cursor: usize,
}

impl SequenceState {
    pub fn new(sequence: Vec<PromptId>) -> Result<Self, CoreError> {
        validate_sequence(&sequence)?;
        Ok(Self {
            sequence,
            evaluation_cursor: 0,
            available: Vec::new(),
            presentation_cursor: 0,
        })
    }

    /// The prompt at the evaluation cursor, if the scan has not reached the end.
    pub fn next_unchecked(&self) -> Option<PromptId> {
        self.sequence.get(self.evaluation_cursor).copied()
    }

    /// Record the availability answer for the prompt at the evaluation cursor.
    ///
    /// Moves the cursor past that prompt either way; an unavailable prompt is
    /// never looked at again. Returns the prompt the answer applied to.
    pub fn record_availability(&mut self, available: bool) -> Option<PromptId> {
        let prompt = self.next_unchecked()?;
        self.evaluation_cursor += 1;
        if available {
            self.available.push(prompt);
        }
        Some(prompt)
    }

    /// Take the next available prompt to present and advance past it.
    pub fn take_next_presentation(&mut self) -> Option<PromptId> {
        let prompt = self.available.get(self.presentation_cursor).copied()?;
        self.presentation_cursor += 1;
        Some(prompt)
    }

    pub fn sequence(&self) -> &[PromptId] {
        &self.sequence
    }

    pub fn evaluation_cursor(&self) -> usize {
        self.evaluation_cursor
    }

    pub fn available(&self) -> &[PromptId] {
        &self.available
    }

    pub fn presentation_cursor(&self) -> usize {
        self.presentation_cursor
    }

    /// Whether every prompt in the sequence has been checked.
    pub fn is_exhausted(&self) -> bool {
        self.evaluation_cursor == self.sequence.len()
    }

    /// Number of available prompts not yet presented.
    pub fn pending_presentations(&self) -> usize {
        self.available.len() - self.presentation_cursor
    }
}
