use thiserror::Error;

use crate::domain::prompt::PromptId;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown prompt: {0}")]
    UnknownPrompt(String),

    #[error("Prompt appears more than once in sequence: {0}")]
    DuplicatePrompt(PromptId),
}
