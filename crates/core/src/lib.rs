//! Domain types shared by the prompt sequencer crates.
//!
//! Holds the closed set of prompts the sequencer can show and the opaque
//! context token that flows through signals, oracles and presenters.

pub mod domain;
pub mod error;

pub use domain::context::ContextToken;
pub use domain::prompt::{validate_sequence, PromptId};
pub use error::CoreError;
