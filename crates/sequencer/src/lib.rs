//! Sequencing engine for interruptive prompts.
//!
//! The engine shows at most one prompt at a time, in declared order, and only
//! the prompts an [`AvailabilityOracle`] reports as available. It is driven
//! entirely by `Evaluate` and `Resume` signals on an [`events::SignalBus`]:
//!
//! - [`SequenceEngine`] - Owns the cursors and the signal queue, drains it
//! - [`AvailabilityOracle`] - Decides whether a prompt may be shown
//! - [`Presenter`] - Puts a prompt on screen and reports its dismissal
//! - [`DismissGuard`] - Presenter helper that emits the required signals
//! - [`SessionGuard`] - Ties one engine task to one sequencing session

pub mod engine;
pub mod error;
pub mod oracle;
pub mod presenter;
pub mod queue;
pub mod resources;
pub mod state;

pub use engine::{EngineConfig, EngineHandle, SequenceEngine, SequenceSnapshot};
pub use error::{OracleError, PresentError, Result, SequencerError};
pub use oracle::{AvailabilityOracle, StaticOracle};
pub use presenter::Presenter;
pub use queue::{DrainGuard, EngineSignal, SignalQueue};
pub use resources::{DismissGuard, SessionGuard};
pub use state::SequenceState;
