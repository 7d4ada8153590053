//! Signal bus for the prompt sequencer
//!
//! This crate provides the in-process bus and the signal types that the
//! sequence engine and presenters exchange.

mod bus;
mod types;

pub use bus::{emit, SignalBus};
pub use types::*;
