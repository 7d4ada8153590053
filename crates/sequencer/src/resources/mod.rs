//! RAII guards tying signal obligations to scopes.
//!
//! - [`DismissGuard`] - Emits the presenter's `Evaluate` / `Resume` pair
//! - [`SessionGuard`] - Stops the engine when a sequencing session ends

mod dismiss_guard;
mod session_guard;

pub use dismiss_guard::DismissGuard;
pub use session_guard::SessionGuard;
