//! Walkthrough sessions
//!
//! [`SessionController`] is the synchronous core: it composes the clock,
//! sequencer, derived-value strategy and effect dispatcher and can be driven
//! by hand, one timer fire at a time. [`driver::spawn`] runs a controller on
//! its own tokio task for real-time playback.

pub mod controller;
pub mod driver;

pub use controller::{SessionConfig, SessionController, SessionStatus, Snapshot, TickOutcome};
pub use driver::{DriverOptions, SessionCommand, SessionHandle, spawn};
