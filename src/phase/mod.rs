//! Phase state machine
//!
//! A walkthrough moves through an ordered list of pedagogical phases, one
//! at a time, driven by the tick count. Nothing here knows about timers or
//! problem kinds: the sequencer is fed ticks and a gate decision, and
//! reports each transition exactly once.
//!
//! # Architecture
//!
//! - [`Phase`] - closed set of pedagogical steps
//! - [`Timeline`] - validated `(phase, start tick)` list for one problem
//! - [`PhaseSequencer`] - cursor over a timeline, single-step advance
//! - [`TickState`] - tick counter and pause flag owned by the session

pub mod sequencer;
pub mod state;
pub mod timeline;

pub use sequencer::{AdvanceCheck, PhaseSequencer};
pub use state::{Phase, PhaseChange, TickState};
pub use timeline::{Timeline, TimelineBuilder, TimelineEntry};
