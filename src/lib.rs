//! `mathwalk` - tick-driven phased walkthroughs of math problems
//!
//! A [`session::SessionController`] turns a validated problem into a
//! fixed timeline of named phases, advances through it one clock tick at
//! a time, recomputes the values to draw on every tick, and fires a cue
//! on each phase change. The CLI in [`cli`] plays walkthroughs from YAML
//! files, built-in presets or inline problems.

pub mod cli;
pub mod clock;
pub mod config;
pub mod derive;
pub mod effect;
pub mod error;
pub mod math;
pub mod observability;
pub mod phase;
pub mod presets;
pub mod problem;
pub mod session;
