//! Walkthrough files
//!
//! Loading and validation of YAML walkthrough files: the problem to
//! animate, playback timing and cue overrides.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLimits, ConfigLoader, LoadResult, LoadWarning, LoaderOptions};
pub use schema::{Playback, WalkthroughConfig};
pub use validation::{ValidationResult, Validator, suggest};
