//! Shared integration-test helpers: building sessions, playing them to the
//! end, and running the `mathwalk` binary.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};

use mathwalk::effect::SessionHooks;
use mathwalk::problem::{ProblemKind, ProblemSpec};
use mathwalk::session::{SessionConfig, SessionController, Snapshot, TickOutcome};

/// Upper bound on ticks for any walkthrough in these tests.
pub const TICK_BUDGET: usize = 10_000;

/// Session for `kind` with default playback and no hooks.
#[allow(clippy::missing_panics_doc)]
pub fn session(kind: ProblemKind, operands: &[f64]) -> SessionController {
    session_for(ProblemSpec::new(kind, operands.to_vec()), SessionHooks::new())
}

/// Session for a full spec with the given hooks.
#[allow(clippy::missing_panics_doc)]
pub fn session_for(spec: ProblemSpec, hooks: SessionHooks) -> SessionController {
    SessionController::new(SessionConfig::new(spec), hooks).expect("session should assemble")
}

/// Fires ticks until the session completes, collecting a snapshot after
/// every delivered tick.
#[allow(clippy::missing_panics_doc)]
pub fn play_to_end(controller: &mut SessionController) -> Vec<(TickOutcome, Snapshot)> {
    let mut frames = Vec::new();
    while !controller.is_completed() {
        let outcome = controller
            .on_timer_fire()
            .expect("running session should deliver");
        frames.push((outcome, controller.snapshot()));
        assert!(
            frames.len() < TICK_BUDGET,
            "walkthrough did not complete within {TICK_BUDGET} ticks"
        );
    }
    frames
}

/// Runs the `mathwalk` binary and waits for it.
pub struct MathWalkProcess;

impl MathWalkProcess {
    /// Runs a CLI command and returns its output.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_command(args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_mathwalk"))
            .args(args)
            .env_remove("MATHWALK_CONFIG")
            .env_remove("MATHWALK_EVENTS_FILE")
            .env_remove("MATHWALK_METRICS_PORT")
            .env_remove("MATHWALK_TICK_PERIOD")
            .output()
            .expect("failed to run mathwalk")
    }

    /// Absolute path of a file under `tests/fixtures`.
    pub fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }
}
