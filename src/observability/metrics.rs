//! Metrics collection for walkthrough sessions.
//!
//! Provides Prometheus-compatible metrics and typed convenience functions
//! for recording measurements. Every label value comes from a closed enum
//! (`ProblemKind`, `Phase`, `Cue`), so label cardinality is bounded by
//! construction.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::effect::Cue;
use crate::error::MathWalkError;
use crate::phase::Phase;
use crate::problem::ProblemKind;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without
/// an HTTP endpoint.
///
/// # Errors
///
/// Returns `MathWalkError::Io` if the recorder or HTTP listener
/// cannot be installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), MathWalkError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| MathWalkError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

/// Registers metric descriptions with the global recorder.
fn describe_metrics() {
    describe_counter!("mathwalk_ticks_total", "Ticks delivered to sessions");
    describe_counter!(
        "mathwalk_phase_transitions_total",
        "Phase transitions by problem kind"
    );
    describe_counter!("mathwalk_cues_total", "Sound cues played");
    describe_counter!(
        "mathwalk_completions_total",
        "Walkthroughs that reached their terminal phase"
    );
    describe_counter!(
        "mathwalk_invalid_problems_total",
        "Problems rejected before any ticking"
    );
    describe_counter!("mathwalk_resets_total", "Session resets");
    describe_gauge!("mathwalk_sessions_active", "Sessions not yet torn down");
    describe_histogram!(
        "mathwalk_ticks_to_complete",
        "Ticks from reset to the terminal phase"
    );
}

/// Records one delivered tick.
pub fn record_tick(kind: ProblemKind) {
    counter!("mathwalk_ticks_total", "kind" => kind.as_str()).increment(1);
}

/// Records a phase transition.
pub fn record_phase_transition(kind: ProblemKind, from: Phase, to: Phase) {
    counter!(
        "mathwalk_phase_transitions_total",
        "kind" => kind.as_str(),
        "from" => from.as_str(),
        "to" => to.as_str(),
    )
    .increment(1);
}

/// Records a played cue.
pub fn record_cue(cue: Cue) {
    counter!("mathwalk_cues_total", "cue" => cue.as_str()).increment(1);
}

/// Records a completed walkthrough and how many ticks it took.
#[allow(clippy::cast_precision_loss)]
pub fn record_completion(kind: ProblemKind, ticks: u64) {
    counter!("mathwalk_completions_total", "kind" => kind.as_str()).increment(1);
    histogram!("mathwalk_ticks_to_complete", "kind" => kind.as_str()).record(ticks as f64);
}

/// Records a rejected problem.
pub fn record_invalid_problem(kind: ProblemKind) {
    counter!("mathwalk_invalid_problems_total", "kind" => kind.as_str()).increment(1);
}

/// Records a reset.
pub fn record_reset() {
    counter!("mathwalk_resets_total").increment(1);
}

/// Records a session being created.
pub fn session_opened() {
    gauge!("mathwalk_sessions_active").increment(1.0);
}

/// Records a session being torn down.
pub fn session_closed() {
    gauge!("mathwalk_sessions_active").decrement(1.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        // metrics macros silently no-op when no global recorder is installed
        record_tick(ProblemKind::Division);
        record_phase_transition(ProblemKind::Division, Phase::Setup, Phase::Distribute);
        record_cue(Cue::Whoosh);
        record_completion(ProblemKind::Division, 84);
        record_invalid_problem(ProblemKind::Factoring);
        record_reset();
        session_opened();
        session_closed();
    }
}
