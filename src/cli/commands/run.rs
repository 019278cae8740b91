//! `mathwalk run`
//!
//! Resolves the walkthrough (file, preset or inline problem), applies
//! command-line overrides, then plays it either in real time through the
//! session driver or, with `--instant`, by firing every tick back to back.

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::cli::args::{OutputFormat, RunArgs};
use crate::config::{
    ConfigLimits, ConfigLoader, LoadResult, LoaderOptions, Validator, WalkthroughConfig,
};
use crate::effect::{Cue, CueTable, SessionHooks};
use crate::error::{ConfigError, MathWalkError};
use crate::observability::{Event, EventEmitter, StopReason};
use crate::phase::{Phase, PhaseChange};
use crate::presets::resolve_preset;
use crate::problem::{ProblemKind, ProblemSpec};
use crate::session::{DriverOptions, SessionController, SessionStatus, Snapshot, spawn};

/// Play a walkthrough.
///
/// # Errors
///
/// Returns an error if the walkthrough cannot be loaded or assembled, or
/// [`MathWalkError::InvalidProblem`] after showing why the problem cannot
/// be animated.
pub async fn run(
    args: &RunArgs,
    quiet: bool,
    cancel: CancellationToken,
) -> Result<(), MathWalkError> {
    let mut config = load_walkthrough(args)?;
    apply_overrides(&mut config, args)?;

    if let Some(port) = args.metrics_port {
        crate::observability::init_metrics(Some(port))?;
        tracing::info!(port, "Prometheus metrics endpoint started");
    }

    let emitter = Arc::new(match &args.events_file {
        Some(path) if path.as_os_str() == "-" => EventEmitter::stderr(),
        Some(path) => EventEmitter::from_file(path)?,
        None => EventEmitter::noop(),
    });

    let mut session = config.session_config()?;
    if args.mute {
        session.cues = CueTable::muted();
    }

    let kind = config.problem.kind;
    let print_cues = args.format == OutputFormat::Human && !quiet;
    let hooks = build_hooks(&emitter, kind, print_cues);
    let controller = SessionController::new(session, hooks)?;
    let mut renderer = Renderer::new(args.format, quiet);

    if let Some(reason) = controller.invalid_reason().cloned() {
        renderer.rejected(&config.problem, &reason.to_string());
        emitter.emit(Event::ProblemRejected {
            timestamp: Utc::now(),
            kind,
            reason: reason.to_string(),
        });
        emitter.emit(Event::SessionStopped {
            timestamp: Utc::now(),
            reason: StopReason::Invalid,
            ticks: 0,
        });
        return Err(reason.into());
    }

    let problem = controller
        .problem()
        .map_or_else(|| kind.to_string(), ToString::to_string);
    let total_ticks = controller.total_ticks().unwrap_or_default();
    let tick_period = controller.tick_period();
    tracing::info!(%kind, %problem, total_ticks, "starting walkthrough");
    emitter.emit(Event::SessionStarted {
        timestamp: Utc::now(),
        kind,
        problem: problem.clone(),
        tick_period_ms: u64::try_from(tick_period.as_millis()).unwrap_or(u64::MAX),
        total_ticks,
    });
    renderer.header(&problem, kind, total_ticks, tick_period);

    let max_ticks = config.playback.max_ticks;
    let (reason, last) = if args.instant {
        play_instant(controller, max_ticks, &cancel, &mut renderer)
    } else {
        play_live(controller, max_ticks, &cancel, &mut renderer).await
    };

    renderer.footer(&last, reason);
    emitter.emit(Event::SessionStopped {
        timestamp: Utc::now(),
        reason,
        ticks: last.tick,
    });
    tracing::info!(%reason, ticks = last.tick, "walkthrough stopped");
    Ok(())
}

// ============================================================================
// Walkthrough resolution
// ============================================================================

/// Loads the walkthrough named by `--config`, `--preset` or `--kind`.
///
/// # Errors
///
/// Returns a usage error when no source is given, or the loader's error.
pub fn load_walkthrough(args: &RunArgs) -> Result<WalkthroughConfig, MathWalkError> {
    let loader = ConfigLoader::new(LoaderOptions {
        strict: args.strict,
        ..LoaderOptions::default()
    });

    if let Some(path) = &args.config {
        tracing::info!(config = %path.display(), "loading walkthrough");
        return Ok(unwrap_loaded(loader.load(path)?));
    }
    if let Some(name) = &args.preset {
        tracing::info!(preset = %name, "loading preset");
        return Ok(unwrap_loaded(resolve_preset(name)?.load(&loader)?));
    }
    if let Some(kind) = args.kind {
        return Ok(WalkthroughConfig::new(ProblemSpec::new(
            kind,
            args.operands.clone(),
        )));
    }
    Err(MathWalkError::Usage(
        "one of --config, --preset or --kind is required".into(),
    ))
}

fn unwrap_loaded(result: LoadResult) -> WalkthroughConfig {
    for warning in &result.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }
    Arc::unwrap_or_clone(result.config)
}

/// Applies command-line settings on top of the loaded walkthrough and
/// checks the merged playback settings against the loader's limits.
///
/// # Errors
///
/// Returns [`ConfigError::ValidationError`] when an override is out of range.
pub fn apply_overrides(
    config: &mut WalkthroughConfig,
    args: &RunArgs,
) -> Result<(), ConfigError> {
    for (name, value) in &args.flags {
        config
            .problem
            .params
            .flags
            .insert(name.clone(), value.clone());
    }
    if let Some(period) = args.tick_period {
        config.playback.tick_period = period;
    }
    if let Some(pacing) = args.pacing {
        config.playback.pacing = pacing;
    }
    if args.max_ticks.is_some() {
        config.playback.max_ticks = args.max_ticks;
    }
    // The CLI always plays from the start.
    config.playback.show_solution = true;
    config.playback.paused = false;

    let result =
        Validator::new().validate_playback_only(&config.playback, &ConfigLimits::default());
    if result.has_errors() {
        for issue in &result.errors {
            tracing::error!(path = %issue.path, "{}", issue.message);
        }
        return Err(ConfigError::ValidationError {
            path: "command line".to_string(),
            errors: result.errors,
        });
    }
    Ok(())
}

fn build_hooks(emitter: &Arc<EventEmitter>, kind: ProblemKind, print_cues: bool) -> SessionHooks {
    let on_cue = Arc::clone(emitter);
    let on_change = Arc::clone(emitter);
    let on_complete = Arc::clone(emitter);

    SessionHooks::new()
        .audio(move |cue: Cue, phase: Phase| {
            if print_cues {
                println!("        ♪ {cue}");
            }
            on_cue.emit(Event::CuePlayed {
                timestamp: Utc::now(),
                cue,
                phase,
            });
        })
        .on_phase_change(move |change: &PhaseChange| {
            on_change.emit(Event::PhaseEntered {
                timestamp: Utc::now(),
                from: change.from,
                phase: change.to,
                phase_index: change.index,
                tick: change.tick,
            });
        })
        .on_complete(move || {
            on_complete.emit(Event::WalkthroughCompleted {
                timestamp: Utc::now(),
                kind,
            });
        })
}

// ============================================================================
// Playback
// ============================================================================

/// Fires ticks back to back without a timer.
fn play_instant(
    mut controller: SessionController,
    max_ticks: Option<u64>,
    cancel: &CancellationToken,
    renderer: &mut Renderer,
) -> (StopReason, Snapshot) {
    renderer.frame(&controller.snapshot());

    let reason = loop {
        if controller.status() == SessionStatus::Complete {
            break StopReason::Completed;
        }
        if max_ticks.is_some_and(|max| controller.tick_state().current_tick >= max) {
            break StopReason::TickLimit;
        }
        if cancel.is_cancelled() {
            break StopReason::Cancelled;
        }
        if controller.on_timer_fire().is_none() {
            break StopReason::TornDown;
        }
        renderer.frame(&controller.snapshot());
    };

    controller.teardown();
    (reason, controller.snapshot())
}

/// Runs the session on the driver and renders each published snapshot.
async fn play_live(
    controller: SessionController,
    max_ticks: Option<u64>,
    cancel: &CancellationToken,
    renderer: &mut Renderer,
) -> (StopReason, Snapshot) {
    let handle = spawn(
        controller,
        DriverOptions {
            stop_when_final: true,
            max_ticks,
        },
    );
    let mut snapshots = handle.subscribe();
    renderer.frame(&snapshots.borrow_and_update());

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                renderer.frame(&snapshot);
            }
            () = cancel.cancelled() => {
                handle.cancel();
                break;
            }
        }
    }

    let last = handle.snapshot();
    (handle.join().await, last)
}

// ============================================================================
// Rendering
// ============================================================================

/// Writes frames to stdout: one line per phase in human mode, one JSON
/// snapshot per tick in JSON mode.
#[derive(Debug)]
struct Renderer {
    format: OutputFormat,
    quiet: bool,
    last_phase: Option<Phase>,
    last_tick: Option<u64>,
}

impl Renderer {
    const fn new(format: OutputFormat, quiet: bool) -> Self {
        Self {
            format,
            quiet,
            last_phase: None,
            last_tick: None,
        }
    }

    fn header(
        &self,
        problem: &str,
        kind: ProblemKind,
        total_ticks: u64,
        period: std::time::Duration,
    ) {
        if self.format == OutputFormat::Human && !self.quiet {
            println!(
                "{problem}  ({kind}, {total_ticks} ticks at {})",
                humantime::format_duration(period)
            );
        }
    }

    fn frame(&mut self, snapshot: &Snapshot) {
        if self.quiet || self.last_tick == Some(snapshot.tick) {
            return;
        }
        self.last_tick = Some(snapshot.tick);

        match self.format {
            OutputFormat::Json => match serde_json::to_string(snapshot) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, "failed to serialize snapshot"),
            },
            OutputFormat::Human => {
                if snapshot.phase == self.last_phase {
                    return;
                }
                self.last_phase = snapshot.phase;
                if let Some(phase) = snapshot.phase {
                    println!(
                        "  [{:>4}] {:<20} {}",
                        snapshot.tick,
                        phase,
                        format_outputs(snapshot)
                    );
                }
            }
        }
    }

    fn footer(&self, last: &Snapshot, reason: StopReason) {
        if self.format != OutputFormat::Human || self.quiet {
            return;
        }
        match reason {
            StopReason::Completed => {
                println!("  ✓ complete after {} ticks: {}", last.tick, format_outputs(last));
            }
            other => println!("  stopped at tick {} ({other})", last.tick),
        }
    }

    fn rejected(&self, problem: &ProblemSpec, reason: &str) {
        match self.format {
            OutputFormat::Human => {
                let operands: Vec<String> = problem
                    .params
                    .operands
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                println!(
                    "{} [{}] cannot be animated",
                    problem.kind,
                    operands.join(", ")
                );
                println!("  {reason}");
            }
            OutputFormat::Json => {
                let panel = serde_json::json!({
                    "status": SessionStatus::Invalid,
                    "kind": problem.kind,
                    "operands": problem.params.operands,
                    "invalid_reason": reason,
                });
                println!("{panel}");
            }
        }
    }
}

fn format_outputs(snapshot: &Snapshot) -> String {
    snapshot
        .outputs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}
