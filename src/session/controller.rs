//! The per-problem session controller.
//!
//! `SessionController` owns every piece of mutable state for one
//! walkthrough: the clock, the tick counter, the phase sequencer, the
//! derived-value strategy and the effect dispatcher. All mutation goes
//! through its methods, and one delivered tick always runs in the same
//! order: phase evaluation, then derived recomputation, then effect
//! dispatch.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Interval;
use tracing::{debug, info, trace, warn};

use crate::clock::{Clock, DEFAULT_TICK_PERIOD};
use crate::derive::{DerivedOutput, DerivedStrategy, TickContext};
use crate::effect::{Cue, CueTable, EffectDispatcher, SessionHooks};
use crate::error::{ConfigurationError, InvalidProblemError};
use crate::observability::metrics;
use crate::phase::{AdvanceCheck, Phase, PhaseChange, PhaseSequencer, TickState};
use crate::problem::{Pacing, Problem, ProblemKind, ProblemSpec};

// ============================================================================
// Configuration and status
// ============================================================================

/// Everything needed to create a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Problem to animate
    pub problem: ProblemSpec,
    /// Period between ticks
    pub tick_period: Duration,
    /// Whether the walkthrough plays; arms the clock on creation
    pub show_solution: bool,
    /// Whether tick delivery starts suspended
    pub paused: bool,
    /// Phase duration multiplier
    pub pacing: Pacing,
    /// Cue overrides
    pub cues: CueTable,
}

impl SessionConfig {
    /// Config with default playback settings: 100 ms ticks, solution shown,
    /// not paused, normal pacing, default cues.
    #[must_use]
    pub fn new(problem: ProblemSpec) -> Self {
        Self {
            problem,
            tick_period: DEFAULT_TICK_PERIOD,
            show_solution: true,
            paused: false,
            pacing: Pacing::NORMAL,
            cues: CueTable::default(),
        }
    }
}

/// Externally visible state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Valid problem, clock not running
    Idle,
    /// Clock running and delivering ticks
    Running,
    /// Clock running, delivery suspended
    Paused,
    /// Terminal phase reached
    Complete,
    /// Problem rejected; nothing will ever tick
    Invalid,
    /// Torn down; nothing will ever fire again
    TornDown,
}

impl SessionStatus {
    /// Whether no further tick can change the session.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Complete | Self::Invalid | Self::TornDown)
    }
}

/// Point-in-time view of a session for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Ticks delivered since the last reset
    pub tick: u64,
    /// Current phase; `None` for an invalid problem
    pub phase: Option<Phase>,
    /// Session status
    pub status: SessionStatus,
    /// Whether delivery is suspended
    pub paused: bool,
    /// Derived values for the current tick
    pub outputs: DerivedOutput,
    /// Explanation shown instead of the animation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_reason: Option<String>,
}

/// What a single delivered tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// The tick that was delivered
    pub tick: u64,
    /// Transition made on this tick, if any
    pub change: Option<PhaseChange>,
    /// Cue played for that transition
    pub cue: Option<Cue>,
    /// Whether this tick completed the walkthrough
    pub completed: bool,
}

// ============================================================================
// Engine
// ============================================================================

/// Validated problem with its sequencer and strategy.
#[derive(Debug)]
struct Engine {
    problem: Problem,
    sequencer: PhaseSequencer,
    strategy: Box<dyn DerivedStrategy>,
}

impl Engine {
    fn build(problem: Problem, pacing: Pacing) -> Result<Self, ConfigurationError> {
        let walkthrough = problem.walkthrough(pacing)?;
        Ok(Self {
            problem,
            sequencer: PhaseSequencer::new(walkthrough.timeline),
            strategy: walkthrough.strategy,
        })
    }

    fn compute(&mut self, tick: u64) -> DerivedOutput {
        self.strategy.compute(&context(&self.sequencer, tick))
    }
}

/// Result of validating the requested problem.
#[derive(Debug)]
enum Loaded {
    Ready(Engine),
    Invalid {
        kind: ProblemKind,
        error: InvalidProblemError,
    },
}

impl Loaded {
    fn load(spec: &ProblemSpec, pacing: Pacing) -> Result<Self, ConfigurationError> {
        match Problem::validate(spec) {
            Ok(problem) => {
                debug!(kind = %spec.kind, %problem, "problem validated");
                Ok(Self::Ready(Engine::build(problem, pacing)?))
            }
            Err(error) => {
                warn!(kind = %spec.kind, %error, "problem rejected");
                metrics::record_invalid_problem(spec.kind);
                Ok(Self::Invalid {
                    kind: spec.kind,
                    error,
                })
            }
        }
    }
}

fn context(sequencer: &PhaseSequencer, tick: u64) -> TickContext<'_> {
    TickContext {
        tick,
        phase: sequencer.current(),
        phase_index: sequencer.index(),
        entered_at: sequencer.entered_at(),
        phase_span: sequencer.phase_span(),
        timeline: sequencer.timeline(),
    }
}

// ============================================================================
// Controller
// ============================================================================

/// One running walkthrough.
#[derive(Debug)]
pub struct SessionController {
    pacing: Pacing,
    show_solution: bool,
    clock: Clock,
    state: TickState,
    loaded: Loaded,
    dispatcher: EffectDispatcher,
    outputs: DerivedOutput,
    alive: bool,
}

impl SessionController {
    /// Creates a session. An invalid problem does not fail construction;
    /// the session enters [`SessionStatus::Invalid`] and never ticks.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] for a zero tick period or a
    /// malformed timeline.
    pub fn new(config: SessionConfig, hooks: SessionHooks) -> Result<Self, ConfigurationError> {
        let mut clock = Clock::new(config.tick_period)?;
        clock.set_paused(config.paused);
        let loaded = Loaded::load(&config.problem, config.pacing)?;

        let mut session = Self {
            pacing: config.pacing,
            show_solution: config.show_solution,
            clock,
            state: TickState {
                current_tick: 0,
                paused: config.paused,
            },
            loaded,
            dispatcher: EffectDispatcher::new(config.cues, hooks),
            outputs: DerivedOutput::new(),
            alive: true,
        };
        metrics::session_opened();
        session.recompute();
        if session.show_solution {
            session.start();
        }
        Ok(session)
    }

    /// Arms the clock. A no-op for invalid, completed or torn-down sessions.
    pub fn start(&mut self) {
        if !self.alive || self.is_complete() {
            return;
        }
        if let Loaded::Ready(engine) = &self.loaded {
            info!(
                kind = %engine.problem.kind(),
                phases = engine.sequencer.timeline().len(),
                "session started"
            );
            self.clock.start();
        }
    }

    /// Handles one raw timer fire.
    ///
    /// Returns `None` when the fire was not delivered: the session is torn
    /// down, invalid, stopped, or paused.
    pub fn on_timer_fire(&mut self) -> Option<TickOutcome> {
        if !self.alive {
            return None;
        }
        let Loaded::Ready(engine) = &mut self.loaded else {
            return None;
        };
        if !self.clock.deliver() {
            return None;
        }

        let tick = self.state.advance();
        let kind = engine.problem.kind();
        metrics::record_tick(kind);
        trace!(tick, phase = %engine.sequencer.current(), "tick");

        let open = match engine.sequencer.check(tick) {
            AdvanceCheck::Due(next) => engine
                .strategy
                .gate_open(next.phase, &context(&engine.sequencer, tick)),
            AdvanceCheck::NotDue { .. } | AdvanceCheck::Terminal => true,
        };
        let change = engine.sequencer.evaluate(tick, |_| open);

        self.outputs = engine.compute(tick);

        let mut outcome = TickOutcome {
            tick,
            change,
            cue: None,
            completed: false,
        };
        if let Some(change) = change {
            info!(%kind, from = %change.from, to = %change.to, tick, "phase entered");
            metrics::record_phase_transition(kind, change.from, change.to);
            let dispatched = self.dispatcher.dispatch(&change);
            if let Some(cue) = dispatched.cue {
                metrics::record_cue(cue);
            }
            outcome.cue = dispatched.cue;
            outcome.completed = dispatched.completed;
            if dispatched.completed {
                metrics::record_completion(kind, tick);
            }
        }

        if engine.sequencer.is_terminal() {
            self.clock.stop();
        }
        Some(outcome)
    }

    /// Returns to tick 0 and the first phase, clears the completion flag
    /// and all strategy state. The clock is stopped; call [`start`] to
    /// play again. Calling it twice is the same as calling it once.
    ///
    /// [`start`]: Self::start
    pub fn reset(&mut self) {
        self.clock.stop();
        self.state.rewind();
        self.dispatcher.reset();
        if let Loaded::Ready(engine) = &mut self.loaded {
            engine.sequencer.reset();
            engine.strategy.reset();
        }
        metrics::record_reset();
        debug!("session reset");
        self.recompute();
    }

    /// Suspends or resumes tick delivery. Nothing else changes.
    pub const fn set_paused(&mut self, paused: bool) {
        self.state.paused = paused;
        self.clock.set_paused(paused);
    }

    /// Shows or hides the solution. Turning it on from off restarts the
    /// walkthrough from tick 0; turning it off stops the clock.
    pub fn set_show_solution(&mut self, show: bool) {
        let was = self.show_solution;
        self.show_solution = show;
        match (was, show) {
            (false, true) => {
                self.reset();
                self.start();
            }
            (true, false) => self.clock.stop(),
            _ => {}
        }
    }

    /// Replaces the problem and restarts from tick 0.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the new problem's timeline is
    /// malformed. The previous problem is kept in that case.
    pub fn set_problem(&mut self, problem: &ProblemSpec) -> Result<(), ConfigurationError> {
        if !self.alive {
            return Ok(());
        }
        let loaded = Loaded::load(problem, self.pacing)?;
        self.loaded = loaded;
        self.reset();
        if self.show_solution {
            self.start();
        }
        Ok(())
    }

    /// Stops the clock for good. No effect fires afterwards, even for a
    /// timer fire that was already scheduled. Idempotent.
    pub fn teardown(&mut self) {
        if !self.alive {
            return;
        }
        self.alive = false;
        self.clock.stop();
        metrics::session_closed();
        debug!(tick = self.state.current_tick, "session torn down");
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        if !self.alive {
            return SessionStatus::TornDown;
        }
        match &self.loaded {
            Loaded::Invalid { .. } => SessionStatus::Invalid,
            Loaded::Ready(engine) if engine.sequencer.is_terminal() => SessionStatus::Complete,
            Loaded::Ready(_) if !self.clock.is_running() => SessionStatus::Idle,
            Loaded::Ready(_) if self.clock.is_paused() => SessionStatus::Paused,
            Loaded::Ready(_) => SessionStatus::Running,
        }
    }

    /// Point-in-time view for rendering.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.state.current_tick,
            phase: self.phase(),
            status: self.status(),
            paused: self.state.paused,
            outputs: self.outputs.clone(),
            invalid_reason: self.invalid_reason().map(ToString::to_string),
        }
    }

    /// Current phase; `None` for an invalid problem.
    #[must_use]
    pub fn phase(&self) -> Option<Phase> {
        match &self.loaded {
            Loaded::Ready(engine) => Some(engine.sequencer.current()),
            Loaded::Invalid { .. } => None,
        }
    }

    /// Tick counter and pause flag.
    #[must_use]
    pub const fn tick_state(&self) -> TickState {
        self.state
    }

    /// Derived values for the current tick.
    #[must_use]
    pub const fn outputs(&self) -> &DerivedOutput {
        &self.outputs
    }

    /// Kind of the problem being shown.
    #[must_use]
    pub const fn kind(&self) -> ProblemKind {
        match &self.loaded {
            Loaded::Ready(engine) => engine.problem.kind(),
            Loaded::Invalid { kind, .. } => *kind,
        }
    }

    /// The validated problem, if it was valid.
    #[must_use]
    pub const fn problem(&self) -> Option<&Problem> {
        match &self.loaded {
            Loaded::Ready(engine) => Some(&engine.problem),
            Loaded::Invalid { .. } => None,
        }
    }

    /// Why the problem was rejected.
    #[must_use]
    pub const fn invalid_reason(&self) -> Option<&InvalidProblemError> {
        match &self.loaded {
            Loaded::Invalid { error, .. } => Some(error),
            Loaded::Ready(_) => None,
        }
    }

    /// Total ticks from reset to the terminal phase, ignoring gate holds.
    #[must_use]
    pub fn total_ticks(&self) -> Option<u64> {
        match &self.loaded {
            Loaded::Ready(engine) => Some(engine.sequencer.timeline().total_ticks()),
            Loaded::Invalid { .. } => None,
        }
    }

    /// Period between ticks.
    #[must_use]
    pub const fn tick_period(&self) -> Duration {
        self.clock.period()
    }

    /// Timer for this session's tick period.
    #[must_use]
    pub fn interval(&self) -> Interval {
        self.clock.interval()
    }

    /// Whether the clock is armed.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.alive && self.clock.is_running()
    }

    /// Whether the completion callback has fired in this run.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.dispatcher.completion().is_set()
    }

    fn is_complete(&self) -> bool {
        matches!(&self.loaded, Loaded::Ready(engine) if engine.sequencer.is_terminal())
    }

    fn recompute(&mut self) {
        self.outputs = match &mut self.loaded {
            Loaded::Ready(engine) => engine.compute(self.state.current_tick),
            Loaded::Invalid { .. } => DerivedOutput::new(),
        };
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.teardown();
    }
}
