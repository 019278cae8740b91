//! Side effects synchronized with phase transitions
//!
//! Every transition produces exactly one cue lookup and one
//! `on_phase_change` call. Entering the terminal phase additionally calls
//! `on_complete`, guarded by a [`CompletionFlag`] so it runs at most once per
//! run no matter how the clock is stopped and restarted. Nothing fires while
//! the session is paused.

use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::phase::{Phase, PhaseChange};

// ============================================================================
// Cues
// ============================================================================

/// Short sound played on a phase transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// Light pop, for a new item appearing
    Pop,
    /// Sweep, for things moving into place
    Whoosh,
    /// Tick, for a discrete step
    Click,
    /// Bell, for a result appearing
    Chime,
    /// Fanfare, for completion
    Success,
}

impl Cue {
    /// Stable `snake_case` name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pop => "pop",
            Self::Whoosh => "whoosh",
            Self::Click => "click",
            Self::Chime => "chime",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default cue for every phase.
static DEFAULT_CUES: LazyLock<IndexMap<Phase, Option<Cue>>> = LazyLock::new(|| {
    Phase::ALL
        .iter()
        .map(|phase| (*phase, default_cue(*phase)))
        .collect()
});

const fn default_cue(phase: Phase) -> Option<Cue> {
    match phase {
        Phase::Setup => None,
        Phase::Identify | Phase::ShowDigits | Phase::Search => Some(Cue::Pop),
        Phase::ExpandedForm
        | Phase::ConvertFractions
        | Phase::FlipDivisor
        | Phase::Distribute
        | Phase::Approach
        | Phase::ShrinkInterval => Some(Cue::Whoosh),
        Phase::FindLcd
        | Phase::Multiply
        | Phase::CombineNumerators
        | Phase::Remainder
        | Phase::Substitute
        | Phase::DrawSecant
        | Phase::NotFactorable => Some(Cue::Click),
        Phase::Simplify | Phase::Factored | Phase::Roots => Some(Cue::Chime),
        Phase::Complete => Some(Cue::Success),
    }
}

/// Phase-to-cue mapping: the defaults plus per-session overrides.
///
/// An override of `None` mutes that phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueTable {
    overrides: IndexMap<Phase, Option<Cue>>,
}

impl CueTable {
    /// Table with overrides applied on top of the defaults.
    #[must_use]
    pub const fn with_overrides(overrides: IndexMap<Phase, Option<Cue>>) -> Self {
        Self { overrides }
    }

    /// Table that plays nothing.
    #[must_use]
    pub fn muted() -> Self {
        Self {
            overrides: Phase::ALL.iter().map(|p| (*p, None)).collect(),
        }
    }

    /// Cue for entering `phase`.
    #[must_use]
    pub fn cue_for(&self, phase: Phase) -> Option<Cue> {
        match self.overrides.get(&phase) {
            Some(cue) => *cue,
            None => DEFAULT_CUES.get(&phase).copied().flatten(),
        }
    }
}

// ============================================================================
// Sinks and hooks
// ============================================================================

/// Receiver for cues. Implemented for any `FnMut(Cue, Phase) + Send`.
pub trait AudioSink: Send {
    /// Plays `cue` for the transition into `phase`.
    fn play(&mut self, cue: Cue, phase: Phase);
}

impl<F> AudioSink for F
where
    F: FnMut(Cue, Phase) + Send,
{
    fn play(&mut self, cue: Cue, phase: Phase) {
        self(cue, phase);
    }
}

/// Sink that discards every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self, _cue: Cue, _phase: Phase) {}
}

type PhaseHook = Box<dyn FnMut(&PhaseChange) + Send>;
type CompleteHook = Box<dyn FnMut() + Send>;

/// Callbacks a consumer attaches to a session.
pub struct SessionHooks {
    audio: Box<dyn AudioSink>,
    on_phase_change: Option<PhaseHook>,
    on_complete: Option<CompleteHook>,
}

impl fmt::Debug for SessionHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHooks")
            .field("on_phase_change", &self.on_phase_change.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for SessionHooks {
    fn default() -> Self {
        Self {
            audio: Box::new(NullSink),
            on_phase_change: None,
            on_complete: None,
        }
    }
}

impl SessionHooks {
    /// Hooks that do nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cue sink.
    #[must_use]
    pub fn audio(mut self, sink: impl AudioSink + 'static) -> Self {
        self.audio = Box::new(sink);
        self
    }

    /// Sets the per-transition callback.
    #[must_use]
    pub fn on_phase_change(mut self, hook: impl FnMut(&PhaseChange) + Send + 'static) -> Self {
        self.on_phase_change = Some(Box::new(hook));
        self
    }

    /// Sets the completion callback.
    #[must_use]
    pub fn on_complete(mut self, hook: impl FnMut() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(hook));
        self
    }
}

// ============================================================================
// Completion flag
// ============================================================================

/// Set once when a run reaches its terminal phase; cleared only by reset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompletionFlag(bool);

impl CompletionFlag {
    /// Sets the flag. Returns `true` only if it was not already set.
    pub const fn try_set(&mut self) -> bool {
        if self.0 {
            false
        } else {
            self.0 = true;
            true
        }
    }

    /// Whether the flag is set.
    #[must_use]
    pub const fn is_set(self) -> bool {
        self.0
    }

    /// Clears the flag.
    pub const fn clear(&mut self) {
        self.0 = false;
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// What a dispatch actually did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dispatched {
    /// Cue that was played, if any
    pub cue: Option<Cue>,
    /// Whether the completion callback ran
    pub completed: bool,
}

/// Fires cues and callbacks for phase transitions.
#[derive(Debug)]
pub struct EffectDispatcher {
    cues: CueTable,
    hooks: SessionHooks,
    completion: CompletionFlag,
}

impl EffectDispatcher {
    /// Creates a dispatcher.
    #[must_use]
    pub const fn new(cues: CueTable, hooks: SessionHooks) -> Self {
        Self {
            cues,
            hooks,
            completion: CompletionFlag(false),
        }
    }

    /// Fires the effects of `change`. Only called for delivered ticks, so
    /// pausing is already handled by the clock.
    pub fn dispatch(&mut self, change: &PhaseChange) -> Dispatched {
        let cue = self.cues.cue_for(change.to);
        if let Some(cue) = cue {
            debug!(%cue, phase = %change.to, "playing cue");
            self.hooks.audio.play(cue, change.to);
        }

        if let Some(hook) = self.hooks.on_phase_change.as_mut() {
            hook(change);
        }

        let mut completed = false;
        if change.to.is_terminal() && self.completion.try_set() {
            info!(tick = change.tick, "walkthrough complete");
            if let Some(hook) = self.hooks.on_complete.as_mut() {
                hook();
            }
            completed = true;
        }

        Dispatched { cue, completed }
    }

    /// Completion state of the current run.
    #[must_use]
    pub const fn completion(&self) -> CompletionFlag {
        self.completion
    }

    /// Clears the completion flag for a new run.
    pub const fn reset(&mut self) {
        self.completion.clear();
    }
}
