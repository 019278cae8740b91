//! Single-step phase sequencer.
//!
//! The sequencer is a cursor over a [`Timeline`]. On each delivered tick it
//! checks the next phase's threshold and, when it is due and the caller's
//! gate agrees, advances by exactly one phase. Thresholds use `>=`, so a
//! phase held back by a closed gate is entered on the first tick the gate
//! opens.

use tracing::{debug, trace};

use super::state::{Phase, PhaseChange};
use super::timeline::{Timeline, TimelineEntry};

/// Outcome of checking the next threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceCheck {
    /// The next phase's threshold has been reached
    Due(TimelineEntry),
    /// The next phase starts in `remaining` ticks
    NotDue {
        /// Upcoming phase
        next: Phase,
        /// Ticks until its threshold
        remaining: u64,
    },
    /// Already in the terminal phase
    Terminal,
}

/// Cursor over a timeline.
#[derive(Debug, Clone)]
pub struct PhaseSequencer {
    timeline: Timeline,
    index: usize,
    entered_at: u64,
}

impl PhaseSequencer {
    /// Creates a sequencer positioned on the first phase at tick 0.
    #[must_use]
    pub const fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            index: 0,
            entered_at: 0,
        }
    }

    /// The timeline being walked.
    #[must_use]
    pub const fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Current phase.
    #[must_use]
    pub fn current(&self) -> Phase {
        self.timeline.entries()[self.index].phase
    }

    /// Position of the current phase in the timeline.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Tick on which the current phase was entered.
    #[must_use]
    pub const fn entered_at(&self) -> u64 {
        self.entered_at
    }

    /// Whether the terminal phase has been reached.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.current().is_terminal()
    }

    /// Entry of the phase after the current one.
    #[must_use]
    pub fn next_entry(&self) -> Option<&TimelineEntry> {
        self.timeline.get(self.index + 1)
    }

    /// Nominal span of the current phase, `None` once terminal.
    #[must_use]
    pub fn phase_span(&self) -> Option<u64> {
        self.timeline.span_at(self.index)
    }

    /// Checks the next threshold against `tick` without advancing.
    #[must_use]
    pub fn check(&self, tick: u64) -> AdvanceCheck {
        match self.next_entry() {
            None => AdvanceCheck::Terminal,
            Some(next) if tick >= next.starts_at => AdvanceCheck::Due(*next),
            Some(next) => AdvanceCheck::NotDue {
                next: next.phase,
                remaining: next.starts_at - tick,
            },
        }
    }

    /// Advances at most one phase.
    ///
    /// `gate` is consulted only when the next threshold is due; it receives
    /// the upcoming phase and may hold the sequencer where it is.
    pub fn evaluate(&mut self, tick: u64, gate: impl FnOnce(Phase) -> bool) -> Option<PhaseChange> {
        let AdvanceCheck::Due(next) = self.check(tick) else {
            return None;
        };

        if !gate(next.phase) {
            debug!(
                phase = %self.current(),
                next = %next.phase,
                tick,
                "threshold reached but gate closed; holding"
            );
            return None;
        }

        let from = self.current();
        self.index += 1;
        self.entered_at = tick;
        debug_assert!(self.index < self.timeline.len());
        trace!(%from, to = %next.phase, tick, "sequencer advanced");

        Some(PhaseChange {
            from,
            to: next.phase,
            index: self.index,
            tick,
        })
    }

    /// Returns to the first phase at tick 0.
    pub const fn reset(&mut self) {
        self.index = 0;
        self.entered_at = 0;
    }
}
