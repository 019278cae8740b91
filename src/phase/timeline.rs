//! Declarative phase timelines.
//!
//! A [`Timeline`] lists the phases of one walkthrough together with the tick
//! at which each one begins. It is validated once at construction, so the
//! sequencer can rely on its ordering without re-checking.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::ConfigurationError;

use super::state::Phase;

/// One phase and the tick at which it begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    /// The phase
    pub phase: Phase,
    /// First tick on which the phase is current
    pub starts_at: u64,
}

/// Validated, ordered list of phases for one walkthrough.
///
/// Guarantees:
/// - at least one entry, the first starting at tick 0
/// - strictly increasing start ticks
/// - no phase listed twice
/// - [`Phase::Complete`] is the last entry and appears nowhere else
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    /// Validates and wraps a list of entries.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] describing the first violated
    /// ordering rule.
    pub fn new(entries: Vec<TimelineEntry>) -> Result<Self, ConfigurationError> {
        let first = entries.first().ok_or(ConfigurationError::EmptyTimeline)?;
        if first.starts_at != 0 {
            return Err(ConfigurationError::FirstPhaseNotAtZero {
                phase: first.phase,
                starts_at: first.starts_at,
            });
        }

        let mut seen = HashSet::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if !seen.insert(entry.phase) {
                return Err(ConfigurationError::DuplicatePhase(entry.phase));
            }
            if index > 0 {
                let previous = entries[index - 1].starts_at;
                if entry.starts_at <= previous {
                    return Err(ConfigurationError::NonIncreasingThreshold {
                        phase: entry.phase,
                        starts_at: entry.starts_at,
                        previous,
                    });
                }
            }
            if entry.phase.is_terminal() && index + 1 != entries.len() {
                return Err(ConfigurationError::EarlyTerminal { index });
            }
        }

        // Non-empty was checked above.
        let last = entries[entries.len() - 1].phase;
        if !last.is_terminal() {
            return Err(ConfigurationError::MissingTerminal { last });
        }

        Ok(Self { entries })
    }

    /// Starts a builder whose first phase begins at tick 0.
    #[must_use]
    pub fn builder() -> TimelineBuilder {
        TimelineBuilder::default()
    }

    /// All entries in order.
    #[must_use]
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// Number of phases, including the terminal one.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TimelineEntry> {
        self.entries.get(index)
    }

    /// First phase.
    #[must_use]
    pub fn first_phase(&self) -> Phase {
        self.entries[0].phase
    }

    /// Position of `phase`, if the timeline contains it.
    #[must_use]
    pub fn position(&self, phase: Phase) -> Option<usize> {
        self.entries.iter().position(|e| e.phase == phase)
    }

    /// Whether the timeline contains `phase`.
    #[must_use]
    pub fn contains(&self, phase: Phase) -> bool {
        self.position(phase).is_some()
    }

    /// Start tick of `phase`.
    #[must_use]
    pub fn starts_at(&self, phase: Phase) -> Option<u64> {
        self.position(phase).map(|i| self.entries[i].starts_at)
    }

    /// Nominal number of ticks between the start of the phase at `index`
    /// and the start of the next one. `None` for the terminal phase.
    #[must_use]
    pub fn span_at(&self, index: usize) -> Option<u64> {
        let current = self.entries.get(index)?;
        let next = self.entries.get(index + 1)?;
        Some(next.starts_at - current.starts_at)
    }

    /// Nominal span of `phase`.
    #[must_use]
    pub fn span_of(&self, phase: Phase) -> Option<u64> {
        self.position(phase).and_then(|i| self.span_at(i))
    }

    /// Start tick of the terminal phase.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        self.entries[self.entries.len() - 1].starts_at
    }

    /// Phases in order.
    pub fn phases(&self) -> impl Iterator<Item = Phase> + '_ {
        self.entries.iter().map(|e| e.phase)
    }
}

/// Builds a [`Timeline`] from phase durations.
///
/// `hold` appends a phase at the cursor and moves the cursor forward by its
/// duration; `finish` appends [`Phase::Complete`] at the cursor and
/// validates.
#[derive(Debug, Default)]
pub struct TimelineBuilder {
    entries: Vec<TimelineEntry>,
    cursor: u64,
}

impl TimelineBuilder {
    /// Appends `phase` at the cursor, lasting `ticks` ticks.
    #[must_use]
    pub fn hold(mut self, phase: Phase, ticks: u64) -> Self {
        self.entries.push(TimelineEntry {
            phase,
            starts_at: self.cursor,
        });
        self.cursor = self.cursor.saturating_add(ticks);
        self
    }

    /// Appends `phase` only when `condition` holds.
    #[must_use]
    pub fn hold_if(self, condition: bool, phase: Phase, ticks: u64) -> Self {
        if condition { self.hold(phase, ticks) } else { self }
    }

    /// Appends `phase` at an absolute tick and moves the cursor there.
    #[must_use]
    pub fn at(mut self, phase: Phase, starts_at: u64) -> Self {
        self.entries.push(TimelineEntry { phase, starts_at });
        self.cursor = starts_at;
        self
    }

    /// Current cursor position.
    #[must_use]
    pub const fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Appends the terminal phase at the cursor and validates.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the assembled entries violate
    /// the timeline rules (for instance a zero-length hold).
    pub fn finish(mut self) -> Result<Timeline, ConfigurationError> {
        self.entries.push(TimelineEntry {
            phase: Phase::Complete,
            starts_at: self.cursor,
        });
        Timeline::new(self.entries)
    }
}
