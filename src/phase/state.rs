//! Phase identifiers and per-session tick state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A pedagogical step of a walkthrough.
///
/// Each problem kind uses an ordered subset of these. `Complete` is the
/// terminal phase of every timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Problem is shown, nothing computed yet.
    Setup,
    /// The relevant quantities are pointed out.
    Identify,
    /// Digits appear one place at a time.
    ShowDigits,
    /// Number rewritten as a sum of place values.
    ExpandedForm,
    /// Least common denominator is found.
    FindLcd,
    /// Fractions rewritten over the common denominator.
    ConvertFractions,
    /// Divisor fraction turned upside down.
    FlipDivisor,
    /// Numerators and denominators multiplied.
    Multiply,
    /// Numerators added or subtracted.
    CombineNumerators,
    /// Result reduced to lowest terms.
    Simplify,
    /// Items dealt into groups.
    Distribute,
    /// Leftover items set aside.
    Remainder,
    /// Candidate factor pairs tried one by one.
    Search,
    /// Factored form shown.
    Factored,
    /// No integer factorization exists.
    NotFactorable,
    /// Roots read off the factors.
    Roots,
    /// Direct substitution shows the indeterminate form.
    Substitute,
    /// Input values approach the limit point.
    Approach,
    /// Secant line drawn through two points.
    DrawSecant,
    /// Secant interval shrinks toward the tangent.
    ShrinkInterval,
    /// Terminal phase.
    Complete,
}

impl Phase {
    /// All phases in declaration order.
    pub const ALL: [Self; 21] = [
        Self::Setup,
        Self::Identify,
        Self::ShowDigits,
        Self::ExpandedForm,
        Self::FindLcd,
        Self::ConvertFractions,
        Self::FlipDivisor,
        Self::Multiply,
        Self::CombineNumerators,
        Self::Simplify,
        Self::Distribute,
        Self::Remainder,
        Self::Search,
        Self::Factored,
        Self::NotFactorable,
        Self::Roots,
        Self::Substitute,
        Self::Approach,
        Self::DrawSecant,
        Self::ShrinkInterval,
        Self::Complete,
    ];

    /// Stable `snake_case` name, matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Identify => "identify",
            Self::ShowDigits => "show_digits",
            Self::ExpandedForm => "expanded_form",
            Self::FindLcd => "find_lcd",
            Self::ConvertFractions => "convert_fractions",
            Self::FlipDivisor => "flip_divisor",
            Self::Multiply => "multiply",
            Self::CombineNumerators => "combine_numerators",
            Self::Simplify => "simplify",
            Self::Distribute => "distribute",
            Self::Remainder => "remainder",
            Self::Search => "search",
            Self::Factored => "factored",
            Self::NotFactorable => "not_factorable",
            Self::Roots => "roots",
            Self::Substitute => "substitute",
            Self::Approach => "approach",
            Self::DrawSecant => "draw_secant",
            Self::ShrinkInterval => "shrink_interval",
            Self::Complete => "complete",
        }
    }

    /// Whether this is the terminal phase.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown phase '{s}'"))
    }
}

/// Record of a single phase transition.
///
/// Produced by the sequencer, consumed by the effect dispatcher and the
/// session's observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseChange {
    /// Phase that was left
    pub from: Phase,
    /// Phase that was entered
    pub to: Phase,
    /// Timeline position of `to`
    pub index: usize,
    /// Tick on which the transition happened
    pub tick: u64,
}

/// Tick counter and pause flag for one session.
///
/// `current_tick` only increases on delivered ticks and is only zeroed by
/// a reset; pausing never touches it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickState {
    /// Ticks delivered since the last reset
    pub current_tick: u64,
    /// Whether delivery is currently suspended
    pub paused: bool,
}

impl TickState {
    /// Advances the counter by one delivered tick and returns the new value.
    pub const fn advance(&mut self) -> u64 {
        self.current_tick += 1;
        self.current_tick
    }

    /// Returns the counter to zero. The pause flag is kept.
    pub const fn rewind(&mut self) {
        self.current_tick = 0;
    }
}
