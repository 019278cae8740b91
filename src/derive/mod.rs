//! Derived-value engine
//!
//! Each problem kind supplies a [`DerivedStrategy`] that turns the current
//! `(tick, phase)` into a [`DerivedOutput`]: the numbers, fractions and
//! labels a renderer draws. Strategies are assembled from four building
//! blocks:
//!
//! - [`reveal`] - how many of N items are visible
//! - [`distribution`] - round-robin dealing of items into groups
//! - [`convergence`] - a value easing toward a target without reaching it
//! - [`search`] - candidate factor pairs tried one per interval
//!
//! Output depends only on the tick, the phase and the problem parameters.
//! The single exception is round-robin placement, which is append-only and
//! cleared only by [`DerivedStrategy::reset`].

pub mod convergence;
pub mod distribution;
pub mod ease;
pub mod reveal;
pub mod search;

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::math::Fraction;
use crate::phase::{Phase, Timeline};
use crate::problem::ProblemKind;

pub use convergence::{ConvergenceRamp, Side};
pub use distribution::{Placement, RoundRobin};
pub use ease::Ease;
pub use search::{FactorSearch, SearchOutcome};

// ============================================================================
// Strategy trait
// ============================================================================

/// Per-problem-kind computation of derived values.
pub trait DerivedStrategy: Send + fmt::Debug {
    /// Problem kind this strategy animates.
    fn kind(&self) -> ProblemKind;

    /// Computes the output for the given tick and phase.
    fn compute(&mut self, ctx: &TickContext<'_>) -> DerivedOutput;

    /// Whether the sequencer may enter `next` on this tick.
    ///
    /// Called only once the next threshold has been reached. Strategies
    /// whose work must finish before a phase can end hold it here.
    fn gate_open(&self, next: Phase, ctx: &TickContext<'_>) -> bool {
        let _ = (next, ctx);
        true
    }

    /// Discards any accumulated state.
    fn reset(&mut self) {}
}

// ============================================================================
// Tick context
// ============================================================================

/// Read-only view of where the walkthrough is.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    /// Ticks delivered since the last reset
    pub tick: u64,
    /// Current phase
    pub phase: Phase,
    /// Timeline position of `phase`
    pub phase_index: usize,
    /// Tick on which `phase` was entered
    pub entered_at: u64,
    /// Nominal span of `phase`, `None` when terminal
    pub phase_span: Option<u64>,
    /// Timeline being walked
    pub timeline: &'a Timeline,
}

impl<'a> TickContext<'a> {
    /// Context for the first tick of a timeline.
    #[must_use]
    pub fn initial(timeline: &'a Timeline) -> Self {
        Self {
            tick: 0,
            phase: timeline.first_phase(),
            phase_index: 0,
            entered_at: 0,
            phase_span: timeline.span_at(0),
            timeline,
        }
    }

    /// Ticks since the current phase was entered.
    #[must_use]
    pub const fn elapsed(&self) -> u64 {
        self.tick.saturating_sub(self.entered_at)
    }

    /// Fraction of the current phase's nominal span that has passed,
    /// clamped to `[0, 1]`. Always `1.0` in the terminal phase.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        match self.phase_span {
            Some(span) if span > 0 => (self.elapsed() as f64 / span as f64).clamp(0.0, 1.0),
            _ => 1.0,
        }
    }

    /// Whether `phase` is current or already behind. False for phases not
    /// on the timeline.
    #[must_use]
    pub fn has_reached(&self, phase: Phase) -> bool {
        self.timeline
            .position(phase)
            .is_some_and(|i| i <= self.phase_index)
    }

    /// Whether `phase` is strictly behind.
    #[must_use]
    pub fn has_passed(&self, phase: Phase) -> bool {
        self.timeline
            .position(phase)
            .is_some_and(|i| i < self.phase_index)
    }

    /// Whether the current phase is `phase`.
    #[must_use]
    pub fn is_in(&self, phase: Phase) -> bool {
        self.phase == phase
    }

    /// Number of `total` items revealed by `phase`, one every `step` ticks
    /// while it is current. Zero before it, `total` after it.
    #[must_use]
    pub fn revealed_in(&self, phase: Phase, total: usize, step: u64) -> usize {
        if self.has_passed(phase) {
            total
        } else if self.is_in(phase) {
            reveal::revealed(self.elapsed(), total, step)
        } else {
            0
        }
    }
}

// ============================================================================
// Output
// ============================================================================

/// One derived value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutputValue {
    /// Flag
    Bool(bool),
    /// Whole number
    Int(i64),
    /// Real number
    Float(f64),
    /// Label
    Text(String),
    /// Rational number
    Fraction(Fraction),
    /// Plotted point
    Point {
        /// Horizontal coordinate
        x: f64,
        /// Vertical coordinate
        y: f64,
    },
    /// Ordered values
    List(Vec<OutputValue>),
}

impl From<bool> for OutputValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for OutputValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<usize> for OutputValue {
    fn from(v: usize) -> Self {
        Self::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<u64> for OutputValue {
    fn from(v: u64) -> Self {
        Self::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for OutputValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for OutputValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for OutputValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<Fraction> for OutputValue {
    fn from(v: Fraction) -> Self {
        Self::Fraction(v)
    }
}

impl<T: Into<Self>> From<Vec<T>> for OutputValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for OutputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:.6}"),
            Self::Text(v) => f.write_str(v),
            Self::Fraction(v) => write!(f, "{v}"),
            Self::Point { x, y } => write!(f, "({x:.4}, {y:.4})"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Ordered bag of named derived values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DerivedOutput {
    values: IndexMap<&'static str, OutputValue>,
}

impl DerivedOutput {
    /// Empty output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing any previous value.
    pub fn set(&mut self, key: &'static str, value: impl Into<OutputValue>) -> &mut Self {
        self.values.insert(key, value.into());
        self
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: &'static str, value: impl Into<OutputValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Raw value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OutputValue> {
        self.values.get(key)
    }

    /// Integer value for `key`.
    #[must_use]
    pub fn int(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            OutputValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Float value for `key`. Integers are widened.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn float(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            OutputValue::Float(v) => Some(*v),
            OutputValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Boolean value for `key`.
    #[must_use]
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            OutputValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Text value for `key`.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            OutputValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Fraction value for `key`.
    #[must_use]
    pub fn fraction(&self, key: &str) -> Option<Fraction> {
        match self.get(key)? {
            OutputValue::Fraction(v) => Some(*v),
            _ => None,
        }
    }

    /// List value for `key`.
    #[must_use]
    pub fn list(&self, key: &str) -> Option<&[OutputValue]> {
        match self.get(key)? {
            OutputValue::List(v) => Some(v),
            _ => None,
        }
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Iterates values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &OutputValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no values are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline() -> Timeline {
        Timeline::builder()
            .hold(Phase::Setup, 10)
            .hold(Phase::ShowDigits, 20)
            .hold(Phase::ExpandedForm, 10)
            .finish()
            .unwrap()
    }

    fn ctx_at(timeline: &Timeline, tick: u64, phase: Phase, entered_at: u64) -> TickContext<'_> {
        let phase_index = timeline.position(phase).unwrap();
        TickContext {
            tick,
            phase,
            phase_index,
            entered_at,
            phase_span: timeline.span_at(phase_index),
            timeline,
        }
    }

    #[test]
    fn test_initial_context() {
        let t = timeline();
        let ctx = TickContext::initial(&t);
        assert_eq!(ctx.phase, Phase::Setup);
        assert_eq!(ctx.elapsed(), 0);
        assert_eq!(ctx.phase_span, Some(10));
        assert!(ctx.progress().abs() < f64::EPSILON);
    }

    #[test]
    fn test_has_reached_and_passed() {
        let t = timeline();
        let ctx = ctx_at(&t, 15, Phase::ShowDigits, 10);
        assert!(ctx.has_reached(Phase::Setup));
        assert!(ctx.has_passed(Phase::Setup));
        assert!(ctx.has_reached(Phase::ShowDigits));
        assert!(!ctx.has_passed(Phase::ShowDigits));
        assert!(!ctx.has_reached(Phase::ExpandedForm));
        assert!(!ctx.has_reached(Phase::Search));
    }

    #[test]
    fn test_revealed_in() {
        let t = timeline();
        let before = ctx_at(&t, 5, Phase::Setup, 0);
        assert_eq!(before.revealed_in(Phase::ShowDigits, 4, 5), 0);
        let during = ctx_at(&t, 21, Phase::ShowDigits, 10);
        assert_eq!(during.revealed_in(Phase::ShowDigits, 4, 5), 2);
        let after = ctx_at(&t, 31, Phase::ExpandedForm, 30);
        assert_eq!(after.revealed_in(Phase::ShowDigits, 4, 5), 4);
    }

    #[test]
    fn test_progress_terminal_is_one() {
        let t = timeline();
        let ctx = ctx_at(&t, 40, Phase::Complete, 40);
        assert!((ctx.progress() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_output_accessors() {
        let out = DerivedOutput::new()
            .with("quotient", 3_i64)
            .with("ratio", 0.5)
            .with("done", true)
            .with("label", "three")
            .with("result", Fraction::new(5, 6).unwrap())
            .with("groups", vec![4_i64, 4, 4]);
        assert_eq!(out.int("quotient"), Some(3));
        assert_eq!(out.float("quotient"), Some(3.0));
        assert_eq!(out.float("ratio"), Some(0.5));
        assert_eq!(out.flag("done"), Some(true));
        assert_eq!(out.text("label"), Some("three"));
        assert_eq!(out.fraction("result"), Fraction::new(5, 6));
        assert_eq!(out.list("groups").map(<[_]>::len), Some(3));
        assert_eq!(out.int("missing"), None);
        assert_eq!(out.len(), 6);
    }

    #[test]
    fn test_output_serializes_in_insertion_order() {
        let out = DerivedOutput::new()
            .with("b", 1_i64)
            .with("a", Fraction::new(1, 2).unwrap());
        let json = serde_json::to_string(&out).unwrap();
        assert_eq!(json, r#"{"b":1,"a":{"num":1,"den":2}}"#);
    }

    #[test]
    fn test_output_value_display() {
        let list = OutputValue::from(vec![1_i64, 2]);
        assert_eq!(list.to_string(), "[1, 2]");
        assert_eq!(OutputValue::from(Fraction::new(3, 4).unwrap()).to_string(), "3/4");
    }
}
