//! Place value: digits appear one at a time with their place names, then
//! the number is rewritten as a sum of place values.

use std::fmt;

use crate::derive::{DerivedOutput, DerivedStrategy, TickContext};
use crate::error::{ConfigurationError, InvalidProblemError};
use crate::phase::{Phase, Timeline};

use super::{FlagKind, FlagSpec, Pacing, ProblemKind, ProblemParameters, SETUP_TICKS, Walkthrough};

/// Ticks between successive digits.
pub const DIGIT_STEP: u64 = 6;

/// Ticks between successive expanded-form terms.
pub const TERM_STEP: u64 = 6;

/// Largest number with a named place for every digit.
pub const MAX_NUMBER: i64 = 999_999_999_999;

/// Place names, ones first.
pub static PLACE_NAMES: [&str; 12] = [
    "ones",
    "tens",
    "hundreds",
    "thousands",
    "ten thousands",
    "hundred thousands",
    "millions",
    "ten millions",
    "hundred millions",
    "billions",
    "ten billions",
    "hundred billions",
];

pub(super) const FLAGS: &[FlagSpec] = &[FlagSpec {
    name: "expanded",
    kind: FlagKind::Bool,
    default: "true",
    description: "Finish with the expanded form (e.g. 300 + 40 + 5)",
}];

/// A whole number to break into places.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceValueProblem {
    number: i64,
    expanded: bool,
}

impl PlaceValueProblem {
    pub(super) fn from_params(
        operands: &[f64],
        params: &ProblemParameters,
    ) -> Result<Self, InvalidProblemError> {
        let number = super::whole("number", operands[0], 0, MAX_NUMBER)?;
        let expanded = params.bool_flag("expanded", true)?;
        Ok(Self { number, expanded })
    }

    /// The number.
    #[must_use]
    pub const fn number(&self) -> i64 {
        self.number
    }

    /// Digits, most significant first.
    #[must_use]
    pub fn digits(&self) -> Vec<u8> {
        self.number
            .to_string()
            .bytes()
            .map(|b| b - b'0')
            .collect()
    }

    /// Non-zero place values, largest first. `[0]` for zero.
    #[must_use]
    pub fn terms(&self) -> Vec<i64> {
        let digits = self.digits();
        let len = digits.len();
        let terms: Vec<i64> = digits
            .iter()
            .enumerate()
            .filter(|(_, d)| **d != 0)
            .map(|(i, d)| i64::from(*d) * 10_i64.pow(u32::try_from(len - 1 - i).unwrap_or(0)))
            .collect();
        if terms.is_empty() { vec![0] } else { terms }
    }

    pub(super) fn walkthrough(&self, pacing: Pacing) -> Result<Walkthrough, ConfigurationError> {
        let digits = self.digits().len() as u64;
        let terms = self.terms().len() as u64;
        let timeline = Timeline::builder()
            .hold(Phase::Setup, pacing.ticks(SETUP_TICKS))
            .hold(Phase::ShowDigits, pacing.ticks((digits + 1) * DIGIT_STEP))
            .hold_if(
                self.expanded,
                Phase::ExpandedForm,
                pacing.ticks((terms + 1) * TERM_STEP),
            )
            .finish()?;
        Ok(Walkthrough {
            timeline,
            strategy: Box::new(PlaceValueStrategy {
                problem: self.clone(),
                digit_step: pacing.ticks(DIGIT_STEP),
                term_step: pacing.ticks(TERM_STEP),
            }),
        })
    }
}

impl fmt::Display for PlaceValueProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "place value of {}", self.number)
    }
}

#[derive(Debug)]
struct PlaceValueStrategy {
    problem: PlaceValueProblem,
    digit_step: u64,
    term_step: u64,
}

impl DerivedStrategy for PlaceValueStrategy {
    fn kind(&self) -> ProblemKind {
        ProblemKind::PlaceValue
    }

    fn compute(&mut self, ctx: &TickContext<'_>) -> DerivedOutput {
        let digits = self.problem.digits();
        let len = digits.len();
        let mut out = DerivedOutput::new().with("number", self.problem.number);

        let shown = if ctx.phase.is_terminal() {
            len
        } else {
            ctx.revealed_in(Phase::ShowDigits, len, self.digit_step)
        };
        let shown_digits: Vec<i64> = digits[..shown].iter().map(|d| i64::from(*d)).collect();
        let places: Vec<&str> = (0..shown).map(|i| PLACE_NAMES[len - 1 - i]).collect();
        out.set("digits_shown", shown)
            .set("digits", shown_digits)
            .set("places", places);

        if ctx.timeline.contains(Phase::ExpandedForm) {
            let terms = self.problem.terms();
            let count = if ctx.phase.is_terminal() {
                terms.len()
            } else {
                ctx.revealed_in(Phase::ExpandedForm, terms.len(), self.term_step)
            };
            let visible = &terms[..count];
            let text = visible
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" + ");
            out.set("terms", visible.to_vec()).set("expanded_form", text);
        }

        out.set("complete", ctx.phase.is_terminal());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{FlagValue, Problem, ProblemSpec};

    fn problem(n: f64) -> PlaceValueProblem {
        let spec = ProblemSpec::new(ProblemKind::PlaceValue, vec![n]);
        match Problem::validate(&spec).unwrap() {
            Problem::PlaceValue(p) => p,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_digits_and_terms() {
        let p = problem(3045.0);
        assert_eq!(p.digits(), vec![3, 0, 4, 5]);
        assert_eq!(p.terms(), vec![3000, 40, 5]);
    }

    #[test]
    fn test_zero() {
        let p = problem(0.0);
        assert_eq!(p.digits(), vec![0]);
        assert_eq!(p.terms(), vec![0]);
    }

    #[test]
    fn test_rejects_negative_and_fractional() {
        let spec = ProblemSpec::new(ProblemKind::PlaceValue, vec![-1.0]);
        assert!(matches!(
            Problem::validate(&spec),
            Err(InvalidProblemError::OutOfRange { .. })
        ));
        let spec = ProblemSpec::new(ProblemKind::PlaceValue, vec![1.5]);
        assert!(matches!(
            Problem::validate(&spec),
            Err(InvalidProblemError::NotInteger { .. })
        ));
    }

    #[test]
    fn test_timeline_without_expanded_form() {
        let spec = ProblemSpec::new(ProblemKind::PlaceValue, vec![42.0])
            .with_flag("expanded", FlagValue::Bool(false));
        let walkthrough = Problem::validate(&spec)
            .unwrap()
            .walkthrough(Pacing::NORMAL)
            .unwrap();
        let phases: Vec<_> = walkthrough.timeline.phases().collect();
        assert_eq!(phases, vec![Phase::Setup, Phase::ShowDigits, Phase::Complete]);
    }

    #[test]
    fn test_bad_flag_value() {
        let spec = ProblemSpec::new(ProblemKind::PlaceValue, vec![42.0])
            .with_flag("expanded", FlagValue::Text("sometimes".into()));
        assert!(matches!(
            Problem::validate(&spec),
            Err(InvalidProblemError::InvalidFlag { .. })
        ));
    }

    #[test]
    fn test_digits_reveal_progressively() {
        let mut w = problem(345.0).walkthrough(Pacing::NORMAL).unwrap();
        let start = w.timeline.starts_at(Phase::ShowDigits).unwrap();
        let index = w.timeline.position(Phase::ShowDigits).unwrap();
        let mut last = 0;
        for elapsed in 0..w.timeline.span_at(index).unwrap() {
            let ctx = TickContext {
                tick: start + elapsed,
                phase: Phase::ShowDigits,
                phase_index: index,
                entered_at: start,
                phase_span: w.timeline.span_at(index),
                timeline: &w.timeline,
            };
            let out = w.strategy.compute(&ctx);
            let shown = out.int("digits_shown").unwrap();
            assert!(shown >= last);
            last = shown;
        }
        assert_eq!(last, 3);
    }
}
