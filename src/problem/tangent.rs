//! Tangent slope as a limit of secant slopes.
//!
//! For `f(x) = ax² + bx + c` the secant through `x0` and `x0 + h` has slope
//! `a(2·x0 + h) + b`. The interval `h` shrinks toward zero without reaching
//! it; on completion the tangent slope `2a·x0 + b` is shown.

use std::fmt;

use crate::derive::{ConvergenceRamp, DerivedOutput, DerivedStrategy, Ease, OutputValue, Side, TickContext};
use crate::error::{ConfigurationError, InvalidProblemError};
use crate::phase::{Phase, Timeline};

use super::{Pacing, ProblemKind, SETUP_TICKS, Walkthrough};

/// Largest accepted coefficient or point magnitude.
pub const MAX_MAGNITUDE: f64 = 1_000.0;

/// Ticks spent drawing the first secant.
pub const DRAW_TICKS: u64 = 20;

/// Ticks spent shrinking the interval.
pub const SHRINK_TICKS: u64 = 60;

/// Starting interval width.
pub const START_H: f64 = 1.0;

/// Quadratic and the point of tangency.
#[derive(Debug, Clone, PartialEq)]
pub struct TangentProblem {
    a: f64,
    b: f64,
    c: f64,
    x0: f64,
}

impl TangentProblem {
    pub(super) fn from_operands(operands: &[f64]) -> Result<Self, InvalidProblemError> {
        Ok(Self {
            a: super::bounded("a", operands[0], MAX_MAGNITUDE)?,
            b: super::bounded("b", operands[1], MAX_MAGNITUDE)?,
            c: super::bounded("c", operands[2], MAX_MAGNITUDE)?,
            x0: super::bounded("x0", operands[3], MAX_MAGNITUDE)?,
        })
    }

    /// `f(x)`.
    #[must_use]
    pub fn f(&self, x: f64) -> f64 {
        (self.a * x + self.b).mul_add(x, self.c)
    }

    /// Slope of the secant through `x0` and `x0 + h`.
    #[must_use]
    pub fn secant_slope(&self, h: f64) -> f64 {
        self.a.mul_add(2.0f64.mul_add(self.x0, h), self.b)
    }

    /// Slope of the tangent at `x0`.
    #[must_use]
    pub fn tangent_slope(&self) -> f64 {
        (2.0 * self.a).mul_add(self.x0, self.b)
    }

    pub(super) fn walkthrough(&self, pacing: Pacing) -> Result<Walkthrough, ConfigurationError> {
        let timeline = Timeline::builder()
            .hold(Phase::Setup, pacing.ticks(SETUP_TICKS))
            .hold(Phase::DrawSecant, pacing.ticks(DRAW_TICKS))
            .hold(Phase::ShrinkInterval, pacing.ticks(SHRINK_TICKS))
            .finish()?;
        Ok(Walkthrough {
            timeline,
            strategy: Box::new(TangentStrategy {
                problem: self.clone(),
                h: ConvergenceRamp::new(0.0, START_H, Side::Right, Ease::OutQuad),
            }),
        })
    }
}

impl fmt::Display for TangentProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tangent to {}x² + {}x + {} at x = {}",
            self.a, self.b, self.c, self.x0
        )
    }
}

#[derive(Debug)]
struct TangentStrategy {
    problem: TangentProblem,
    h: ConvergenceRamp,
}

impl DerivedStrategy for TangentStrategy {
    fn kind(&self) -> ProblemKind {
        ProblemKind::Tangent
    }

    fn compute(&mut self, ctx: &TickContext<'_>) -> DerivedOutput {
        let p = &self.problem;
        let mut out = DerivedOutput::new().with("x0", p.x0).with(
            "point",
            OutputValue::Point {
                x: p.x0,
                y: p.f(p.x0),
            },
        );

        if ctx.has_reached(Phase::DrawSecant) {
            let h = if ctx.phase.is_terminal() {
                self.h.settled()
            } else if ctx.is_in(Phase::ShrinkInterval) {
                self.h.value_at(ctx.progress())
            } else {
                START_H
            };
            let x1 = p.x0 + h;
            out.set("h", h)
                .set("secant_point", OutputValue::Point { x: x1, y: p.f(x1) })
                .set("secant_slope", p.secant_slope(h));
        }

        if ctx.phase.is_terminal() {
            out.set("tangent_slope", p.tangent_slope());
        }
        out.set("complete", ctx.phase.is_terminal());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Problem, ProblemSpec};

    fn problem() -> TangentProblem {
        match Problem::validate(&ProblemSpec::new(ProblemKind::Tangent, vec![1.0, 0.0, 0.0, 2.0]))
            .unwrap()
        {
            Problem::Tangent(p) => p,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_slopes() {
        let p = problem();
        assert!((p.tangent_slope() - 4.0).abs() < 1e-12);
        assert!((p.secant_slope(1.0) - 5.0).abs() < 1e-12);
        assert!((p.f(3.0) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_secant_slope_matches_difference_quotient() {
        let p = problem();
        let h = 0.25;
        let quotient = (p.f(p.x0 + h) - p.f(p.x0)) / h;
        assert!((quotient - p.secant_slope(h)).abs() < 1e-9);
    }

    #[test]
    fn test_h_stays_positive_while_shrinking() {
        let mut w = problem().walkthrough(Pacing::NORMAL).unwrap();
        let index = w.timeline.position(Phase::ShrinkInterval).unwrap();
        let start = w.timeline.starts_at(Phase::ShrinkInterval).unwrap();
        let span = w.timeline.span_at(index);
        for elapsed in 0..=span.unwrap() {
            let ctx = TickContext {
                tick: start + elapsed,
                phase: Phase::ShrinkInterval,
                phase_index: index,
                entered_at: start,
                phase_span: span,
                timeline: &w.timeline,
            };
            let out = w.strategy.compute(&ctx);
            assert!(out.float("h").unwrap() > 0.0);
        }
    }

    #[test]
    fn test_rejects_infinite_operand() {
        let spec = ProblemSpec::new(ProblemKind::Tangent, vec![1.0, f64::INFINITY, 0.0, 0.0]);
        assert_eq!(
            Problem::validate(&spec),
            Err(InvalidProblemError::NonFinite { operand: "b" })
        );
    }
}
