//! Fraction arithmetic.
//!
//! Addition and subtraction go through the least common denominator when
//! the denominators differ and skip those phases when they already match.
//! Division flips the divisor and multiplies. Every operation ends with a
//! simplify phase only if the raw result can be reduced.

use std::fmt;

use crate::derive::{DerivedOutput, DerivedStrategy, TickContext};
use crate::error::{ConfigurationError, InvalidProblemError};
use crate::math::{Fraction, lcm};
use crate::phase::{Phase, Timeline};

use super::{Pacing, ProblemKind, SETUP_TICKS, Walkthrough};

/// Largest accepted numerator magnitude.
pub const MAX_NUMERATOR: i64 = 1_000_000;

/// Largest accepted denominator magnitude.
pub const MAX_DENOMINATOR: i64 = 1_000;

/// Ticks between successive multiples while searching for the LCD.
pub const MULTIPLE_STEP: u64 = 5;

/// Ticks spent rewriting the fractions over the LCD.
pub const CONVERT_TICKS: u64 = 20;

/// Ticks spent on flip, multiply and combine steps.
pub const STEP_TICKS: u64 = 20;

/// Ticks spent simplifying.
pub const SIMPLIFY_TICKS: u64 = 20;

/// Operation between the two fractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FractionOp {
    /// `a + b`
    Add,
    /// `a - b`
    Subtract,
    /// `a ÷ b`
    Divide,
}

impl FractionOp {
    /// Operator symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Divide => "÷",
        }
    }
}

/// Two fractions and an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FractionProblem {
    op: FractionOp,
    left: Fraction,
    right: Fraction,
}

impl FractionProblem {
    pub(super) fn from_operands(op: FractionOp, operands: &[f64]) -> Result<Self, InvalidProblemError> {
        let n1 = super::whole("first numerator", operands[0], -MAX_NUMERATOR, MAX_NUMERATOR)?;
        let d1 = super::whole("first denominator", operands[1], -MAX_DENOMINATOR, MAX_DENOMINATOR)?;
        let n2 = super::whole("second numerator", operands[2], -MAX_NUMERATOR, MAX_NUMERATOR)?;
        let d2 = super::whole("second denominator", operands[3], -MAX_DENOMINATOR, MAX_DENOMINATOR)?;

        let left = Fraction::new(n1, d1).ok_or(InvalidProblemError::ZeroDenominator {
            operand: "first denominator",
        })?;
        let right = Fraction::new(n2, d2).ok_or(InvalidProblemError::ZeroDenominator {
            operand: "second denominator",
        })?;
        if op == FractionOp::Divide && right.num == 0 {
            return Err(InvalidProblemError::DivisionByZero);
        }

        Ok(Self { op, left, right })
    }

    /// Kind matching the operation.
    #[must_use]
    pub const fn kind(&self) -> ProblemKind {
        match self.op {
            FractionOp::Add => ProblemKind::FractionAdd,
            FractionOp::Subtract => ProblemKind::FractionSubtract,
            FractionOp::Divide => ProblemKind::FractionDivide,
        }
    }

    /// Operation.
    #[must_use]
    pub const fn op(&self) -> FractionOp {
        self.op
    }

    /// Whether the denominators differ, requiring an LCD.
    #[must_use]
    pub const fn needs_lcd(&self) -> bool {
        !matches!(self.op, FractionOp::Divide) && self.left.den != self.right.den
    }

    /// Least common denominator (the shared denominator when equal).
    #[must_use]
    pub const fn lcd(&self) -> i64 {
        lcm(self.left.den, self.right.den)
    }

    /// Multiples of the larger denominator, up to and including the LCD.
    #[must_use]
    pub fn lcd_multiples(&self) -> Vec<i64> {
        let base = self.left.den.max(self.right.den);
        let lcd = self.lcd();
        (1..=lcd / base).map(|k| k * base).collect()
    }

    /// Result before simplification.
    #[must_use]
    pub const fn raw_result(&self) -> Fraction {
        match self.op {
            FractionOp::Add | FractionOp::Subtract => {
                let lcd = self.lcd();
                let a = self.left.scaled_to(lcd);
                let b = self.right.scaled_to(lcd);
                let num = match self.op {
                    FractionOp::Subtract => a.num - b.num,
                    _ => a.num + b.num,
                };
                Fraction { num, den: lcd }
            }
            FractionOp::Divide => match self.right.reciprocal() {
                Some(flipped) => self.left.times(flipped),
                // Zero divisors are rejected at validation.
                None => self.left,
            },
        }
    }

    pub(super) fn walkthrough(&self, pacing: Pacing) -> Result<Walkthrough, ConfigurationError> {
        let raw = self.raw_result();
        let builder = Timeline::builder().hold(Phase::Setup, pacing.ticks(SETUP_TICKS));
        let builder = match self.op {
            FractionOp::Add | FractionOp::Subtract => {
                let multiples = self.lcd_multiples().len() as u64;
                builder
                    .hold_if(
                        self.needs_lcd(),
                        Phase::FindLcd,
                        pacing.ticks((multiples + 1) * MULTIPLE_STEP),
                    )
                    .hold_if(
                        self.needs_lcd(),
                        Phase::ConvertFractions,
                        pacing.ticks(CONVERT_TICKS),
                    )
                    .hold(Phase::CombineNumerators, pacing.ticks(STEP_TICKS))
            }
            FractionOp::Divide => builder
                .hold(Phase::FlipDivisor, pacing.ticks(STEP_TICKS))
                .hold(Phase::Multiply, pacing.ticks(STEP_TICKS)),
        };
        let timeline = builder
            .hold_if(raw.is_reducible(), Phase::Simplify, pacing.ticks(SIMPLIFY_TICKS))
            .finish()?;

        Ok(Walkthrough {
            timeline,
            strategy: Box::new(FractionStrategy {
                problem: self.clone(),
                multiple_step: pacing.ticks(MULTIPLE_STEP),
            }),
        })
    }
}

impl fmt::Display for FractionProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op.symbol(), self.right)
    }
}

#[derive(Debug)]
struct FractionStrategy {
    problem: FractionProblem,
    multiple_step: u64,
}

impl FractionStrategy {
    fn add_lcd_values(&self, ctx: &TickContext<'_>, out: &mut DerivedOutput) {
        let p = &self.problem;
        let lcd = p.lcd();
        if p.needs_lcd() {
            if ctx.has_reached(Phase::FindLcd) {
                let multiples = p.lcd_multiples();
                let shown = if ctx.is_in(Phase::FindLcd) {
                    // The first multiple is visible on entry.
                    (ctx.revealed_in(Phase::FindLcd, multiples.len(), self.multiple_step) + 1)
                        .min(multiples.len())
                } else {
                    multiples.len()
                };
                out.set("multiples", multiples[..shown].to_vec());
                if shown == multiples.len() {
                    out.set("lcd", lcd);
                }
            }
            if ctx.has_reached(Phase::ConvertFractions) {
                out.set("converted_left", p.left.scaled_to(lcd))
                    .set("converted_right", p.right.scaled_to(lcd));
            }
        } else {
            out.set("lcd", lcd);
        }
    }
}

impl DerivedStrategy for FractionStrategy {
    fn kind(&self) -> ProblemKind {
        self.problem.kind()
    }

    fn compute(&mut self, ctx: &TickContext<'_>) -> DerivedOutput {
        let p = &self.problem;
        let raw = p.raw_result();
        let mut out = DerivedOutput::new()
            .with("left", p.left)
            .with("right", p.right)
            .with("operator", p.op.symbol());

        match p.op {
            FractionOp::Add | FractionOp::Subtract => {
                self.add_lcd_values(ctx, &mut out);
                if ctx.has_reached(Phase::CombineNumerators) {
                    out.set("result", raw);
                }
            }
            FractionOp::Divide => {
                if ctx.has_reached(Phase::FlipDivisor) {
                    if let Some(flipped) = p.right.reciprocal() {
                        out.set("reciprocal", flipped);
                    }
                }
                if ctx.has_reached(Phase::Multiply) {
                    out.set("result", raw);
                }
            }
        }

        if ctx.has_reached(Phase::Simplify) {
            out.set("common_factor", raw.common_factor())
                .set("result", raw.reduced());
        }
        out.set("complete", ctx.phase.is_terminal());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Problem, ProblemSpec};

    fn validate(kind: ProblemKind, ops: [f64; 4]) -> Result<FractionProblem, InvalidProblemError> {
        match Problem::validate(&ProblemSpec::new(kind, ops.to_vec()))? {
            Problem::Fraction(p) => Ok(p),
            other => panic!("unexpected {other:?}"),
        }
    }

    fn phases(p: &FractionProblem) -> Vec<Phase> {
        p.walkthrough(Pacing::NORMAL).unwrap().timeline.phases().collect()
    }

    #[test]
    fn test_same_denominator_skips_lcd() {
        let p = validate(ProblemKind::FractionAdd, [1.0, 4.0, 2.0, 4.0]).unwrap();
        assert!(!p.needs_lcd());
        assert_eq!(p.raw_result(), Fraction { num: 3, den: 4 });
        assert_eq!(
            phases(&p),
            vec![Phase::Setup, Phase::CombineNumerators, Phase::Complete]
        );
    }

    #[test]
    fn test_halves_plus_thirds() {
        let p = validate(ProblemKind::FractionAdd, [1.0, 2.0, 1.0, 3.0]).unwrap();
        assert_eq!(p.lcd(), 6);
        assert_eq!(p.lcd_multiples(), vec![3, 6]);
        assert_eq!(p.raw_result(), Fraction { num: 5, den: 6 });
        assert_eq!(
            phases(&p),
            vec![
                Phase::Setup,
                Phase::FindLcd,
                Phase::ConvertFractions,
                Phase::CombineNumerators,
                Phase::Complete
            ]
        );
    }

    #[test]
    fn test_reducible_sum_gets_simplify() {
        let p = validate(ProblemKind::FractionAdd, [1.0, 6.0, 1.0, 3.0]).unwrap();
        assert_eq!(p.raw_result(), Fraction { num: 3, den: 6 });
        assert_eq!(phases(&p).iter().filter(|x| **x == Phase::Simplify).count(), 1);
    }

    #[test]
    fn test_subtract_negative_result() {
        let p = validate(ProblemKind::FractionSubtract, [1.0, 3.0, 1.0, 2.0]).unwrap();
        assert_eq!(p.raw_result(), Fraction { num: -1, den: 6 });
    }

    #[test]
    fn test_divide() {
        let p = validate(ProblemKind::FractionDivide, [1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(p.raw_result(), Fraction { num: 4, den: 6 });
        assert_eq!(p.raw_result().reduced(), Fraction { num: 2, den: 3 });
        assert_eq!(
            phases(&p),
            vec![
                Phase::Setup,
                Phase::FlipDivisor,
                Phase::Multiply,
                Phase::Simplify,
                Phase::Complete
            ]
        );
    }

    #[test]
    fn test_zero_denominator_rejected() {
        assert_eq!(
            validate(ProblemKind::FractionAdd, [1.0, 0.0, 1.0, 3.0]),
            Err(InvalidProblemError::ZeroDenominator {
                operand: "first denominator"
            })
        );
        assert_eq!(
            validate(ProblemKind::FractionSubtract, [1.0, 2.0, 1.0, 0.0]),
            Err(InvalidProblemError::ZeroDenominator {
                operand: "second denominator"
            })
        );
    }

    #[test]
    fn test_divide_by_zero_fraction_rejected() {
        assert_eq!(
            validate(ProblemKind::FractionDivide, [1.0, 2.0, 0.0, 5.0]),
            Err(InvalidProblemError::DivisionByZero)
        );
    }

    #[test]
    fn test_negative_denominator_normalized() {
        let p = validate(ProblemKind::FractionAdd, [1.0, -2.0, 1.0, 2.0]).unwrap();
        assert!(!p.needs_lcd());
        assert_eq!(p.raw_result(), Fraction { num: 0, den: 2 });
    }
}
