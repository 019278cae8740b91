//! Whole-number division by dealing.
//!
//! `dividend` items are dealt one at a time into `divisor` groups. Each
//! group ends up with the quotient; whatever cannot complete another round
//! is set aside as the remainder.

use std::fmt;
use std::num::NonZeroUsize;

use crate::derive::{DerivedOutput, DerivedStrategy, RoundRobin, TickContext};
use crate::error::{ConfigurationError, InvalidProblemError};
use crate::phase::{Phase, Timeline};

use super::{Pacing, ProblemKind, SETUP_TICKS, Walkthrough};

/// Most items that can be dealt.
pub const MAX_DIVIDEND: i64 = 1_000;

/// Most groups.
pub const MAX_DIVISOR: i64 = 100;

/// Ticks between dealing successive items.
pub const DEAL_STEP: u64 = 4;

/// Items dealt into groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivisionProblem {
    dividend: usize,
    divisor: NonZeroUsize,
}

impl DivisionProblem {
    pub(super) fn from_operands(operands: &[f64]) -> Result<Self, InvalidProblemError> {
        let dividend = super::whole("dividend", operands[0], 0, MAX_DIVIDEND)?;
        if operands[1] == 0.0 {
            return Err(InvalidProblemError::DivisionByZero);
        }
        let divisor = super::whole("divisor", operands[1], 1, MAX_DIVISOR)?;

        let dividend = usize::try_from(dividend).map_err(|_| InvalidProblemError::OutOfRange {
            operand: "dividend",
            value: operands[0],
            min: 0.0,
            max: 1_000.0,
        })?;
        let divisor = usize::try_from(divisor)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or(InvalidProblemError::DivisionByZero)?;
        Ok(Self { dividend, divisor })
    }

    /// Items to deal.
    #[must_use]
    pub const fn dividend(&self) -> usize {
        self.dividend
    }

    /// Number of groups.
    #[must_use]
    pub const fn divisor(&self) -> usize {
        self.divisor.get()
    }

    /// Items per group.
    #[must_use]
    pub const fn quotient(&self) -> usize {
        self.dividend / self.divisor.get()
    }

    /// Items left over.
    #[must_use]
    pub const fn remainder(&self) -> usize {
        self.dividend % self.divisor.get()
    }

    pub(super) fn walkthrough(&self, pacing: Pacing) -> Result<Walkthrough, ConfigurationError> {
        let remainder = self.remainder();
        let distributable = (self.dividend - remainder) as u64;
        let timeline = Timeline::builder()
            .hold(Phase::Setup, pacing.ticks(SETUP_TICKS))
            .hold(Phase::Distribute, pacing.ticks((distributable + 1) * DEAL_STEP))
            .hold_if(
                remainder > 0,
                Phase::Remainder,
                pacing.ticks((remainder as u64 + 1) * DEAL_STEP),
            )
            .finish()?;
        Ok(Walkthrough {
            timeline,
            strategy: Box::new(DivisionStrategy {
                dealer: RoundRobin::new(self.dividend, self.divisor),
                step: pacing.ticks(DEAL_STEP),
            }),
        })
    }
}

impl fmt::Display for DivisionProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ÷ {}", self.dividend, self.divisor)
    }
}

#[derive(Debug)]
struct DivisionStrategy {
    dealer: RoundRobin,
    step: u64,
}

impl DerivedStrategy for DivisionStrategy {
    fn kind(&self) -> ProblemKind {
        ProblemKind::Division
    }

    fn compute(&mut self, ctx: &TickContext<'_>) -> DerivedOutput {
        let distributable = self.dealer.distributable();
        let remainder = self.dealer.remainder();

        let target = if ctx.phase.is_terminal() {
            self.dealer.dividend()
        } else {
            ctx.revealed_in(Phase::Distribute, distributable, self.step)
                + ctx.revealed_in(Phase::Remainder, remainder, self.step)
        };
        self.dealer.place_through(target);

        let mut out = DerivedOutput::new()
            .with("dividend", self.dealer.dividend())
            .with("divisor", self.dealer.divisor().get())
            .with("placed", self.dealer.placed())
            .with("groups", self.dealer.group_sizes())
            .with("leftover", self.dealer.remainder_placed());
        if ctx.phase.is_terminal() {
            out.set("quotient", self.dealer.quotient())
                .set("remainder", remainder);
        }
        out.set("complete", ctx.phase.is_terminal());
        out
    }

    fn reset(&mut self) {
        self.dealer.clear();
    }
}
