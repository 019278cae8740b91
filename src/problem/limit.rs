//! Limit at a removable discontinuity.
//!
//! `f(x) = (x² − p²) / (x − p)` is undefined at `x = p`: substituting gives
//! `0/0`. Approaching `p` from either side, `f(x)` approaches `2p`. The
//! approach values stay strictly on their side until the walkthrough
//! completes, when the limit itself is shown.

use std::fmt;

use crate::derive::{ConvergenceRamp, DerivedOutput, DerivedStrategy, Ease, Side, TickContext};
use crate::error::{ConfigurationError, InvalidProblemError};
use crate::phase::{Phase, Timeline};

use super::{FlagKind, FlagSpec, Pacing, ProblemKind, ProblemParameters, SETUP_TICKS, Walkthrough};

/// Largest accepted point magnitude.
pub const MAX_POINT: f64 = 1_000.0;

/// Ticks spent on the `0/0` substitution.
pub const SUBSTITUTE_TICKS: u64 = 20;

/// Ticks spent approaching.
pub const APPROACH_TICKS: u64 = 60;

/// Distance from the point at which the approach starts.
pub const START_OFFSET: f64 = 1.0;

const SIDES: &[&str] = &["left", "right", "both"];

pub(super) const FLAGS: &[FlagSpec] = &[FlagSpec {
    name: "side",
    kind: FlagKind::Choice(SIDES),
    default: "both",
    description: "Approach from the left, the right, or both",
}];

/// Which sides are animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approach {
    /// Left only
    Left,
    /// Right only
    Right,
    /// Both sides
    Both,
}

impl Approach {
    const fn includes(self, side: Side) -> bool {
        matches!(
            (self, side),
            (Self::Both, _) | (Self::Left, Side::Left) | (Self::Right, Side::Right)
        )
    }
}

/// Limit of `(x² − p²)/(x − p)` as `x → p`.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitProblem {
    point: f64,
    approach: Approach,
}

impl LimitProblem {
    pub(super) fn from_params(
        operands: &[f64],
        params: &ProblemParameters,
    ) -> Result<Self, InvalidProblemError> {
        let point = super::bounded("point", operands[0], MAX_POINT)?;
        let approach = match params.choice_flag("side", SIDES, "left, right or both", "both")? {
            "left" => Approach::Left,
            "right" => Approach::Right,
            _ => Approach::Both,
        };
        Ok(Self { point, approach })
    }

    /// The point `p`.
    #[must_use]
    pub const fn point(&self) -> f64 {
        self.point
    }

    /// The limit `2p`.
    #[must_use]
    pub fn limit(&self) -> f64 {
        2.0 * self.point
    }

    /// Animated sides.
    #[must_use]
    pub const fn approach(&self) -> Approach {
        self.approach
    }

    pub(super) fn walkthrough(&self, pacing: Pacing) -> Result<Walkthrough, ConfigurationError> {
        let timeline = Timeline::builder()
            .hold(Phase::Setup, pacing.ticks(SETUP_TICKS))
            .hold(Phase::Substitute, pacing.ticks(SUBSTITUTE_TICKS))
            .hold(Phase::Approach, pacing.ticks(APPROACH_TICKS))
            .finish()?;

        let ramps = |side| SideRamps {
            side,
            x: ConvergenceRamp::new(self.point, START_OFFSET, side, Ease::OutCubic),
            fx: ConvergenceRamp::new(self.limit(), START_OFFSET, side, Ease::OutCubic),
        };
        let sides = [Side::Left, Side::Right]
            .into_iter()
            .filter(|side| self.approach.includes(*side))
            .map(ramps)
            .collect();

        Ok(Walkthrough {
            timeline,
            strategy: Box::new(LimitStrategy {
                point: self.point,
                sides,
            }),
        })
    }
}

impl fmt::Display for LimitProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.point;
        write!(f, "lim x→{p} of (x² - {})/(x - {p})", p * p)
    }
}

/// Input and output ramps for one side. `f(x) = x + p` away from `p`, so
/// both move by the same eased amount.
#[derive(Debug)]
struct SideRamps {
    side: Side,
    x: ConvergenceRamp,
    fx: ConvergenceRamp,
}

#[derive(Debug)]
struct LimitStrategy {
    point: f64,
    sides: Vec<SideRamps>,
}

impl DerivedStrategy for LimitStrategy {
    fn kind(&self) -> ProblemKind {
        ProblemKind::Limit
    }

    fn compute(&mut self, ctx: &TickContext<'_>) -> DerivedOutput {
        let mut out = DerivedOutput::new()
            .with("point", self.point)
            .with("expression", format!("(x² - {})/(x - {})", self.point * self.point, self.point));

        if ctx.has_reached(Phase::Substitute) {
            out.set("substituted", "0/0").set("defined", false);
        }

        if ctx.has_reached(Phase::Approach) {
            let terminal = ctx.phase.is_terminal();
            let progress = ctx.progress();
            for ramps in &self.sides {
                let (x, fx) = if terminal {
                    (ramps.x.settled(), ramps.fx.settled())
                } else {
                    (ramps.x.value_at(progress), ramps.fx.value_at(progress))
                };
                match ramps.side {
                    Side::Left => out.set("x_left", x).set("fx_left", fx),
                    Side::Right => out.set("x_right", x).set("fx_right", fx),
                };
            }
        }

        if ctx.phase.is_terminal() {
            out.set("limit", 2.0 * self.point);
        }
        out.set("complete", ctx.phase.is_terminal());
        out
    }
}
