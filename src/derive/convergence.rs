//! Convergence ramp: a value moving monotonically toward a target.
//!
//! Used for limits (x approaching a point from one side) and for the
//! shrinking secant interval. The ramp never reaches or crosses the target
//! while progress is below completion; only [`ConvergenceRamp::settled`]
//! returns the target itself, and callers use it in the terminal phase.

use serde::Serialize;

use super::ease::Ease;

/// Smallest gap kept to the target, as a fraction of the starting offset.
pub const MIN_GAP_FRACTION: f64 = 1e-3;

/// Side of the target the ramp approaches from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Values below the target
    Left,
    /// Values above the target
    Right,
}

impl Side {
    /// Lower-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Value easing from `target ± offset` toward `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceRamp {
    target: f64,
    offset: f64,
    side: Side,
    ease: Ease,
}

impl ConvergenceRamp {
    /// Creates a ramp. `offset` is taken as a magnitude; a zero offset is
    /// replaced by 1 so the ramp always has somewhere to travel.
    #[must_use]
    pub fn new(target: f64, offset: f64, side: Side, ease: Ease) -> Self {
        let offset = offset.abs();
        let offset = if offset > 0.0 && offset.is_finite() {
            offset
        } else {
            1.0
        };
        Self {
            target,
            offset,
            side,
            ease,
        }
    }

    /// The value being approached.
    #[must_use]
    pub const fn target(&self) -> f64 {
        self.target
    }

    /// Approach side.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Distance to the target at `progress` in `[0, 1]`.
    ///
    /// Shrinks monotonically from the full offset down to
    /// `offset * MIN_GAP_FRACTION`, never below.
    #[must_use]
    pub fn gap_at(&self, progress: f64) -> f64 {
        let remaining = 1.0 - self.ease.apply(progress);
        (self.offset * remaining).max(self.offset * MIN_GAP_FRACTION)
    }

    /// Value at `progress` in `[0, 1]`, strictly on the ramp's side of the
    /// target.
    #[must_use]
    pub fn value_at(&self, progress: f64) -> f64 {
        let gap = self.gap_at(progress);
        match self.side {
            Side::Left => {
                let v = self.target - gap;
                if v < self.target {
                    v
                } else {
                    self.target.next_down()
                }
            }
            Side::Right => {
                let v = self.target + gap;
                if v > self.target {
                    v
                } else {
                    self.target.next_up()
                }
            }
        }
    }

    /// The target, for the terminal phase.
    #[must_use]
    pub const fn settled(&self) -> f64 {
        self.target
    }
}
