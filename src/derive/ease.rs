//! Easing curves for the convergence ramp.

use serde::{Deserialize, Serialize};

/// Easing curve mapping linear progress in `[0, 1]` onto eased progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// Constant speed
    #[default]
    Linear,
    /// Starts slow, speeds up
    InQuad,
    /// Starts fast, slows down
    OutQuad,
    /// Slow at both ends
    InOutQuad,
    /// Like `OutQuad` with a longer tail
    OutCubic,
}

impl Ease {
    /// Applies the curve. Input is clamped to `[0, 1]`.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}
