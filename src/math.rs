//! Integer arithmetic helpers shared by the problem kinds.

use std::fmt;

use serde::Serialize;

/// Greatest common divisor, always non-negative. `gcd(0, 0) == 0`.
#[must_use]
pub const fn gcd(a: i64, b: i64) -> i64 {
    let mut a = a.unsigned_abs();
    let mut b = b.unsigned_abs();
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    // Operands are bounded well below i64::MAX by problem validation.
    #[allow(clippy::cast_possible_wrap)]
    let g = a as i64;
    g
}

/// Least common multiple, always non-negative. Zero if either input is zero.
#[must_use]
pub const fn lcm(a: i64, b: i64) -> i64 {
    if a == 0 || b == 0 {
        return 0;
    }
    (a / gcd(a, b) * b).abs()
}

/// A rational number with a positive denominator.
///
/// Not automatically reduced: walkthroughs show the unreduced form before
/// the simplify step, so reduction is explicit via [`Fraction::reduced`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Fraction {
    /// Numerator, carries the sign.
    pub num: i64,
    /// Denominator, always positive.
    pub den: i64,
}

impl Fraction {
    /// Creates a fraction, moving any sign onto the numerator.
    ///
    /// Returns `None` when `den` is zero.
    #[must_use]
    pub const fn new(num: i64, den: i64) -> Option<Self> {
        if den == 0 {
            return None;
        }
        if den < 0 {
            Some(Self {
                num: -num,
                den: -den,
            })
        } else {
            Some(Self { num, den })
        }
    }

    /// Common factor of numerator and denominator.
    #[must_use]
    pub const fn common_factor(self) -> i64 {
        let g = gcd(self.num, self.den);
        if g == 0 { 1 } else { g }
    }

    /// Whether [`reduced`](Self::reduced) would change the fraction.
    #[must_use]
    pub const fn is_reducible(self) -> bool {
        self.common_factor() > 1
    }

    /// Lowest-terms form.
    #[must_use]
    pub const fn reduced(self) -> Self {
        let g = self.common_factor();
        Self {
            num: self.num / g,
            den: self.den / g,
        }
    }

    /// Swaps numerator and denominator. `None` for a zero numerator.
    #[must_use]
    pub const fn reciprocal(self) -> Option<Self> {
        Self::new(self.den, self.num)
    }

    /// Rewrites the fraction over `den`, which must be a multiple of the
    /// current denominator.
    #[must_use]
    pub const fn scaled_to(self, den: i64) -> Self {
        let factor = den / self.den;
        Self {
            num: self.num * factor,
            den,
        }
    }

    /// Unreduced product.
    #[must_use]
    pub const fn times(self, other: Self) -> Self {
        Self {
            num: self.num * other.num,
            den: self.den * other.den,
        }
    }

    /// Value as a float.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn to_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}
