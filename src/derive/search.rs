//! Multi-candidate factor search.
//!
//! For `ax² + bx + c` the search looks for integers `p, q` with
//! `p · q = a · c` and `p + q = b`. Every integer pair whose product matches
//! is a candidate. Candidates are tried one per interval; the matching pair,
//! if there is one, is always tried last so that every wrong candidate is
//! shown and rejected first.

use serde::Serialize;

/// A candidate factor pair.
pub type Pair = (i64, i64);

/// How the search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// A pair with the right sum exists
    Found {
        /// The pair
        pair: Pair,
    },
    /// No pair has the right sum
    Exhausted,
}

/// Ordered candidate list for one product and target sum.
#[derive(Debug, Clone)]
pub struct FactorSearch {
    product: i64,
    target_sum: i64,
    candidates: Vec<Pair>,
    outcome: SearchOutcome,
}

impl FactorSearch {
    /// Enumerates candidates for `product` and `target_sum`.
    ///
    /// A zero product has infinitely many pairs; the only one worth
    /// showing is `(0, target_sum)`.
    #[must_use]
    pub fn new(product: i64, target_sum: i64) -> Self {
        let mut candidates = if product == 0 {
            vec![(0, target_sum)]
        } else {
            enumerate_pairs(product)
        };

        let winner = candidates
            .iter()
            .position(|&(p, q)| p + q == target_sum);
        let outcome = match winner {
            Some(i) => {
                let pair = candidates.remove(i);
                candidates.push(pair);
                SearchOutcome::Found { pair }
            }
            None => SearchOutcome::Exhausted,
        };

        Self {
            product,
            target_sum,
            candidates,
            outcome,
        }
    }

    /// Product every candidate multiplies to.
    #[must_use]
    pub const fn product(&self) -> i64 {
        self.product
    }

    /// Sum being searched for.
    #[must_use]
    pub const fn target_sum(&self) -> i64 {
        self.target_sum
    }

    /// Candidates in evaluation order.
    #[must_use]
    pub fn candidates(&self) -> &[Pair] {
        &self.candidates
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Never true: even a zero product has one candidate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Result once every candidate has been tried.
    #[must_use]
    pub const fn outcome(&self) -> SearchOutcome {
        self.outcome
    }

    /// Candidates evaluated after `elapsed` ticks of searching, one per
    /// `interval`. The first candidate is shown immediately.
    #[must_use]
    pub fn evaluated_after(&self, elapsed: u64, interval: u64) -> usize {
        let steps = if interval == 0 {
            self.len()
        } else {
            usize::try_from(elapsed / interval).map_or(self.len(), |n| n.saturating_add(1))
        };
        steps.min(self.len())
    }

    /// Whether `pair` has the target sum.
    #[must_use]
    pub const fn matches(&self, pair: Pair) -> bool {
        pair.0 + pair.1 == self.target_sum
    }
}

/// All integer pairs multiplying to a non-zero `product`, smallest
/// magnitude first, each unordered pair once.
fn enumerate_pairs(product: i64) -> Vec<Pair> {
    let magnitude = product.unsigned_abs();
    let mut positive = Vec::new();
    let mut negative = Vec::new();

    let mut d: u64 = 1;
    while d.saturating_mul(d) <= magnitude {
        if magnitude % d == 0 {
            // Magnitudes are bounded by problem validation, far below i64::MAX.
            let small = i64::try_from(d).unwrap_or(i64::MAX);
            let large = i64::try_from(magnitude / d).unwrap_or(i64::MAX);
            if product > 0 {
                positive.push((small, large));
                negative.push((-small, -large));
            } else {
                positive.push((small, -large));
                if small != large {
                    negative.push((-small, large));
                }
            }
        }
        d += 1;
    }

    positive.extend(negative);
    positive
}
