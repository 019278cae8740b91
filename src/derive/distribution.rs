//! Round-robin distribution of items into equal groups.
//!
//! Items are dealt one at a time: item `i` goes to group `i mod divisor`
//! until only the remainder is left, and those last items are set aside.
//! Placements are append-only; the only way to take an item back is
//! [`RoundRobin::clear`].

use std::num::NonZeroUsize;

use serde::Serialize;

/// Where one item ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Dealt into the group with this zero-based index
    Group(usize),
    /// Left over after the last full round
    Remainder,
}

/// Dealer for `dividend` items into `divisor` groups.
#[derive(Debug, Clone)]
pub struct RoundRobin {
    dividend: usize,
    divisor: NonZeroUsize,
    placements: Vec<Placement>,
}

impl RoundRobin {
    /// Creates a dealer with nothing placed yet.
    #[must_use]
    pub fn new(dividend: usize, divisor: NonZeroUsize) -> Self {
        Self {
            dividend,
            divisor,
            placements: Vec::with_capacity(dividend),
        }
    }

    /// Number of items to deal.
    #[must_use]
    pub const fn dividend(&self) -> usize {
        self.dividend
    }

    /// Number of groups.
    #[must_use]
    pub const fn divisor(&self) -> NonZeroUsize {
        self.divisor
    }

    /// Items per group once dealing is done.
    #[must_use]
    pub const fn quotient(&self) -> usize {
        self.dividend / self.divisor.get()
    }

    /// Items left over once dealing is done.
    #[must_use]
    pub const fn remainder(&self) -> usize {
        self.dividend % self.divisor.get()
    }

    /// Items that go into groups.
    #[must_use]
    pub const fn distributable(&self) -> usize {
        self.dividend - self.remainder()
    }

    /// Placement rule for item `index`.
    #[must_use]
    pub const fn placement_of(&self, index: usize) -> Placement {
        if index < self.distributable() {
            Placement::Group(index % self.divisor.get())
        } else {
            Placement::Remainder
        }
    }

    /// Places items until `count` have been placed (capped at the
    /// dividend). Already-placed items are left alone; asking for fewer
    /// than are placed does nothing.
    pub fn place_through(&mut self, count: usize) {
        let target = count.min(self.dividend);
        while self.placements.len() < target {
            let placement = self.placement_of(self.placements.len());
            self.placements.push(placement);
        }
    }

    /// Placements made so far, in dealing order.
    #[must_use]
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Items placed so far.
    #[must_use]
    pub fn placed(&self) -> usize {
        self.placements.len()
    }

    /// Current size of each group.
    #[must_use]
    pub fn group_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.divisor.get()];
        for placement in &self.placements {
            if let Placement::Group(g) = placement {
                sizes[*g] += 1;
            }
        }
        sizes
    }

    /// Items set aside so far.
    #[must_use]
    pub fn remainder_placed(&self) -> usize {
        self.placements
            .iter()
            .filter(|p| matches!(p, Placement::Remainder))
            .count()
    }

    /// Whether every item has been placed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.placements.len() == self.dividend
    }

    /// Forgets every placement.
    pub fn clear(&mut self) {
        self.placements.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_thirteen_into_four() {
        let mut rr = RoundRobin::new(13, nz(4));
        assert_eq!(rr.quotient(), 3);
        assert_eq!(rr.remainder(), 1);
        rr.place_through(13);
        assert_eq!(rr.group_sizes(), vec![3, 3, 3, 3]);
        assert_eq!(rr.remainder_placed(), 1);
        assert_eq!(rr.placements()[12], Placement::Remainder);
        assert!(rr.is_done());
    }

    #[test]
    fn test_round_robin_order() {
        let mut rr = RoundRobin::new(6, nz(3));
        rr.place_through(5);
        assert_eq!(
            rr.placements(),
            &[
                Placement::Group(0),
                Placement::Group(1),
                Placement::Group(2),
                Placement::Group(0),
                Placement::Group(1),
            ]
        );
    }

    #[test]
    fn test_placements_are_append_only() {
        let mut rr = RoundRobin::new(10, nz(3));
        rr.place_through(7);
        let before = rr.placements().to_vec();
        rr.place_through(2);
        assert_eq!(rr.placements(), before.as_slice());
        rr.place_through(10);
        assert_eq!(&rr.placements()[..7], before.as_slice());
    }

    #[test]
    fn test_place_through_capped() {
        let mut rr = RoundRobin::new(3, nz(5));
        rr.place_through(99);
        assert_eq!(rr.placed(), 3);
        assert_eq!(rr.quotient(), 0);
        assert_eq!(rr.remainder_placed(), 3);
    }

    #[test]
    fn test_clear() {
        let mut rr = RoundRobin::new(8, nz(2));
        rr.place_through(8);
        rr.clear();
        assert_eq!(rr.placed(), 0);
        assert_eq!(rr.group_sizes(), vec![0, 0]);
    }

    #[test]
    fn test_zero_dividend() {
        let mut rr = RoundRobin::new(0, nz(4));
        rr.place_through(5);
        assert!(rr.is_done());
        assert_eq!(rr.quotient(), 0);
        assert_eq!(rr.remainder(), 0);
    }
}
