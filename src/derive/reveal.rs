//! Progressive reveal: one more item every `step` ticks.

/// Items visible after `elapsed` ticks of the revealing phase.
///
/// Zero at the start of the phase, never decreasing, capped at `total`.
/// A zero `step` reveals everything at once.
#[must_use]
pub fn revealed(elapsed: u64, total: usize, step: u64) -> usize {
    if step == 0 {
        return total;
    }
    usize::try_from(elapsed / step).map_or(total, |n| n.min(total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        assert_eq!(revealed(0, 5, 3), 0);
        assert_eq!(revealed(2, 5, 3), 0);
    }

    #[test]
    fn test_one_item_per_step() {
        assert_eq!(revealed(3, 5, 3), 1);
        assert_eq!(revealed(8, 5, 3), 2);
        assert_eq!(revealed(9, 5, 3), 3);
    }

    #[test]
    fn test_capped_at_total() {
        assert_eq!(revealed(1_000, 5, 3), 5);
        assert_eq!(revealed(u64::MAX, 5, 1), 5);
    }

    #[test]
    fn test_zero_step_reveals_all() {
        assert_eq!(revealed(0, 4, 0), 4);
    }

    #[test]
    fn test_zero_total() {
        assert_eq!(revealed(50, 0, 2), 0);
    }
}
