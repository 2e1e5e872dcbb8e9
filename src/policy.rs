//! Contains the deallocation thresholds of a [`SlotMap`](crate::SlotMap).

/// Default number of garbage slots that must be exceeded before a shrink.
pub const DEFAULT_GARBAGE_COUNT: usize = 1000;

/// Default fraction of garbage slots that must be exceeded before a shrink.
pub const DEFAULT_GARBAGE_RATIO: f64 = 0.1;

/// Decides when a [`SlotMap`](crate::SlotMap) gives trailing garbage slots
/// back to the allocator.
///
/// Removing an entry leaves an empty slot at the end of the dense storage.
/// These slots are reused by later insertions, so a map under steady churn
/// never shrinks. Only when **both** the number of garbage slots exceeds
/// `garbage_count` **and** the fraction of garbage slots exceeds
/// `garbage_ratio` is the storage truncated to the live entries.
///
/// A map holding a million entries with 1001 garbage slots therefore keeps its
/// storage (0.1% is far below the default 10%), while a small working set with
/// heavy turnover gets its memory back.
///
/// # Examples
///
/// ```
/// # use keyed_slotmap::*;
/// let policy = ShrinkPolicy::default()
///     .with_garbage_count(16)
///     .with_garbage_ratio(0.5);
/// assert!(policy.should_shrink(20, 3));
/// assert!(!policy.should_shrink(20, 15));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShrinkPolicy {
    garbage_count: usize,
    garbage_ratio: f64,
}

impl ShrinkPolicy {
    /// Creates a policy with the given thresholds.
    ///
    /// # Panics
    ///
    /// Panics if `garbage_ratio` is NaN or outside `0.0..=1.0`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use keyed_slotmap::*;
    /// let policy = ShrinkPolicy::new(1000, 0.1);
    /// assert_eq!(policy, ShrinkPolicy::default());
    /// ```
    pub fn new(garbage_count: usize, garbage_ratio: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&garbage_ratio),
            "ShrinkPolicy garbage ratio must be within 0.0..=1.0"
        );
        ShrinkPolicy {
            garbage_count,
            garbage_ratio,
        }
    }

    /// A policy that never shrinks. The storage then only grows, like a
    /// `Vec` that is never truncated.
    pub fn never() -> Self {
        ShrinkPolicy {
            garbage_count: std::usize::MAX,
            garbage_ratio: 1.0,
        }
    }

    /// Returns this policy with the garbage count threshold replaced.
    pub fn with_garbage_count(self, garbage_count: usize) -> Self {
        ShrinkPolicy::new(garbage_count, self.garbage_ratio)
    }

    /// Returns this policy with the garbage ratio threshold replaced.
    ///
    /// # Panics
    ///
    /// Panics if `garbage_ratio` is NaN or outside `0.0..=1.0`.
    pub fn with_garbage_ratio(self, garbage_ratio: f64) -> Self {
        ShrinkPolicy::new(self.garbage_count, garbage_ratio)
    }

    /// The number of garbage slots that must be exceeded.
    pub fn garbage_count(&self) -> usize {
        self.garbage_count
    }

    /// The fraction of garbage slots that must be exceeded.
    pub fn garbage_ratio(&self) -> f64 {
        self.garbage_ratio
    }

    /// Returns whether storage of `dense_len` slots of which only `live` are
    /// occupied should be truncated to `live`.
    pub fn should_shrink(&self, dense_len: usize, live: usize) -> bool {
        let garbage = dense_len.saturating_sub(live);
        if garbage == 0 || garbage <= self.garbage_count {
            return false;
        }

        // Both counts fit comfortably in an f64 mantissa for any real map.
        let ratio = garbage as f64 / dense_len as f64;
        ratio > self.garbage_ratio
    }
}

impl Default for ShrinkPolicy {
    fn default() -> Self {
        ShrinkPolicy {
            garbage_count: DEFAULT_GARBAGE_COUNT,
            garbage_ratio: DEFAULT_GARBAGE_RATIO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_alone_is_not_enough() {
        let policy = ShrinkPolicy::default();
        assert!(!policy.should_shrink(1_000_999, 1_000_000));
        assert!(!policy.should_shrink(1_001_001, 1_000_000));
    }

    #[test]
    fn ratio_alone_is_not_enough() {
        let policy = ShrinkPolicy::default();
        // 100% garbage, but only 1000 slots of it.
        assert!(!policy.should_shrink(1000, 0));
        assert!(!policy.should_shrink(1999, 1000));
    }

    #[test]
    fn both_thresholds_exceeded() {
        let policy = ShrinkPolicy::default();
        assert!(policy.should_shrink(1001, 0));
        assert!(policy.should_shrink(10_000, 8_000));
        // Exactly 10% is not more than 10%.
        assert!(!policy.should_shrink(20_000, 18_000));
        assert!(policy.should_shrink(20_000, 17_999));
    }

    #[test]
    fn never_shrinks() {
        let policy = ShrinkPolicy::never();
        assert!(!policy.should_shrink(std::usize::MAX, 0));
        assert!(!policy.should_shrink(5000, 0));
    }

    #[test]
    fn no_garbage_never_shrinks() {
        let policy = ShrinkPolicy::new(0, 0.0);
        assert!(!policy.should_shrink(0, 0));
        assert!(!policy.should_shrink(10, 10));
        assert!(policy.should_shrink(10, 9));
    }

    #[test]
    #[should_panic]
    fn rejects_out_of_range_ratio() {
        let _ = ShrinkPolicy::new(10, 1.5);
    }

    #[test]
    #[should_panic]
    fn rejects_nan_ratio() {
        let _ = ShrinkPolicy::default().with_garbage_ratio(std::f64::NAN);
    }
}
