//! Trend aggregation
//!
//! One linear pass over a team's games fills the outcome buckets, then the
//! formatter turns bucket counts into threshold-gated sentences.

pub mod aggregator;
pub mod buckets;
pub mod classify;
pub mod format;
pub mod record;
pub mod rules;

pub use aggregator::{OddsLookup, TrendAggregator};
pub use buckets::{SkippedGame, SpreadSummary, TrendBuckets};
pub use format::{Category, TrendFormatter, TrendLine};
pub use record::TeamRecord;
pub use rules::{RangeRule, RuleSet};

/// Whole-number percentage, rounding halves up. `None` when there is nothing to divide by.
pub fn percent(numerator: usize, denominator: usize) -> Option<u32> {
    if denominator == 0 {
        return None;
    }
    // (n / d * 100) rounded half-up, kept in integers
    let scaled = (200 * numerator + denominator) / (2 * denominator);
    Some(scaled as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rounds_half_up() {
        assert_eq!(percent(1, 3), Some(33));
        assert_eq!(percent(2, 3), Some(67));
        assert_eq!(percent(1, 8), Some(13)); // 12.5
        assert_eq!(percent(1, 200), Some(1)); // 0.5
        assert_eq!(percent(0, 4), Some(0));
        assert_eq!(percent(4, 4), Some(100));
        assert_eq!(percent(1, 0), None);
    }
}
