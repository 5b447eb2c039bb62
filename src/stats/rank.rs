//! Trending rank for tags.
//!
//! rank = usage + recency, where:
//! - usage is `total_used`
//! - recency is `max(0, window - days_since_last_used) * weight`
//!
//! With the default weights the recency bonus is 3.5 on the day of use and
//! reaches zero after seven days. Elapsed time is floored to whole days and
//! negative elapsed time (clock skew) counts as zero.

use chrono::{DateTime, Utc};

use crate::config::RankingConfig;

/// Default rank weights.
pub mod weights {
    /// Days over which the recency bonus decays to zero.
    pub const RECENCY_WINDOW_DAYS: u32 = 7;
    /// Bonus per remaining day inside the window.
    pub const RECENCY_WEIGHT: f64 = 0.5;
    /// Rank a tag row carries between creation and its first recompute.
    pub const SEED_RANK: f64 = 1.0;
}

/// Pure rank function over `(total_used, last_used_at, now)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankCalculator {
    window_days: u32,
    weight: f64,
    seed: f64,
}

impl Default for RankCalculator {
    fn default() -> Self {
        Self {
            window_days: weights::RECENCY_WINDOW_DAYS,
            weight: weights::RECENCY_WEIGHT,
            seed: weights::SEED_RANK,
        }
    }
}

impl RankCalculator {
    pub fn new(window_days: u32, weight: f64, seed: f64) -> Self {
        Self {
            window_days,
            weight,
            seed,
        }
    }

    pub fn from_config(config: &RankingConfig) -> Self {
        Self::new(
            config.recency_window_days,
            config.recency_weight,
            config.seed_rank,
        )
    }

    /// Rank written into a freshly created row.
    pub fn seed_rank(&self) -> f64 {
        self.seed
    }

    /// Whole days between `last_used_at` and `now`, never negative.
    pub fn days_since(last_used_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
        (now - last_used_at).num_days().max(0)
    }

    /// Recency bonus for a tag last used `days` days ago.
    pub fn recency_score(&self, days: i64) -> f64 {
        let remaining = (i64::from(self.window_days) - days).max(0);
        remaining as f64 * self.weight
    }

    /// Compute the rank at evaluation time `now`.
    pub fn rank(&self, total_used: u64, last_used_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        let usage_score = total_used as f64;
        usage_score + self.recency_score(Self::days_since(last_used_at, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_same_instant_rank() {
        let calc = RankCalculator::default();
        let now = Utc::now();
        assert_eq!(calc.rank(1, now, now), 4.5);
        assert_eq!(calc.rank(2, now, now), 5.5);
    }

    #[test]
    fn test_recency_decays_linearly() {
        let calc = RankCalculator::default();
        let now = Utc::now();
        assert_eq!(calc.rank(3, now - Duration::days(1), now), 6.0);
        assert_eq!(calc.rank(3, now - Duration::days(6), now), 3.5);
        assert_eq!(calc.rank(3, now - Duration::days(7), now), 3.0);
        assert_eq!(calc.rank(3, now - Duration::days(40), now), 3.0);
    }

    #[test]
    fn test_partial_days_are_floored() {
        let calc = RankCalculator::default();
        let now = Utc::now();
        let last = now - Duration::hours(47);
        assert_eq!(RankCalculator::days_since(last, now), 1);
        assert_eq!(calc.rank(0, last, now), 3.0);
    }

    #[test]
    fn test_clock_skew_counts_as_zero_days() {
        let calc = RankCalculator::default();
        let now = Utc::now();
        let future = now + Duration::days(3);
        assert_eq!(RankCalculator::days_since(future, now), 0);
        assert_eq!(calc.rank(1, future, now), 4.5);
    }

    #[test]
    fn test_custom_weights() {
        let calc = RankCalculator::from_config(&RankingConfig {
            recency_window_days: 2,
            recency_weight: 2.0,
            seed_rank: 0.0,
        });
        let now = Utc::now();
        assert_eq!(calc.rank(1, now, now), 5.0);
        assert_eq!(calc.rank(1, now - Duration::days(1), now), 3.0);
        assert_eq!(calc.rank(1, now - Duration::days(2), now), 1.0);
        assert_eq!(calc.seed_rank(), 0.0);
    }

    #[test]
    fn test_default_matches_default_config() {
        assert_eq!(
            RankCalculator::default(),
            RankCalculator::from_config(&RankingConfig::default())
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Property: more usage never lowers rank at fixed recency
            #[test]
            fn prop_rank_non_decreasing_in_usage(
                used in 0u64..10_000,
                extra in 0u64..1_000,
                age_hours in 0i64..(24 * 30),
            ) {
                let calc = RankCalculator::default();
                let now = Utc::now();
                let last = now - Duration::hours(age_hours);
                prop_assert!(calc.rank(used + extra, last, now) >= calc.rank(used, last, now));
            }

            // Property: older last use never raises rank at fixed usage
            #[test]
            fn prop_rank_non_increasing_in_age(
                used in 0u64..10_000,
                age_days in 0i64..60,
                later in 0i64..60,
            ) {
                let calc = RankCalculator::default();
                let now = Utc::now();
                let newer = calc.rank(used, now - Duration::days(age_days), now);
                let older = calc.rank(used, now - Duration::days(age_days + later), now);
                prop_assert!(older <= newer);
            }

            // Property: past the window, rank is exactly usage
            #[test]
            fn prop_rank_floors_at_usage(used in 0u64..10_000, age_days in 7i64..3_650) {
                let calc = RankCalculator::default();
                let now = Utc::now();
                let rank = calc.rank(used, now - Duration::days(age_days), now);
                prop_assert_eq!(rank, used as f64);
            }

            // Property: rank stays within [usage, usage + 3.5]
            #[test]
            fn prop_rank_bounded(used in 0u64..10_000, age_secs in -1_000_000i64..10_000_000) {
                let calc = RankCalculator::default();
                let now = Utc::now();
                let rank = calc.rank(used, now - Duration::seconds(age_secs), now);
                prop_assert!(rank >= used as f64);
                prop_assert!(rank <= used as f64 + 3.5);
            }
        }
    }
}
