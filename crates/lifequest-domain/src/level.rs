//! Level curve
//!
//! Levels consume a triangular XP budget: leaving level L costs
//! `base_level_xp * L`, so reaching level L+1 needs `base_level_xp * L(L+1)/2`
//! cumulative XP.

use serde::{Deserialize, Serialize};

/// Compute the level for a cumulative XP total
///
/// Level 1 is the floor. Totals below zero (administrative corrections) stay at
/// level 1. A non-positive `base_level_xp` is rejected by
/// [`crate::XpRules::validate`]; if one slips through the level stays at 1.
///
/// # Examples
///
/// ```
/// use lifequest_domain::calculate_level;
///
/// assert_eq!(calculate_level(0, 100), 1);
/// assert_eq!(calculate_level(99, 100), 1);
/// assert_eq!(calculate_level(100, 100), 2);
/// assert_eq!(calculate_level(300, 100), 3);
/// ```
pub fn calculate_level(total_xp: i64, base_level_xp: i64) -> u32 {
    level_progress(total_xp, base_level_xp).level
}

/// Position of a total within the level curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    /// Current level (>= 1)
    pub level: u32,

    /// XP accumulated since reaching `level`
    pub xp_into_level: i64,

    /// XP the current level costs in total
    pub xp_for_next_level: i64,
}

impl LevelProgress {
    /// XP still missing before the next level
    pub fn remaining(&self) -> i64 {
        (self.xp_for_next_level - self.xp_into_level).max(0)
    }

    /// Progress through the current level, 0-100
    pub fn percent(&self) -> u8 {
        if self.xp_for_next_level <= 0 {
            return 0;
        }
        (self.xp_into_level.max(0).saturating_mul(100) / self.xp_for_next_level).min(100) as u8
    }
}

/// Locate a total on the curve
///
/// Every threshold is a multiple of `base_level_xp`, so the level only depends
/// on `total_xp / base_level_xp`: the largest `L` with `L(L-1)/2 <= q`. The
/// square-root estimate is corrected with exact integer checks.
pub fn level_progress(total_xp: i64, base_level_xp: i64) -> LevelProgress {
    if base_level_xp <= 0 {
        return LevelProgress {
            level: 1,
            xp_into_level: total_xp.max(0),
            xp_for_next_level: 0,
        };
    }
    if total_xp < base_level_xp {
        return LevelProgress {
            level: 1,
            xp_into_level: total_xp.max(0),
            xp_for_next_level: base_level_xp,
        };
    }

    let q = (total_xp / base_level_xp) as u128;
    let triangle = |n: u128| n * (n + 1) / 2;

    let mut level = (((8.0 * q as f64 + 1.0).sqrt() + 1.0) / 2.0).floor().max(1.0) as u128;
    while level > 1 && triangle(level - 1) > q {
        level -= 1;
    }
    while triangle(level) <= q {
        level += 1;
    }

    let spent = i128::from(base_level_xp) * triangle(level - 1) as i128;
    LevelProgress {
        level: u32::try_from(level).unwrap_or(u32::MAX),
        xp_into_level: i64::try_from(i128::from(total_xp) - spent).unwrap_or(i64::MAX),
        xp_for_next_level: i64::try_from(i128::from(base_level_xp) * level as i128)
            .unwrap_or(i64::MAX),
    }
}

/// Cumulative XP needed to reach `level`
pub fn xp_required_for_level(level: u32, base_level_xp: i64) -> i64 {
    let below = i64::from(level.saturating_sub(1));
    base_level_xp.saturating_mul(below.saturating_mul(below + 1) / 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_starts_from_one() {
        assert_eq!(calculate_level(0, 100), 1);
    }

    #[test]
    fn test_level_thresholds_are_triangular() {
        assert_eq!(calculate_level(50, 100), 1);
        assert_eq!(calculate_level(100, 100), 2);
        assert_eq!(calculate_level(299, 100), 2);
        assert_eq!(calculate_level(300, 100), 3);
        assert_eq!(calculate_level(600, 100), 4);
        assert_eq!(calculate_level(1000, 100), 5);
    }

    #[test]
    fn test_negative_total_stays_at_floor() {
        assert_eq!(calculate_level(-500, 100), 1);
    }

    #[test]
    fn test_level_progress_within_level() {
        let progress = level_progress(350, 100);
        assert_eq!(progress.level, 3);
        assert_eq!(progress.xp_into_level, 50);
        assert_eq!(progress.xp_for_next_level, 300);
        assert_eq!(progress.remaining(), 250);
        assert_eq!(progress.percent(), 16);
    }

    #[test]
    fn test_required_xp_matches_curve() {
        assert_eq!(xp_required_for_level(1, 100), 0);
        assert_eq!(xp_required_for_level(2, 100), 100);
        assert_eq!(xp_required_for_level(4, 100), 600);
        for level in 1..20 {
            assert_eq!(calculate_level(xp_required_for_level(level, 100), 100), level);
        }
    }

    #[test]
    fn test_extreme_totals_stay_in_range() {
        let progress = level_progress(i64::MAX, 100);
        assert!(progress.level > 400_000_000);
        assert!(progress.xp_into_level < progress.xp_for_next_level);
        assert!(calculate_level(i64::MAX, 1) >= 4_000_000_000);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: level never decreases as XP grows
        #[test]
        fn test_level_monotonic(a in 0i64..2_000_000, delta in 0i64..2_000_000) {
            prop_assert!(calculate_level(a, 100) <= calculate_level(a + delta, 100));
        }

        /// Property: the reported level is bracketed by its thresholds
        #[test]
        fn test_level_bracketed(total in 0i64..5_000_000, base in 1i64..1000) {
            let level = calculate_level(total, base);
            prop_assert!(level >= 1);
            prop_assert!(xp_required_for_level(level, base) <= total);
            prop_assert!(total < xp_required_for_level(level + 1, base));
        }

        /// Property: agrees with walking the curve one level at a time
        #[test]
        fn test_matches_stepwise_walk(total in -1000i64..3_000_000, base in 1i64..500) {
            let mut level = 1u32;
            let mut remaining = total;
            while remaining >= base * i64::from(level) {
                remaining -= base * i64::from(level);
                level += 1;
            }
            let progress = level_progress(total, base);
            prop_assert_eq!(progress.level, level);
            prop_assert_eq!(progress.xp_into_level, remaining.max(0));
        }
    }
}
