//! XP and level curve.
//!
//! Levels follow a quadratic progression: reaching level `n` costs
//! `(n-1)*100 + floor((n-2)*(n-1)/2)*50` cumulative XP. Level 100 is a hard
//! ceiling; XP past its threshold keeps accumulating but never raises the
//! level further.

use serde::{Deserialize, Serialize};

/// Highest reachable level.
pub const MAX_LEVEL: u32 = 100;

/// Coins granted per reached level on level-up (`new_level * 10`).
pub const LEVEL_UP_BONUS_PER_LEVEL: i64 = 10;

/// Cumulative XP required to reach `level`.
pub fn xp_for_level(level: u32) -> i64 {
    if level <= 1 {
        return 0;
    }
    let l = i64::from(level);
    (l - 1) * 100 + ((l - 2) * (l - 1) / 2) * 50
}

/// Level for a cumulative XP total, capped at [`MAX_LEVEL`].
pub fn level_for_xp(total_xp: i64) -> u32 {
    (1..=MAX_LEVEL)
        .find(|&level| xp_for_level(level + 1) > total_xp)
        .unwrap_or(MAX_LEVEL)
}

/// Coin bonus granted when a profile reaches `new_level`.
pub fn level_up_bonus(new_level: u32) -> i64 {
    i64::from(new_level) * LEVEL_UP_BONUS_PER_LEVEL
}

/// Level plus progress within the current level band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub level: u32,
    pub total_xp: i64,
    pub current_level_xp: i64,
    pub next_level_xp: Option<i64>,
    pub xp_to_next_level: i64,
    pub progress_percentage: f64,
}

pub fn level_info(total_xp: i64) -> LevelInfo {
    let level = level_for_xp(total_xp);
    let current_level_xp = xp_for_level(level);

    if level >= MAX_LEVEL {
        return LevelInfo {
            level,
            total_xp,
            current_level_xp,
            next_level_xp: None,
            xp_to_next_level: 0,
            progress_percentage: 100.0,
        };
    }

    let next_level_xp = xp_for_level(level + 1);
    let band = (next_level_xp - current_level_xp) as f64;
    let into_band = (total_xp - current_level_xp).max(0) as f64;
    let progress = (into_band / band * 100.0).clamp(0.0, 100.0);

    LevelInfo {
        level,
        total_xp,
        current_level_xp,
        next_level_xp: Some(next_level_xp),
        xp_to_next_level: (next_level_xp - total_xp).max(0),
        progress_percentage: (progress * 100.0).round() / 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn thresholds_match_curve() {
        assert_eq!(xp_for_level(0), 0);
        assert_eq!(xp_for_level(1), 0);
        assert_eq!(xp_for_level(2), 100);
        assert_eq!(xp_for_level(3), 250);
        assert_eq!(xp_for_level(4), 450);
        assert_eq!(xp_for_level(5), 700);
    }

    #[test]
    fn level_boundaries() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(150), 2);
        assert_eq!(level_for_xp(249), 2);
        assert_eq!(level_for_xp(250), 3);
    }

    #[test]
    fn negative_xp_is_level_one() {
        assert_eq!(level_for_xp(-5), 1);
    }

    #[test]
    fn cap_is_hard_ceiling() {
        let at_cap = xp_for_level(MAX_LEVEL);
        assert_eq!(level_for_xp(at_cap), MAX_LEVEL);
        assert_eq!(level_for_xp(at_cap - 1), MAX_LEVEL - 1);
        assert_eq!(level_for_xp(i64::MAX / 2), MAX_LEVEL);
    }

    #[test]
    fn info_reports_band_progress() {
        let info = level_info(150);
        assert_eq!(info.level, 2);
        assert_eq!(info.current_level_xp, 100);
        assert_eq!(info.next_level_xp, Some(250));
        assert_eq!(info.xp_to_next_level, 100);
        assert!((info.progress_percentage - 33.33).abs() < 0.01);
    }

    #[test]
    fn info_clamps_at_cap() {
        let info = level_info(xp_for_level(MAX_LEVEL) + 10_000);
        assert_eq!(info.level, MAX_LEVEL);
        assert_eq!(info.next_level_xp, None);
        assert_eq!(info.xp_to_next_level, 0);
        assert_eq!(info.progress_percentage, 100.0);
    }

    #[test]
    fn bonus_scales_with_level() {
        assert_eq!(level_up_bonus(2), 20);
        assert_eq!(level_up_bonus(10), 100);
    }

    proptest! {
        #[test]
        fn level_is_monotonic(a in 0i64..2_000_000, b in 0i64..2_000_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(level_for_xp(lo) <= level_for_xp(hi));
        }

        #[test]
        fn level_never_exceeds_cap(xp in 0i64..i64::MAX / 4) {
            prop_assert!(level_for_xp(xp) <= MAX_LEVEL);
            prop_assert!(level_for_xp(xp) >= 1);
        }

        #[test]
        fn progress_stays_in_range(xp in 0i64..3_000_000) {
            let info = level_info(xp);
            prop_assert!(info.progress_percentage >= 0.0);
            prop_assert!(info.progress_percentage <= 100.0);
        }
    }
}
