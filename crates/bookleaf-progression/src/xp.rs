//! User XP formulas: level curve, session awards, and boost application.
//!
//! # Level Curve
//!
//! The XP needed to go from level `N - 1` to level `N` is
//! `round(100 * 1.5^(N - 1))`:
//!
//! | Level | Step XP | Cumulative |
//! |-------|---------|------------|
//! | 2 | 150 | 150 |
//! | 3 | 225 | 375 |
//! | 4 | 338 | 713 |
//! | 5 | 506 | 1219 |
//!
//! [`level_from_total_xp`] is the exact left-inverse of the cumulative sum:
//! XP never overflows into a level it cannot fully pay for.
//!
//! # Session XP
//!
//! `minutes * 5 + pages * 20`, plus 50 for sessions of an hour or longer,
//! plus 20 when the reader is on a streak.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use crate::curve;

// ---------------------------------------------------------------------------
// Award constants
// ---------------------------------------------------------------------------

/// XP per minute of reading.
pub const XP_PER_MINUTE: u128 = 5;

/// XP per page read.
pub const XP_PER_PAGE: u128 = 20;

/// Session length (minutes) that earns the long-session bonus.
pub const LONG_SESSION_MINUTES: u32 = 60;

/// Flat bonus for a session of [`LONG_SESSION_MINUTES`] or more.
pub const LONG_SESSION_BONUS: u128 = 50;

/// Flat bonus while the reader is on a streak.
pub const STREAK_BONUS: u128 = 20;

/// Flat XP for finishing a book.
pub const BOOK_COMPLETION_XP: u128 = 100;

// ---------------------------------------------------------------------------
// Level curve
// ---------------------------------------------------------------------------

/// Incremental XP needed to reach `level` from `level - 1`.
///
/// Returns `Some(0)` for level 1 and below. Returns `None` only when the
/// value overflows, which happens far above any reachable level.
pub fn xp_required_for_level(level: u32) -> Option<u128> {
    curve::step_cost(level, Decimal::ONE)
}

/// Total XP needed to reach `level` from zero.
pub fn cumulative_xp_for_level(level: u32) -> Option<u128> {
    curve::cumulative_cost(level, Decimal::ONE)
}

/// The user level that `total_xp` has fully paid for.
pub fn level_from_total_xp(total_xp: u128) -> u32 {
    curve::climb(total_xp, Decimal::ONE, u32::MAX)
}

/// XP still missing before the next level.
pub fn xp_to_next_level(total_xp: u128) -> Option<u128> {
    xp_to_next_level_at(level_from_total_xp(total_xp), total_xp)
}

/// XP earned since the current level was reached.
pub fn xp_into_level(total_xp: u128) -> Option<u128> {
    xp_into_level_at(level_from_total_xp(total_xp), total_xp)
}

/// Fraction of the current level completed, in `[0, 1)`.
pub fn level_progress(total_xp: u128) -> Option<Decimal> {
    level_progress_at(level_from_total_xp(total_xp), total_xp)
}

/// XP still missing before `level + 1`, for a user standing at `level`.
///
/// `level` may be ahead of what `total_xp` pays for (a seeded record); the
/// result is then the full distance to the next level's threshold.
pub fn xp_to_next_level_at(level: u32, total_xp: u128) -> Option<u128> {
    Some(cumulative_xp_for_level(level.checked_add(1)?)?.saturating_sub(total_xp))
}

/// XP earned inside `level`. Zero when `level` is ahead of `total_xp`.
pub fn xp_into_level_at(level: u32, total_xp: u128) -> Option<u128> {
    Some(total_xp.saturating_sub(cumulative_xp_for_level(level)?))
}

/// Fraction of `level` completed by `total_xp`, clamped to `[0, 1]`.
pub fn level_progress_at(level: u32, total_xp: u128) -> Option<Decimal> {
    let into = Decimal::from_u128(xp_into_level_at(level, total_xp)?)?;
    let span = Decimal::from_u128(xp_required_for_level(level.checked_add(1)?)?)?;
    Some(into.checked_div(span)?.min(Decimal::ONE))
}

// ---------------------------------------------------------------------------
// Awards
// ---------------------------------------------------------------------------

/// Base XP for a reading session.
pub fn session_xp(minutes: u32, pages_read: Option<u32>, has_streak: bool) -> u128 {
    let reading = u128::from(minutes).saturating_mul(XP_PER_MINUTE);
    let pages = u128::from(pages_read.unwrap_or(0)).saturating_mul(XP_PER_PAGE);
    let mut xp = reading.saturating_add(pages);

    if minutes >= LONG_SESSION_MINUTES {
        xp = xp.saturating_add(LONG_SESSION_BONUS);
    }
    if has_streak {
        xp = xp.saturating_add(STREAK_BONUS);
    }
    xp
}

/// Base XP for finishing a book.
pub const fn book_completion_xp() -> u128 {
    BOOK_COMPLETION_XP
}

/// Apply a summed boost fraction: `floor(base_xp * (1 + boost_fraction))`.
///
/// Returns `None` on overflow or if a negative boost would drive the result
/// below zero.
pub fn apply_boost(base_xp: u128, boost_fraction: Decimal) -> Option<u128> {
    let multiplier = Decimal::ONE.checked_add(boost_fraction)?;
    Decimal::from_u128(base_xp)?
        .checked_mul(multiplier)?
        .floor()
        .to_u128()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn required_xp_matches_curve_table() {
        assert_eq!(xp_required_for_level(0), Some(0));
        assert_eq!(xp_required_for_level(1), Some(0));
        assert_eq!(xp_required_for_level(2), Some(150));
        assert_eq!(xp_required_for_level(3), Some(225));
        assert_eq!(xp_required_for_level(4), Some(338));
        assert_eq!(xp_required_for_level(5), Some(506));
    }

    #[test]
    fn cumulative_matches_curve_table() {
        assert_eq!(cumulative_xp_for_level(1), Some(0));
        assert_eq!(cumulative_xp_for_level(2), Some(150));
        assert_eq!(cumulative_xp_for_level(3), Some(375));
        assert_eq!(cumulative_xp_for_level(4), Some(713));
        assert_eq!(cumulative_xp_for_level(5), Some(1219));
    }

    #[test]
    fn level_thresholds_round_trip_to_level_100() {
        for level in 1..=100_u32 {
            let threshold = cumulative_xp_for_level(level);
            assert!(threshold.is_some(), "no threshold for level {level}");
            let threshold = threshold.unwrap_or_default();

            assert_eq!(level_from_total_xp(threshold), level, "at threshold of {level}");
            if level >= 2 {
                assert_eq!(
                    level_from_total_xp(threshold.saturating_sub(1)),
                    level.saturating_sub(1),
                    "one XP below threshold of {level}"
                );
            }
        }
    }

    #[test]
    fn required_xp_strictly_increases() {
        let mut previous = 0_u128;
        for level in 2..=100_u32 {
            let required = xp_required_for_level(level).unwrap_or_default();
            assert!(required > previous, "level {level} not above level before it");
            previous = required;
        }
    }

    #[test]
    fn level_is_monotonic_in_xp() {
        let mut previous = 1_u32;
        for total in (0..20_000_u128).step_by(37) {
            let level = level_from_total_xp(total);
            assert!(level >= previous);
            previous = level;
        }
    }

    #[test]
    fn zero_xp_is_level_one() {
        assert_eq!(level_from_total_xp(0), 1);
        assert_eq!(level_from_total_xp(149), 1);
        assert_eq!(level_from_total_xp(150), 2);
    }

    #[test]
    fn progress_within_level() {
        // 150 XP reaches level 2; level 3 needs another 225.
        assert_eq!(xp_into_level(150), Some(0));
        assert_eq!(xp_to_next_level(150), Some(225));
        assert_eq!(xp_into_level(200), Some(50));
        assert_eq!(xp_to_next_level(200), Some(175));
        assert_eq!(level_progress(0), Some(Decimal::ZERO));
        assert_eq!(level_progress(75), Some(dec!(0.5)));
    }

    #[test]
    fn progress_at_a_level_ahead_of_xp() {
        // Level 3 starts at 375 and level 4 at 713.
        assert_eq!(xp_into_level_at(3, 200), Some(0));
        assert_eq!(xp_to_next_level_at(3, 200), Some(513));
        assert_eq!(level_progress_at(3, 200), Some(Decimal::ZERO));

        assert_eq!(xp_into_level_at(3, 544), Some(169));
        assert_eq!(xp_to_next_level_at(3, 544), Some(169));
        assert_eq!(level_progress_at(3, 544), Some(dec!(0.5)));
    }

    #[test]
    fn progress_at_derived_level_matches_plain_helpers() {
        for total in [0_u128, 149, 150, 640, 5_000] {
            let level = level_from_total_xp(total);
            assert_eq!(xp_into_level_at(level, total), xp_into_level(total));
            assert_eq!(xp_to_next_level_at(level, total), xp_to_next_level(total));
            assert_eq!(level_progress_at(level, total), level_progress(total));
        }
    }

    #[test]
    fn hour_session_with_pages() {
        // 60*5 + 30*20 + 50 = 950
        assert_eq!(session_xp(60, Some(30), false), 950);
    }

    #[test]
    fn short_session_without_pages() {
        assert_eq!(session_xp(25, None, false), 125);
        assert_eq!(session_xp(59, None, false), 295);
    }

    #[test]
    fn streak_adds_flat_bonus() {
        assert_eq!(session_xp(10, None, true), 70);
        assert_eq!(session_xp(60, Some(30), true), 970);
    }

    #[test]
    fn empty_session_only_earns_streak() {
        assert_eq!(session_xp(0, None, false), 0);
        assert_eq!(session_xp(0, Some(0), true), STREAK_BONUS);
    }

    #[test]
    fn book_completion_is_flat() {
        assert_eq!(book_completion_xp(), 100);
    }

    #[test]
    fn boost_floors_result() {
        assert_eq!(apply_boost(950, Decimal::ZERO), Some(950));
        assert_eq!(apply_boost(100, dec!(0.075)), Some(107));
        assert_eq!(apply_boost(199, dec!(0.1)), Some(218));
        assert_eq!(apply_boost(1000, dec!(1.5)), Some(2500));
    }

    #[test]
    fn boost_below_minus_one_rejected() {
        assert_eq!(apply_boost(100, dec!(-2)), None);
    }
}
