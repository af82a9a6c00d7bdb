//! Exponential level curve shared by user and plant leveling.
//!
//! Each level costs 1.5x the previous one, starting at 100 XP for level 2.
//! Powers of 1.5 are built by repeated [`Decimal`] multiplication rather
//! than a float `powf`, so every platform produces the same integers.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// XP cost of the first level-up (level 1 to 2) before any divisor.
pub const BASE_CURVE_XP: Decimal = Decimal::ONE_HUNDRED;

/// Per-level cost multiplier (1.5).
pub const CURVE_GROWTH: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Incremental XP to go from `level - 1` to `level`.
///
/// Formula: `round(100 * 1.5^(level - 1) / divisor)`, midpoints rounded away
/// from zero. Returns `Some(0)` for level 1 and below. Returns `None` when
/// the divisor is not positive or the value no longer fits.
pub(crate) fn step_cost(level: u32, divisor: Decimal) -> Option<u128> {
    if level <= 1 {
        return Some(0);
    }
    if divisor <= Decimal::ZERO {
        return None;
    }

    let mut value = BASE_CURVE_XP;
    for _ in 1..level {
        value = value.checked_mul(CURVE_GROWTH)?;
    }

    value
        .checked_div(divisor)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u128()
}

/// Sum of [`step_cost`] for levels `2..=level`.
pub(crate) fn cumulative_cost(level: u32, divisor: Decimal) -> Option<u128> {
    (2..=level).try_fold(0_u128, |total, step| total.checked_add(step_cost(step, divisor)?))
}

/// Greedy climb: the highest level whose cumulative cost `total_xp` covers.
///
/// Starts at level 1 and pays each next level's cost out of the remainder
/// while it can, never passing `max_level`. A level whose cost cannot be
/// computed stops the climb.
pub(crate) fn climb(total_xp: u128, divisor: Decimal, max_level: u32) -> u32 {
    let mut level: u32 = 1;
    let mut remaining = total_xp;

    while level < max_level {
        let Some(next) = level.checked_add(1) else {
            break;
        };
        let Some(cost) = step_cost(next, divisor) else {
            break;
        };
        if remaining < cost {
            break;
        }
        remaining = remaining.saturating_sub(cost);
        level = next;
    }

    level
}
