//! Plant leveling, health decay, and XP boost formulas.
//!
//! Plants level on the same 1.5x curve as users, divided by the species'
//! growth rate: a species with growth rate 2 needs half the XP per level.
//!
//! # Health Ladder
//!
//! Health is a pure function of time since the last watering:
//!
//! | Elapsed | Status |
//! |---------|--------|
//! | `< interval` | Healthy |
//! | `< 1.5 * interval` | Thirsty |
//! | `< 2 * interval` | Wilting |
//! | otherwise | Dead |
//!
//! Elapsed time is compared in whole seconds against thresholds built from
//! `interval_days * 86_400`, so the 1.5x boundary is exact. Nothing here
//! reads the clock; callers pass `now`.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use bookleaf_types::{PlantSpecies, PlantStatus, UserPlant};

use crate::curve;

/// Seconds in one watering-interval day.
const SECONDS_PER_DAY: i64 = 86_400;

/// Hours before turning thirsty at which a plant is flagged for water.
pub const WATER_WARNING_HOURS: i64 = 6;

// ---------------------------------------------------------------------------
// Leveling
// ---------------------------------------------------------------------------

/// Incremental plant XP to reach `level` from `level - 1`.
///
/// Formula: `round(100 * 1.5^(level - 1) / growth_rate)`. Returns `Some(0)`
/// for level 1 and below, `None` for a non-positive growth rate or overflow.
pub fn xp_for_plant_level(level: u32, growth_rate: Decimal) -> Option<u128> {
    curve::step_cost(level, growth_rate)
}

/// Total plant XP needed to reach `level` from zero.
pub fn cumulative_xp_for_level(level: u32, growth_rate: Decimal) -> Option<u128> {
    curve::cumulative_cost(level, growth_rate)
}

/// The plant level `total_xp` has paid for, clamped to `max_level`.
pub fn level_from_xp(total_xp: u128, growth_rate: Decimal, max_level: u32) -> u32 {
    curve::climb(total_xp, growth_rate, max_level.max(1))
}

/// Whether a plant at `current_level` with `xp` can advance one level.
pub fn can_level_up(current_level: u32, xp: u128, growth_rate: Decimal, max_level: u32) -> bool {
    if current_level >= max_level {
        return false;
    }
    current_level
        .checked_add(1)
        .and_then(|next| cumulative_xp_for_level(next, growth_rate))
        .is_some_and(|needed| xp >= needed)
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// Whole seconds since `last_watered`. Future timestamps count as zero.
fn elapsed_seconds(last_watered: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    now.signed_duration_since(last_watered).num_seconds().max(0)
}

/// The watering interval in seconds.
fn interval_seconds(water_interval_days: u32) -> i64 {
    i64::from(water_interval_days).saturating_mul(SECONDS_PER_DAY)
}

/// Health of a plant last watered at `last_watered`, as of `now`.
pub fn health_state(
    last_watered: DateTime<Utc>,
    water_interval_days: u32,
    now: DateTime<Utc>,
) -> PlantStatus {
    let elapsed = elapsed_seconds(last_watered, now);
    let thirsty_at = interval_seconds(water_interval_days);
    let wilting_at = thirsty_at
        .saturating_mul(3)
        .checked_div(2)
        .unwrap_or(i64::MAX);
    let dead_at = thirsty_at.saturating_mul(2);

    if elapsed >= dead_at {
        PlantStatus::Dead
    } else if elapsed >= wilting_at {
        PlantStatus::Wilting
    } else if elapsed >= thirsty_at {
        PlantStatus::Thirsty
    } else {
        PlantStatus::Healthy
    }
}

/// Whether the plant turns thirsty within `window` but has not yet.
pub fn needs_water_within(
    last_watered: DateTime<Utc>,
    water_interval_days: u32,
    now: DateTime<Utc>,
    window: Duration,
) -> bool {
    let elapsed = elapsed_seconds(last_watered, now);
    let thirsty_at = interval_seconds(water_interval_days);
    let warn_at = thirsty_at.saturating_sub(window.num_seconds());
    elapsed >= warn_at && elapsed < thirsty_at
}

/// Whether the plant turns thirsty within [`WATER_WARNING_HOURS`].
pub fn needs_water_soon(
    last_watered: DateTime<Utc>,
    water_interval_days: u32,
    now: DateTime<Utc>,
) -> bool {
    needs_water_within(
        last_watered,
        water_interval_days,
        now,
        Duration::hours(WATER_WARNING_HOURS),
    )
}

/// Time left before the plant turns thirsty, or `None` if it already is.
pub fn time_until_thirsty(
    last_watered: DateTime<Utc>,
    water_interval_days: u32,
    now: DateTime<Utc>,
) -> Option<Duration> {
    let remaining = interval_seconds(water_interval_days)
        .checked_sub(elapsed_seconds(last_watered, now))?;
    (remaining > 0).then(|| Duration::seconds(remaining))
}

/// Health of `plant` as of `now`.
///
/// A plant stored as dead stays dead even if its timestamp says otherwise;
/// every other plant is re-evaluated from its last watering.
pub fn effective_status(plant: &UserPlant, species: &PlantSpecies, now: DateTime<Utc>) -> PlantStatus {
    if plant.status.is_dead() {
        return PlantStatus::Dead;
    }
    health_state(plant.last_watered, species.water_interval_days, now)
}

// ---------------------------------------------------------------------------
// Boost
// ---------------------------------------------------------------------------

/// XP boost fraction contributed by one plant.
///
/// Formula: `base + current_level * base / max_level`, where `base` is the
/// species' `xp_boost_percentage`. Returns `None` when `max_level` is 0.
pub fn plant_boost(species: &PlantSpecies, current_level: u32) -> Option<Decimal> {
    if species.max_level == 0 {
        return None;
    }
    let base = species.xp_boost_percentage;
    let level_share = Decimal::from(current_level)
        .checked_mul(base)?
        .checked_div(Decimal::from(species.max_level))?;
    base.checked_add(level_share)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use bookleaf_types::SpeciesId;

    use super::*;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 10, 12, 0, 0).single().unwrap_or_default()
    }

    fn fern() -> PlantSpecies {
        PlantSpecies {
            id: SpeciesId::new(),
            name: String::from("Fern"),
            description: String::from("Likes the shade."),
            growth_rate: dec!(1.5),
            max_level: 10,
            water_interval_days: 3,
            xp_boost_percentage: dec!(0.05),
            base_cost: 150,
            unlock_level: 1,
            is_available: true,
        }
    }

    // -------------------------------------------------------------------
    // Leveling
    // -------------------------------------------------------------------

    #[test]
    fn growth_rate_divides_step_cost() {
        assert_eq!(xp_for_plant_level(1, dec!(2)), Some(0));
        // 150 / 2
        assert_eq!(xp_for_plant_level(2, dec!(2)), Some(75));
        // 337.5 / 1.5
        assert_eq!(xp_for_plant_level(4, dec!(1.5)), Some(225));
        // 225 / 0.5
        assert_eq!(xp_for_plant_level(3, dec!(0.5)), Some(450));
    }

    #[test]
    fn zero_growth_rate_rejected() {
        assert_eq!(xp_for_plant_level(2, Decimal::ZERO), None);
        assert!(!can_level_up(1, 1_000_000, Decimal::ZERO, 10));
    }

    #[test]
    fn plant_level_round_trips() {
        let rate = dec!(1.25);
        for level in 1..=30_u32 {
            let threshold = cumulative_xp_for_level(level, rate).unwrap_or_default();
            assert_eq!(level_from_xp(threshold, rate, 50), level);
            if level >= 2 {
                assert_eq!(
                    level_from_xp(threshold.saturating_sub(1), rate, 50),
                    level.saturating_sub(1)
                );
            }
        }
    }

    #[test]
    fn plant_level_clamps_at_max() {
        assert_eq!(level_from_xp(u128::MAX, dec!(1), 7), 7);
        assert_eq!(level_from_xp(0, dec!(1), 7), 1);
    }

    #[test]
    fn can_level_up_checks_threshold_and_cap() {
        let rate = dec!(1);
        assert!(!can_level_up(1, 149, rate, 10));
        assert!(can_level_up(1, 150, rate, 10));
        assert!(can_level_up(2, 375, rate, 10));
        assert!(!can_level_up(10, u128::MAX, rate, 10));
    }

    // -------------------------------------------------------------------
    // Health
    // -------------------------------------------------------------------

    #[test]
    fn just_watered_is_healthy() {
        assert_eq!(health_state(noon(), 3, noon()), PlantStatus::Healthy);
    }

    #[test]
    fn exactly_one_interval_is_thirsty() {
        let watered = noon() - Duration::days(3);
        assert_eq!(health_state(watered, 3, noon()), PlantStatus::Thirsty);
        let almost = watered + Duration::seconds(1);
        assert_eq!(health_state(almost, 3, noon()), PlantStatus::Healthy);
    }

    #[test]
    fn one_and_a_half_intervals_is_wilting() {
        let watered = noon() - Duration::hours(108);
        assert_eq!(health_state(watered, 3, noon()), PlantStatus::Wilting);
        let almost = watered + Duration::seconds(1);
        assert_eq!(health_state(almost, 3, noon()), PlantStatus::Thirsty);
    }

    #[test]
    fn exactly_two_intervals_is_dead() {
        let watered = noon() - Duration::days(6);
        assert_eq!(health_state(watered, 3, noon()), PlantStatus::Dead);
        let almost = watered + Duration::seconds(1);
        assert_eq!(health_state(almost, 3, noon()), PlantStatus::Wilting);
    }

    #[test]
    fn future_watering_counts_as_fresh() {
        let future = noon() + Duration::days(1);
        assert_eq!(health_state(future, 3, noon()), PlantStatus::Healthy);
    }

    #[test]
    fn water_warning_window() {
        let interval = 3;
        let thirsty_at = noon();
        let watered = thirsty_at - Duration::days(3);

        let seven_hours_before = thirsty_at - Duration::hours(7);
        assert!(!needs_water_soon(watered, interval, seven_hours_before));

        let six_hours_before = thirsty_at - Duration::hours(6);
        assert!(needs_water_soon(watered, interval, six_hours_before));

        let one_minute_before = thirsty_at - Duration::minutes(1);
        assert!(needs_water_soon(watered, interval, one_minute_before));

        // Already thirsty: no longer "soon".
        assert!(!needs_water_soon(watered, interval, thirsty_at));
    }

    #[test]
    fn time_until_thirsty_counts_down() {
        let watered = noon() - Duration::days(2);
        assert_eq!(time_until_thirsty(watered, 3, noon()), Some(Duration::days(1)));
        assert_eq!(time_until_thirsty(watered, 2, noon()), None);
    }

    #[test]
    fn stored_dead_plant_stays_dead() {
        let species = fern();
        let mut plant = UserPlant::new(species.id, noon());
        assert_eq!(effective_status(&plant, &species, noon()), PlantStatus::Healthy);

        plant.status = PlantStatus::Dead;
        assert_eq!(effective_status(&plant, &species, noon()), PlantStatus::Dead);
    }

    #[test]
    fn effective_status_decays_lazily() {
        let species = fern();
        let plant = UserPlant::new(species.id, noon());
        let later = noon() + Duration::days(4);
        assert_eq!(effective_status(&plant, &species, later), PlantStatus::Thirsty);
    }

    // -------------------------------------------------------------------
    // Boost
    // -------------------------------------------------------------------

    #[test]
    fn boost_grows_with_level() {
        let species = fern();
        // 0.05 + 1 * 0.05 / 10
        assert_eq!(plant_boost(&species, 1), Some(dec!(0.055)));
        // 0.05 + 10 * 0.05 / 10
        assert_eq!(plant_boost(&species, 10), Some(dec!(0.1)));
    }

    #[test]
    fn boost_requires_positive_max_level() {
        let mut species = fern();
        species.max_level = 0;
        assert_eq!(plant_boost(&species, 1), None);
    }
}
