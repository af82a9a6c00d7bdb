//! Coin rewards and plant pricing.
//!
//! Coins are earned only by leveling up and spent only on plants. Each
//! level crossed pays `level * 50`. Plant prices rise by 200 for every
//! plant ever bought, regardless of species.

/// Coins granted when the progression record is first created.
pub const STARTING_COINS: u64 = 100;

/// Coins paid per level reached (multiplied by the level number).
pub const COINS_PER_LEVEL: u64 = 50;

/// Surcharge added to every plant price per plant already purchased.
pub const PLANT_PRICE_STEP: u64 = 200;

/// Coins owed for climbing from `old_level` to `new_level`.
///
/// Sums `level * coins_per_level` for every level in
/// `old_level + 1..=new_level`, so a multi-level jump pays each crossing.
/// Returns `Some(0)` when no level was gained, `None` on overflow.
pub fn level_up_coins(old_level: u32, new_level: u32, coins_per_level: u64) -> Option<u64> {
    (old_level.saturating_add(1)..=new_level).try_fold(0_u64, |total, level| {
        total.checked_add(u64::from(level).checked_mul(coins_per_level)?)
    })
}

/// Price of the next plant: `base_cost + plants_purchased * price_step`.
///
/// The counter is global across species, so buying any plant raises the
/// price of every species.
pub fn plant_price(base_cost: u64, plants_purchased: u32, price_step: u64) -> Option<u64> {
    base_cost.checked_add(u64::from(plants_purchased).checked_mul(price_step)?)
}
