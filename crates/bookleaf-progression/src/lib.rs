//! Pure calculation rules for the Bookleaf progression engine.
//!
//! Everything in this crate is a deterministic function of its arguments:
//! no state, no clock reads, no I/O. Fractional math runs on
//! [`rust_decimal::Decimal`] so results are identical on every platform.
//!
//! # Modules
//!
//! - [`xp`] -- User level curve, session and book awards, boost application
//! - [`growth`] -- Plant leveling, the watering health ladder, plant boosts
//! - [`economy`] -- Coin rewards for level-ups and plant pricing
//! - [`streak`] -- Consecutive reading-day detection

mod curve;
pub mod economy;
pub mod growth;
pub mod streak;
pub mod xp;

// Re-export the common entry points at crate root.
pub use economy::{COINS_PER_LEVEL, PLANT_PRICE_STEP, STARTING_COINS, level_up_coins, plant_price};
pub use growth::{
    WATER_WARNING_HOURS, can_level_up, effective_status, health_state, level_from_xp,
    needs_water_soon, plant_boost, xp_for_plant_level,
};
pub use streak::{current_streak, has_reading_streak};
pub use xp::{
    apply_boost, book_completion_xp, level_from_total_xp, session_xp, xp_required_for_level,
};
