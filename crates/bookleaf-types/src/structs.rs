//! Core records and result objects for the Bookleaf progression engine.
//!
//! Persistent records: [`UserProgression`] (singleton), [`PlantSpecies`]
//! (catalog) and [`UserPlant`] (owned instances). Everything else here is a
//! transient value returned by an engine operation or pushed to observers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{PlantStatus, ProgressionChangeCause, XpSource};
use crate::ids::{PlantId, SpeciesId};

// ---------------------------------------------------------------------------
// UserProgression
// ---------------------------------------------------------------------------

/// The user's progression record. Exactly one exists.
///
/// `level` tracks the level derived from `total_xp`; the engine updates both
/// fields in the same write and never lowers `level`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UserProgression {
    /// Lifetime XP earned from reading.
    pub total_xp: u128,
    /// Current user level (starts at 1).
    pub level: u32,
    /// Spendable coin balance.
    pub coins: u64,
    /// Plants bought so far across every species. Never decremented.
    pub plants_purchased: u32,
}

impl UserProgression {
    /// A fresh record: level 1, no XP, the given starting coin grant.
    pub const fn new(starting_coins: u64) -> Self {
        Self {
            total_xp: 0,
            level: 1,
            coins: starting_coins,
            plants_purchased: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// PlantSpecies
// ---------------------------------------------------------------------------

/// A purchasable plant species from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlantSpecies {
    /// Catalog identifier.
    pub id: SpeciesId,
    /// Display name.
    pub name: String,
    /// Short flavour text for the shop.
    pub description: String,
    /// Leveling speed. Higher values need less XP per plant level.
    #[ts(as = "String")]
    pub growth_rate: Decimal,
    /// Highest level a plant of this species can reach.
    pub max_level: u32,
    /// Days a plant can go without water before it turns thirsty.
    pub water_interval_days: u32,
    /// Base XP boost at level 1, as a fraction in `[0, 1]`.
    #[ts(as = "String")]
    pub xp_boost_percentage: Decimal,
    /// Coin price before the global purchase surcharge.
    pub base_cost: u64,
    /// Minimum user level required to buy this species.
    pub unlock_level: u32,
    /// Whether the shop currently sells this species.
    pub is_available: bool,
}

// ---------------------------------------------------------------------------
// UserPlant
// ---------------------------------------------------------------------------

/// A plant the user owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UserPlant {
    /// Instance identifier.
    pub id: PlantId,
    /// Species this plant belongs to (looked up by value).
    pub species_id: SpeciesId,
    /// Optional user-chosen name.
    pub nickname: Option<String>,
    /// Current level, `1..=species.max_level`.
    pub current_level: u32,
    /// Total plant XP accumulated.
    pub experience: u128,
    /// Health as of the last write. Reads recompute it against the clock.
    pub status: PlantStatus,
    /// When the plant was last watered.
    pub last_watered: DateTime<Utc>,
    /// Whether this plant receives session XP. At most one plant is active.
    pub is_active: bool,
    /// When the plant was bought.
    pub purchased_at: DateTime<Utc>,
}

impl UserPlant {
    /// A newly bought plant: level 1, no XP, watered at `now`.
    pub fn new(species_id: SpeciesId, now: DateTime<Utc>) -> Self {
        Self {
            id: PlantId::new(),
            species_id,
            nickname: None,
            current_level: 1,
            experience: 0,
            status: PlantStatus::Healthy,
            last_watered: now,
            is_active: false,
            purchased_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// A finished reading session, as reported by the session tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ReadingSession {
    /// Minutes spent reading.
    pub minutes: u32,
    /// Pages read, when the reader logged them.
    pub pages_read: Option<u32>,
    /// Whether the reader is on a streak of two or more consecutive days.
    pub has_streak: bool,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Details of a user level-up, present only when a threshold was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LevelUpResult {
    /// Level before the award.
    pub old_level: u32,
    /// Level after the award. May be several levels above `old_level`.
    pub new_level: u32,
    /// Coins paid out for every level crossed.
    pub coins_awarded: u64,
}

impl LevelUpResult {
    /// Number of levels gained by this award.
    pub const fn levels_gained(&self) -> u32 {
        self.new_level.saturating_sub(self.old_level)
    }
}

/// Outcome of one XP award to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProgressionResult {
    /// What earned the XP.
    pub source: XpSource,
    /// XP before plant boosts.
    pub base_xp: u128,
    /// Summed plant boost applied to `base_xp`.
    #[ts(as = "String")]
    pub boost_fraction: Decimal,
    /// XP actually added to the total.
    pub boosted_xp: u128,
    /// Total XP after the award.
    pub new_total_xp: u128,
    /// Present when the award crossed one or more level thresholds.
    pub level_up: Option<LevelUpResult>,
}

impl ProgressionResult {
    /// XP contributed by plant boosts alone.
    pub const fn bonus_xp(&self) -> u128 {
        self.boosted_xp.saturating_sub(self.base_xp)
    }
}

/// Outcome of adding XP to a single plant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlantXpAward {
    /// The plant that received the XP.
    pub plant_id: PlantId,
    /// XP added by this award.
    pub xp_added: u128,
    /// Plant level before the award.
    pub old_level: u32,
    /// Plant level after the award.
    pub new_level: u32,
    /// Plant XP after the award.
    pub total_experience: u128,
}

impl PlantXpAward {
    /// Whether the plant gained at least one level.
    pub const fn leveled_up(&self) -> bool {
        self.new_level > self.old_level
    }
}

/// Outcome of a successful plant purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PurchaseReceipt {
    /// The newly created plant.
    pub plant: UserPlant,
    /// Coins charged.
    pub cost: u64,
    /// Coin balance after the purchase.
    pub coins_remaining: u64,
}

/// Counts from one batch health refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StatusRefreshSummary {
    /// Plants examined.
    pub checked: u32,
    /// Plants whose stored status changed.
    pub changed: u32,
    /// Plants that died during this refresh.
    pub newly_dead: u32,
}

/// Display-oriented view of the user's level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LevelSummary {
    /// Current level.
    pub level: u32,
    /// Lifetime XP.
    pub total_xp: u128,
    /// XP earned since reaching the current level.
    pub xp_into_level: u128,
    /// XP still needed for the next level.
    pub xp_to_next_level: u128,
    /// Fraction of the current level completed, in `[0, 1)`.
    #[ts(as = "String")]
    pub progress: Decimal,
}

// ---------------------------------------------------------------------------
// Change notification
// ---------------------------------------------------------------------------

/// Pushed to observers after any write that changes XP, level, or coins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProgressionChanged {
    /// What kind of write produced this change.
    pub cause: ProgressionChangeCause,
    /// Total XP after the write.
    pub total_xp: u128,
    /// Level after the write.
    pub level: u32,
    /// Coin balance after the write.
    pub coins: u64,
}

impl ProgressionChanged {
    /// Snapshot the fields observers care about from a progression record.
    pub const fn from_record(cause: ProgressionChangeCause, record: &UserProgression) -> Self {
        Self {
            cause,
            total_xp: record.total_xp,
            level: record.level,
            coins: record.coins,
        }
    }
}
