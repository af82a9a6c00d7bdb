//! Progression Service: turns reading activity into XP, levels, and coins.
//!
//! Every award follows the same read-modify-write cycle:
//!
//! 1. Compute base XP for the activity.
//! 2. Ask the [`BoostSource`] for the summed plant boost.
//! 3. Apply the boost (floored).
//! 4. Read the progression record with its version token.
//! 5. Derive old and new levels and pay coins for every level crossed.
//! 6. Write XP, level, and coins together with the token.
//! 7. Publish [`ProgressionChanged`].
//!
//! A version conflict restarts the cycle from step 2, up to the configured
//! retry budget. A failed write never produces a result.

use std::sync::Arc;

use rust_decimal::Decimal;

use bookleaf_progression::{economy, xp};
use bookleaf_store::{SettingsStore, Versioned};
use bookleaf_types::{
    LevelSummary, LevelUpResult, ProgressionChangeCause, ProgressionChanged, ProgressionResult,
    ReadingSession, UserProgression, XpSource,
};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::events::ProgressionEvents;
use crate::retry::retry_on_conflict;

/// Supplies the summed XP boost fraction applied to every award.
///
/// The [`PlantService`](crate::plants::PlantService) is the production
/// implementation; [`NoBoost`] is used when plants are not involved.
pub trait BoostSource: Send + Sync {
    /// Current boost fraction (0.075 means +7.5%).
    fn total_boost(&self) -> Result<Decimal, EngineError>;
}

/// A boost source that always reports zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBoost;

impl BoostSource for NoBoost {
    fn total_boost(&self) -> Result<Decimal, EngineError> {
        Ok(Decimal::ZERO)
    }
}

/// Awards XP to the user and pays level-up coins.
pub struct ProgressionService {
    /// The singleton progression record.
    settings: Arc<dyn SettingsStore>,
    /// Where the XP multiplier comes from.
    boosts: Arc<dyn BoostSource>,
    /// Change notification hub.
    events: ProgressionEvents,
    /// Coins per level reached.
    coins_per_level: u64,
    /// Extra attempts after a version conflict.
    max_conflict_retries: u32,
}

impl ProgressionService {
    /// Create a service over `settings`, boosted by `boosts`.
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        boosts: Arc<dyn BoostSource>,
        events: ProgressionEvents,
        config: &EngineConfig,
    ) -> Self {
        Self {
            settings,
            boosts,
            events,
            coins_per_level: config.economy.coins_per_level,
            max_conflict_retries: config.concurrency.max_conflict_retries,
        }
    }

    /// Award XP for a finished reading session.
    pub fn record_session(&self, session: &ReadingSession) -> Result<ProgressionResult, EngineError> {
        let base_xp = xp::session_xp(session.minutes, session.pages_read, session.has_streak);
        self.award_xp(XpSource::ReadingSession, base_xp)
    }

    /// Award the flat XP for finishing a book.
    pub fn record_book_completion(&self) -> Result<ProgressionResult, EngineError> {
        self.award_xp(XpSource::BookCompletion, xp::book_completion_xp())
    }

    /// Award `base_xp` (before boosts) from `source`.
    ///
    /// Retries the whole read-modify-write on version conflicts.
    pub fn award_xp(&self, source: XpSource, base_xp: u128) -> Result<ProgressionResult, EngineError> {
        retry_on_conflict(self.max_conflict_retries, "award_xp", || {
            self.try_award(source, base_xp)
        })
    }

    /// One attempt at an award. Conflicts propagate to the retry loop.
    fn try_award(&self, source: XpSource, base_xp: u128) -> Result<ProgressionResult, EngineError> {
        let boost_fraction = self.boosts.total_boost()?;
        let boosted_xp = xp::apply_boost(base_xp, boost_fraction).ok_or(
            EngineError::ArithmeticOverflow {
                context: "boosted xp",
            },
        )?;

        let Versioned {
            mut record,
            version,
        } = self.settings.read()?;

        let new_total_xp =
            record
                .total_xp
                .checked_add(boosted_xp)
                .ok_or(EngineError::ArithmeticOverflow {
                    context: "total xp",
                })?;

        // The stored level wins when it is ahead of the XP it was seeded with.
        let old_level = xp::level_from_total_xp(record.total_xp).max(record.level);
        let new_level = xp::level_from_total_xp(new_total_xp).max(old_level);

        let level_up = if new_level > old_level {
            let coins_awarded = economy::level_up_coins(old_level, new_level, self.coins_per_level)
                .ok_or(EngineError::ArithmeticOverflow {
                    context: "level-up coins",
                })?;
            record.coins =
                record
                    .coins
                    .checked_add(coins_awarded)
                    .ok_or(EngineError::ArithmeticOverflow {
                        context: "coin balance",
                    })?;
            Some(LevelUpResult {
                old_level,
                new_level,
                coins_awarded,
            })
        } else {
            None
        };

        record.total_xp = new_total_xp;
        record.level = new_level;
        self.settings.write(&record, version)?;

        self.events.publish(ProgressionChanged::from_record(
            ProgressionChangeCause::XpAwarded,
            &record,
        ));

        if let Some(ref up) = level_up {
            tracing::info!(
                old_level = up.old_level,
                new_level = up.new_level,
                coins_awarded = up.coins_awarded,
                coins = record.coins,
                "Level up"
            );
        }
        tracing::debug!(
            ?source,
            base_xp,
            boosted_xp,
            boost = %boost_fraction,
            total_xp = new_total_xp,
            "XP awarded"
        );

        Ok(ProgressionResult {
            source,
            base_xp,
            boost_fraction,
            boosted_xp,
            new_total_xp,
            level_up,
        })
    }

    /// The current progression record.
    pub fn progression(&self) -> Result<UserProgression, EngineError> {
        Ok(self.settings.read()?.record)
    }

    /// Level, XP within the level, and progress toward the next one.
    ///
    /// Every field is measured against the same level: the stored level, or
    /// the XP-derived level when that is higher.
    pub fn level_summary(&self) -> Result<LevelSummary, EngineError> {
        let record = self.settings.read()?.record;
        let level = xp::level_from_total_xp(record.total_xp).max(record.level);
        let overflow = || EngineError::ArithmeticOverflow {
            context: "level summary",
        };

        Ok(LevelSummary {
            level,
            total_xp: record.total_xp,
            xp_into_level: xp::xp_into_level_at(level, record.total_xp).ok_or_else(overflow)?,
            xp_to_next_level: xp::xp_to_next_level_at(level, record.total_xp)
                .ok_or_else(overflow)?,
            progress: xp::level_progress_at(level, record.total_xp).ok_or_else(overflow)?,
        })
    }
}
