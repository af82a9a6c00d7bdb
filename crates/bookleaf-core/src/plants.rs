//! Plant Service: watering, plant XP, purchases, and health upkeep.
//!
//! Plant health is never advanced by a background job. Reads recompute it
//! from `last_watered` against the clock, and [`PlantService::refresh_statuses`]
//! persists the recomputed values for every plant in one grouped write.
//!
//! A plant whose effective status is [`PlantStatus::Dead`] cannot be
//! watered, given XP, leveled, or made active, and contributes nothing to
//! the user's XP boost.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use bookleaf_progression::{economy, growth};
use bookleaf_store::{PlantStore, SettingsStore, Versioned};
use bookleaf_types::{
    PlantId, PlantSpecies, PlantStatus, PlantXpAward, ProgressionChangeCause, ProgressionChanged,
    PurchaseReceipt, SpeciesId, StatusRefreshSummary, UserPlant,
};

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::events::ProgressionEvents;
use crate::progression::BoostSource;
use crate::retry::retry_on_conflict;

/// Species catalog keyed by ID, loaded once per batch operation.
type Catalog = BTreeMap<SpeciesId, PlantSpecies>;

/// Manages the user's plants and the coins spent on them.
pub struct PlantService {
    /// Plant instances and the species catalog.
    plants: Arc<dyn PlantStore>,
    /// The progression record (coins and purchase counter).
    settings: Arc<dyn SettingsStore>,
    /// Source of "now" for watering and decay.
    clock: Arc<dyn Clock>,
    /// Change notification hub for coin spends and refunds.
    events: ProgressionEvents,
    /// Per-purchase price surcharge.
    plant_price_step: u64,
    /// How long before turning thirsty a plant is flagged.
    water_warning: Duration,
    /// Extra attempts after a version conflict.
    max_conflict_retries: u32,
}

impl PlantService {
    /// Create a service over the given stores and clock.
    pub fn new(
        plants: Arc<dyn PlantStore>,
        settings: Arc<dyn SettingsStore>,
        clock: Arc<dyn Clock>,
        events: ProgressionEvents,
        config: &EngineConfig,
    ) -> Self {
        Self {
            plants,
            settings,
            clock,
            events,
            plant_price_step: config.economy.plant_price_step,
            water_warning: config.plants.warning_window().unwrap_or(Duration::MAX),
            max_conflict_retries: config.concurrency.max_conflict_retries,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// One plant with its status recomputed against now. Nothing is written.
    pub fn plant(&self, id: PlantId) -> Result<UserPlant, EngineError> {
        let mut plant = self.plants.read(id)?.record;
        let species = self.plants.read_species(plant.species_id)?;
        plant.status = growth::effective_status(&plant, &species, self.clock.now());
        Ok(plant)
    }

    /// Every owned plant with statuses recomputed against now.
    pub fn plants(&self) -> Result<Vec<UserPlant>, EngineError> {
        let catalog = self.catalog()?;
        let now = self.clock.now();
        self.plants
            .list()?
            .into_iter()
            .map(|Versioned { mut record, .. }| {
                let species = lookup(&catalog, record.species_id)?;
                record.status = growth::effective_status(&record, species, now);
                Ok(record)
            })
            .collect()
    }

    /// Species the shop currently sells, ordered by unlock level then cost.
    pub fn catalog_for_sale(&self) -> Result<Vec<PlantSpecies>, EngineError> {
        Ok(self
            .plants
            .list_species()?
            .into_iter()
            .filter(|s| s.is_available)
            .collect())
    }

    /// The plant currently receiving session XP, if any.
    pub fn active_plant(&self) -> Result<Option<UserPlant>, EngineError> {
        Ok(self.plants()?.into_iter().find(|p| p.is_active))
    }

    /// Living plants that will turn thirsty within the configured warning
    /// window.
    pub fn plants_needing_water(&self) -> Result<Vec<UserPlant>, EngineError> {
        let catalog = self.catalog()?;
        let now = self.clock.now();
        let mut due = Vec::new();
        for Versioned { record, .. } in self.plants.list()? {
            let species = lookup(&catalog, record.species_id)?;
            if record.status.is_alive()
                && growth::needs_water_within(
                    record.last_watered,
                    species.water_interval_days,
                    now,
                    self.water_warning,
                )
            {
                due.push(record);
            }
        }
        Ok(due)
    }

    // =========================================================================
    // Care
    // =========================================================================

    /// Water a plant, resetting its health to healthy.
    ///
    /// Fails with [`EngineError::InvalidOperation`] if the plant is dead.
    pub fn water(&self, id: PlantId) -> Result<UserPlant, EngineError> {
        retry_on_conflict(self.max_conflict_retries, "water", || {
            let (Versioned { mut record, version }, species, now) = self.read_living(id, "water")?;

            record.last_watered = now;
            record.status = growth::health_state(now, species.water_interval_days, now);
            self.plants.write(&record, version)?;

            tracing::debug!(plant_id = %id, species = %species.name, "Plant watered");
            Ok(record)
        })
    }

    /// Add `xp` to a plant and advance its level as far as the XP allows.
    ///
    /// Fails with [`EngineError::InvalidOperation`] if the plant is dead.
    pub fn award_experience(&self, id: PlantId, xp: u128) -> Result<PlantXpAward, EngineError> {
        retry_on_conflict(self.max_conflict_retries, "award_experience", || {
            let (Versioned { mut record, version }, species, now) =
                self.read_living(id, "give experience to")?;

            let old_level = record.current_level;
            let total_experience =
                record
                    .experience
                    .checked_add(xp)
                    .ok_or(EngineError::ArithmeticOverflow {
                        context: "plant experience",
                    })?;
            let new_level =
                growth::level_from_xp(total_experience, species.growth_rate, species.max_level)
                    .max(old_level);

            record.experience = total_experience;
            record.current_level = new_level;
            record.status = growth::effective_status(&record, &species, now);
            self.plants.write(&record, version)?;

            let award = PlantXpAward {
                plant_id: id,
                xp_added: xp,
                old_level,
                new_level,
                total_experience,
            };
            if award.leveled_up() {
                tracing::info!(
                    plant_id = %id,
                    species = %species.name,
                    old_level,
                    new_level,
                    "Plant leveled up"
                );
            } else {
                tracing::debug!(plant_id = %id, xp, total_experience, "Plant XP awarded");
            }
            Ok(award)
        })
    }

    /// Advance a plant exactly one level if its XP already covers it.
    ///
    /// Fails with [`EngineError::InvalidOperation`] if the plant is dead,
    /// at its species' max level, or short of XP.
    pub fn level_up(&self, id: PlantId) -> Result<UserPlant, EngineError> {
        retry_on_conflict(self.max_conflict_retries, "level_up", || {
            let (Versioned { mut record, version }, species, _) = self.read_living(id, "level up")?;

            if !growth::can_level_up(
                record.current_level,
                record.experience,
                species.growth_rate,
                species.max_level,
            ) {
                return Err(EngineError::invalid(format!(
                    "plant {id} cannot level up from {} (max {})",
                    record.current_level, species.max_level
                )));
            }

            record.current_level = record.current_level.saturating_add(1);
            self.plants.write(&record, version)?;
            tracing::info!(plant_id = %id, level = record.current_level, "Plant leveled up");
            Ok(record)
        })
    }

    /// Route a session's base XP to the active plant.
    ///
    /// Returns `None` without writing when no plant is active or the active
    /// plant has died.
    pub fn record_session(&self, base_xp: u128) -> Result<Option<PlantXpAward>, EngineError> {
        let Some(active) = self.active_plant()? else {
            tracing::debug!("No active plant, session XP not shared");
            return Ok(None);
        };
        if active.status.is_dead() {
            tracing::debug!(plant_id = %active.id, "Active plant is dead, session XP not shared");
            return Ok(None);
        }
        self.award_experience(active.id, base_xp).map(Some)
    }

    /// Make `id` the only active plant.
    ///
    /// The previously active plant (if any) is cleared in the same grouped
    /// write. Fails with [`EngineError::InvalidOperation`] if the plant is
    /// dead.
    pub fn set_active(&self, id: PlantId) -> Result<UserPlant, EngineError> {
        retry_on_conflict(self.max_conflict_retries, "set_active", || {
            let catalog = self.catalog()?;
            let now = self.clock.now();
            let mut batch = Vec::new();
            let mut target = None;

            for Versioned { mut record, version } in self.plants.list()? {
                if record.id == id {
                    let species = lookup(&catalog, record.species_id)?;
                    if growth::effective_status(&record, species, now).is_dead() {
                        return Err(EngineError::invalid(format!(
                            "cannot activate dead plant {id}"
                        )));
                    }
                    record.is_active = true;
                    target = Some(record.clone());
                    batch.push((record, version));
                } else if record.is_active {
                    record.is_active = false;
                    batch.push((record, version));
                }
            }

            let target = target.ok_or_else(|| EngineError::NotFound {
                entity: "plant",
                id: id.to_string(),
            })?;
            self.plants.write_batch(&batch)?;
            tracing::debug!(plant_id = %id, "Active plant changed");
            Ok(target)
        })
    }

    // =========================================================================
    // Shop
    // =========================================================================

    /// What the next plant of `species_id` would cost right now.
    pub fn purchase_price(&self, species_id: SpeciesId) -> Result<u64, EngineError> {
        let species = self.plants.read_species(species_id)?;
        let purchased = self.settings.read()?.record.plants_purchased;
        self.price_of(&species, purchased)
    }

    /// Buy a plant of `species_id`.
    ///
    /// Coins are deducted and the global purchase counter incremented in one
    /// settings write; then the new plant is stored. If storing the plant
    /// fails, the coins are refunded and the store error is returned.
    pub fn purchase(&self, species_id: SpeciesId) -> Result<PurchaseReceipt, EngineError> {
        let species = self.plants.read_species(species_id)?;
        if !species.is_available {
            return Err(EngineError::invalid(format!(
                "{} is not for sale",
                species.name
            )));
        }

        let (cost, coins_remaining) =
            retry_on_conflict(self.max_conflict_retries, "purchase", || {
                self.charge_for(&species)
            })?;

        let plant = UserPlant::new(species.id, self.clock.now());
        if let Err(err) = self.plants.insert(&plant) {
            tracing::error!(
                species = %species.name,
                cost,
                error = %err,
                "Storing purchased plant failed, refunding"
            );
            self.refund(cost);
            return Err(err.into());
        }

        tracing::info!(
            plant_id = %plant.id,
            species = %species.name,
            cost,
            coins_remaining,
            "Plant purchased"
        );
        Ok(PurchaseReceipt {
            plant,
            cost,
            coins_remaining,
        })
    }

    /// Deduct the price of `species` and bump the purchase counter.
    fn charge_for(&self, species: &PlantSpecies) -> Result<(u64, u64), EngineError> {
        let Versioned {
            mut record,
            version,
        } = self.settings.read()?;

        if record.level < species.unlock_level {
            return Err(EngineError::invalid(format!(
                "{} unlocks at level {} (current level {})",
                species.name, species.unlock_level, record.level
            )));
        }

        let cost = self.price_of(species, record.plants_purchased)?;
        let remaining = record
            .coins
            .checked_sub(cost)
            .ok_or(EngineError::InsufficientFunds {
                required: cost,
                available: record.coins,
            })?;

        record.coins = remaining;
        record.plants_purchased =
            record
                .plants_purchased
                .checked_add(1)
                .ok_or(EngineError::ArithmeticOverflow {
                    context: "purchase counter",
                })?;
        self.settings.write(&record, version)?;

        self.events.publish(ProgressionChanged::from_record(
            ProgressionChangeCause::CoinsSpent,
            &record,
        ));
        Ok((cost, remaining))
    }

    /// Give back `amount` coins after a failed purchase. The purchase
    /// counter keeps its increment.
    fn refund(&self, amount: u64) {
        let refunded = retry_on_conflict(self.max_conflict_retries, "refund", || {
            let Versioned {
                mut record,
                version,
            } = self.settings.read()?;
            record.coins = record.coins.saturating_add(amount);
            self.settings.write(&record, version)?;
            Ok(record)
        });

        match refunded {
            Ok(record) => {
                self.events.publish(ProgressionChanged::from_record(
                    ProgressionChangeCause::CoinsAdded,
                    &record,
                ));
            }
            Err(err) => {
                tracing::error!(amount, error = %err, "Refund after failed purchase did not apply");
            }
        }
    }

    fn price_of(&self, species: &PlantSpecies, purchased: u32) -> Result<u64, EngineError> {
        economy::plant_price(species.base_cost, purchased, self.plant_price_step).ok_or(
            EngineError::ArithmeticOverflow {
                context: "plant price",
            },
        )
    }

    // =========================================================================
    // Upkeep
    // =========================================================================

    /// Persist recomputed health for every plant whose status changed.
    ///
    /// All changes commit in one grouped write. A conflict on any plant
    /// fails the whole batch, which is then retried from a fresh read.
    pub fn refresh_statuses(&self) -> Result<StatusRefreshSummary, EngineError> {
        retry_on_conflict(self.max_conflict_retries, "refresh_statuses", || {
            let catalog = self.catalog()?;
            let now = self.clock.now();
            let mut summary = StatusRefreshSummary::default();
            let mut batch = Vec::new();

            for Versioned { mut record, version } in self.plants.list()? {
                summary.checked = summary.checked.saturating_add(1);
                let species = lookup(&catalog, record.species_id)?;
                let status = growth::effective_status(&record, species, now);
                if status == record.status {
                    continue;
                }

                summary.changed = summary.changed.saturating_add(1);
                if status.is_dead() {
                    summary.newly_dead = summary.newly_dead.saturating_add(1);
                    tracing::info!(
                        plant_id = %record.id,
                        species = %species.name,
                        "Plant died of neglect"
                    );
                }
                record.status = status;
                batch.push((record, version));
            }

            if !batch.is_empty() {
                self.plants.write_batch(&batch)?;
            }
            tracing::debug!(
                checked = summary.checked,
                changed = summary.changed,
                newly_dead = summary.newly_dead,
                "Plant statuses refreshed"
            );
            Ok(summary)
        })
    }

    /// Summed XP boost from every plant that is not dead.
    pub fn total_boost(&self) -> Result<Decimal, EngineError> {
        let catalog = self.catalog()?;
        let now = self.clock.now();
        let mut total = Decimal::ZERO;

        for Versioned { record, .. } in self.plants.list()? {
            let species = lookup(&catalog, record.species_id)?;
            if growth::effective_status(&record, species, now).is_dead() {
                continue;
            }
            let Some(boost) = growth::plant_boost(species, record.current_level) else {
                tracing::warn!(
                    species = %species.name,
                    "Species has no max level, plant boost skipped"
                );
                continue;
            };
            total = total
                .checked_add(boost)
                .ok_or(EngineError::ArithmeticOverflow {
                    context: "total boost",
                })?;
        }
        Ok(total)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn catalog(&self) -> Result<Catalog, EngineError> {
        Ok(self
            .plants
            .list_species()?
            .into_iter()
            .map(|s| (s.id, s))
            .collect())
    }

    /// Read a plant and its species, rejecting dead plants for `action`.
    fn read_living(
        &self,
        id: PlantId,
        action: &str,
    ) -> Result<(Versioned<UserPlant>, PlantSpecies, DateTime<Utc>), EngineError> {
        let current = self.plants.read(id)?;
        let species = self.plants.read_species(current.record.species_id)?;
        let now = self.clock.now();
        if growth::effective_status(&current.record, &species, now) == PlantStatus::Dead {
            return Err(EngineError::invalid(format!(
                "cannot {action} dead plant {id}"
            )));
        }
        Ok((current, species, now))
    }
}

impl BoostSource for PlantService {
    fn total_boost(&self) -> Result<Decimal, EngineError> {
        Self::total_boost(self)
    }
}

fn lookup(catalog: &Catalog, id: SpeciesId) -> Result<&PlantSpecies, EngineError> {
    catalog.get(&id).ok_or_else(|| EngineError::NotFound {
        entity: "species",
        id: id.to_string(),
    })
}
