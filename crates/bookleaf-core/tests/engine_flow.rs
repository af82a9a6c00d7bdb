//! End-to-end tests for the Bookleaf engine over in-memory stores.
//!
//! Each test builds a fresh [`Engine`] with a [`ManualClock`] so decay and
//! watering are fully deterministic.

// Integration tests use unwrap extensively for clarity -- panicking on
// failure is the correct behavior in test code.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::arithmetic_side_effects,
    clippy::missing_panics_doc
)]

use std::sync::Arc;

use bookleaf_core::{Clock, Engine, EngineConfig, EngineError, ManualClock};
use bookleaf_progression::xp;
use bookleaf_store::{
    MemoryPlantStore, MemorySettingsStore, PlantStore, SettingsStore, StoreError, VersionToken,
    Versioned,
};
use bookleaf_types::{
    PlantId, PlantSpecies, PlantStatus, ProgressionChangeCause, ReadingSession, SpeciesId,
    UserPlant, UserProgression, XpSource,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal_macros::dec;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 1, 7, 30, 0).unwrap()
}

fn fern() -> PlantSpecies {
    PlantSpecies {
        id: SpeciesId::new(),
        name: String::from("Fern"),
        description: String::from("Happy in a dim corner."),
        growth_rate: dec!(1),
        max_level: 10,
        water_interval_days: 3,
        xp_boost_percentage: dec!(0.05),
        base_cost: 100,
        unlock_level: 1,
        is_available: true,
    }
}

fn hour_with_pages() -> ReadingSession {
    ReadingSession {
        minutes: 60,
        pages_read: Some(30),
        has_streak: false,
    }
}

struct Harness {
    engine: Engine,
    settings: Arc<MemorySettingsStore>,
    clock: Arc<ManualClock>,
    species: PlantSpecies,
}

fn harness(record: UserProgression) -> Harness {
    harness_with(record, EngineConfig::default())
}

fn harness_with(record: UserProgression, config: EngineConfig) -> Harness {
    let species = fern();
    let settings = Arc::new(MemorySettingsStore::with_record(record));
    let clock = Arc::new(ManualClock::new(start()));
    let engine = Engine::new(
        settings.clone(),
        Arc::new(MemoryPlantStore::with_catalog([species.clone()])),
        clock.clone(),
        config,
    );
    Harness {
        engine,
        settings,
        clock,
        species,
    }
}

fn patient() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.concurrency.max_conflict_retries = 1_000;
    config
}

fn wealthy() -> UserProgression {
    UserProgression {
        total_xp: 0,
        level: 1,
        coins: 5_000,
        plants_purchased: 0,
    }
}

#[test]
fn session_without_plants_is_unboosted() {
    let h = harness(UserProgression::new(100));
    let outcome = h.engine.record_session(&hour_with_pages()).unwrap();
    assert_eq!(outcome.progression.base_xp, 950);
    assert_eq!(outcome.progression.boosted_xp, 950);
    assert_eq!(outcome.plant_award, Ok(None));
    assert_eq!(Engine::preview_session_xp(&hour_with_pages()), 950);
}

#[test]
fn living_plants_boost_and_active_plant_grows() {
    let h = harness(wealthy());
    let plant = h.engine.plants().purchase(h.species.id).unwrap().plant;
    h.engine.plants().purchase(h.species.id).unwrap();
    h.engine.plants().set_active(plant.id).unwrap();

    let outcome = h.engine.record_session(&hour_with_pages()).unwrap();
    // Two level-1 ferns: 2 * (0.05 + 0.005) = 0.11
    assert_eq!(outcome.progression.boost_fraction, dec!(0.11));
    // floor(950 * 1.11) = 1054
    assert_eq!(outcome.progression.boosted_xp, 1054);

    let award = outcome.plant_award.unwrap().unwrap();
    assert_eq!(award.plant_id, plant.id);
    // The plant receives the unboosted base XP.
    assert_eq!(award.xp_added, 950);
    assert_eq!(award.new_level, 4);
}

/// Serves a memory store but rejects every single-plant write as stale.
struct StalePlantWrites(MemoryPlantStore);

impl PlantStore for StalePlantWrites {
    fn read(&self, id: PlantId) -> Result<Versioned<UserPlant>, StoreError> {
        self.0.read(id)
    }
    fn list(&self) -> Result<Vec<Versioned<UserPlant>>, StoreError> {
        self.0.list()
    }
    fn insert(&self, plant: &UserPlant) -> Result<VersionToken, StoreError> {
        self.0.insert(plant)
    }
    fn write(
        &self,
        record: &UserPlant,
        _expected: VersionToken,
    ) -> Result<VersionToken, StoreError> {
        Err(StoreError::Conflict {
            entity: "plant",
            id: record.id.to_string(),
        })
    }
    fn write_batch(
        &self,
        records: &[(UserPlant, VersionToken)],
    ) -> Result<Vec<VersionToken>, StoreError> {
        self.0.write_batch(records)
    }
    fn read_species(&self, id: SpeciesId) -> Result<PlantSpecies, StoreError> {
        self.0.read_species(id)
    }
    fn list_species(&self) -> Result<Vec<PlantSpecies>, StoreError> {
        self.0.list_species()
    }
    fn upsert_species(&self, species: &PlantSpecies) -> Result<(), StoreError> {
        self.0.upsert_species(species)
    }
}

#[test]
fn failed_plant_award_is_reported_not_hidden() {
    let species = fern();
    let settings = Arc::new(MemorySettingsStore::with_record(wealthy()));
    let plant_store = Arc::new(StalePlantWrites(MemoryPlantStore::with_catalog([
        species.clone(),
    ])));
    let engine = Engine::new(
        settings.clone(),
        plant_store.clone(),
        Arc::new(ManualClock::new(start())),
        EngineConfig::default(),
    );
    let plant = engine.plants().purchase(species.id).unwrap().plant;
    engine.plants().set_active(plant.id).unwrap();

    let session = ReadingSession {
        minutes: 30,
        pages_read: None,
        has_streak: false,
    };
    let outcome = engine.record_session(&session).unwrap();

    // The user's award committed; the plant's did not, and says so.
    assert_eq!(outcome.progression.base_xp, 150);
    // floor(150 * 1.055) = 158
    assert_eq!(outcome.progression.new_total_xp, 158);
    assert_eq!(settings.read().unwrap().record.total_xp, 158);
    assert_eq!(
        outcome.plant_award,
        Err(EngineError::ConcurrencyConflict { entity: "plant" })
    );
    assert_eq!(plant_store.read(plant.id).unwrap().record.experience, 0);
}

#[test]
fn neglected_plants_stop_boosting() {
    let h = harness(wealthy());
    h.engine.plants().purchase(h.species.id).unwrap();
    h.clock.advance(Duration::days(6));

    let result = h.engine.complete_book().unwrap();
    assert_eq!(result.source, XpSource::BookCompletion);
    assert_eq!(result.boost_fraction, dec!(0));
    assert_eq!(result.boosted_xp, 100);

    let summary = h.engine.plants().refresh_statuses().unwrap();
    assert_eq!(summary.newly_dead, 1);
    let plants = h.engine.plants().plants().unwrap();
    assert!(plants.iter().all(|p| p.status == PlantStatus::Dead));
}

#[test]
fn seeded_level_three_jumps_to_six() {
    let seeded = UserProgression {
        total_xp: 0,
        level: 3,
        coins: 0,
        plants_purchased: 0,
    };
    let h = harness(seeded);
    let target = xp::cumulative_xp_for_level(6).unwrap();
    let result = h
        .engine
        .progression()
        .award_xp(XpSource::ReadingSession, target)
        .unwrap();

    let level_up = result.level_up.unwrap();
    assert_eq!((level_up.old_level, level_up.new_level), (3, 6));
    assert_eq!(level_up.coins_awarded, 750);
    assert_eq!(h.settings.coins().unwrap(), 750);
}

#[test]
fn purchase_price_climbs_globally() {
    let mut record = wealthy();
    record.plants_purchased = 2;
    let h = harness(record);
    let mut bonsai = fern();
    bonsai.base_cost = 500;
    let plant_store = Arc::new(MemoryPlantStore::with_catalog([bonsai.clone()]));
    let engine = Engine::new(
        h.settings.clone(),
        plant_store,
        h.clock.clone(),
        EngineConfig::default(),
    );

    assert_eq!(engine.plants().purchase_price(bonsai.id).unwrap(), 900);
    let receipt = engine.plants().purchase(bonsai.id).unwrap();
    assert_eq!(receipt.cost, 900);
    assert_eq!(receipt.coins_remaining, 4_100);
}

#[test]
fn insufficient_funds_reports_amounts() {
    let h = harness(UserProgression::new(100));
    h.engine.plants().purchase(h.species.id).unwrap();
    let err = h.engine.plants().purchase(h.species.id).unwrap_err();
    assert_eq!(
        err,
        EngineError::InsufficientFunds {
            required: 300,
            available: 0,
        }
    );
}

#[test]
fn observers_see_every_progression_write() {
    let h = harness(wealthy());
    let mut rx = h.engine.subscribe();

    h.engine.plants().purchase(h.species.id).unwrap();
    h.engine.complete_book().unwrap();

    let spent = rx.try_recv().unwrap();
    assert_eq!(spent.cause, ProgressionChangeCause::CoinsSpent);
    assert_eq!(spent.coins, 4_900);

    let awarded = rx.try_recv().unwrap();
    assert_eq!(awarded.cause, ProgressionChangeCause::XpAwarded);
    assert!(awarded.total_xp > 0);
    assert!(rx.try_recv().is_err());
}

#[test]
fn concurrent_awards_sum_exactly() {
    let h = harness_with(UserProgression::new(100), patient());
    let engine = &h.engine;

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..25 {
                    engine
                        .progression()
                        .award_xp(XpSource::ReadingSession, 10)
                        .unwrap();
                }
            });
        }
    });

    let record = engine.progression().progression().unwrap();
    assert_eq!(record.total_xp, 8 * 25 * 10);
    assert_eq!(record.level, xp::level_from_total_xp(2_000));

    // Coins equal the starting grant plus every level crossed exactly once.
    let expected_coins = 100 + bookleaf_progression::level_up_coins(1, record.level, 50).unwrap();
    assert_eq!(record.coins, expected_coins);
}

#[test]
fn concurrent_plant_care_never_loses_updates() {
    let h = harness_with(wealthy(), patient());
    let engine = &h.engine;
    let plant = engine.plants().purchase(h.species.id).unwrap().plant;

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..20 {
                    engine.plants().award_experience(plant.id, 5).unwrap();
                    engine.plants().water(plant.id).unwrap();
                }
            });
        }
    });

    let stored = engine.plants().plant(plant.id).unwrap();
    assert_eq!(stored.experience, 4 * 20 * 5);
    assert_eq!(stored.status, PlantStatus::Healthy);
    assert_eq!(stored.last_watered, h.clock.now());
}
