//! Facade wiring the services to shared stores, a clock, and one event hub.

use std::sync::Arc;

use tokio::sync::broadcast;

use bookleaf_progression::xp;
use bookleaf_store::{MemoryPlantStore, MemorySettingsStore, PlantStore, SettingsStore};
use bookleaf_types::{
    PlantSpecies, PlantXpAward, ProgressionChanged, ProgressionResult, ReadingSession,
};

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::events::ProgressionEvents;
use crate::plants::PlantService;
use crate::progression::ProgressionService;

/// Everything a finished reading session produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    /// The user's XP award, boosted by every living plant.
    pub progression: ProgressionResult,
    /// XP routed to the active plant. `Ok(None)` when no living plant is
    /// active; `Err` when the plant write failed after the user's award
    /// was already committed.
    pub plant_award: Result<Option<PlantXpAward>, EngineError>,
}

/// The progression engine: one user's services over shared stores.
pub struct Engine {
    /// XP, levels, and level-up coins.
    progression: ProgressionService,
    /// Plants, purchases, and the XP boost.
    plants: Arc<PlantService>,
    /// Change notification hub shared by both services.
    events: ProgressionEvents,
    /// Configuration the services were built from.
    config: EngineConfig,
}

impl Engine {
    /// Build an engine over the given stores and clock.
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        plant_store: Arc<dyn PlantStore>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        let events = ProgressionEvents::new();
        let plants = Arc::new(PlantService::new(
            plant_store,
            Arc::clone(&settings),
            clock,
            events.clone(),
            &config,
        ));
        let progression =
            ProgressionService::new(settings, plants.clone(), events.clone(), &config);

        Self {
            progression,
            plants,
            events,
            config,
        }
    }

    /// Build an engine over fresh in-memory stores seeded with `catalog`.
    pub fn in_memory(
        clock: Arc<dyn Clock>,
        config: EngineConfig,
        catalog: impl IntoIterator<Item = PlantSpecies>,
    ) -> Self {
        let settings = Arc::new(MemorySettingsStore::new(config.economy.starting_coins));
        let plant_store = Arc::new(MemoryPlantStore::with_catalog(catalog));
        Self::new(settings, plant_store, clock, config)
    }

    /// Award a reading session to the user, then share its base XP with
    /// the active plant.
    ///
    /// The user's award is committed first, so a failure there is the
    /// call's error. A later plant failure cannot undo that award; it is
    /// returned in [`SessionOutcome::plant_award`] for the caller to retry
    /// with [`PlantService::record_session`].
    pub fn record_session(&self, session: &ReadingSession) -> Result<SessionOutcome, EngineError> {
        let progression = self.progression.record_session(session)?;

        let plant_award = self.plants.record_session(progression.base_xp);
        if let Err(ref err) = plant_award {
            tracing::warn!(
                base_xp = progression.base_xp,
                error = %err,
                "Session XP could not be shared with the active plant"
            );
        }

        Ok(SessionOutcome {
            progression,
            plant_award,
        })
    }

    /// Award the flat book-completion XP.
    pub fn complete_book(&self) -> Result<ProgressionResult, EngineError> {
        self.progression.record_book_completion()
    }

    /// Base XP a session would earn before boosts.
    pub fn preview_session_xp(session: &ReadingSession) -> u128 {
        xp::session_xp(session.minutes, session.pages_read, session.has_streak)
    }

    /// The Progression Service.
    pub const fn progression(&self) -> &ProgressionService {
        &self.progression
    }

    /// The Plant Service.
    pub fn plants(&self) -> &PlantService {
        &self.plants
    }

    /// Subscribe to progression changes from this engine.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressionChanged> {
        self.events.subscribe()
    }

    /// Configuration the engine was built with.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }
}
