//! In-memory store implementations.
//!
//! Both stores keep their state behind a [`std::sync::Mutex`] and are safe
//! to share via `Arc`. Every write holds the lock across its token check
//! and its update, so the check-then-write is atomic. A poisoned lock is
//! reported as [`StoreError::Backend`] rather than panicking.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use bookleaf_types::{PlantId, PlantSpecies, SpeciesId, UserPlant, UserProgression};

use crate::error::StoreError;
use crate::plant::PlantStore;
use crate::settings::SettingsStore;
use crate::version::{VersionToken, Versioned};

/// Entity label used in plant errors.
const PLANT: &str = "plant";

/// Entity label used in species errors.
const SPECIES: &str = "species";

/// Entity label used in settings errors.
const SETTINGS: &str = "settings";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// In-memory [`SettingsStore`].
///
/// The record is created on first read with level 1, no XP, and the
/// configured starting coins.
#[derive(Debug)]
pub struct MemorySettingsStore {
    /// Coin grant for a freshly created record.
    starting_coins: u64,
    /// The record, absent until first read.
    slot: Mutex<Option<Versioned<UserProgression>>>,
}

impl MemorySettingsStore {
    /// An empty store that will create its record with `starting_coins`.
    pub const fn new(starting_coins: u64) -> Self {
        Self {
            starting_coins,
            slot: Mutex::new(None),
        }
    }

    /// A store pre-seeded with `record`.
    pub fn with_record(record: UserProgression) -> Self {
        Self {
            starting_coins: record.coins,
            slot: Mutex::new(Some(Versioned::new(record, VersionToken::initial()))),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Versioned<UserProgression>>>, StoreError> {
        self.slot
            .lock()
            .map_err(|e| StoreError::Backend(format!("settings lock poisoned: {e}")))
    }
}

impl SettingsStore for MemorySettingsStore {
    fn read(&self) -> Result<Versioned<UserProgression>, StoreError> {
        let mut slot = self.lock()?;
        let current = slot.get_or_insert_with(|| {
            tracing::debug!(
                starting_coins = self.starting_coins,
                "Creating default progression record"
            );
            Versioned::new(
                UserProgression::new(self.starting_coins),
                VersionToken::initial(),
            )
        });
        Ok(current.clone())
    }

    fn write(
        &self,
        record: &UserProgression,
        expected: VersionToken,
    ) -> Result<VersionToken, StoreError> {
        let mut slot = self.lock()?;
        let conflict = || StoreError::Conflict {
            entity: SETTINGS,
            id: String::from("user"),
        };

        let current = slot.as_mut().ok_or_else(conflict)?;
        if current.version != expected {
            tracing::debug!(
                expected = %expected,
                current = %current.version,
                "Rejected stale settings write"
            );
            return Err(conflict());
        }

        let next = expected.next();
        *current = Versioned::new(record.clone(), next);
        Ok(next)
    }
}

// ---------------------------------------------------------------------------
// Plants
// ---------------------------------------------------------------------------

/// Mutable state of [`MemoryPlantStore`].
#[derive(Debug, Default)]
struct PlantTables {
    /// Owned plants keyed by ID.
    plants: BTreeMap<PlantId, Versioned<UserPlant>>,
    /// Plant IDs in insertion order.
    purchase_order: Vec<PlantId>,
    /// The species catalog.
    species: BTreeMap<SpeciesId, PlantSpecies>,
}

/// In-memory [`PlantStore`].
#[derive(Debug, Default)]
pub struct MemoryPlantStore {
    /// All tables behind one lock so grouped writes are atomic.
    tables: Mutex<PlantTables>,
}

impl MemoryPlantStore {
    /// An empty store with no plants and no catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose catalog is pre-seeded with `species`.
    pub fn with_catalog(species: impl IntoIterator<Item = PlantSpecies>) -> Self {
        let tables = PlantTables {
            species: species.into_iter().map(|s| (s.id, s)).collect(),
            ..PlantTables::default()
        };
        Self {
            tables: Mutex::new(tables),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, PlantTables>, StoreError> {
        self.tables
            .lock()
            .map_err(|e| StoreError::Backend(format!("plant store lock poisoned: {e}")))
    }
}

fn plant_not_found(id: PlantId) -> StoreError {
    StoreError::NotFound {
        entity: PLANT,
        id: id.to_string(),
    }
}

fn plant_conflict(id: PlantId) -> StoreError {
    StoreError::Conflict {
        entity: PLANT,
        id: id.to_string(),
    }
}

impl PlantStore for MemoryPlantStore {
    fn read(&self, id: PlantId) -> Result<Versioned<UserPlant>, StoreError> {
        let tables = self.lock()?;
        tables
            .plants
            .get(&id)
            .cloned()
            .ok_or_else(|| plant_not_found(id))
    }

    fn list(&self) -> Result<Vec<Versioned<UserPlant>>, StoreError> {
        let tables = self.lock()?;
        Ok(tables
            .purchase_order
            .iter()
            .filter_map(|id| tables.plants.get(id).cloned())
            .collect())
    }

    fn insert(&self, plant: &UserPlant) -> Result<VersionToken, StoreError> {
        let mut tables = self.lock()?;
        if tables.plants.contains_key(&plant.id) {
            return Err(StoreError::Duplicate {
                entity: PLANT,
                id: plant.id.to_string(),
            });
        }
        let version = VersionToken::initial();
        tables
            .plants
            .insert(plant.id, Versioned::new(plant.clone(), version));
        tables.purchase_order.push(plant.id);
        Ok(version)
    }

    fn write(
        &self,
        record: &UserPlant,
        expected: VersionToken,
    ) -> Result<VersionToken, StoreError> {
        let mut tables = self.lock()?;
        let current = tables
            .plants
            .get_mut(&record.id)
            .ok_or_else(|| plant_not_found(record.id))?;
        if current.version != expected {
            tracing::debug!(
                plant_id = %record.id,
                expected = %expected,
                current = %current.version,
                "Rejected stale plant write"
            );
            return Err(plant_conflict(record.id));
        }

        let next = expected.next();
        *current = Versioned::new(record.clone(), next);
        Ok(next)
    }

    fn write_batch(
        &self,
        records: &[(UserPlant, VersionToken)],
    ) -> Result<Vec<VersionToken>, StoreError> {
        let mut tables = self.lock()?;

        // Validate everything before touching anything.
        let mut seen = BTreeSet::new();
        for (plant, expected) in records {
            if !seen.insert(plant.id) {
                return Err(StoreError::Duplicate {
                    entity: PLANT,
                    id: plant.id.to_string(),
                });
            }
            let current = tables
                .plants
                .get(&plant.id)
                .ok_or_else(|| plant_not_found(plant.id))?;
            if current.version != *expected {
                tracing::debug!(
                    plant_id = %plant.id,
                    batch_size = records.len(),
                    "Rejected stale plant batch"
                );
                return Err(plant_conflict(plant.id));
            }
        }

        let mut versions = Vec::with_capacity(records.len());
        for (plant, expected) in records {
            let next = expected.next();
            tables
                .plants
                .insert(plant.id, Versioned::new(plant.clone(), next));
            versions.push(next);
        }
        Ok(versions)
    }

    fn read_species(&self, id: SpeciesId) -> Result<PlantSpecies, StoreError> {
        let tables = self.lock()?;
        tables
            .species
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: SPECIES,
                id: id.to_string(),
            })
    }

    fn list_species(&self) -> Result<Vec<PlantSpecies>, StoreError> {
        let tables = self.lock()?;
        let mut catalog: Vec<PlantSpecies> = tables.species.values().cloned().collect();
        catalog.sort_by(|a, b| {
            a.unlock_level
                .cmp(&b.unlock_level)
                .then(a.base_cost.cmp(&b.base_cost))
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(catalog)
    }

    fn upsert_species(&self, species: &PlantSpecies) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        tables.species.insert(species.id, species.clone());
        Ok(())
    }
}
