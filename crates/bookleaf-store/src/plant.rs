//! Store contract for owned plants and the species catalog.

use bookleaf_types::{PlantId, PlantSpecies, SpeciesId, UserPlant};

use crate::error::StoreError;
use crate::version::{VersionToken, Versioned};

/// Persistence for [`UserPlant`] instances and [`PlantSpecies`] entries.
///
/// Plants carry version tokens; species are immutable catalog data and are
/// only replaced wholesale through [`upsert_species`](Self::upsert_species).
pub trait PlantStore: Send + Sync {
    /// Read one plant and its current version.
    fn read(&self, id: PlantId) -> Result<Versioned<UserPlant>, StoreError>;

    /// Every owned plant, dead ones included, in purchase order.
    fn list(&self) -> Result<Vec<Versioned<UserPlant>>, StoreError>;

    /// Store a new plant. Fails with [`StoreError::Duplicate`] if the ID is
    /// already taken.
    fn insert(&self, plant: &UserPlant) -> Result<VersionToken, StoreError>;

    /// Replace a plant if `expected` is still its current version.
    fn write(&self, record: &UserPlant, expected: VersionToken)
    -> Result<VersionToken, StoreError>;

    /// Replace several plants atomically.
    ///
    /// Either every record's token matches and all are written, or nothing
    /// is written and the first mismatch is returned. New versions come
    /// back in input order.
    fn write_batch(
        &self,
        records: &[(UserPlant, VersionToken)],
    ) -> Result<Vec<VersionToken>, StoreError>;

    /// Look up one catalog entry.
    fn read_species(&self, id: SpeciesId) -> Result<PlantSpecies, StoreError>;

    /// The whole catalog, ordered by unlock level then base cost.
    fn list_species(&self) -> Result<Vec<PlantSpecies>, StoreError>;

    /// Insert or replace a catalog entry.
    fn upsert_species(&self, species: &PlantSpecies) -> Result<(), StoreError>;
}
