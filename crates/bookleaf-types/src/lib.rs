//! Shared type definitions for the Bookleaf progression engine.
//!
//! This crate is the single source of truth for the records and result
//! objects exchanged between the pure calculation crate, the stores, and
//! the services. Types flow downstream to `TypeScript` via `ts-rs` for the
//! app's display layer.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for plants and species
//! - [`enums`] -- Plant health, XP sources, change causes
//! - [`structs`] -- Progression, species and plant records plus result objects

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{PlantStatus, ProgressionChangeCause, XpSource};
pub use ids::{PlantId, SpeciesId};
pub use structs::{
    LevelSummary, LevelUpResult, PlantSpecies, PlantXpAward, ProgressionChanged,
    ProgressionResult, PurchaseReceipt, ReadingSession, StatusRefreshSummary, UserPlant,
    UserProgression,
};
