//! Services, configuration, and orchestration for the Bookleaf engine.
//!
//! The [`Engine`] owns a [`ProgressionService`] and a [`PlantService`] that
//! share one settings store, one plant store, one [`Clock`], and one
//! [`ProgressionEvents`] hub. All mutations are optimistic
//! read-modify-writes, retried on version conflicts.
//!
//! # Modules
//!
//! - [`config`] -- `bookleaf-config.yaml` loading into typed structs
//! - [`clock`] -- [`Clock`] trait with system and manual clocks
//! - [`error`] -- [`EngineError`] taxonomy
//! - [`events`] -- Broadcast channel for [`ProgressionChanged`] events
//! - [`retry`] -- Conflict retry loop
//! - [`progression`] -- XP awards, level-ups, and coin rewards
//! - [`plants`] -- Watering, plant XP, purchases, decay, boosts
//! - [`engine`] -- The facade tying it together
//!
//! [`ProgressionChanged`]: bookleaf_types::ProgressionChanged

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod plants;
pub mod progression;
pub mod retry;

// Re-export primary types for convenience.
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, EngineConfig};
pub use engine::{Engine, SessionOutcome};
pub use error::EngineError;
pub use events::ProgressionEvents;
pub use plants::PlantService;
pub use progression::{BoostSource, NoBoost, ProgressionService};
pub use retry::retry_on_conflict;
