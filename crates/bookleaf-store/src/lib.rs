//! Persistence contracts for the Bookleaf progression engine.
//!
//! The engine treats storage as a transactional row store with optimistic
//! concurrency: every read hands back a [`VersionToken`], and every write
//! must present the token it read. A stale token is rejected with
//! [`StoreError::Conflict`] and the caller re-reads and retries.
//!
//! ```text
//! Service
//!     |
//!     +-- read()  --------> Versioned { record, version }
//!     |      (modify record)
//!     +-- write(record, version)
//!             |-- version matches --> new VersionToken
//!             +-- version stale ----> StoreError::Conflict
//! ```
//!
//! # Modules
//!
//! - [`version`] -- Opaque version tokens and the [`Versioned`] wrapper
//! - [`settings`] -- [`SettingsStore`] for the singleton progression record
//! - [`plant`] -- [`PlantStore`] for owned plants and the species catalog
//! - [`memory`] -- Mutex-guarded in-memory implementations of both stores
//! - [`error`] -- Shared error types

pub mod error;
pub mod memory;
pub mod plant;
pub mod settings;
pub mod version;

// Re-export primary types for convenience.
pub use error::StoreError;
pub use memory::{MemoryPlantStore, MemorySettingsStore};
pub use plant::PlantStore;
pub use settings::SettingsStore;
pub use version::{VersionToken, Versioned};
