//! Enumeration types for the Bookleaf progression engine.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Plant health
// ---------------------------------------------------------------------------

/// Health of an owned plant, driven by time since its last watering.
///
/// Variants are declared in decay order, so the derived [`Ord`] ranks a
/// `Wilting` plant above a `Thirsty` one. The ladder only moves forward with
/// time; watering resets it to `Healthy`, except from `Dead`, which is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum PlantStatus {
    /// Watered within the species' interval.
    Healthy,
    /// Past the watering interval but under 1.5x of it.
    Thirsty,
    /// Between 1.5x and 2x the watering interval.
    Wilting,
    /// Neglected for 2x the interval or longer. Terminal.
    Dead,
}

impl PlantStatus {
    /// Whether the plant has reached the terminal state.
    pub const fn is_dead(self) -> bool {
        matches!(self, Self::Dead)
    }

    /// Whether the plant is alive (anything but [`PlantStatus::Dead`]).
    pub const fn is_alive(self) -> bool {
        !self.is_dead()
    }
}

impl core::fmt::Display for PlantStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::Healthy => "healthy",
            Self::Thirsty => "thirsty",
            Self::Wilting => "wilting",
            Self::Dead => "dead",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// XP sources
// ---------------------------------------------------------------------------

/// What produced an XP award.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum XpSource {
    /// A timed reading session (minutes, optional pages, streak flag).
    ReadingSession,
    /// Finishing a book.
    BookCompletion,
}

// ---------------------------------------------------------------------------
// Change notification causes
// ---------------------------------------------------------------------------

/// Why the progression record changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ProgressionChangeCause {
    /// XP was added (possibly with a level-up and coin reward).
    XpAwarded,
    /// Coins were spent, e.g. on a plant purchase.
    CoinsSpent,
    /// Coins were credited outside of a level-up, e.g. a purchase refund.
    CoinsAdded,
}
