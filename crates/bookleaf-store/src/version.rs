//! Optimistic-concurrency version tokens.
//!
//! A [`VersionToken`] is opaque to callers: they can compare it and hand it
//! back to the store, but only a store mints new ones.

/// Opaque marker of a record's revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionToken(u64);

impl VersionToken {
    /// The token of a freshly created record.
    ///
    /// Intended for store implementations only.
    pub const fn initial() -> Self {
        Self(1)
    }

    /// The token that follows this one after a successful write.
    ///
    /// Intended for store implementations only.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl core::fmt::Display for VersionToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A record paired with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    /// The record as of `version`.
    pub record: T,
    /// Token to present when writing the record back.
    pub version: VersionToken,
}

impl<T> Versioned<T> {
    /// Pair a record with its version.
    pub const fn new(record: T, version: VersionToken) -> Self {
        Self { record, version }
    }
}
