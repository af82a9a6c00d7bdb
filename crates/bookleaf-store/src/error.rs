//! Error types for the store layer.
//!
//! [`StoreError::Conflict`] is the only error a caller is expected to
//! recover from by retrying. Everything else reports a fact about the data.

/// Errors that can occur in a store operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No record exists with the given identifier.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record looked up (`"plant"`, `"species"`).
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// The record changed since the presented version token was issued.
    #[error("version conflict on {entity} {id}")]
    Conflict {
        /// Kind of record written.
        entity: &'static str,
        /// Identifier of the conflicting record.
        id: String,
    },

    /// The coin balance cannot cover a spend.
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        /// Coins the operation needs.
        required: u64,
        /// Coins currently held.
        available: u64,
    },

    /// A record with this identifier already exists, or appears twice in
    /// one grouped write.
    #[error("duplicate {entity}: {id}")]
    Duplicate {
        /// Kind of record.
        entity: &'static str,
        /// Identifier that collided.
        id: String,
    },

    /// The backing store failed (e.g. a poisoned lock).
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether re-reading and retrying the operation may succeed.
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
