//! Error types for engine operations.
//!
//! Store failures are folded into [`EngineError`] at the service boundary so
//! callers match on one enum. [`EngineError::ConcurrencyConflict`] is only
//! seen once the retry budget is exhausted.

use bookleaf_store::StoreError;

/// Errors surfaced by the progression and plant services.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A referenced plant or species does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record looked up.
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// The coin balance cannot cover a purchase.
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        /// Coins the purchase costs.
        required: u64,
        /// Coins the user holds.
        available: u64,
    },

    /// The operation is not allowed in the record's current state.
    #[error("invalid operation: {reason}")]
    InvalidOperation {
        /// Why the operation was refused.
        reason: String,
    },

    /// The record kept changing underneath every retry.
    #[error("concurrency conflict on {entity} after retries")]
    ConcurrencyConflict {
        /// Kind of record that conflicted.
        entity: &'static str,
    },

    /// A counter or formula overflowed.
    #[error("arithmetic overflow computing {context}")]
    ArithmeticOverflow {
        /// What was being computed.
        context: &'static str,
    },

    /// The store failed for a reason other than a conflict.
    #[error("store error: {0}")]
    Store(String),
}

impl EngineError {
    /// Whether re-reading and retrying the whole operation may succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict { .. })
    }

    /// Shorthand for [`EngineError::InvalidOperation`].
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidOperation {
            reason: reason.into(),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound { entity, id },
            StoreError::Conflict { entity, .. } => Self::ConcurrencyConflict { entity },
            StoreError::InsufficientFunds {
                required,
                available,
            } => Self::InsufficientFunds {
                required,
                available,
            },
            StoreError::Duplicate { .. } | StoreError::Backend(_) => Self::Store(err.to_string()),
        }
    }
}
