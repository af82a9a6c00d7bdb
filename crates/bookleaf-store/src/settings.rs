//! Store contract for the singleton [`UserProgression`] record.

use bookleaf_types::UserProgression;

use crate::error::StoreError;
use crate::version::{VersionToken, Versioned};

/// Persistence for the user's progression record.
///
/// Exactly one record exists. The first [`read`](Self::read) creates it
/// with the store's starting values if it is absent.
pub trait SettingsStore: Send + Sync {
    /// Read the record and its current version, creating it if absent.
    fn read(&self) -> Result<Versioned<UserProgression>, StoreError>;

    /// Replace the record if `expected` is still its current version.
    ///
    /// Returns the new version, or [`StoreError::Conflict`] when the record
    /// changed since `expected` was issued.
    fn write(
        &self,
        record: &UserProgression,
        expected: VersionToken,
    ) -> Result<VersionToken, StoreError>;

    /// Current coin balance.
    fn coins(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.record.coins)
    }

    /// Current stored level.
    fn level(&self) -> Result<u32, StoreError> {
        Ok(self.read()?.record.level)
    }

    /// Deduct `amount` coins in one token-checked write.
    ///
    /// Returns the remaining balance. A concurrent write surfaces as
    /// [`StoreError::Conflict`]; nothing is deducted in that case.
    fn spend_coins(&self, amount: u64) -> Result<u64, StoreError> {
        let Versioned {
            mut record,
            version,
        } = self.read()?;
        let remaining =
            record
                .coins
                .checked_sub(amount)
                .ok_or(StoreError::InsufficientFunds {
                    required: amount,
                    available: record.coins,
                })?;
        record.coins = remaining;
        self.write(&record, version)?;
        Ok(remaining)
    }

    /// Credit `amount` coins in one token-checked write.
    ///
    /// Returns the new balance. The balance saturates at `u64::MAX`.
    fn add_coins(&self, amount: u64) -> Result<u64, StoreError> {
        let Versioned {
            mut record,
            version,
        } = self.read()?;
        record.coins = record.coins.saturating_add(amount);
        self.write(&record, version)?;
        Ok(record.coins)
    }
}
