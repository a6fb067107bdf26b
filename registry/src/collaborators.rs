//! External capabilities the registry depends on.
//!
//! Credit transfer mechanics and the item graph live outside this crate.
//! Tests swap in the implementations from `pyre-nullables`.

use pyre_types::{AccountId, CreditId, ItemId};
use thiserror::Error;

/// Why a pull did not go through. The registry reports every variant as
/// `RegistryError::TransferFailed`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("allowance exceeded: need {needed}, approved {approved}")]
    AllowanceExceeded { needed: u128, approved: u128 },

    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Moves credit of one type between accounts.
pub trait TransferCapability {
    /// Move `amount` of `credit` from `from` to `to`. Either the whole amount
    /// moves or nothing does.
    fn pull(
        &mut self,
        credit: &CreditId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TransferError>;
}

/// Single-parent item ancestry.
pub trait ItemParentLookup {
    fn parent_of(&self, item: &ItemId) -> ItemId;
}

/// Which credit type governs an item.
pub trait ItemTokenRegistry {
    fn token_of(&self, item: &ItemId) -> Option<CreditId>;
}
