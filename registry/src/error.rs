//! Registry errors.

use pyre_ranked::RankedError;
use pyre_store::StoreError;
use pyre_types::ItemId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("stale hint: {0}")]
    StaleHint(&'static str),

    #[error("transfer failed: {0}")]
    TransferFailed(String),

    #[error("item {0} has no associated credit type")]
    NoAssociatedToken(ItemId),

    #[error("the sentinel account cannot burn")]
    SentinelAccount,

    #[error("arithmetic overflow in burn totals")]
    Overflow,

    #[error("ledger state is corrupted: {0}")]
    Corrupted(String),

    #[error("unsupported snapshot schema version {0}")]
    UnsupportedSchema(u32),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<RankedError> for RegistryError {
    fn from(e: RankedError) -> Self {
        match e {
            RankedError::ZeroAmount => RegistryError::ZeroAmount,
            RankedError::StaleHint(reason) => RegistryError::StaleHint(reason),
            RankedError::SentinelAccount => RegistryError::SentinelAccount,
            RankedError::Overflow => RegistryError::Overflow,
            RankedError::Corrupted(reason) => RegistryError::Corrupted(reason),
        }
    }
}
