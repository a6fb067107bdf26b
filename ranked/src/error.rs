//! Ranked-ledger errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RankedError {
    #[error("amount must be non-zero")]
    ZeroAmount,

    /// The caller's hint no longer (or never did) describe the list.
    #[error("stale hint: {0}")]
    StaleHint(&'static str),

    #[error("the sentinel account cannot hold a burn")]
    SentinelAccount,

    #[error("arithmetic overflow in cumulative burn")]
    Overflow,

    #[error("ranked list is corrupted: {0}")]
    Corrupted(String),
}
