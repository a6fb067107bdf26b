//! LMDB storage backend for the pyre burn ledger.
//!
//! Implements `BurnStore` from `pyre-store` using the `heed` LMDB bindings.
//! Snapshot, meta entries and the event log are three databases in one
//! environment, so a `WriteBatch` commits as a single LMDB write transaction.

pub mod burn;
pub mod error;

pub use burn::LmdbBurnStore;
pub use error::LmdbError;
