//! Storage traits for the pyre burn ledger.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.

pub mod batch;
pub mod burn;
pub mod error;

pub use batch::WriteBatch;
pub use burn::BurnStore;
pub use error::StoreError;
