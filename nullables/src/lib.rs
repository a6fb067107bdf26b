//! Nullable infrastructure for deterministic testing.
//!
//! All external dependencies of the registry (credit transfers, the item
//! graph, storage) are abstracted behind traits. This crate provides
//! test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically (e.g. forced transfer failures)
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod graph;
pub mod store;
pub mod transfer;

pub use graph::{NullItemGraph, NullTokenRegistry};
pub use store::NullBurnStore;
pub use transfer::{NullTransfer, PullRecord};
