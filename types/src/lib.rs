//! Fundamental types for the pyre burn ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account and scope identifiers, insertion hints, and the burn notification record.

pub mod error;
pub mod event;
pub mod hint;
pub mod id;

pub use error::IdParseError;
pub use event::BurnRecorded;
pub use hint::Hint;
pub use id::{AccountId, CreditId, ItemId};
