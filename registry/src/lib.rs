//! Burn registry — records irrevocable burns against ranked ledgers.
//!
//! A burn is recorded against a credit type and, for item burns, also
//! against the item. Each burn:
//! 1. verifies the caller's hints against every ledger it touches,
//! 2. pulls the funds through the external [`TransferCapability`],
//! 3. applies the ledger updates and emits one [`BurnRecorded`] event.
//!
//! Every check runs before the pull and every write after it, so a failed
//! burn changes nothing.
//!
//! [`BurnRecorded`]: pyre_types::BurnRecorded

pub mod collaborators;
pub mod error;
pub mod events;
pub mod registry;
pub mod state;

pub use collaborators::{ItemParentLookup, ItemTokenRegistry, TransferCapability, TransferError};
pub use error::RegistryError;
pub use events::{
    append_events_to_store, load_events_from_store, stage_events, EventLog, EventSink,
};
pub use registry::{BurnRegistry, ItemHints};
pub use state::{LedgerState, SCHEMA_VERSION};
