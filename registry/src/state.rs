//! The persistent part of the registry.

use std::collections::HashMap;

use pyre_ranked::RankedBook;
use pyre_store::{BurnStore, WriteBatch};
use pyre_types::{CreditId, ItemId};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Bumped whenever the snapshot encoding changes.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_VERSION_KEY: &str = "schema_version";

/// Everything a burn can change, in one serializable value.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LedgerState {
    /// Ranked lists per credit type, and each account's credit-type index.
    pub credits: RankedBook<CreditId>,
    /// Ranked lists per item, and each account's item index.
    pub items: RankedBook<ItemId>,
    /// Running sum of every account's burns per item.
    pub item_totals: HashMap<ItemId, u128>,
    /// Sequence number of the last emitted event.
    pub last_seq: u64,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item_total(&self, item: &ItemId) -> u128 {
        self.item_totals.get(item).copied().unwrap_or(0)
    }

    /// Check every ranked list and index, and that each item total equals
    /// the sum of that item's ledger.
    pub fn check_integrity(&self) -> Result<(), RegistryError> {
        self.credits.check_integrity()?;
        self.items.check_integrity()?;

        for (item, ledger) in self.items.iter() {
            let sum = ledger
                .iter()
                .try_fold(0u128, |acc, (_, amount)| acc.checked_add(amount))
                .ok_or(RegistryError::Overflow)?;
            if sum != self.item_total(item) {
                return Err(RegistryError::Corrupted(format!(
                    "item {} total {} does not match burns {}",
                    item,
                    self.item_total(item),
                    sum
                )));
            }
        }
        for (item, total) in &self.item_totals {
            if *total != 0 && self.items.ledger(item).is_none() {
                return Err(RegistryError::Corrupted(format!(
                    "item {} has a total but no burns",
                    item
                )));
            }
        }
        Ok(())
    }

    /// Queue the snapshot and the schema version into `batch`.
    pub fn stage(&self, batch: &mut WriteBatch) -> Result<(), RegistryError> {
        let bytes =
            bincode::serialize(self).map_err(|e| RegistryError::Serialization(e.to_string()))?;
        batch.put_snapshot(bytes);
        batch.put_meta(SCHEMA_VERSION_KEY, SCHEMA_VERSION.to_le_bytes().to_vec());
        Ok(())
    }

    /// Persist the state and the schema version in one batch.
    pub fn save_to_store(&self, store: &dyn BurnStore) -> Result<(), RegistryError> {
        let mut batch = WriteBatch::new();
        self.stage(&mut batch)?;
        store.write_batch(&batch)?;
        Ok(())
    }

    /// Restore state from a store; an empty store yields empty state.
    ///
    /// The restored state is integrity-checked before it is returned.
    pub fn load_from_store(store: &dyn BurnStore) -> Result<Self, RegistryError> {
        let version = match store.get_meta(SCHEMA_VERSION_KEY)? {
            Some(bytes) => {
                let arr: [u8; 4] = bytes.as_slice().try_into().map_err(|_| {
                    RegistryError::Serialization(
                        "schema_version has unexpected byte length".to_string(),
                    )
                })?;
                u32::from_le_bytes(arr)
            }
            None => SCHEMA_VERSION,
        };
        if version != SCHEMA_VERSION {
            return Err(RegistryError::UnsupportedSchema(version));
        }

        let state = match store.get_snapshot()? {
            Some(bytes) => bincode::deserialize::<LedgerState>(&bytes)
                .map_err(|e| RegistryError::Serialization(e.to_string()))?,
            None => LedgerState::default(),
        };
        state.check_integrity()?;
        Ok(state)
    }
}
