//! Burn notifications observed by external indexers.

use crate::id::{AccountId, CreditId, ItemId};
use serde::{Deserialize, Serialize};

/// Emitted once per successful burn.
///
/// `seq` increases by one per event, starting at 1, so an indexer can
/// detect a gap in the stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnRecorded {
    pub seq: u64,
    pub credit: CreditId,
    /// `None` for burns against the credit type alone.
    pub item: Option<ItemId>,
    pub account: AccountId,
    pub amount: u128,
}

impl BurnRecorded {
    pub fn is_item_burn(&self) -> bool {
        self.item.is_some()
    }
}
