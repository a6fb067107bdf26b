//! Nullable item graph and token registry.

use std::collections::HashMap;

use pyre_registry::{ItemParentLookup, ItemTokenRegistry};
use pyre_types::{CreditId, ItemId};

/// Fixed parent links. An item with no registered parent is its own root.
#[derive(Debug, Default)]
pub struct NullItemGraph {
    parents: HashMap<ItemId, ItemId>,
}

impl NullItemGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(mut self, item: ItemId, parent: ItemId) -> Self {
        self.parents.insert(item, parent);
        self
    }
}

impl ItemParentLookup for NullItemGraph {
    fn parent_of(&self, item: &ItemId) -> ItemId {
        self.parents.get(item).copied().unwrap_or(*item)
    }
}

/// Fixed item -> credit type assignments.
#[derive(Debug, Default)]
pub struct NullTokenRegistry {
    tokens: HashMap<ItemId, CreditId>,
}

impl NullTokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, item: ItemId, credit: CreditId) -> Self {
        self.tokens.insert(item, credit);
        self
    }
}

impl ItemTokenRegistry for NullTokenRegistry {
    fn token_of(&self, item: &ItemId) -> Option<CreditId> {
        self.tokens.get(item).copied()
    }
}
