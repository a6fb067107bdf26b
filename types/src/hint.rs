//! Caller-supplied insertion hints.

use crate::id::AccountId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an account should sit in a ranked list after its next burn.
///
/// `prev` is the entry the account should follow once reordered; `old_prev`
/// is the entry currently preceding it. Either may be `AccountId::ZERO`
/// (the sentinel). Hints are verified on use, never trusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Hint {
    pub prev: AccountId,
    pub old_prev: AccountId,
}

impl Hint {
    /// Insert at the head, no current predecessor.
    pub const SENTINEL: Self = Self {
        prev: AccountId::ZERO,
        old_prev: AccountId::ZERO,
    };

    pub fn new(prev: AccountId, old_prev: AccountId) -> Self {
        Self { prev, old_prev }
    }

    /// Whether this hint asks for an in-place amount update.
    pub fn is_in_place(&self) -> bool {
        self.prev == self.old_prev
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prev={} old_prev={}", self.prev, self.old_prev)
    }
}
