//! List nodes and the values returned by ledger operations.

use pyre_types::AccountId;
use serde::{Deserialize, Serialize};

/// One account's position in a ranked list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// Cumulative amount burned by this account in the scope. Never decreases.
    pub amount: u128,
    /// The next entry toward the tail, or the sentinel at the end of the list.
    pub next: AccountId,
}

/// What an applied insert changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InsertOutcome {
    pub account: AccountId,
    pub previous_amount: u128,
    pub new_total: u128,
    /// True when this was the account's first burn in the scope.
    pub first_entry: bool,
    /// False for an in-place update that kept every link as it was.
    pub relinked: bool,
}

/// A slice of a ranked list, highest burner first.
///
/// `accounts[i]` burned `amounts[i]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnerPage {
    pub accounts: Vec<AccountId>,
    pub amounts: Vec<u128>,
}

impl BurnerPage {
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Pairs of `(account, amount)` in rank order.
    pub fn pairs(&self) -> Vec<(AccountId, u128)> {
        self.accounts
            .iter()
            .copied()
            .zip(self.amounts.iter().copied())
            .collect()
    }
}

impl FromIterator<(AccountId, u128)> for BurnerPage {
    fn from_iter<I: IntoIterator<Item = (AccountId, u128)>>(iter: I) -> Self {
        let (accounts, amounts) = iter.into_iter().unzip();
        Self { accounts, amounts }
    }
}
