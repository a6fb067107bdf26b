//! In-memory balances with injectable failures.

use std::collections::HashMap;

use pyre_registry::{TransferCapability, TransferError};
use pyre_types::{AccountId, CreditId};

/// A pull that went through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PullRecord {
    pub credit: CreditId,
    pub from: AccountId,
    pub to: AccountId,
    pub amount: u128,
}

/// Balances per `(credit, account)`, moved only when funds suffice.
#[derive(Debug, Default)]
pub struct NullTransfer {
    balances: HashMap<(CreditId, AccountId), u128>,
    pulls: Vec<PullRecord>,
    reject_all: bool,
}

impl NullTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give `account` `amount` of `credit`.
    pub fn fund(&mut self, credit: CreditId, account: AccountId, amount: u128) {
        *self.balances.entry((credit, account)).or_default() += amount;
    }

    /// Builder form of [`fund`](Self::fund).
    pub fn with_funds(mut self, credit: CreditId, account: AccountId, amount: u128) -> Self {
        self.fund(credit, account, amount);
        self
    }

    pub fn balance(&self, credit: &CreditId, account: &AccountId) -> u128 {
        self.balances.get(&(*credit, *account)).copied().unwrap_or(0)
    }

    /// Make every subsequent pull fail (or succeed again).
    pub fn set_reject_all(&mut self, reject: bool) {
        self.reject_all = reject;
    }

    pub fn pulls(&self) -> &[PullRecord] {
        &self.pulls
    }
}

impl TransferCapability for NullTransfer {
    fn pull(
        &mut self,
        credit: &CreditId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TransferError> {
        if self.reject_all {
            return Err(TransferError::Rejected("null transfer set to reject".into()));
        }
        let available = self.balance(credit, from);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        self.balances.insert((*credit, *from), available - amount);
        *self.balances.entry((*credit, *to)).or_default() += amount;
        self.pulls.push(PullRecord {
            credit: *credit,
            from: *from,
            to: *to,
            amount,
        });
        Ok(())
    }
}
