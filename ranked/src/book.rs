//! A set of independent ranked lists keyed by scope.

use std::collections::HashMap;
use std::hash::Hash;

use pyre_types::{AccountId, Hint};
use serde::{Deserialize, Serialize};

use crate::entry::{BurnerPage, InsertOutcome};
use crate::error::RankedError;
use crate::ledger::{PreparedInsert, RankedBurnLedger};
use crate::pagination::{page, ZeroLimit};

/// One [`RankedBurnLedger`] per scope, plus the per-account index of the
/// scopes each account has burned into.
///
/// A scope with no burns has no ledger and behaves exactly like an empty one.
/// The index is append-only: a scope is pushed once, on the account's first
/// burn in it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize + Eq + Hash",
    deserialize = "S: Deserialize<'de> + Eq + Hash"
))]
pub struct RankedBook<S> {
    ledgers: HashMap<S, RankedBurnLedger>,
    account_scopes: HashMap<AccountId, Vec<S>>,
}

/// A verified insert bound to its scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopedInsert<S> {
    pub scope: S,
    pub insert: PreparedInsert,
}

impl<S> Default for RankedBook<S> {
    fn default() -> Self {
        Self {
            ledgers: HashMap::new(),
            account_scopes: HashMap::new(),
        }
    }
}

impl<S: Copy + Eq + Hash> RankedBook<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self, scope: &S) -> Option<&RankedBurnLedger> {
        self.ledgers.get(scope)
    }

    /// Number of scopes with at least one burn.
    pub fn scope_count(&self) -> usize {
        self.ledgers.len()
    }

    pub fn amount_of(&self, scope: &S, account: &AccountId) -> u128 {
        self.ledgers
            .get(scope)
            .map(|l| l.amount_of(account))
            .unwrap_or(0)
    }

    pub fn compute_insertion_hint(
        &self,
        scope: &S,
        account: &AccountId,
        amount_to_add: u128,
    ) -> Result<Hint, RankedError> {
        match self.ledgers.get(scope) {
            Some(ledger) => ledger.compute_insertion_hint(account, amount_to_add),
            None => RankedBurnLedger::new().compute_insertion_hint(account, amount_to_add),
        }
    }

    pub fn prepare_insert(
        &self,
        scope: &S,
        account: &AccountId,
        amount_to_add: u128,
        hint: &Hint,
    ) -> Result<ScopedInsert<S>, RankedError> {
        let insert = match self.ledgers.get(scope) {
            Some(ledger) => ledger.prepare_insert(account, amount_to_add, hint)?,
            None => RankedBurnLedger::new().prepare_insert(account, amount_to_add, hint)?,
        };
        Ok(ScopedInsert {
            scope: *scope,
            insert,
        })
    }

    /// Apply an insert from [`prepare_insert`](Self::prepare_insert). A stale
    /// insert leaves both the scope and the account index untouched.
    pub fn apply(&mut self, prepared: ScopedInsert<S>) -> Result<InsertOutcome, RankedError> {
        let outcome = self
            .ledgers
            .entry(prepared.scope)
            .or_default()
            .apply(prepared.insert)?;
        if outcome.first_entry {
            self.account_scopes
                .entry(outcome.account)
                .or_default()
                .push(prepared.scope);
        }
        Ok(outcome)
    }

    pub fn insert(
        &mut self,
        scope: &S,
        account: &AccountId,
        amount_to_add: u128,
        hint: &Hint,
    ) -> Result<InsertOutcome, RankedError> {
        let prepared = self.prepare_insert(scope, account, amount_to_add, hint)?;
        self.apply(prepared)
    }

    /// Top burners of `scope`. `limit == 0` returns nothing.
    pub fn enumerate(&self, scope: &S, offset: usize, limit: usize) -> BurnerPage {
        self.ledgers
            .get(scope)
            .map(|l| l.enumerate(offset, limit))
            .unwrap_or_default()
    }

    /// Every scope `account` has burned into, in first-burn order.
    pub fn scopes_of(&self, account: &AccountId) -> &[S] {
        self.account_scopes
            .get(account)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn scopes_of_count(&self, account: &AccountId) -> usize {
        self.scopes_of(account).len()
    }

    /// A window of [`scopes_of`](Self::scopes_of). `limit == 0` returns the
    /// remainder from `offset`.
    pub fn scopes_of_page(&self, account: &AccountId, offset: usize, limit: usize) -> Vec<S> {
        page(self.scopes_of(account), offset, limit, ZeroLimit::Remainder)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, &RankedBurnLedger)> {
        self.ledgers.iter()
    }

    /// Check every ledger, and that the scope index lists each
    /// `(account, scope)` pair with a non-zero amount exactly once.
    pub fn check_integrity(&self) -> Result<(), RankedError> {
        let mut expected = 0usize;
        for ledger in self.ledgers.values() {
            ledger.check_integrity()?;
            expected += ledger.len();
        }
        let mut indexed = 0usize;
        for (account, scopes) in &self.account_scopes {
            for (i, scope) in scopes.iter().enumerate() {
                if scopes[..i].contains(scope) {
                    return Err(RankedError::Corrupted(format!(
                        "scope listed twice for {}",
                        account
                    )));
                }
                if self.amount_of(scope, account) == 0 {
                    return Err(RankedError::Corrupted(format!(
                        "{} indexes a scope it never burned into",
                        account
                    )));
                }
            }
            indexed += scopes.len();
        }
        if indexed != expected {
            return Err(RankedError::Corrupted(format!(
                "scope index holds {} entries, ledgers hold {}",
                indexed, expected
            )));
        }
        Ok(())
    }
}
