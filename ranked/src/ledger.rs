//! The per-scope ranked list.

use std::collections::HashMap;

use pyre_types::{AccountId, Hint};
use serde::{Deserialize, Serialize};

use crate::entry::{BurnerPage, InsertOutcome, RankedEntry};
use crate::error::RankedError;
use crate::pagination::{window, ZeroLimit};

/// A singly linked list of accounts, highest cumulative burn first.
///
/// Nodes live in a keyed arena (`account -> entry`). The sentinel is not
/// stored in the arena: its `next` pointer is `head`, and its amount is
/// always zero.
///
/// Invariants (checked by [`RankedBurnLedger::check_integrity`]):
/// - amounts are non-increasing from head to tail
/// - every stored entry has a non-zero amount
/// - every stored entry is reachable from `head` exactly once
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RankedBurnLedger {
    head: AccountId,
    entries: HashMap<AccountId, RankedEntry>,
    /// Bumped on every applied insert. A `PreparedInsert` is only valid
    /// against the revision it was prepared at.
    revision: u64,
}

/// A verified insert, ready to apply.
///
/// Produced by [`RankedBurnLedger::prepare_insert`], which does all of the
/// checking. Applying it only fails if the ledger changed in between.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreparedInsert {
    account: AccountId,
    previous_amount: u128,
    new_total: u128,
    splice: Option<Splice>,
    revision: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Splice {
    /// Current predecessor to unlink from; `None` for a first burn.
    unlink_from: Option<AccountId>,
    prev: AccountId,
    next: AccountId,
}

impl PreparedInsert {
    pub fn account(&self) -> AccountId {
        self.account
    }

    pub fn new_total(&self) -> u128 {
        self.new_total
    }

    pub fn is_first_entry(&self) -> bool {
        self.previous_amount == 0
    }
}

impl RankedBurnLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts in the list (the sentinel is not counted).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The top burner, if any.
    pub fn head(&self) -> Option<AccountId> {
        (!self.head.is_zero()).then_some(self.head)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Cumulative amount burned by `account`; zero if it never burned here.
    pub fn amount_of(&self, account: &AccountId) -> u128 {
        self.entries.get(account).map(|e| e.amount).unwrap_or(0)
    }

    pub fn contains(&self, account: &AccountId) -> bool {
        self.entries.contains_key(account)
    }

    pub fn entry(&self, account: &AccountId) -> Option<&RankedEntry> {
        self.entries.get(account)
    }

    /// The successor of `account`, treating the zero id as the sentinel.
    /// `None` if `account` is neither the sentinel nor in the list.
    fn next_of(&self, account: &AccountId) -> Option<AccountId> {
        if account.is_zero() {
            Some(self.head)
        } else {
            self.entries.get(account).map(|e| e.next)
        }
    }

    fn set_next(&mut self, account: &AccountId, next: AccountId) {
        if account.is_zero() {
            self.head = next;
        } else if let Some(entry) = self.entries.get_mut(account) {
            entry.next = next;
        }
    }

    /// Compute the hint that places `account` correctly after burning
    /// `amount_to_add` more.
    ///
    /// Read-only and O(n): walks the list from the head. `prev` is the last
    /// entry whose amount is at least the new total; `old_prev` is the
    /// account's current predecessor, or the sentinel if it is not listed.
    pub fn compute_insertion_hint(
        &self,
        account: &AccountId,
        amount_to_add: u128,
    ) -> Result<Hint, RankedError> {
        if amount_to_add == 0 {
            return Err(RankedError::ZeroAmount);
        }
        if account.is_zero() {
            return Err(RankedError::SentinelAccount);
        }
        let new_total = self
            .amount_of(account)
            .checked_add(amount_to_add)
            .ok_or(RankedError::Overflow)?;

        let mut hint = Hint::SENTINEL;
        let mut found = !self.contains(account);
        let mut before = AccountId::ZERO;
        let mut cursor = self.head;
        while let Some(entry) = self.entries.get(&cursor) {
            if cursor == *account {
                hint.old_prev = before;
                found = true;
            } else if entry.amount >= new_total {
                hint.prev = cursor;
            } else if found {
                break;
            }
            before = cursor;
            cursor = entry.next;
        }
        Ok(hint)
    }

    /// Verify `hint` for burning `amount_to_add` more as `account`, without
    /// touching the list.
    ///
    /// O(1). The checks:
    /// - a listed account must be the successor of `hint.old_prev`
    /// - `hint.prev` must be the sentinel or a listed account other than `account`
    /// - `prev` must hold at least the new total (unless it is the sentinel)
    /// - the entry after `prev` must hold strictly less than the new total
    ///
    /// When `prev == old_prev` for a listed account the update is in place and
    /// only the upper bound is checked; the lower bound already holds because
    /// amounts only grow. A first burn is always spliced and `old_prev` is
    /// ignored.
    pub fn prepare_insert(
        &self,
        account: &AccountId,
        amount_to_add: u128,
        hint: &Hint,
    ) -> Result<PreparedInsert, RankedError> {
        if amount_to_add == 0 {
            return Err(RankedError::ZeroAmount);
        }
        if account.is_zero() {
            return Err(RankedError::SentinelAccount);
        }
        let previous_amount = self.amount_of(account);
        let new_total = previous_amount
            .checked_add(amount_to_add)
            .ok_or(RankedError::Overflow)?;
        let listed = self.contains(account);

        if listed && self.next_of(&hint.old_prev) != Some(*account) {
            return Err(RankedError::StaleHint("old_prev does not precede the account"));
        }

        let splice = if listed && hint.is_in_place() {
            self.check_upper_bound(&hint.prev, new_total)?;
            None
        } else {
            if hint.prev == *account {
                return Err(RankedError::StaleHint("prev is the account itself"));
            }
            let next = self
                .next_of(&hint.prev)
                .ok_or(RankedError::StaleHint("prev is not in the list"))?;
            self.check_upper_bound(&hint.prev, new_total)?;
            if let Some(following) = self.entries.get(&next) {
                if following.amount >= new_total {
                    return Err(RankedError::StaleHint("entry after prev is not below the new total"));
                }
            }
            Some(Splice {
                unlink_from: listed.then_some(hint.old_prev),
                prev: hint.prev,
                next,
            })
        };

        Ok(PreparedInsert {
            account: *account,
            previous_amount,
            new_total,
            splice,
            revision: self.revision,
        })
    }

    fn check_upper_bound(&self, prev: &AccountId, new_total: u128) -> Result<(), RankedError> {
        match self.entries.get(prev) {
            Some(entry) if entry.amount < new_total => {
                Err(RankedError::StaleHint("prev holds less than the new total"))
            }
            _ => Ok(()),
        }
    }

    /// Apply an insert verified by [`prepare_insert`](Self::prepare_insert).
    ///
    /// Fails with [`RankedError::StaleHint`], leaving the list untouched, if
    /// the ledger changed after the insert was prepared.
    pub fn apply(&mut self, prepared: PreparedInsert) -> Result<InsertOutcome, RankedError> {
        if prepared.revision != self.revision {
            return Err(RankedError::StaleHint(
                "ledger changed since the insert was prepared",
            ));
        }
        let account = prepared.account;

        if let Some(splice) = prepared.splice {
            if let Some(old_prev) = splice.unlink_from {
                let following = self.next_of(&account).unwrap_or(AccountId::ZERO);
                self.set_next(&old_prev, following);
            }
            self.set_next(&splice.prev, account);
            self.entries
                .entry(account)
                .or_insert(RankedEntry {
                    amount: 0,
                    next: AccountId::ZERO,
                })
                .next = splice.next;
        }
        if let Some(entry) = self.entries.get_mut(&account) {
            entry.amount = prepared.new_total;
        }
        self.revision = self.revision.wrapping_add(1);

        Ok(InsertOutcome {
            account,
            previous_amount: prepared.previous_amount,
            new_total: prepared.new_total,
            first_entry: prepared.previous_amount == 0,
            relinked: prepared.splice.is_some(),
        })
    }

    /// Verify `hint` and record the burn. O(1).
    ///
    /// On error the list is untouched.
    pub fn insert(
        &mut self,
        account: &AccountId,
        amount_to_add: u128,
        hint: &Hint,
    ) -> Result<InsertOutcome, RankedError> {
        let prepared = self.prepare_insert(account, amount_to_add, hint)?;
        self.apply(prepared)
    }

    /// Walk the list from the top.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            ledger: self,
            cursor: self.head,
        }
    }

    /// Up to `limit` entries after skipping `offset`, highest first.
    ///
    /// `limit == 0` returns nothing: a ranked list is never walked unbounded.
    pub fn enumerate(&self, offset: usize, limit: usize) -> BurnerPage {
        let range = window(self.len(), offset, limit, ZeroLimit::Empty);
        self.iter().skip(range.start).take(range.len()).collect()
    }

    /// Verify the list invariants. Used after restoring from storage.
    pub fn check_integrity(&self) -> Result<(), RankedError> {
        if self.entries.contains_key(&AccountId::ZERO) {
            return Err(RankedError::Corrupted("sentinel stored as an entry".into()));
        }
        let mut visited = 0usize;
        let mut last = u128::MAX;
        let mut cursor = self.head;
        while !cursor.is_zero() {
            let entry = self.entries.get(&cursor).ok_or_else(|| {
                RankedError::Corrupted(format!("link to unknown account {}", cursor))
            })?;
            if entry.amount == 0 {
                return Err(RankedError::Corrupted(format!("{} has a zero amount", cursor)));
            }
            if entry.amount > last {
                return Err(RankedError::Corrupted(format!("{} is out of order", cursor)));
            }
            visited += 1;
            if visited > self.entries.len() {
                return Err(RankedError::Corrupted("cycle in list".into()));
            }
            last = entry.amount;
            cursor = entry.next;
        }
        if visited != self.entries.len() {
            return Err(RankedError::Corrupted(format!(
                "{} of {} entries unreachable",
                self.entries.len() - visited,
                self.entries.len()
            )));
        }
        Ok(())
    }
}

/// Descending iterator over `(account, amount)`.
pub struct Iter<'a> {
    ledger: &'a RankedBurnLedger,
    cursor: AccountId,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (AccountId, u128);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.ledger.entries.get(&self.cursor)?;
        let account = self.cursor;
        self.cursor = entry.next;
        Some((account, entry.amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(n: u8) -> AccountId {
        AccountId::new([n; 32])
    }

    /// Burn with a freshly computed hint.
    fn burn(ledger: &mut RankedBurnLedger, account: AccountId, amount: u128) -> InsertOutcome {
        let hint = ledger.compute_insertion_hint(&account, amount).unwrap();
        ledger.insert(&account, amount, &hint).unwrap()
    }

    #[test]
    fn empty_ledger() {
        let ledger = RankedBurnLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.head(), None);
        assert_eq!(ledger.amount_of(&acct(1)), 0);
        assert!(ledger.enumerate(0, 10).is_empty());
        ledger.check_integrity().unwrap();
    }

    #[test]
    fn sole_burner_accumulates() {
        let mut ledger = RankedBurnLedger::new();
        let a = acct(1);
        let first = burn(&mut ledger, a, 5);
        assert!(first.first_entry);
        let second = burn(&mut ledger, a, 7);
        assert!(!second.first_entry);
        assert_eq!(second.previous_amount, 5);
        assert_eq!(ledger.amount_of(&a), 12);
        assert_eq!(ledger.enumerate(0, 10).pairs(), vec![(a, 12)]);
    }

    #[test]
    fn order_is_independent_of_call_order() {
        let (a, b) = (acct(1), acct(2));

        let mut first = RankedBurnLedger::new();
        burn(&mut first, b, 15);
        burn(&mut first, a, 10);

        let mut second = RankedBurnLedger::new();
        burn(&mut second, a, 10);
        burn(&mut second, b, 15);

        let expected = vec![(b, 15), (a, 10)];
        assert_eq!(first.enumerate(0, 10).pairs(), expected);
        assert_eq!(second.enumerate(0, 10).pairs(), expected);
    }

    #[test]
    fn hint_for_new_account_uses_sentinel_old_prev() {
        let mut ledger = RankedBurnLedger::new();
        burn(&mut ledger, acct(1), 20);
        burn(&mut ledger, acct(2), 10);
        let hint = ledger.compute_insertion_hint(&acct(3), 15).unwrap();
        assert_eq!(hint, Hint::new(acct(1), AccountId::ZERO));
    }

    #[test]
    fn hint_for_existing_account_reports_current_predecessor() {
        let mut ledger = RankedBurnLedger::new();
        burn(&mut ledger, acct(1), 30);
        burn(&mut ledger, acct(2), 20);
        burn(&mut ledger, acct(3), 10);
        // 10 + 15 = 25 lands between 30 and 20.
        let hint = ledger.compute_insertion_hint(&acct(3), 15).unwrap();
        assert_eq!(hint, Hint::new(acct(1), acct(2)));
        ledger.insert(&acct(3), 15, &hint).unwrap();
        assert_eq!(
            ledger.enumerate(0, 10).accounts,
            vec![acct(1), acct(3), acct(2)]
        );
        ledger.check_integrity().unwrap();
    }

    #[test]
    fn move_to_head() {
        let mut ledger = RankedBurnLedger::new();
        burn(&mut ledger, acct(1), 30);
        burn(&mut ledger, acct(2), 20);
        let hint = ledger.compute_insertion_hint(&acct(2), 100).unwrap();
        assert_eq!(hint, Hint::new(AccountId::ZERO, acct(1)));
        ledger.insert(&acct(2), 100, &hint).unwrap();
        assert_eq!(ledger.head(), Some(acct(2)));
        assert_eq!(ledger.enumerate(0, 10).pairs(), vec![(acct(2), 120), (acct(1), 30)]);
        ledger.check_integrity().unwrap();
    }

    #[test]
    fn in_place_update_keeps_links() {
        let mut ledger = RankedBurnLedger::new();
        burn(&mut ledger, acct(1), 50);
        burn(&mut ledger, acct(2), 20);
        burn(&mut ledger, acct(3), 10);
        let before_next = ledger.entry(&acct(2)).unwrap().next;

        let hint = Hint::new(acct(1), acct(1));
        let outcome = ledger.insert(&acct(2), 5, &hint).unwrap();
        assert!(!outcome.relinked);
        assert_eq!(ledger.entry(&acct(2)).unwrap().next, before_next);
        assert_eq!(ledger.entry(&acct(1)).unwrap().next, acct(2));
        assert_eq!(ledger.amount_of(&acct(2)), 25);
    }

    #[test]
    fn in_place_update_still_checks_upper_bound() {
        let mut ledger = RankedBurnLedger::new();
        burn(&mut ledger, acct(1), 10);
        burn(&mut ledger, acct(2), 5);
        // 5 + 10 = 15 would overtake acct(1); staying in place is wrong.
        let err = ledger
            .insert(&acct(2), 10, &Hint::new(acct(1), acct(1)))
            .unwrap_err();
        assert!(matches!(err, RankedError::StaleHint(_)));
        assert_eq!(ledger.amount_of(&acct(2)), 5);
    }

    #[test]
    fn wrong_old_prev_is_stale() {
        let mut ledger = RankedBurnLedger::new();
        burn(&mut ledger, acct(1), 30);
        burn(&mut ledger, acct(2), 20);
        burn(&mut ledger, acct(3), 10);
        let err = ledger
            .insert(&acct(3), 1, &Hint::new(acct(2), acct(1)))
            .unwrap_err();
        assert!(matches!(err, RankedError::StaleHint(_)));
    }

    #[test]
    fn prev_below_new_total_is_stale() {
        let mut ledger = RankedBurnLedger::new();
        burn(&mut ledger, acct(1), 30);
        burn(&mut ledger, acct(2), 20);
        // 25 cannot follow an entry holding 20.
        let err = ledger
            .insert(&acct(3), 25, &Hint::new(acct(2), AccountId::ZERO))
            .unwrap_err();
        assert!(matches!(err, RankedError::StaleHint(_)));
    }

    #[test]
    fn next_not_below_new_total_is_stale() {
        let mut ledger = RankedBurnLedger::new();
        burn(&mut ledger, acct(1), 30);
        burn(&mut ledger, acct(2), 20);
        // Placing 15 at the head would put it above 30.
        let err = ledger.insert(&acct(3), 15, &Hint::SENTINEL).unwrap_err();
        assert!(matches!(err, RankedError::StaleHint(_)));
        assert_eq!(ledger.len(), 2);
        ledger.check_integrity().unwrap();
    }

    #[test]
    fn unknown_prev_is_stale() {
        let mut ledger = RankedBurnLedger::new();
        burn(&mut ledger, acct(1), 30);
        let err = ledger
            .insert(&acct(2), 5, &Hint::new(acct(9), AccountId::ZERO))
            .unwrap_err();
        assert!(matches!(err, RankedError::StaleHint(_)));
    }

    #[test]
    fn self_as_prev_is_stale() {
        let mut ledger = RankedBurnLedger::new();
        burn(&mut ledger, acct(1), 30);
        burn(&mut ledger, acct(2), 20);
        let err = ledger
            .insert(&acct(2), 1, &Hint::new(acct(2), acct(1)))
            .unwrap_err();
        assert!(matches!(err, RankedError::StaleHint(_)));
    }

    #[test]
    fn equal_amount_ranks_behind_incumbent() {
        let mut ledger = RankedBurnLedger::new();
        burn(&mut ledger, acct(1), 10);
        burn(&mut ledger, acct(2), 10);
        assert_eq!(ledger.enumerate(0, 10).accounts, vec![acct(1), acct(2)]);
        // Jumping ahead of an equal incumbent is rejected.
        let mut other = RankedBurnLedger::new();
        burn(&mut other, acct(1), 10);
        let err = other.insert(&acct(2), 10, &Hint::SENTINEL).unwrap_err();
        assert!(matches!(err, RankedError::StaleHint(_)));
    }

    #[test]
    fn hint_goes_stale_after_intervening_burn() {
        let mut ledger = RankedBurnLedger::new();
        burn(&mut ledger, acct(1), 30);
        burn(&mut ledger, acct(2), 20);
        let hint = ledger.compute_insertion_hint(&acct(3), 25).unwrap();
        assert_eq!(hint.prev, acct(1));
        // acct(2) overtakes to 28, so the slot after acct(1) now holds 28 >= 25.
        burn(&mut ledger, acct(2), 8);
        let err = ledger.insert(&acct(3), 25, &hint).unwrap_err();
        assert!(matches!(err, RankedError::StaleHint(_)));
    }

    #[test]
    fn zero_amount_and_sentinel_rejected() {
        let mut ledger = RankedBurnLedger::new();
        assert_eq!(
            ledger.compute_insertion_hint(&acct(1), 0),
            Err(RankedError::ZeroAmount)
        );
        assert_eq!(
            ledger.insert(&acct(1), 0, &Hint::SENTINEL),
            Err(RankedError::ZeroAmount)
        );
        assert_eq!(
            ledger.insert(&AccountId::ZERO, 1, &Hint::SENTINEL),
            Err(RankedError::SentinelAccount)
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn overflow_rejected() {
        let mut ledger = RankedBurnLedger::new();
        burn(&mut ledger, acct(1), u128::MAX);
        assert_eq!(
            ledger.compute_insertion_hint(&acct(1), 1),
            Err(RankedError::Overflow)
        );
        assert_eq!(
            ledger.insert(&acct(1), 1, &Hint::SENTINEL),
            Err(RankedError::Overflow)
        );
    }

    #[test]
    fn enumerate_pagination() {
        let mut ledger = RankedBurnLedger::new();
        for n in 1..=5u8 {
            burn(&mut ledger, acct(n), n as u128 * 10);
        }
        let page = ledger.enumerate(1, 2);
        assert_eq!(page.amounts, vec![40, 30]);
        assert!(ledger.enumerate(5, 10).is_empty());
        assert!(ledger.enumerate(0, 0).is_empty());
        assert_eq!(ledger.enumerate(3, 10).amounts, vec![20, 10]);
    }

    #[test]
    fn integrity_detects_corruption() {
        let mut ledger = RankedBurnLedger::new();
        burn(&mut ledger, acct(1), 30);
        burn(&mut ledger, acct(2), 20);

        let mut out_of_order = ledger.clone();
        out_of_order.entries.get_mut(&acct(2)).unwrap().amount = 99;
        assert!(matches!(
            out_of_order.check_integrity(),
            Err(RankedError::Corrupted(_))
        ));

        let mut orphan = ledger.clone();
        orphan.entries.insert(
            acct(7),
            RankedEntry {
                amount: 1,
                next: AccountId::ZERO,
            },
        );
        assert!(orphan.check_integrity().is_err());

        let mut cycle = ledger.clone();
        cycle.entries.get_mut(&acct(2)).unwrap().next = acct(1);
        cycle.entries.get_mut(&acct(1)).unwrap().amount = 20;
        assert!(cycle.check_integrity().is_err());
    }

    #[test]
    fn prepared_insert_does_not_mutate() {
        let mut ledger = RankedBurnLedger::new();
        burn(&mut ledger, acct(1), 30);
        let hint = ledger.compute_insertion_hint(&acct(2), 40).unwrap();
        let prepared = ledger.prepare_insert(&acct(2), 40, &hint).unwrap();
        assert!(prepared.is_first_entry());
        assert_eq!(prepared.new_total(), 40);
        assert_eq!(ledger.len(), 1);
        ledger.apply(prepared).unwrap();
        assert_eq!(ledger.head(), Some(acct(2)));
    }

    #[test]
    fn prepared_insert_is_rejected_after_ledger_changes() {
        let (a, b, c) = (acct(1), acct(2), acct(3));
        let mut ledger = RankedBurnLedger::new();
        burn(&mut ledger, a, 30);
        let hint = ledger.compute_insertion_hint(&b, 10).unwrap();
        let prepared = ledger.prepare_insert(&b, 10, &hint).unwrap();

        // C lands between A and the splice point B was verified against.
        burn(&mut ledger, c, 20);

        let err = ledger.apply(prepared).unwrap_err();
        assert!(matches!(err, RankedError::StaleHint(_)));
        assert_eq!(ledger.enumerate(0, 10).pairs(), vec![(a, 30), (c, 20)]);
        assert_eq!(ledger.amount_of(&b), 0);
        ledger.check_integrity().unwrap();
    }

    #[test]
    fn bincode_roundtrip_preserves_order() {
        let mut ledger = RankedBurnLedger::new();
        for n in 1..=4u8 {
            burn(&mut ledger, acct(n), (n as u128 * 7) % 5 + 1);
        }
        let bytes = bincode::serialize(&ledger).unwrap();
        let restored: RankedBurnLedger = bincode::deserialize(&bytes).unwrap();
        restored.check_integrity().unwrap();
        assert_eq!(restored.enumerate(0, 10), ledger.enumerate(0, 10));
    }
}
