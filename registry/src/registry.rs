//! The burn registry.

use pyre_ranked::BurnerPage;
use pyre_types::{AccountId, BurnRecorded, CreditId, Hint, ItemId};
use pyre_utils::StatsCounter;

use crate::collaborators::{ItemParentLookup, ItemTokenRegistry, TransferCapability};
use crate::error::RegistryError;
use crate::events::EventSink;
use crate::state::LedgerState;

const STAT_BURNS: &str = "burns";
const STAT_STALE_HINTS: &str = "stale_hints";
const STAT_TRANSFER_FAILURES: &str = "transfer_failures";

/// The pair of hints an item burn needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemHints {
    /// Position in the governing credit type's list.
    pub token: Hint,
    /// Position in the item's own list.
    pub item: Hint,
}

/// Records burns of credit types and items, and answers ranking queries.
///
/// Burns run to completion or change nothing: hints, token resolution and
/// totals are all verified before the transfer, and state is only written
/// once the transfer went through.
pub struct BurnRegistry<T, P, R, E> {
    state: LedgerState,
    transfer: T,
    parents: P,
    tokens: R,
    events: E,
    /// Destination of pulled funds.
    burn_sink: AccountId,
    stats: StatsCounter,
}

impl<T, P, R, E> BurnRegistry<T, P, R, E>
where
    T: TransferCapability,
    P: ItemParentLookup,
    R: ItemTokenRegistry,
    E: EventSink,
{
    pub fn new(transfer: T, parents: P, tokens: R, events: E) -> Self {
        Self::with_state(LedgerState::default(), transfer, parents, tokens, events)
    }

    /// Resume from previously persisted state.
    pub fn with_state(state: LedgerState, transfer: T, parents: P, tokens: R, events: E) -> Self {
        Self {
            state,
            transfer,
            parents,
            tokens,
            events,
            burn_sink: AccountId::ZERO,
            stats: StatsCounter::new(&[STAT_BURNS, STAT_STALE_HINTS, STAT_TRANSFER_FAILURES]),
        }
    }

    /// Send pulled funds to `sink` instead of the zero account.
    pub fn with_burn_sink(mut self, sink: AccountId) -> Self {
        self.burn_sink = sink;
        self
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn transfer(&self) -> &T {
        &self.transfer
    }

    pub fn transfer_mut(&mut self) -> &mut T {
        &mut self.transfer
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    pub fn stats(&self) -> &StatsCounter {
        &self.stats
    }

    pub fn burn_sink(&self) -> AccountId {
        self.burn_sink
    }

    /// Give back the owned parts.
    pub fn into_parts(self) -> (LedgerState, T, P, R, E) {
        (self.state, self.transfer, self.parents, self.tokens, self.events)
    }

    /// The credit type governing `item`: the token registered for its parent.
    pub fn resolve_credit(&self, item: &ItemId) -> Result<CreditId, RegistryError> {
        let parent = self.parents.parent_of(item);
        self.tokens
            .token_of(&parent)
            .ok_or(RegistryError::NoAssociatedToken(*item))
    }

    fn note_failure(&self, err: &RegistryError) {
        match err {
            RegistryError::StaleHint(_) => self.stats.increment(STAT_STALE_HINTS),
            RegistryError::TransferFailed(_) => self.stats.increment(STAT_TRANSFER_FAILURES),
            _ => {}
        }
    }

    fn next_event(
        &mut self,
        credit: CreditId,
        item: Option<ItemId>,
        account: AccountId,
        amount: u128,
    ) -> BurnRecorded {
        self.state.last_seq += 1;
        BurnRecorded {
            seq: self.state.last_seq,
            credit,
            item,
            account,
            amount,
        }
    }

    // ── Hints (read-only, O(n)) ───────────────────────────────────────

    /// The hint `caller` should submit to burn `amount` of `credit`.
    pub fn compute_token_hint(
        &self,
        caller: &AccountId,
        credit: &CreditId,
        amount: u128,
    ) -> Result<Hint, RegistryError> {
        Ok(self
            .state
            .credits
            .compute_insertion_hint(credit, caller, amount)?)
    }

    /// The hints `caller` should submit to burn `amount` for `item`.
    pub fn compute_item_hints(
        &self,
        caller: &AccountId,
        item: &ItemId,
        amount: u128,
    ) -> Result<ItemHints, RegistryError> {
        if amount == 0 {
            return Err(RegistryError::ZeroAmount);
        }
        let credit = self.resolve_credit(item)?;
        Ok(ItemHints {
            token: self
                .state
                .credits
                .compute_insertion_hint(&credit, caller, amount)?,
            item: self.state.items.compute_insertion_hint(item, caller, amount)?,
        })
    }

    // ── Burns (mutating, O(1) given valid hints) ──────────────────────

    /// Burn `amount` of `credit` as `caller`.
    pub fn burn_token(
        &mut self,
        caller: &AccountId,
        credit: &CreditId,
        amount: u128,
        hint: &Hint,
    ) -> Result<BurnRecorded, RegistryError> {
        let result = self.try_burn_token(caller, credit, amount, hint);
        if let Err(e) = &result {
            self.note_failure(e);
            tracing::warn!(account = %caller, credit = %credit, amount, %hint, error = %e, "token burn rejected");
        }
        result
    }

    fn try_burn_token(
        &mut self,
        caller: &AccountId,
        credit: &CreditId,
        amount: u128,
        hint: &Hint,
    ) -> Result<BurnRecorded, RegistryError> {
        if amount == 0 {
            return Err(RegistryError::ZeroAmount);
        }
        let prepared = self.state.credits.prepare_insert(credit, caller, amount, hint)?;

        self.transfer
            .pull(credit, caller, &self.burn_sink, amount)
            .map_err(|e| RegistryError::TransferFailed(e.to_string()))?;

        // Prepared under this same borrow, so the ledger cannot have moved.
        let outcome = self.state.credits.apply(prepared)?;
        let event = self.next_event(*credit, None, *caller, amount);
        self.events.emit(&event);
        self.stats.increment(STAT_BURNS);
        tracing::debug!(
            seq = event.seq,
            account = %caller,
            credit = %credit,
            amount,
            total = outcome.new_total,
            relinked = outcome.relinked,
            "token burn recorded"
        );
        Ok(event)
    }

    /// Burn `amount` for `item` as `caller`. Counts toward both the item's
    /// ranking and its governing credit type's ranking.
    pub fn burn_item(
        &mut self,
        caller: &AccountId,
        item: &ItemId,
        amount: u128,
        hints: &ItemHints,
    ) -> Result<BurnRecorded, RegistryError> {
        let result = self.try_burn_item(caller, item, amount, hints);
        if let Err(e) = &result {
            self.note_failure(e);
            tracing::warn!(
                account = %caller,
                item = %item,
                amount,
                token_hint = %hints.token,
                item_hint = %hints.item,
                error = %e,
                "item burn rejected"
            );
        }
        result
    }

    fn try_burn_item(
        &mut self,
        caller: &AccountId,
        item: &ItemId,
        amount: u128,
        hints: &ItemHints,
    ) -> Result<BurnRecorded, RegistryError> {
        if amount == 0 {
            return Err(RegistryError::ZeroAmount);
        }
        let credit = self.resolve_credit(item)?;
        let token_insert = self
            .state
            .credits
            .prepare_insert(&credit, caller, amount, &hints.token)?;
        let item_insert = self
            .state
            .items
            .prepare_insert(item, caller, amount, &hints.item)?;
        let new_item_total = self
            .state
            .item_total(item)
            .checked_add(amount)
            .ok_or(RegistryError::Overflow)?;

        self.transfer
            .pull(&credit, caller, &self.burn_sink, amount)
            .map_err(|e| RegistryError::TransferFailed(e.to_string()))?;

        let token_outcome = self.state.credits.apply(token_insert)?;
        let item_outcome = self.state.items.apply(item_insert)?;
        self.state.item_totals.insert(*item, new_item_total);
        let event = self.next_event(credit, Some(*item), *caller, amount);
        self.events.emit(&event);
        self.stats.increment(STAT_BURNS);
        tracing::debug!(
            seq = event.seq,
            account = %caller,
            credit = %credit,
            item = %item,
            amount,
            token_total = token_outcome.new_total,
            item_total = item_outcome.new_total,
            item_aggregate = new_item_total,
            "item burn recorded"
        );
        Ok(event)
    }

    // ── Queries ───────────────────────────────────────────────────────

    /// Cumulative amount `account` burned of `credit` (item burns included).
    pub fn account_credit_burned(&self, account: &AccountId, credit: &CreditId) -> u128 {
        self.state.credits.amount_of(credit, account)
    }

    /// Cumulative amount `account` burned for `item`.
    pub fn account_item_burned(&self, account: &AccountId, item: &ItemId) -> u128 {
        self.state.items.amount_of(item, account)
    }

    pub fn account_credits_count(&self, account: &AccountId) -> usize {
        self.state.credits.scopes_of_count(account)
    }

    /// Credit types `account` burned, in first-burn order. `limit == 0`
    /// returns everything from `offset` on.
    pub fn account_credits(&self, account: &AccountId, offset: usize, limit: usize) -> Vec<CreditId> {
        self.state.credits.scopes_of_page(account, offset, limit)
    }

    pub fn account_items_count(&self, account: &AccountId) -> usize {
        self.state.items.scopes_of_count(account)
    }

    /// Items `account` burned for, in first-burn order. `limit == 0`
    /// returns everything from `offset` on.
    pub fn account_items(&self, account: &AccountId, offset: usize, limit: usize) -> Vec<ItemId> {
        self.state.items.scopes_of_page(account, offset, limit)
    }

    /// Top burners of `credit`. `limit == 0` returns nothing.
    pub fn credit_burners(&self, credit: &CreditId, offset: usize, limit: usize) -> BurnerPage {
        self.state.credits.enumerate(credit, offset, limit)
    }

    /// Top burners for `item`. `limit == 0` returns nothing.
    pub fn item_burners(&self, item: &ItemId, offset: usize, limit: usize) -> BurnerPage {
        self.state.items.enumerate(item, offset, limit)
    }

    /// Sum of every account's burns for `item`.
    pub fn item_total(&self, item: &ItemId) -> u128 {
        self.state.item_total(item)
    }
}
