use pyre_nullables::{NullBurnStore, NullItemGraph, NullTokenRegistry, NullTransfer};
use pyre_registry::{
    append_events_to_store, load_events_from_store, stage_events, BurnRegistry, EventLog,
    ItemHints, LedgerState, RegistryError,
};
use pyre_store::{BurnStore, StoreError, WriteBatch};
use pyre_store_lmdb::LmdbBurnStore;
use pyre_types::{AccountId, CreditId, Hint, ItemId};

type TestRegistry = BurnRegistry<NullTransfer, NullItemGraph, NullTokenRegistry, EventLog>;

fn account(name: &str) -> AccountId {
    AccountId::from_label(name)
}

fn credit() -> CreditId {
    CreditId::from_label("credit-t")
}

fn post() -> ItemId {
    ItemId::from_label("post")
}

fn reply() -> ItemId {
    ItemId::from_label("reply")
}

fn orphan() -> ItemId {
    ItemId::from_label("orphan")
}

/// `reply` hangs off `post`; `post` is governed by `credit()`.
fn make_registry(funded: &[&str]) -> TestRegistry {
    let mut transfer = NullTransfer::new();
    for name in funded {
        transfer.fund(credit(), account(name), 1_000);
    }
    let graph = NullItemGraph::new().with_parent(reply(), post());
    let tokens = NullTokenRegistry::new().with_token(post(), credit());
    BurnRegistry::new(transfer, graph, tokens, EventLog::new())
}

fn burn_token(registry: &mut TestRegistry, name: &str, amount: u128) {
    let who = account(name);
    let hint = registry.compute_token_hint(&who, &credit(), amount).unwrap();
    registry.burn_token(&who, &credit(), amount, &hint).unwrap();
}

fn burn_item(registry: &mut TestRegistry, name: &str, item: ItemId, amount: u128) {
    let who = account(name);
    let hints = registry.compute_item_hints(&who, &item, amount).unwrap();
    registry.burn_item(&who, &item, amount, &hints).unwrap();
}

#[test]
fn sole_burner_accumulates() {
    let mut registry = make_registry(&["a"]);
    burn_token(&mut registry, "a", 5);
    burn_token(&mut registry, "a", 7);
    assert_eq!(registry.account_credit_burned(&account("a"), &credit()), 12);
    assert_eq!(
        registry.credit_burners(&credit(), 0, 10).pairs(),
        vec![(account("a"), 12)]
    );
    assert_eq!(registry.transfer().balance(&credit(), &account("a")), 988);
    assert_eq!(
        registry.transfer().balance(&credit(), &AccountId::ZERO),
        12
    );
}

#[test]
fn ranking_independent_of_call_order() {
    let expected = vec![(account("b"), 15), (account("a"), 10)];

    let mut first = make_registry(&["a", "b"]);
    burn_token(&mut first, "b", 15);
    burn_token(&mut first, "a", 10);
    assert_eq!(first.credit_burners(&credit(), 0, 10).pairs(), expected);

    let mut second = make_registry(&["a", "b"]);
    burn_token(&mut second, "a", 10);
    burn_token(&mut second, "b", 15);
    assert_eq!(second.credit_burners(&credit(), 0, 10).pairs(), expected);
}

#[test]
fn item_total_sums_burners() {
    let mut registry = make_registry(&["a", "b"]);
    burn_item(&mut registry, "a", reply(), 3);
    burn_item(&mut registry, "b", reply(), 4);
    assert_eq!(registry.item_total(&reply()), 7);
    assert_eq!(
        registry.item_burners(&reply(), 0, 10).pairs(),
        vec![(account("b"), 4), (account("a"), 3)]
    );
    // Item burns also count toward the governing credit type.
    assert_eq!(registry.account_credit_burned(&account("b"), &credit()), 4);
    assert_eq!(registry.account_item_burned(&account("a"), &reply()), 3);
    registry.state().check_integrity().unwrap();
}

#[test]
fn events_emitted_once_per_burn() {
    let mut registry = make_registry(&["a"]);
    burn_token(&mut registry, "a", 2);
    burn_item(&mut registry, "a", reply(), 3);

    let events = registry.events().events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].seq, 1);
    assert_eq!(events[0].item, None);
    assert_eq!(events[0].amount, 2);
    assert_eq!(events[1].seq, 2);
    assert_eq!(events[1].item, Some(reply()));
    assert_eq!(events[1].credit, credit());
    assert_eq!(events[1].account, account("a"));
}

#[test]
fn zero_amount_rejected_without_effect() {
    let mut registry = make_registry(&["a"]);
    let who = account("a");
    assert!(matches!(
        registry.burn_token(&who, &credit(), 0, &Hint::SENTINEL),
        Err(RegistryError::ZeroAmount)
    ));
    let hints = ItemHints {
        token: Hint::SENTINEL,
        item: Hint::SENTINEL,
    };
    assert!(matches!(
        registry.burn_item(&who, &reply(), 0, &hints),
        Err(RegistryError::ZeroAmount)
    ));
    assert!(matches!(
        registry.compute_token_hint(&who, &credit(), 0),
        Err(RegistryError::ZeroAmount)
    ));
    assert!(registry.events().is_empty());
    assert!(registry.transfer().pulls().is_empty());
    assert_eq!(registry.account_credits_count(&who), 0);
}

#[test]
fn item_without_token_rejected() {
    let mut registry = make_registry(&["a"]);
    let who = account("a");
    assert!(matches!(
        registry.compute_item_hints(&who, &orphan(), 5),
        Err(RegistryError::NoAssociatedToken(_))
    ));
    let hints = ItemHints {
        token: Hint::SENTINEL,
        item: Hint::SENTINEL,
    };
    assert!(matches!(
        registry.burn_item(&who, &orphan(), 5, &hints),
        Err(RegistryError::NoAssociatedToken(_))
    ));
    assert!(registry.transfer().pulls().is_empty());
}

#[test]
fn failed_transfer_changes_nothing() {
    // "poor" has no funds.
    let mut registry = make_registry(&["a"]);
    let who = account("poor");
    let hint = registry.compute_token_hint(&who, &credit(), 5).unwrap();
    assert!(matches!(
        registry.burn_token(&who, &credit(), 5, &hint),
        Err(RegistryError::TransferFailed(_))
    ));

    registry.transfer_mut().set_reject_all(true);
    let who = account("a");
    let hints = registry.compute_item_hints(&who, &reply(), 5).unwrap();
    assert!(matches!(
        registry.burn_item(&who, &reply(), 5, &hints),
        Err(RegistryError::TransferFailed(_))
    ));

    assert!(registry.credit_burners(&credit(), 0, 10).is_empty());
    assert!(registry.item_burners(&reply(), 0, 10).is_empty());
    assert_eq!(registry.item_total(&reply()), 0);
    assert_eq!(registry.account_items_count(&who), 0);
    assert!(registry.events().is_empty());
    assert_eq!(registry.stats().get("transfer_failures"), 2);
}

#[test]
fn stale_item_hint_aborts_before_transfer() {
    let mut registry = make_registry(&["a", "b"]);
    burn_item(&mut registry, "a", reply(), 10);

    let who = account("b");
    let mut hints = registry.compute_item_hints(&who, &reply(), 20).unwrap();
    // A valid token hint paired with a forged item hint.
    hints.item = Hint::new(account("a"), AccountId::ZERO);
    assert!(matches!(
        registry.burn_item(&who, &reply(), 20, &hints),
        Err(RegistryError::StaleHint(_))
    ));
    // Neither ledger, the total, nor the balance moved.
    assert_eq!(registry.account_credit_burned(&who, &credit()), 0);
    assert_eq!(registry.item_total(&reply()), 10);
    assert_eq!(registry.transfer().balance(&credit(), &who), 1_000);
    assert_eq!(registry.stats().get("stale_hints"), 1);
    registry.state().check_integrity().unwrap();
}

#[test]
fn hint_goes_stale_after_intervening_burn() {
    let mut registry = make_registry(&["a", "b", "c"]);
    burn_token(&mut registry, "a", 30);
    burn_token(&mut registry, "b", 20);

    let who = account("c");
    let hint = registry.compute_token_hint(&who, &credit(), 25).unwrap();
    // b climbs to 28 before c submits.
    burn_token(&mut registry, "b", 8);
    assert!(matches!(
        registry.burn_token(&who, &credit(), 25, &hint),
        Err(RegistryError::StaleHint(_))
    ));
    // Recompute and resubmit.
    let hint = registry.compute_token_hint(&who, &credit(), 25).unwrap();
    registry.burn_token(&who, &credit(), 25, &hint).unwrap();
    assert_eq!(
        registry.credit_burners(&credit(), 0, 10).amounts,
        vec![30, 28, 25]
    );
}

#[test]
fn account_listings_paginate() {
    let mut registry = make_registry(&["a"]);
    let items: Vec<ItemId> = (0..4).map(|i| ItemId::from_label(&format!("child-{i}"))).collect();
    let mut graph = NullItemGraph::new();
    for item in &items {
        graph = graph.with_parent(*item, post());
    }
    let tokens = NullTokenRegistry::new().with_token(post(), credit());
    let (state, transfer, _, _, events) = registry.into_parts();
    registry = BurnRegistry::with_state(state, transfer, graph, tokens, events);

    for item in &items {
        burn_item(&mut registry, "a", *item, 1);
    }
    burn_item(&mut registry, "a", items[0], 1);

    let who = account("a");
    assert_eq!(registry.account_items_count(&who), 4);
    assert_eq!(registry.account_items(&who, 0, 0), items);
    assert_eq!(registry.account_items(&who, 1, 2), items[1..3].to_vec());
    assert_eq!(registry.account_items(&who, 3, 0), items[3..].to_vec());
    assert!(registry.account_items(&who, 4, 0).is_empty());
    assert_eq!(registry.account_credits_count(&who), 1);
    assert_eq!(registry.account_credits(&who, 0, 0), vec![credit()]);

    assert!(registry.item_burners(&items[0], 0, 0).is_empty());
    assert!(registry.item_burners(&items[0], 1, 10).is_empty());
}

#[test]
fn in_place_reburn_keeps_neighbours() {
    let mut registry = make_registry(&["a", "b", "c"]);
    burn_token(&mut registry, "a", 50);
    burn_token(&mut registry, "b", 20);
    burn_token(&mut registry, "c", 10);

    let who = account("b");
    let hint = Hint::new(account("a"), account("a"));
    registry.burn_token(&who, &credit(), 5, &hint).unwrap();
    assert_eq!(
        registry.credit_burners(&credit(), 0, 10).pairs(),
        vec![(account("a"), 50), (account("b"), 25), (account("c"), 10)]
    );
}

#[test]
fn burn_sink_receives_funds() {
    let sink = account("furnace");
    let mut registry = make_registry(&["a"]).with_burn_sink(sink);
    burn_token(&mut registry, "a", 9);
    assert_eq!(registry.burn_sink(), sink);
    assert_eq!(registry.transfer().balance(&credit(), &sink), 9);
}

#[test]
fn state_survives_store_roundtrip() {
    let mut registry = make_registry(&["a", "b"]);
    burn_token(&mut registry, "a", 4);
    burn_item(&mut registry, "b", reply(), 6);

    let store = NullBurnStore::new();
    registry.state().save_to_store(&store).unwrap();
    let events = registry.events_mut().drain();
    append_events_to_store(&store, &events).unwrap();

    let restored = LedgerState::load_from_store(&store).unwrap();
    assert_eq!(restored.last_seq, 2);
    assert_eq!(restored.item_total(&reply()), 6);
    assert_eq!(
        restored.credits.enumerate(&credit(), 0, 10).pairs(),
        vec![(account("b"), 6), (account("a"), 4)]
    );

    let replayed = load_events_from_store(&store, 2).unwrap();
    assert_eq!(replayed.len(), 1);
    assert_eq!(replayed[0].item, Some(reply()));
}

#[test]
fn empty_store_loads_empty_state() {
    let store = NullBurnStore::new();
    let state = LedgerState::load_from_store(&store).unwrap();
    assert_eq!(state.last_seq, 0);
    assert_eq!(state.credits.scope_count(), 0);
}

#[test]
fn load_rejects_unknown_schema_and_corruption() {
    let store = NullBurnStore::new();
    store.put_meta("schema_version", &99u32.to_le_bytes()).unwrap();
    assert!(matches!(
        LedgerState::load_from_store(&store),
        Err(RegistryError::UnsupportedSchema(99))
    ));

    let store = NullBurnStore::new();
    let mut state = LedgerState::new();
    state.item_totals.insert(reply(), 5);
    state.save_to_store(&store).unwrap();
    assert!(matches!(
        LedgerState::load_from_store(&store),
        Err(RegistryError::Corrupted(_))
    ));

    let store = NullBurnStore::new();
    store.put_snapshot(b"not bincode").unwrap();
    assert!(LedgerState::load_from_store(&store).is_err());
}

#[test]
fn lmdb_store_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = make_registry(&["a"]);
    burn_item(&mut registry, "a", reply(), 8);
    {
        let store = LmdbBurnStore::open(dir.path()).unwrap();
        let mut batch = WriteBatch::new();
        registry.state().stage(&mut batch).unwrap();
        stage_events(&mut batch, registry.events().events()).unwrap();
        store.write_batch(&batch).unwrap();
    }

    let reopened = LmdbBurnStore::open(dir.path()).unwrap();
    let state = LedgerState::load_from_store(&reopened).unwrap();
    assert_eq!(state.item_total(&reply()), 8);
    assert_eq!(state.items.scopes_of(&account("a")), &[reply()]);
    let events = load_events_from_store(&reopened, 1).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].seq, state.last_seq);
}

#[test]
fn replayed_event_leaves_snapshot_untouched() {
    let store = NullBurnStore::new();
    let mut registry = make_registry(&["a"]);
    burn_token(&mut registry, "a", 3);
    let first = registry.events_mut().drain();
    append_events_to_store(&store, &first).unwrap();
    registry.state().save_to_store(&store).unwrap();
    let before = store.get_snapshot().unwrap();
    assert!(before.is_some());

    burn_token(&mut registry, "a", 2);
    let mut batch = WriteBatch::new();
    registry.state().stage(&mut batch).unwrap();
    // Writing the first event again makes the whole batch fail.
    stage_events(&mut batch, &first).unwrap();
    assert!(matches!(
        store.write_batch(&batch),
        Err(StoreError::OutOfOrder { seq: 1, last: 1 })
    ));
    assert_eq!(store.get_snapshot().unwrap(), before);
}
