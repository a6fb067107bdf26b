//! JSON renderings printed by the CLI, one object per line.
//!
//! Ids are hex strings and amounts are decimal strings, since `u128`
//! does not fit a JSON number.

use pyre_ranked::BurnerPage;
use pyre_registry::ItemHints;
use pyre_types::{BurnRecorded, Hint};
use serde_json::{json, Value};

pub fn hint(hint: &Hint) -> Value {
    json!({
        "prev": hint.prev.to_string(),
        "old_prev": hint.old_prev.to_string(),
    })
}

pub fn item_hints(hints: &ItemHints) -> Value {
    json!({
        "token": hint(&hints.token),
        "item": hint(&hints.item),
    })
}

pub fn event(event: &BurnRecorded) -> Value {
    json!({
        "seq": event.seq,
        "credit": event.credit.to_string(),
        "item": event.item.map(|item| item.to_string()),
        "account": event.account.to_string(),
        "amount": event.amount.to_string(),
    })
}

/// A ranked page; ranks are 1-based and continue from `offset`.
pub fn burners(page: &BurnerPage, offset: usize) -> Value {
    let rows: Vec<Value> = page
        .pairs()
        .into_iter()
        .enumerate()
        .map(|(i, (account, amount))| {
            json!({
                "rank": offset + i + 1,
                "account": account.to_string(),
                "amount": amount.to_string(),
            })
        })
        .collect();
    json!({ "offset": offset, "burners": rows })
}

pub fn print(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
