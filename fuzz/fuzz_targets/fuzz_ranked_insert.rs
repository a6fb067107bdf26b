#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use pyre_ranked::RankedBurnLedger;
use pyre_types::{AccountId, Hint};

#[derive(Debug, Arbitrary)]
struct Op {
    account: u8,
    amount: u16,
    prev: u8,
    old_prev: u8,
}

// Small account space so hints often name real entries. Multiples of 9
// map to the sentinel.
fn account(n: u8) -> AccountId {
    if n % 9 == 0 {
        AccountId::ZERO
    } else {
        AccountId::new([n % 9; 32])
    }
}

// Drive the ledger with arbitrary hints. Rejected inserts must leave it
// untouched and accepted ones must keep it ordered.
fuzz_target!(|ops: Vec<Op>| {
    let mut ledger = RankedBurnLedger::new();
    for op in ops {
        let who = account(op.account);
        let hint = Hint::new(account(op.prev), account(op.old_prev));
        let before = ledger.amount_of(&who);
        let len = ledger.len();
        match ledger.insert(&who, u128::from(op.amount), &hint) {
            Ok(outcome) => {
                assert_eq!(outcome.new_total, before + u128::from(op.amount));
            }
            Err(_) => {
                assert_eq!(ledger.amount_of(&who), before);
                assert_eq!(ledger.len(), len);
            }
        }
        ledger.check_integrity().unwrap();
    }
});
