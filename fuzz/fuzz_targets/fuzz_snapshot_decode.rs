#![no_main]

use libfuzzer_sys::fuzz_target;

use pyre_ranked::RankedBurnLedger;

// Decoding an arbitrary snapshot must never panic, and neither may the
// integrity check on whatever decodes.
fuzz_target!(|data: &[u8]| {
    if let Ok(ledger) = bincode::deserialize::<RankedBurnLedger>(data) {
        if ledger.check_integrity().is_ok() {
            let _ = ledger.iter().count();
        }
    }
});
