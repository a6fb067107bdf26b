//! Thread-safe in-memory storage for testing.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use pyre_store::{BurnStore, StoreError, WriteBatch};

#[derive(Default)]
struct Contents {
    snapshot: Option<Vec<u8>>,
    meta: HashMap<String, Vec<u8>>,
    events: BTreeMap<u64, Vec<u8>>,
}

/// An in-memory [`BurnStore`]. A batch is validated in full before any of
/// it is applied.
pub struct NullBurnStore {
    contents: Mutex<Contents>,
}

impl NullBurnStore {
    pub fn new() -> Self {
        Self {
            contents: Mutex::new(Contents::default()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Contents>, StoreError> {
        self.contents
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

impl Default for NullBurnStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BurnStore for NullBurnStore {
    fn get_snapshot(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.lock()?.snapshot.clone())
    }

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.lock()?.meta.get(key).cloned())
    }

    fn events_from(&self, from_seq: u64) -> Result<Vec<(u64, Vec<u8>)>, StoreError> {
        Ok(self
            .lock()?
            .events
            .range(from_seq..)
            .map(|(seq, bytes)| (*seq, bytes.clone()))
            .collect())
    }

    fn write_batch(&self, batch: &WriteBatch) -> Result<(), StoreError> {
        let mut contents = self.lock()?;

        let mut last = contents.events.keys().next_back().copied().unwrap_or(0);
        for (seq, _) in batch.events() {
            if *seq <= last {
                return Err(StoreError::OutOfOrder { seq: *seq, last });
            }
            last = *seq;
        }

        if let Some(snapshot) = batch.snapshot() {
            contents.snapshot = Some(snapshot.to_vec());
        }
        for (key, value) in batch.meta() {
            contents.meta.insert(key.clone(), value.clone());
        }
        for (seq, event) in batch.events() {
            contents.events.insert(*seq, event.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_batch_writes_nothing() {
        let store = NullBurnStore::new();
        store.append_event(1, b"first").unwrap();

        let mut batch = WriteBatch::new();
        batch.put_snapshot(b"state".to_vec());
        batch.put_meta("bank", vec![1]);
        batch.append_event(1, b"dup".to_vec());
        assert!(store.write_batch(&batch).is_err());

        assert!(store.get_snapshot().unwrap().is_none());
        assert!(store.get_meta("bank").unwrap().is_none());
        assert_eq!(store.events_from(0).unwrap().len(), 1);
    }
}
