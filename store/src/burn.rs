use crate::{StoreError, WriteBatch};

/// Store trait for persisting burn registry state.
///
/// Uses opaque `Vec<u8>` so the store doesn't depend on the registry crate
/// (which would create a circular dependency). The registry serializes and
/// deserializes its own types.
pub trait BurnStore {
    /// The latest full snapshot of ledger state, if one was ever written.
    fn get_snapshot(&self) -> Result<Option<Vec<u8>>, StoreError>;

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// All events with a sequence number of at least `from_seq`, in order.
    fn events_from(&self, from_seq: u64) -> Result<Vec<(u64, Vec<u8>)>, StoreError>;

    /// Apply every write in `batch`, or none of them.
    ///
    /// Fails without writing anything if an event's sequence number does not
    /// exceed the one before it (stored or batched).
    fn write_batch(&self, batch: &WriteBatch) -> Result<(), StoreError>;

    fn put_snapshot(&self, snapshot: &[u8]) -> Result<(), StoreError> {
        let mut batch = WriteBatch::new();
        batch.put_snapshot(snapshot.to_vec());
        self.write_batch(&batch)
    }

    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut batch = WriteBatch::new();
        batch.put_meta(key, value.to_vec());
        self.write_batch(&batch)
    }

    fn append_event(&self, seq: u64, event: &[u8]) -> Result<(), StoreError> {
        let mut batch = WriteBatch::new();
        batch.append_event(seq, event.to_vec());
        self.write_batch(&batch)
    }
}
