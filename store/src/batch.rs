//! Write batching: groups every write of one commit so a backend can apply
//! them in a single transaction.

/// Pending writes for [`BurnStore::write_batch`](crate::BurnStore::write_batch).
///
/// A backend applies all of it or none of it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    snapshot: Option<Vec<u8>>,
    meta: Vec<(String, Vec<u8>)>,
    events: Vec<(u64, Vec<u8>)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot. A later call in the same batch wins.
    pub fn put_snapshot(&mut self, snapshot: Vec<u8>) {
        self.snapshot = Some(snapshot);
    }

    pub fn put_meta(&mut self, key: &str, value: Vec<u8>) {
        self.meta.push((key.to_string(), value));
    }

    /// Queue one encoded event. Sequence numbers must increase through the
    /// batch and past every stored event.
    pub fn append_event(&mut self, seq: u64, event: Vec<u8>) {
        self.events.push((seq, event));
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_none() && self.meta.is_empty() && self.events.is_empty()
    }

    pub fn snapshot(&self) -> Option<&[u8]> {
        self.snapshot.as_deref()
    }

    pub fn meta(&self) -> &[(String, Vec<u8>)] {
        &self.meta
    }

    pub fn events(&self) -> &[(u64, Vec<u8>)] {
        &self.events
    }
}
