//! Burn notification stream.

use pyre_store::{BurnStore, WriteBatch};
use pyre_types::BurnRecorded;

use crate::error::RegistryError;

/// Receives one event per successful burn, after the burn has committed.
pub trait EventSink {
    fn emit(&mut self, event: &BurnRecorded);
}

/// An in-memory, append-only event log.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<BurnRecorded>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[BurnRecorded] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove and return everything logged so far.
    pub fn drain(&mut self) -> Vec<BurnRecorded> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &BurnRecorded) {
        self.events.push(event.clone());
    }
}

/// Queue events into `batch`, keyed by their sequence number.
pub fn stage_events(batch: &mut WriteBatch, events: &[BurnRecorded]) -> Result<(), RegistryError> {
    for event in events {
        let bytes =
            bincode::serialize(event).map_err(|e| RegistryError::Serialization(e.to_string()))?;
        batch.append_event(event.seq, bytes);
    }
    Ok(())
}

/// Persist events to a store's event log in one batch.
pub fn append_events_to_store(
    store: &dyn BurnStore,
    events: &[BurnRecorded],
) -> Result<(), RegistryError> {
    let mut batch = WriteBatch::new();
    stage_events(&mut batch, events)?;
    store.write_batch(&batch)?;
    Ok(())
}

/// Read back events with `seq >= from_seq`.
pub fn load_events_from_store(
    store: &dyn BurnStore,
    from_seq: u64,
) -> Result<Vec<BurnRecorded>, RegistryError> {
    store
        .events_from(from_seq)?
        .into_iter()
        .map(|(seq, bytes)| {
            let event: BurnRecorded = bincode::deserialize(&bytes)
                .map_err(|e| RegistryError::Serialization(e.to_string()))?;
            if event.seq != seq {
                return Err(RegistryError::Corrupted(format!(
                    "event stored under seq {} carries seq {}",
                    seq, event.seq
                )));
            }
            Ok(event)
        })
        .collect()
}
