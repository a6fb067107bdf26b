//! LMDB implementation of BurnStore.

use std::path::Path;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, RoTxn};

use pyre_store::{BurnStore, StoreError, WriteBatch};

use crate::LmdbError;

const SNAPSHOT_DB: &str = "snapshot";
const META_DB: &str = "meta";
const EVENTS_DB: &str = "events";
const MAX_DBS: u32 = 3;
const SNAPSHOT_KEY: &[u8] = b"ledger";

/// 1 GiB; LMDB only reserves address space up front.
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

/// Snapshot, meta and event log in one LMDB environment.
///
/// Events are keyed by their sequence number in big-endian, so key order is
/// sequence order.
pub struct LmdbBurnStore {
    env: Env,
    snapshot_db: Database<Bytes, Bytes>,
    meta_db: Database<Bytes, Bytes>,
    events_db: Database<Bytes, Bytes>,
}

impl LmdbBurnStore {
    /// Open or create a store in the directory `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_map_size(path, DEFAULT_MAP_SIZE)
    }

    pub fn open_with_map_size(path: impl AsRef<Path>, map_size: usize) -> Result<Self, StoreError> {
        let path = path.as_ref();
        std::fs::create_dir_all(path).map_err(LmdbError::from)?;

        // SAFETY: the environment is opened once per directory for the
        // lifetime of this store and the data file is not modified outside
        // LMDB.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)
        }
        .map_err(LmdbError::from)?;

        let mut wtxn = env.write_txn().map_err(LmdbError::from)?;
        let snapshot_db = env
            .create_database(&mut wtxn, Some(SNAPSHOT_DB))
            .map_err(LmdbError::from)?;
        let meta_db = env
            .create_database(&mut wtxn, Some(META_DB))
            .map_err(LmdbError::from)?;
        let events_db = env
            .create_database(&mut wtxn, Some(EVENTS_DB))
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;

        tracing::debug!(path = %path.display(), "opened lmdb burn store");
        Ok(Self {
            env,
            snapshot_db,
            meta_db,
            events_db,
        })
    }

    /// Highest stored event sequence number, 0 when the log is empty.
    pub fn last_event_seq(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.last_seq_in(&rtxn)?)
    }

    fn last_seq_in(&self, txn: &RoTxn) -> Result<u64, LmdbError> {
        match self.events_db.last(txn)? {
            Some((key, _)) => decode_seq(key),
            None => Ok(0),
        }
    }
}

fn decode_seq(key: &[u8]) -> Result<u64, LmdbError> {
    let arr: [u8; 8] = key
        .try_into()
        .map_err(|_| LmdbError::Serialization("invalid event key length".into()))?;
    Ok(u64::from_be_bytes(arr))
}

impl BurnStore for LmdbBurnStore {
    fn get_snapshot(&self) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .snapshot_db
            .get(&rtxn, SNAPSHOT_KEY)
            .map_err(LmdbError::from)?;
        Ok(val.map(<[u8]>::to_vec))
    }

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .meta_db
            .get(&rtxn, key.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(val.map(<[u8]>::to_vec))
    }

    fn events_from(&self, from_seq: u64) -> Result<Vec<(u64, Vec<u8>)>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let start = from_seq.to_be_bytes();
        let mut events = Vec::new();
        let iter = self
            .events_db
            .range(&rtxn, &(std::ops::Bound::Included(&start[..]), std::ops::Bound::Unbounded))
            .map_err(LmdbError::from)?;
        for result in iter {
            let (key, val) = result.map_err(LmdbError::from)?;
            events.push((decode_seq(key)?, val.to_vec()));
        }
        Ok(events)
    }

    fn write_batch(&self, batch: &WriteBatch) -> Result<(), StoreError> {
        // Returning before `commit` drops the transaction, which aborts it.
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;

        if let Some(snapshot) = batch.snapshot() {
            self.snapshot_db
                .put(&mut wtxn, SNAPSHOT_KEY, snapshot)
                .map_err(LmdbError::from)?;
        }
        for (key, value) in batch.meta() {
            self.meta_db
                .put(&mut wtxn, key.as_bytes(), value)
                .map_err(LmdbError::from)?;
        }
        let mut last = self.last_seq_in(&wtxn)?;
        for (seq, event) in batch.events() {
            if *seq <= last {
                return Err(StoreError::OutOfOrder { seq: *seq, last });
            }
            self.events_db
                .put(&mut wtxn, &seq.to_be_bytes(), event)
                .map_err(LmdbError::from)?;
            last = *seq;
        }

        wtxn.commit().map_err(LmdbError::from)?;
        tracing::trace!(
            snapshot = batch.snapshot().is_some(),
            meta = batch.meta().len(),
            events = batch.events().len(),
            "write batch committed"
        );
        Ok(())
    }
}
