//! Local collaborators backing the CLI: a persisted balance book and the
//! item graph declared in the config file.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::Context;
use pyre_registry::{
    stage_events, BurnRegistry, EventLog, ItemParentLookup, ItemTokenRegistry, LedgerState,
    TransferCapability, TransferError,
};
use pyre_store::{BurnStore, WriteBatch};
use pyre_store_lmdb::LmdbBurnStore;
use pyre_types::{AccountId, CreditId, ItemId};

use crate::config::CliConfig;
use crate::ids::parse_id;

const BANK_META_KEY: &str = "bank";

pub type LocalRegistry = BurnRegistry<LocalBank, ConfigItemGraph, ConfigTokens, EventLog>;

/// Balances per (credit, account), stored in the data directory's meta.
#[derive(Debug, Default)]
pub struct LocalBank {
    balances: BTreeMap<(CreditId, AccountId), u128>,
}

impl LocalBank {
    /// Load the bank from `store`, seeding it from the config on first use.
    pub fn load(store: &dyn BurnStore, config: &CliConfig) -> anyhow::Result<Self> {
        if let Some(bytes) = store.get_meta(BANK_META_KEY)? {
            let balances = bincode::deserialize(&bytes).context("decoding bank balances")?;
            return Ok(Self { balances });
        }
        let mut bank = Self::default();
        for opening in &config.balances {
            let key = (parse_id(&opening.credit), parse_id(&opening.account));
            let slot = bank.balances.entry(key).or_insert(0);
            *slot = slot
                .checked_add(opening.amount)
                .context("opening balances overflow")?;
        }
        tracing::info!(accounts = bank.balances.len(), "seeded bank from config");
        Ok(bank)
    }

    /// Queue the balances into `batch`.
    pub fn stage(&self, batch: &mut WriteBatch) -> anyhow::Result<()> {
        let bytes = bincode::serialize(&self.balances).context("encoding bank balances")?;
        batch.put_meta(BANK_META_KEY, bytes);
        Ok(())
    }

    pub fn balance(&self, credit: &CreditId, account: &AccountId) -> u128 {
        self.balances.get(&(*credit, *account)).copied().unwrap_or(0)
    }
}

impl TransferCapability for LocalBank {
    fn pull(
        &mut self,
        credit: &CreditId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TransferError> {
        let available = self.balance(credit, from);
        let remaining = available
            .checked_sub(amount)
            .ok_or(TransferError::InsufficientBalance {
                needed: amount,
                available,
            })?;
        let credited = self
            .balance(credit, to)
            .checked_add(amount)
            .ok_or_else(|| TransferError::Rejected("recipient balance overflow".to_string()))?;
        self.balances.insert((*credit, *from), remaining);
        self.balances.insert((*credit, *to), credited);
        Ok(())
    }
}

/// Parent links from `[item_parents]`.
#[derive(Debug, Default)]
pub struct ConfigItemGraph {
    parents: HashMap<ItemId, ItemId>,
}

impl ConfigItemGraph {
    pub fn from_config(config: &CliConfig) -> Self {
        let parents = config
            .item_parents
            .iter()
            .map(|(item, parent)| (parse_id(item), parse_id(parent)))
            .collect();
        Self { parents }
    }
}

impl ItemParentLookup for ConfigItemGraph {
    fn parent_of(&self, item: &ItemId) -> ItemId {
        self.parents.get(item).copied().unwrap_or(*item)
    }
}

/// Credit assignments from `[item_tokens]`.
#[derive(Debug, Default)]
pub struct ConfigTokens {
    tokens: HashMap<ItemId, CreditId>,
}

impl ConfigTokens {
    pub fn from_config(config: &CliConfig) -> Self {
        let tokens = config
            .item_tokens
            .iter()
            .map(|(item, credit)| (parse_id(item), parse_id(credit)))
            .collect();
        Self { tokens }
    }
}

impl ItemTokenRegistry for ConfigTokens {
    fn token_of(&self, item: &ItemId) -> Option<CreditId> {
        self.tokens.get(item).copied()
    }
}

/// An open data directory: the store plus a registry restored from it.
pub struct Session {
    store: LmdbBurnStore,
    registry: LocalRegistry,
}

impl Session {
    pub fn open(data_dir: &Path, config: &CliConfig) -> anyhow::Result<Self> {
        let store = LmdbBurnStore::open(data_dir)
            .with_context(|| format!("opening data directory {}", data_dir.display()))?;
        let state = LedgerState::load_from_store(&store).context("loading ledger snapshot")?;
        let bank = LocalBank::load(&store, config)?;
        let sink = config
            .burn_sink
            .as_deref()
            .map(parse_id)
            .unwrap_or(AccountId::ZERO);

        let registry = BurnRegistry::with_state(
            state,
            bank,
            ConfigItemGraph::from_config(config),
            ConfigTokens::from_config(config),
            EventLog::new(),
        )
        .with_burn_sink(sink);

        tracing::debug!(
            data_dir = %data_dir.display(),
            last_seq = registry.state().last_seq,
            sink = %sink,
            "session opened"
        );
        Ok(Self { store, registry })
    }

    pub fn registry(&self) -> &LocalRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut LocalRegistry {
        &mut self.registry
    }

    pub fn store(&self) -> &LmdbBurnStore {
        &self.store
    }

    /// Everything a commit writes: pending events, the snapshot and the bank.
    pub fn pending_batch(&self) -> anyhow::Result<WriteBatch> {
        let mut batch = WriteBatch::new();
        stage_events(&mut batch, self.registry.events().events())?;
        self.registry.state().stage(&mut batch)?;
        self.registry.transfer().stage(&mut batch)?;
        Ok(batch)
    }

    /// Write pending events, the snapshot and the bank in one transaction.
    pub fn commit(&mut self) -> anyhow::Result<()> {
        let batch = self.pending_batch()?;
        self.store
            .write_batch(&batch)
            .context("committing burn to the data directory")?;
        let events = self.registry.events_mut().drain();
        tracing::debug!(events = events.len(), "session committed");
        Ok(())
    }
}
