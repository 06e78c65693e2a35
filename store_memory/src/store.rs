//! The store itself: committed tables plus scope handout.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, RwLock};

use pesa_records::PaymentRecord;
use pesa_store::StoreError;
use pesa_types::PaymentId;

use crate::config::MemoryStoreConfig;
use crate::error::MemoryError;
use crate::scope::{MemoryReadScope, MemoryWriteScope};

/// Row table plus the secondary indexes the finder queries run on.
#[derive(Clone, Debug, Default)]
pub(crate) struct Tables {
    /// bincode-encoded records keyed by id.
    pub(crate) rows: BTreeMap<PaymentId, Vec<u8>>,
    pub(crate) by_block_index: BTreeMap<u64, BTreeSet<PaymentId>>,
    pub(crate) by_transaction: HashMap<Vec<u8>, PaymentId>,
    pub(crate) by_receipt: HashMap<Vec<u8>, PaymentId>,
    pub(crate) unread: BTreeSet<PaymentId>,
}

impl Tables {
    pub(crate) fn decode(
        &self,
        id: &PaymentId,
        bytes: &[u8],
        trust: bool,
    ) -> Result<PaymentRecord, StoreError> {
        let record: PaymentRecord =
            bincode::deserialize(bytes).map_err(MemoryError::from)?;
        if !trust {
            record.validate()?;
        }
        debug_assert_eq!(record.id(), *id);
        Ok(record)
    }

    pub(crate) fn get(&self, id: &PaymentId, trust: bool) -> Result<PaymentRecord, StoreError> {
        let bytes = self
            .rows
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.decode(id, bytes, trust)
    }

    /// Add `record` to every secondary index. Unconfirmed records (block
    /// index zero) are not indexed by block.
    pub(crate) fn index(&mut self, record: &PaymentRecord) {
        let id = record.id();
        let block_index = record.ledger_block_index();
        if block_index != 0 {
            self.by_block_index.entry(block_index).or_default().insert(id);
        }
        if let Some(tx) = record.transaction_bytes() {
            self.by_transaction.insert(tx.to_vec(), id);
        }
        if let Some(receipt) = record.receipt_bytes() {
            self.by_receipt.insert(receipt.to_vec(), id);
        }
        if record.is_unread() {
            self.unread.insert(id);
        }
    }

    /// Remove `record` from every secondary index.
    pub(crate) fn unindex(&mut self, record: &PaymentRecord) {
        let id = record.id();
        let block_index = record.ledger_block_index();
        if block_index != 0 {
            if let Some(ids) = self.by_block_index.get_mut(&block_index) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.by_block_index.remove(&block_index);
                }
            }
        }
        if let Some(tx) = record.transaction_bytes() {
            self.by_transaction.remove(tx);
        }
        if let Some(receipt) = record.receipt_bytes() {
            self.by_receipt.remove(receipt);
        }
        self.unread.remove(&id);
    }

    /// Reject transaction/receipt bytes already claimed by another record.
    /// This is the deduplication contract the finder queries exist for.
    pub(crate) fn check_unique(&self, record: &PaymentRecord) -> Result<(), StoreError> {
        let id = record.id();
        if let Some(tx) = record.transaction_bytes() {
            if let Some(owner) = self.by_transaction.get(tx) {
                if *owner != id {
                    return Err(StoreError::Duplicate(format!(
                        "transaction bytes already recorded by {owner}"
                    )));
                }
            }
        }
        if let Some(receipt) = record.receipt_bytes() {
            if let Some(owner) = self.by_receipt.get(receipt) {
                if *owner != id {
                    return Err(StoreError::Duplicate(format!(
                        "receipt bytes already recorded by {owner}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// In-memory payment record store.
///
/// Hands out snapshot-isolated read scopes and a single exclusive write
/// scope. The store performs no locking beyond scope handout; mutation
/// serialization comes from the writer token.
pub struct MemoryPaymentStore {
    pub(crate) committed: RwLock<Arc<Tables>>,
    pub(crate) writer: Mutex<()>,
    pub(crate) config: MemoryStoreConfig,
}

impl MemoryPaymentStore {
    pub fn new() -> Self {
        Self::with_config(MemoryStoreConfig::default())
    }

    pub fn with_config(config: MemoryStoreConfig) -> Self {
        Self {
            committed: RwLock::new(Arc::new(Tables::default())),
            writer: Mutex::new(()),
            config,
        }
    }

    /// Open a read scope over the current committed snapshot. Later commits
    /// do not become visible inside it.
    pub fn read_scope(&self) -> Result<MemoryReadScope, StoreError> {
        let snapshot = self
            .committed
            .read()
            .map_err(|e| MemoryError::Poisoned(e.to_string()))?
            .clone();
        Ok(MemoryReadScope::new(snapshot, self.config))
    }

    /// Open the write scope, blocking until the previous writer releases
    /// it. Changes stage in a working copy until commit.
    pub fn write_scope(&self) -> Result<MemoryWriteScope<'_>, StoreError> {
        let token = self
            .writer
            .lock()
            .map_err(|e| MemoryError::Poisoned(e.to_string()))?;
        let working = (**self
            .committed
            .read()
            .map_err(|e| MemoryError::Poisoned(e.to_string()))?)
        .clone();
        Ok(MemoryWriteScope::new(self, token, working))
    }
}

impl Default for MemoryPaymentStore {
    fn default() -> Self {
        Self::new()
    }
}
