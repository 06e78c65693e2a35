//! Read and write scopes over the in-memory tables.

use std::cmp::Reverse;
use std::sync::{Arc, MutexGuard};

use pesa_records::PaymentRecord;
use pesa_store::{PaymentReadScope, PaymentWriteScope, StoreError};
use pesa_types::PaymentId;

use crate::config::MemoryStoreConfig;
use crate::error::MemoryError;
use crate::store::{MemoryPaymentStore, Tables};

fn read_all(tables: &Tables, trust: bool) -> Result<Vec<PaymentRecord>, StoreError> {
    tables
        .rows
        .iter()
        .map(|(id, bytes)| tables.decode(id, bytes, trust))
        .collect()
}

fn finder_get(
    tables: &Tables,
    id: Option<&PaymentId>,
    trust: bool,
) -> Result<Option<PaymentRecord>, StoreError> {
    match id {
        Some(id) => tables.get(id, trust).map(Some),
        None => Ok(None),
    }
}

macro_rules! impl_read_scope {
    ($ty:ty) => {
        impl PaymentReadScope for $ty {
            fn get(&self, id: &PaymentId) -> Result<PaymentRecord, StoreError> {
                self.tables().get(id, self.trust())
            }

            fn exists(&self, id: &PaymentId) -> Result<bool, StoreError> {
                Ok(self.tables().rows.contains_key(id))
            }

            fn by_ledger_block_index(&self, index: u64) -> Result<Vec<PaymentRecord>, StoreError> {
                let tables = self.tables();
                match tables.by_block_index.get(&index) {
                    Some(ids) => ids
                        .iter()
                        .map(|id| tables.get(id, self.trust()))
                        .collect(),
                    None => Ok(Vec::new()),
                }
            }

            fn by_transaction(&self, bytes: &[u8]) -> Result<Option<PaymentRecord>, StoreError> {
                let tables = self.tables();
                finder_get(tables, tables.by_transaction.get(bytes), self.trust())
            }

            fn by_receipt(&self, bytes: &[u8]) -> Result<Option<PaymentRecord>, StoreError> {
                let tables = self.tables();
                finder_get(tables, tables.by_receipt.get(bytes), self.trust())
            }

            fn unread_count(&self) -> Result<u64, StoreError> {
                Ok(self.tables().unread.len() as u64)
            }

            fn iter_unread(&self) -> Result<Vec<PaymentRecord>, StoreError> {
                let tables = self.tables();
                tables
                    .unread
                    .iter()
                    .map(|id| tables.get(id, self.trust()))
                    .collect()
            }

            fn iter_recent(&self, limit: usize) -> Result<Vec<PaymentRecord>, StoreError> {
                let mut records = read_all(self.tables(), self.trust())?;
                // Sort key is computed, never stored
                records.sort_by_key(|r| Reverse((r.sort_timestamp(), r.id())));
                records.truncate(limit);
                Ok(records)
            }

            fn record_count(&self) -> Result<u64, StoreError> {
                Ok(self.tables().rows.len() as u64)
            }
        }
    };
}

/// A snapshot-isolated read scope. Holds the committed tables as they were
/// when the scope opened; concurrent commits do not appear inside it.
pub struct MemoryReadScope {
    snapshot: Arc<Tables>,
    config: MemoryStoreConfig,
}

impl MemoryReadScope {
    pub(crate) fn new(snapshot: Arc<Tables>, config: MemoryStoreConfig) -> Self {
        Self { snapshot, config }
    }

    fn tables(&self) -> &Tables {
        &self.snapshot
    }

    fn trust(&self) -> bool {
        self.config.trust_stored_rows
    }
}

impl_read_scope!(MemoryReadScope);

/// The exclusive write scope. Stages writes in a working copy of the
/// tables; commit swaps the copy in as the new committed snapshot, drop
/// without commit rolls everything back.
pub struct MemoryWriteScope<'a> {
    store: &'a MemoryPaymentStore,
    _writer: MutexGuard<'a, ()>,
    working: Tables,
}

impl<'a> MemoryWriteScope<'a> {
    pub(crate) fn new(
        store: &'a MemoryPaymentStore,
        writer: MutexGuard<'a, ()>,
        working: Tables,
    ) -> Self {
        Self {
            store,
            _writer: writer,
            working,
        }
    }

    fn tables(&self) -> &Tables {
        &self.working
    }

    fn trust(&self) -> bool {
        self.store.config.trust_stored_rows
    }

    fn encode(record: &PaymentRecord) -> Result<Vec<u8>, StoreError> {
        Ok(bincode::serialize(record).map_err(MemoryError::from)?)
    }
}

impl_read_scope!(MemoryWriteScope<'_>);

impl PaymentWriteScope for MemoryWriteScope<'_> {
    fn insert(&mut self, record: &PaymentRecord) -> Result<(), StoreError> {
        let id = record.id();
        if self.working.rows.contains_key(&id) {
            return Err(StoreError::Duplicate(format!("payment id {id}")));
        }
        self.working.check_unique(record)?;
        let bytes = Self::encode(record)?;
        self.working.rows.insert(id, bytes);
        self.working.index(record);
        tracing::debug!(record = %id, state = %record.state(), "payment record inserted");
        Ok(())
    }

    fn put(&mut self, record: &PaymentRecord) -> Result<(), StoreError> {
        let id = record.id();
        // Rows the store wrote itself are decoded as trusted here; the
        // old copy is only needed to tear down its index entries.
        let previous = match self.working.rows.get(&id) {
            Some(bytes) => self.working.decode(&id, bytes, true)?,
            None => return Err(StoreError::NotFound(id.to_string())),
        };
        self.working.unindex(&previous);
        if let Err(e) = self.working.check_unique(record) {
            // Restore the old index entries before surfacing the rejection
            self.working.index(&previous);
            return Err(e);
        }
        let bytes = Self::encode(record)?;
        self.working.rows.insert(id, bytes);
        self.working.index(record);
        Ok(())
    }

    fn delete(&mut self, id: &PaymentId) -> Result<(), StoreError> {
        let previous = match self.working.rows.remove(id) {
            Some(bytes) => self.working.decode(id, &bytes, true)?,
            None => return Err(StoreError::NotFound(id.to_string())),
        };
        self.working.unindex(&previous);
        tracing::debug!(record = %id, "payment record deleted");
        Ok(())
    }

    fn commit(self) -> Result<(), StoreError> {
        let mut committed = self
            .store
            .committed
            .write()
            .map_err(|e| MemoryError::Poisoned(e.to_string()))?;
        *committed = Arc::new(self.working);
        Ok(())
    }
}
