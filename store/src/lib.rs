//! Abstract storage scopes for payment records.
//!
//! Every storage backend (the in-memory reference store, a future
//! database-backed one) implements these traits. The rest of the codebase
//! depends only on the traits.
//!
//! The model is single-writer-per-store: a backend hands out at most one
//! live [`PaymentWriteScope`] at a time, and every mutation runs inside
//! one. Read scopes may be concurrent and see a snapshot of committed
//! state. A write scope is RAII: [`PaymentWriteScope::commit`] consumes
//! it, and dropping it without committing rolls back every staged write.

pub mod error;
pub mod ops;

pub use error::StoreError;

use pesa_records::PaymentRecord;
use pesa_types::PaymentId;

/// Read access to payment records, at some consistent snapshot.
///
/// The finder queries exist for the external collaborators the record
/// keeps its ledger fields current for: ledger sync deduplicates receipts
/// it has already recorded, and the app badge counts unread payments.
pub trait PaymentReadScope {
    /// Fetch a record by id.
    fn get(&self, id: &PaymentId) -> Result<PaymentRecord, StoreError>;

    /// Whether a record exists.
    fn exists(&self, id: &PaymentId) -> Result<bool, StoreError>;

    /// All records confirmed at a given ledger block index.
    fn by_ledger_block_index(&self, index: u64) -> Result<Vec<PaymentRecord>, StoreError>;

    /// The record carrying these transaction bytes, if any. At most one
    /// exists; the insert path enforces uniqueness.
    fn by_transaction(&self, bytes: &[u8]) -> Result<Option<PaymentRecord>, StoreError>;

    /// The record carrying these receipt bytes, if any. At most one.
    fn by_receipt(&self, bytes: &[u8]) -> Result<Option<PaymentRecord>, StoreError>;

    /// Number of unread records.
    fn unread_count(&self) -> Result<u64, StoreError>;

    /// All unread records.
    fn iter_unread(&self) -> Result<Vec<PaymentRecord>, StoreError>;

    /// Up to `limit` records, most recent first by sort timestamp.
    fn iter_recent(&self, limit: usize) -> Result<Vec<PaymentRecord>, StoreError>;

    /// Total number of records.
    fn record_count(&self) -> Result<u64, StoreError>;
}

/// Exclusive write access to payment records.
pub trait PaymentWriteScope: PaymentReadScope {
    /// Insert a new record. Fails with [`StoreError::Duplicate`] if the id,
    /// transaction bytes, or receipt bytes are already present.
    fn insert(&mut self, record: &PaymentRecord) -> Result<(), StoreError>;

    /// Overwrite an existing record. A raw write primitive: it does not
    /// re-validate the record; the [`ops`] operation set does, before
    /// calling it.
    fn put(&mut self, record: &PaymentRecord) -> Result<(), StoreError>;

    /// Delete a record. The store's generic delete path; the record needs
    /// no teardown of its own.
    fn delete(&mut self, id: &PaymentId) -> Result<(), StoreError>;

    /// Commit every staged write. Dropping the scope instead rolls back.
    fn commit(self) -> Result<(), StoreError>
    where
        Self: Sized;
}
