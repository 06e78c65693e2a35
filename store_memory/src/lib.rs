//! In-memory reference backend for the payment record store.
//!
//! Committed state lives behind an `RwLock<Arc<Tables>>`. Read scopes
//! clone the `Arc` and see a frozen snapshot of committed state. Write
//! scopes hold the single writer token and stage changes in a working copy
//! of the tables; [`pesa_store::PaymentWriteScope::commit`] swaps the
//! snapshot in, and dropping the scope without committing discards every
//! staged write.
//!
//! Rows are bincode-encoded. Secondary indexes (ledger block index,
//! transaction bytes, receipt bytes, unread) are rebuilt from the record's
//! computed accessors on every write, which is what keeps external finder
//! lookups current.

pub mod config;
pub mod error;
pub mod scope;
pub mod store;

pub use config::MemoryStoreConfig;
pub use error::MemoryError;
pub use scope::{MemoryReadScope, MemoryWriteScope};
pub use store::MemoryPaymentStore;
