//! Backend configuration.

use serde::{Deserialize, Serialize};

/// Configuration for [`crate::MemoryPaymentStore`].
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryStoreConfig {
    /// Skip re-validating invariants on every decoded row. Off by default:
    /// a mis-recorded financial state is a correctness defect, so rows are
    /// re-checked on load unless the embedder treats the store as
    /// authoritative.
    pub trust_stored_rows: bool,
}
