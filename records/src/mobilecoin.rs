//! MobileCoin ledger payloads, split by direction.
//!
//! The split is what makes invariant enforcement structural: the incoming
//! payload has no transaction field, so an incoming payment can never carry
//! transaction bytes; spent key images and fees exist only on the outgoing
//! side. Key sequences use empty-means-absent. Block index and timestamp
//! keep the ledger's `0 = unset` sentinel.

use pesa_types::PaymentAmount;
use serde::{Deserialize, Serialize};

/// Ledger payload for an incoming MobileCoin payment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMobileCoin {
    /// Opaque receipt used to verify the payment independent of the sender.
    pub receipt: Option<Vec<u8>>,
    /// Public keys of the TXOs received in this payment.
    #[serde(default)]
    pub incoming_tx_public_keys: Vec<Vec<u8>>,
    /// Ledger-assigned confirmation height. Zero if not yet confirmed.
    #[serde(default)]
    pub block_index: u64,
    /// Ledger-assigned confirmation time (epoch ms). Zero if not yet confirmed.
    #[serde(default)]
    pub block_timestamp: u64,
}

impl IncomingMobileCoin {
    pub fn is_confirmed(&self) -> bool {
        self.block_index != 0
    }
}

/// Ledger payload for an outgoing MobileCoin payment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMobileCoin {
    /// Recipient public address. Transfer in/out flows only.
    pub recipient_address: Option<Vec<u8>>,
    /// Opaque signed-transaction payload handed to the ledger client.
    pub transaction: Option<Vec<u8>>,
    /// Opaque receipt for the recipient to verify the payment.
    pub receipt: Option<Vec<u8>>,
    /// Key images of the TXOs consumed by this transaction.
    #[serde(default)]
    pub spent_key_images: Vec<Vec<u8>>,
    /// Public keys of the TXOs created by this transaction.
    #[serde(default)]
    pub output_public_keys: Vec<Vec<u8>>,
    /// Ledger fee paid by this transaction.
    pub fee: Option<PaymentAmount>,
    /// Ledger-assigned confirmation height. Zero if not yet confirmed.
    #[serde(default)]
    pub block_index: u64,
    /// Ledger-assigned confirmation time (epoch ms). Zero if not yet confirmed.
    #[serde(default)]
    pub block_timestamp: u64,
}

impl OutgoingMobileCoin {
    pub fn is_confirmed(&self) -> bool {
        self.block_index != 0
    }
}
