//! Construction and rehydration of payment records.
//!
//! The builder is the single entry point for both paths: a fresh record
//! gets a generated id, a rehydrated one supplies its stored flat fields.
//! Direction is never accepted directly — it is derived from the state —
//! and `build` rejects any field combination the record's shape cannot
//! hold, so an invariant-violating record is never produced.

use pesa_types::{
    CounterpartyId, MessageId, PaymentAmount, PaymentDirection, PaymentFailure, PaymentId,
    PaymentState, RequestId, Timestamp,
};

use crate::error::RecordError;
use crate::mobilecoin::{IncomingMobileCoin, OutgoingMobileCoin};
use crate::record::{
    IncomingPayment, IncomingStatus, OutgoingPayment, OutgoingStatus, PaymentDetails,
    PaymentRecord,
};

/// Builder for [`PaymentRecord`].
#[derive(Clone, Debug)]
pub struct PaymentRecordBuilder {
    id: Option<PaymentId>,
    state: PaymentState,
    failure: Option<PaymentFailure>,
    amount: Option<PaymentAmount>,
    created_at: Timestamp,
    counterparty: Option<CounterpartyId>,
    request_id: Option<RequestId>,
    memo: Option<String>,
    unread: bool,
    linked_message_id: Option<MessageId>,
    mobilecoin: bool,
    recipient_address: Option<Vec<u8>>,
    transaction: Option<Vec<u8>>,
    receipt: Option<Vec<u8>>,
    incoming_tx_public_keys: Vec<Vec<u8>>,
    spent_key_images: Vec<Vec<u8>>,
    output_public_keys: Vec<Vec<u8>>,
    fee: Option<PaymentAmount>,
    ledger_block_index: u64,
    ledger_block_timestamp: u64,
}

impl PaymentRecordBuilder {
    /// Start a record in `state`, created at `created_at`. The direction is
    /// derived from the state.
    pub fn new(state: PaymentState, created_at: Timestamp) -> Self {
        Self {
            id: None,
            state,
            failure: None,
            amount: None,
            created_at,
            counterparty: None,
            request_id: None,
            memo: None,
            unread: false,
            linked_message_id: None,
            mobilecoin: false,
            recipient_address: None,
            transaction: None,
            receipt: None,
            incoming_tx_public_keys: Vec::new(),
            spent_key_images: Vec::new(),
            output_public_keys: Vec::new(),
            fee: None,
            ledger_block_index: 0,
            ledger_block_timestamp: 0,
        }
    }

    /// Supply a stored id (rehydration). Fresh records generate one.
    pub fn id(mut self, id: PaymentId) -> Self {
        self.id = Some(id);
        self
    }

    /// The failure reason, required iff `state` is a failure state.
    pub fn failure(mut self, reason: PaymentFailure) -> Self {
        self.failure = Some(reason);
        self
    }

    pub fn amount(mut self, amount: PaymentAmount) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn counterparty(mut self, counterparty: CounterpartyId) -> Self {
        self.counterparty = Some(counterparty);
        self
    }

    pub fn request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    pub fn unread(mut self, unread: bool) -> Self {
        self.unread = unread;
        self
    }

    pub fn linked_message_id(mut self, message_id: MessageId) -> Self {
        self.linked_message_id = Some(message_id);
        self
    }

    /// Attach a MobileCoin payload even when no ledger field is set yet.
    pub fn mobilecoin(mut self) -> Self {
        self.mobilecoin = true;
        self
    }

    pub fn recipient_address(mut self, address: Vec<u8>) -> Self {
        self.recipient_address = Some(address);
        self
    }

    /// Opaque signed-transaction payload. Outgoing only.
    pub fn transaction(mut self, bytes: Vec<u8>) -> Self {
        self.transaction = Some(bytes);
        self
    }

    pub fn receipt(mut self, bytes: Vec<u8>) -> Self {
        self.receipt = Some(bytes);
        self
    }

    /// Public keys of received TXOs. Incoming only.
    pub fn incoming_tx_public_keys(mut self, keys: Vec<Vec<u8>>) -> Self {
        self.incoming_tx_public_keys = keys;
        self
    }

    /// Key images of consumed TXOs. Outgoing only.
    pub fn spent_key_images(mut self, images: Vec<Vec<u8>>) -> Self {
        self.spent_key_images = images;
        self
    }

    /// Public keys of created TXOs. Outgoing only.
    pub fn output_public_keys(mut self, keys: Vec<Vec<u8>>) -> Self {
        self.output_public_keys = keys;
        self
    }

    /// Ledger fee. Outgoing only.
    pub fn fee(mut self, fee: PaymentAmount) -> Self {
        self.fee = Some(fee);
        self
    }

    pub fn ledger_block_index(mut self, index: u64) -> Self {
        self.ledger_block_index = index;
        self
    }

    pub fn ledger_block_timestamp(mut self, timestamp: u64) -> Self {
        self.ledger_block_timestamp = timestamp;
        self
    }

    fn wants_mobilecoin(&self) -> bool {
        self.mobilecoin
            || self.amount.is_some()
            || self.fee.is_some()
            || self.recipient_address.is_some()
            || self.transaction.is_some()
            || self.receipt.is_some()
            || !self.incoming_tx_public_keys.is_empty()
            || !self.spent_key_images.is_empty()
            || !self.output_public_keys.is_empty()
            || self.ledger_block_index != 0
            || self.ledger_block_timestamp != 0
    }

    /// Assemble the record, rejecting any field set its shape cannot hold.
    pub fn build(self) -> Result<PaymentRecord, RecordError> {
        match (self.state.is_failure(), self.failure) {
            (true, None) => {
                return Err(RecordError::MissingFailureReason { state: self.state });
            }
            (false, Some(reason)) => {
                return Err(RecordError::UnexpectedFailureReason {
                    state: self.state,
                    reason,
                });
            }
            _ => {}
        }

        if let Some(amount) = self.amount {
            if !amount.is_positive() {
                return Err(RecordError::NonPositiveAmount { amount });
            }
        }

        let details = match self.state.direction() {
            PaymentDirection::Incoming => self.build_incoming()?,
            PaymentDirection::Outgoing => self.build_outgoing()?,
        };

        let record = PaymentRecord {
            id: self.id.unwrap_or_else(PaymentId::generate),
            created_at: self.created_at,
            counterparty: self.counterparty,
            memo: self.memo,
            unread: self.unread,
            linked_message_id: self.linked_message_id,
            details,
        };
        record.validate()?;
        Ok(record)
    }

    fn build_incoming(&self) -> Result<PaymentDetails, RecordError> {
        let reject = |field: &'static str| {
            Err(RecordError::WrongDirectionField {
                field,
                direction: PaymentDirection::Incoming,
            })
        };
        if self.request_id.is_some() {
            return reject("request id");
        }
        if self.transaction.is_some() {
            return reject("transaction bytes");
        }
        if !self.spent_key_images.is_empty() {
            return reject("spent key images");
        }
        if !self.output_public_keys.is_empty() {
            return reject("output public keys");
        }
        if self.fee.is_some() {
            return reject("fee");
        }

        if self.state.is_verified() && self.amount.is_none() {
            return Err(RecordError::MissingAmount { state: self.state });
        }

        let status = match self.failure {
            Some(reason) => IncomingStatus::Failed(reason),
            None => IncomingStatus::for_state(self.state).ok_or(RecordError::MissingFailureReason {
                state: self.state,
            })?,
        };

        let mobilecoin = self.wants_mobilecoin().then(|| IncomingMobileCoin {
            receipt: self.receipt.clone(),
            incoming_tx_public_keys: self.incoming_tx_public_keys.clone(),
            block_index: self.ledger_block_index,
            block_timestamp: self.ledger_block_timestamp,
        });

        Ok(PaymentDetails::Incoming(IncomingPayment {
            status,
            amount: self.amount,
            mobilecoin,
        }))
    }

    fn build_outgoing(&self) -> Result<PaymentDetails, RecordError> {
        if !self.incoming_tx_public_keys.is_empty() {
            return Err(RecordError::WrongDirectionField {
                field: "incoming tx public keys",
                direction: PaymentDirection::Outgoing,
            });
        }

        let amount = self
            .amount
            .ok_or(RecordError::MissingAmount { state: self.state })?;

        let status = match self.failure {
            Some(reason) => OutgoingStatus::Failed(reason),
            None => OutgoingStatus::for_state(self.state).ok_or(RecordError::MissingFailureReason {
                state: self.state,
            })?,
        };

        let mobilecoin = self.wants_mobilecoin().then(|| OutgoingMobileCoin {
            recipient_address: self.recipient_address.clone(),
            transaction: self.transaction.clone(),
            receipt: self.receipt.clone(),
            spent_key_images: self.spent_key_images.clone(),
            output_public_keys: self.output_public_keys.clone(),
            fee: self.fee,
            block_index: self.ledger_block_index,
            block_timestamp: self.ledger_block_timestamp,
        });

        Ok(PaymentDetails::Outgoing(OutgoingPayment {
            status,
            amount,
            request_id: self.request_id,
            mobilecoin,
        }))
    }
}
