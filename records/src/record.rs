//! The payment record and its pure, invariant-preserving mutators.

use pesa_types::{
    CounterpartyId, MessageId, PaymentAmount, PaymentDirection, PaymentFailure, PaymentId,
    PaymentState, RequestId, Timestamp,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{RecordError, TransitionError};
use crate::mobilecoin::{IncomingMobileCoin, OutgoingMobileCoin};

/// Lifecycle status of an incoming payment. The failure reason lives inside
/// the status, so a reason cannot exist outside a failure state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomingStatus {
    Unverified,
    Verified,
    Complete,
    Failed(PaymentFailure),
}

impl IncomingStatus {
    /// Flatten to the shared state enum.
    pub fn state(&self) -> PaymentState {
        match self {
            Self::Unverified => PaymentState::IncomingUnverified,
            Self::Verified => PaymentState::IncomingVerified,
            Self::Complete => PaymentState::IncomingComplete,
            Self::Failed(_) => PaymentState::IncomingFailed,
        }
    }

    /// The status for a non-failure incoming state. `None` for failure
    /// states (which need a reason) and for outgoing states.
    pub(crate) fn for_state(state: PaymentState) -> Option<Self> {
        match state {
            PaymentState::IncomingUnverified => Some(Self::Unverified),
            PaymentState::IncomingVerified => Some(Self::Verified),
            PaymentState::IncomingComplete => Some(Self::Complete),
            _ => None,
        }
    }
}

/// Lifecycle status of an outgoing payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutgoingStatus {
    Unsubmitted,
    Submitted,
    Sending,
    Sent,
    Complete,
    Failed(PaymentFailure),
}

impl OutgoingStatus {
    /// Flatten to the shared state enum.
    pub fn state(&self) -> PaymentState {
        match self {
            Self::Unsubmitted => PaymentState::OutgoingUnsubmitted,
            Self::Submitted => PaymentState::OutgoingSubmitted,
            Self::Sending => PaymentState::OutgoingSending,
            Self::Sent => PaymentState::OutgoingSent,
            Self::Complete => PaymentState::OutgoingComplete,
            Self::Failed(_) => PaymentState::OutgoingFailed,
        }
    }

    pub(crate) fn for_state(state: PaymentState) -> Option<Self> {
        match state {
            PaymentState::OutgoingUnsubmitted => Some(Self::Unsubmitted),
            PaymentState::OutgoingSubmitted => Some(Self::Submitted),
            PaymentState::OutgoingSending => Some(Self::Sending),
            PaymentState::OutgoingSent => Some(Self::Sent),
            PaymentState::OutgoingComplete => Some(Self::Complete),
            _ => None,
        }
    }
}

/// Fields valid only for incoming payments.
///
/// The amount may be absent while the payment is unverified; it becomes
/// authoritative once the sync service discovers it and verifies the state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingPayment {
    pub status: IncomingStatus,
    pub amount: Option<PaymentAmount>,
    pub mobilecoin: Option<IncomingMobileCoin>,
}

/// Fields valid only for outgoing payments. The amount is always known:
/// this device (or a linked one) originated the payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingPayment {
    pub status: OutgoingStatus,
    pub amount: PaymentAmount,
    /// Set only for payments originated on this device; cleared once the
    /// originating notification has been sent. Never reset after clearing.
    pub request_id: Option<RequestId>,
    pub mobilecoin: Option<OutgoingMobileCoin>,
}

/// Direction-tagged payment payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentDetails {
    Incoming(IncomingPayment),
    Outgoing(OutgoingPayment),
}

/// A persisted payment record.
///
/// Constructed through [`crate::PaymentRecordBuilder`]; mutated through the
/// narrow operations below, each of which changes exactly the targeted
/// fields. `created_at` is immutable after construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub(crate) id: PaymentId,
    pub(crate) created_at: Timestamp,
    pub(crate) counterparty: Option<CounterpartyId>,
    pub(crate) memo: Option<String>,
    pub(crate) unread: bool,
    pub(crate) linked_message_id: Option<MessageId>,
    pub(crate) details: PaymentDetails,
}

impl PaymentRecord {
    pub fn id(&self) -> PaymentId {
        self.id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn memo(&self) -> Option<&str> {
        self.memo.as_deref()
    }

    pub fn is_unread(&self) -> bool {
        self.unread
    }

    pub fn linked_message_id(&self) -> Option<&MessageId> {
        self.linked_message_id.as_ref()
    }

    pub fn details(&self) -> &PaymentDetails {
        &self.details
    }

    pub fn direction(&self) -> PaymentDirection {
        match &self.details {
            PaymentDetails::Incoming(_) => PaymentDirection::Incoming,
            PaymentDetails::Outgoing(_) => PaymentDirection::Outgoing,
        }
    }

    pub fn is_incoming(&self) -> bool {
        self.direction() == PaymentDirection::Incoming
    }

    pub fn is_outgoing(&self) -> bool {
        self.direction() == PaymentDirection::Outgoing
    }

    pub fn state(&self) -> PaymentState {
        match &self.details {
            PaymentDetails::Incoming(p) => p.status.state(),
            PaymentDetails::Outgoing(p) => p.status.state(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.state().is_failure()
    }

    pub fn is_complete(&self) -> bool {
        self.state().is_complete()
    }

    /// The failure reason, present exactly when the state is a failure state.
    pub fn failure_reason(&self) -> Option<PaymentFailure> {
        match &self.details {
            PaymentDetails::Incoming(p) => match p.status {
                IncomingStatus::Failed(reason) => Some(reason),
                _ => None,
            },
            PaymentDetails::Outgoing(p) => match p.status {
                OutgoingStatus::Failed(reason) => Some(reason),
                _ => None,
            },
        }
    }

    /// The raw amount. Unreliable for unverified incoming payments; use
    /// [`Self::verified_amount`] when displaying to the user.
    pub fn amount(&self) -> Option<PaymentAmount> {
        match &self.details {
            PaymentDetails::Incoming(p) => p.amount,
            PaymentDetails::Outgoing(p) => Some(p.amount),
        }
    }

    /// The amount, but only once the state makes it trustworthy.
    pub fn verified_amount(&self) -> Option<PaymentAmount> {
        if self.state().is_verified() {
            self.amount()
        } else {
            None
        }
    }

    /// The raw counterparty handle. Unreliable for unverified incoming
    /// payments; use [`Self::verified_counterparty`] when displaying.
    pub fn counterparty(&self) -> Option<CounterpartyId> {
        self.counterparty
    }

    /// The counterparty, but only once the state makes it trustworthy.
    pub fn verified_counterparty(&self) -> Option<CounterpartyId> {
        if self.state().is_verified() {
            self.counterparty
        } else {
            None
        }
    }

    /// The notification request id, outgoing payments only.
    pub fn request_id(&self) -> Option<RequestId> {
        match &self.details {
            PaymentDetails::Incoming(_) => None,
            PaymentDetails::Outgoing(p) => p.request_id,
        }
    }

    /// Ledger confirmation height. Zero if unconfirmed or non-MobileCoin.
    /// External finders index on this value.
    pub fn ledger_block_index(&self) -> u64 {
        match &self.details {
            PaymentDetails::Incoming(p) => p.mobilecoin.as_ref().map_or(0, |mc| mc.block_index),
            PaymentDetails::Outgoing(p) => p.mobilecoin.as_ref().map_or(0, |mc| mc.block_index),
        }
    }

    /// Ledger confirmation time (epoch ms). Zero if unconfirmed.
    pub fn ledger_block_timestamp(&self) -> u64 {
        match &self.details {
            PaymentDetails::Incoming(p) => p.mobilecoin.as_ref().map_or(0, |mc| mc.block_timestamp),
            PaymentDetails::Outgoing(p) => p.mobilecoin.as_ref().map_or(0, |mc| mc.block_timestamp),
        }
    }

    /// The signed-transaction payload. Always `None` for incoming payments;
    /// the incoming payload has no such field.
    pub fn transaction_bytes(&self) -> Option<&[u8]> {
        match &self.details {
            PaymentDetails::Incoming(_) => None,
            PaymentDetails::Outgoing(p) => p
                .mobilecoin
                .as_ref()
                .and_then(|mc| mc.transaction.as_deref()),
        }
    }

    /// The receipt payload, either direction.
    pub fn receipt_bytes(&self) -> Option<&[u8]> {
        match &self.details {
            PaymentDetails::Incoming(p) => p.mobilecoin.as_ref().and_then(|mc| mc.receipt.as_deref()),
            PaymentDetails::Outgoing(p) => p.mobilecoin.as_ref().and_then(|mc| mc.receipt.as_deref()),
        }
    }

    /// The timestamp payments sort by: ledger confirmation time when the
    /// ledger has assigned one, creation time otherwise. Computed, never
    /// stored.
    pub fn sort_timestamp(&self) -> Timestamp {
        let block_ts = self.ledger_block_timestamp();
        if block_ts != 0 {
            Timestamp::from_millis(block_ts)
        } else {
            self.created_at
        }
    }

    // ── Mutators ────────────────────────────────────────────────────────

    /// Move to a new non-failure state. Rejects failure targets (those
    /// carry a reason and are entered through [`Self::set_failure`]),
    /// direction changes, transitions outside the legality table, and
    /// verification of an incoming payment whose amount is still unknown.
    pub fn set_state(&mut self, new_state: PaymentState) -> Result<(), TransitionError> {
        let current = self.state();
        if new_state.is_failure() {
            return Err(TransitionError::FailureReasonRequired { target: new_state });
        }
        if new_state.direction() != current.direction() {
            return Err(TransitionError::DirectionChange {
                from: current.direction(),
                to: new_state.direction(),
            });
        }
        if !current.can_transition_to(new_state) {
            return Err(TransitionError::Illegal {
                from: current,
                to: new_state,
            });
        }
        // Verifying an incoming payment vouches for its amount; without
        // one recorded, the resulting row would be invalid.
        if let PaymentDetails::Incoming(p) = &self.details {
            if new_state.is_verified() && p.amount.is_none() {
                return Err(TransitionError::AmountRequired { target: new_state });
            }
        }
        match &mut self.details {
            PaymentDetails::Incoming(p) => {
                p.status = IncomingStatus::for_state(new_state).ok_or(TransitionError::Illegal {
                    from: current,
                    to: new_state,
                })?;
            }
            PaymentDetails::Outgoing(p) => {
                p.status = OutgoingStatus::for_state(new_state).ok_or(TransitionError::Illegal {
                    from: current,
                    to: new_state,
                })?;
            }
        }
        Ok(())
    }

    /// Move to a failure state, recording why. The target must be the
    /// failure state of this record's direction and reachable from the
    /// current state.
    pub fn set_failure(
        &mut self,
        new_state: PaymentState,
        reason: PaymentFailure,
    ) -> Result<(), TransitionError> {
        let current = self.state();
        if !new_state.is_failure() {
            return Err(TransitionError::NotAFailureState { target: new_state });
        }
        if new_state.direction() != current.direction() {
            return Err(TransitionError::DirectionChange {
                from: current.direction(),
                to: new_state.direction(),
            });
        }
        if !current.can_transition_to(new_state) {
            return Err(TransitionError::Illegal {
                from: current,
                to: new_state,
            });
        }
        match &mut self.details {
            PaymentDetails::Incoming(p) => p.status = IncomingStatus::Failed(reason),
            PaymentDetails::Outgoing(p) => p.status = OutgoingStatus::Failed(reason),
        }
        Ok(())
    }

    /// Record the amount, used when a previously unknown incoming amount
    /// is discovered during verification.
    pub fn set_amount(&mut self, amount: PaymentAmount) {
        match &mut self.details {
            PaymentDetails::Incoming(p) => p.amount = Some(amount),
            PaymentDetails::Outgoing(p) => p.amount = amount,
        }
    }

    pub fn set_unread(&mut self, unread: bool) {
        self.unread = unread;
    }

    /// Link (or re-link) the chat message displayed for this payment.
    /// There is no clear operation: a record without a link means no
    /// message exists and one may be created.
    pub fn set_linked_message_id(&mut self, message_id: MessageId) {
        self.linked_message_id = Some(message_id);
    }

    /// Clear the notification request id after the originating notification
    /// has been sent. One-way and idempotent; a no-op for incoming records.
    pub fn clear_request_id(&mut self) {
        if let PaymentDetails::Outgoing(p) = &mut self.details {
            p.request_id = None;
        }
    }

    fn ledger_fields_mut(&mut self) -> Result<(&mut u64, &mut u64), RecordError> {
        match &mut self.details {
            PaymentDetails::Incoming(IncomingPayment {
                mobilecoin: Some(mc),
                ..
            }) => Ok((&mut mc.block_index, &mut mc.block_timestamp)),
            PaymentDetails::Outgoing(OutgoingPayment {
                mobilecoin: Some(mc),
                ..
            }) => Ok((&mut mc.block_index, &mut mc.block_timestamp)),
            _ => Err(RecordError::MissingLedgerPayload),
        }
    }

    /// Record the ledger block index. Callers pairing this with
    /// [`Self::set_ledger_block_timestamp`] should prefer the atomic
    /// [`Self::set_ledger_confirmation`].
    pub fn set_ledger_block_index(&mut self, index: u64) -> Result<(), RecordError> {
        let (block_index, _) = self.ledger_fields_mut()?;
        *block_index = index;
        Ok(())
    }

    /// Record the ledger block timestamp (epoch ms).
    pub fn set_ledger_block_timestamp(&mut self, timestamp: u64) -> Result<(), RecordError> {
        let (_, block_timestamp) = self.ledger_fields_mut()?;
        *block_timestamp = timestamp;
        Ok(())
    }

    /// Record a ledger confirmation: block index and timestamp together.
    /// Both must be nonzero; zero is the unset sentinel.
    pub fn set_ledger_confirmation(&mut self, index: u64, timestamp: u64) -> Result<(), RecordError> {
        if index == 0 || timestamp == 0 {
            return Err(RecordError::IncompleteConfirmation);
        }
        let (block_index, block_timestamp) = self.ledger_fields_mut()?;
        *block_index = index;
        *block_timestamp = timestamp;
        Ok(())
    }

    // ── Validation ──────────────────────────────────────────────────────

    /// Re-check the invariants that serde decoding cannot enforce. Used on
    /// rehydration; construction through the builder cannot violate them.
    ///
    /// A half-set confirmation pair (index without timestamp or the
    /// reverse) is logged but not rejected: the paired single setters can
    /// legitimately persist one side before the other arrives.
    pub fn validate(&self) -> Result<(), RecordError> {
        match &self.details {
            PaymentDetails::Incoming(p) => {
                if p.status.state().is_verified() && p.amount.is_none() {
                    return Err(RecordError::MissingAmount {
                        state: p.status.state(),
                    });
                }
                if let Some(amount) = p.amount {
                    if !amount.is_positive() {
                        return Err(RecordError::NonPositiveAmount { amount });
                    }
                }
            }
            PaymentDetails::Outgoing(p) => {
                if !p.amount.is_positive() {
                    return Err(RecordError::NonPositiveAmount { amount: p.amount });
                }
            }
        }

        let index = self.ledger_block_index();
        let timestamp = self.ledger_block_timestamp();
        if (index == 0) != (timestamp == 0) {
            tracing::warn!(
                record = %self.id,
                block_index = index,
                block_timestamp = timestamp,
                "half-set ledger confirmation pair"
            );
        }

        Ok(())
    }
}

impl fmt::Display for PaymentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.amount() {
            Some(amount) => write!(f, "{} [{}] {}", self.id, self.state(), amount),
            None => write!(f, "{} [{}] amount unknown", self.id, self.state()),
        }
    }
}
