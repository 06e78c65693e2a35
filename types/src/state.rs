//! The payment state machine: direction, lifecycle states, failure reasons.
//!
//! Every state belongs to exactly one direction, so direction is a pure
//! function of state and is never stored independently. Transition legality
//! lives in [`PaymentState::can_transition_to`]; the record layer rejects
//! anything outside that table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a payment moves funds toward or away from this account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentDirection {
    Incoming,
    Outgoing,
}

impl fmt::Display for PaymentDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incoming => write!(f, "incoming"),
            Self::Outgoing => write!(f, "outgoing"),
        }
    }
}

/// The lifecycle state of a payment record.
///
/// Incoming chain: `Unverified → Verified → Complete`, with `Failed`
/// reachable only from `Unverified`. Outgoing chain: `Unsubmitted →
/// Submitted → Sending → Sent → Complete`, with `Failed` reachable from any
/// non-terminal outgoing state. Skips along a chain are legal (ledger sync
/// can observe several hops at once); direction changes never are.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentState {
    /// Observed on the ledger but sender/amount not yet confirmed.
    IncomingUnverified,
    /// Sender and amount confirmed via the ledger receipt.
    IncomingVerified,
    IncomingComplete,
    IncomingFailed,
    /// Constructed locally, not yet handed to the ledger client.
    OutgoingUnsubmitted,
    OutgoingSubmitted,
    OutgoingSending,
    OutgoingSent,
    OutgoingComplete,
    OutgoingFailed,
}

impl PaymentState {
    /// The direction this state belongs to.
    pub fn direction(&self) -> PaymentDirection {
        match self {
            Self::IncomingUnverified
            | Self::IncomingVerified
            | Self::IncomingComplete
            | Self::IncomingFailed => PaymentDirection::Incoming,
            Self::OutgoingUnsubmitted
            | Self::OutgoingSubmitted
            | Self::OutgoingSending
            | Self::OutgoingSent
            | Self::OutgoingComplete
            | Self::OutgoingFailed => PaymentDirection::Outgoing,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::IncomingFailed | Self::OutgoingFailed)
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::IncomingComplete | Self::OutgoingComplete)
    }

    /// Terminal states admit no transition except to themselves.
    pub fn is_terminal(&self) -> bool {
        self.is_complete() || self.is_failure()
    }

    /// Whether an incoming amount/counterparty read is trustworthy yet.
    /// A failed incoming payment was never verified.
    pub fn is_verified(&self) -> bool {
        !matches!(self, Self::IncomingUnverified | Self::IncomingFailed)
    }

    /// Position along the happy-path chain of this state's direction.
    /// `None` for failure states, which sit outside the chain.
    fn chain_position(&self) -> Option<u8> {
        match self {
            Self::IncomingUnverified => Some(0),
            Self::IncomingVerified => Some(1),
            Self::IncomingComplete => Some(2),
            Self::OutgoingUnsubmitted => Some(0),
            Self::OutgoingSubmitted => Some(1),
            Self::OutgoingSending => Some(2),
            Self::OutgoingSent => Some(3),
            Self::OutgoingComplete => Some(4),
            Self::IncomingFailed | Self::OutgoingFailed => None,
        }
    }

    /// Returns true if transitioning from self to `next` is valid.
    ///
    /// Self-transitions are always valid (updates are idempotent). A
    /// ledger-confirmed payment cannot retroactively fail, so terminal
    /// states admit only themselves.
    pub fn can_transition_to(&self, next: PaymentState) -> bool {
        if *self == next {
            return true;
        }
        if self.direction() != next.direction() || self.is_terminal() {
            return false;
        }
        if next.is_failure() {
            return match self.direction() {
                // The only incoming failure arc is from Unverified.
                PaymentDirection::Incoming => *self == Self::IncomingUnverified,
                PaymentDirection::Outgoing => true,
            };
        }
        match (self.chain_position(), next.chain_position()) {
            (Some(from), Some(to)) => to > from,
            _ => false,
        }
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::IncomingUnverified => "incoming-unverified",
            Self::IncomingVerified => "incoming-verified",
            Self::IncomingComplete => "incoming-complete",
            Self::IncomingFailed => "incoming-failed",
            Self::OutgoingUnsubmitted => "outgoing-unsubmitted",
            Self::OutgoingSubmitted => "outgoing-submitted",
            Self::OutgoingSending => "outgoing-sending",
            Self::OutgoingSent => "outgoing-sent",
            Self::OutgoingComplete => "outgoing-complete",
            Self::OutgoingFailed => "outgoing-failed",
        };
        write!(f, "{name}")
    }
}

/// Why a payment failed. Absence of a reason is structural: only the
/// failure states carry one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentFailure {
    Unknown,
    InsufficientFunds,
    /// The ledger client rejected the transaction as malformed.
    ValidationFailed,
    NotificationSendFailed,
    /// The record itself was found inconsistent during sync.
    Invalid,
    Expired,
}

impl fmt::Display for PaymentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::InsufficientFunds => "insufficient-funds",
            Self::ValidationFailed => "validation-failed",
            Self::NotificationSendFailed => "notification-send-failed",
            Self::Invalid => "invalid",
            Self::Expired => "expired",
        };
        write!(f, "{name}")
    }
}
