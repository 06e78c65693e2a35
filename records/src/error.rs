use pesa_types::{PaymentAmount, PaymentDirection, PaymentFailure, PaymentState};
use thiserror::Error;

/// A rejected state transition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("illegal transition from {from} to {to}")]
    Illegal {
        from: PaymentState,
        to: PaymentState,
    },

    #[error("cannot change a {from} payment into a {to} one")]
    DirectionChange {
        from: PaymentDirection,
        to: PaymentDirection,
    },

    #[error("{target} carries a failure reason; use set_failure to enter it")]
    FailureReasonRequired { target: PaymentState },

    #[error("cannot enter {target} without a recorded amount")]
    AmountRequired { target: PaymentState },

    #[error("{target} is not a failure state")]
    NotAFailureState { target: PaymentState },
}

/// Invalid construction or mutation of a payment record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("amount is required for state {state}")]
    MissingAmount { state: PaymentState },

    #[error("amount must be positive, got {amount}")]
    NonPositiveAmount { amount: PaymentAmount },

    #[error("state {state} requires a failure reason")]
    MissingFailureReason { state: PaymentState },

    #[error("failure reason {reason} supplied for non-failure state {state}")]
    UnexpectedFailureReason {
        state: PaymentState,
        reason: PaymentFailure,
    },

    #[error("{field} does not apply to {direction} payments")]
    WrongDirectionField {
        field: &'static str,
        direction: PaymentDirection,
    },

    #[error("record has no MobileCoin payload to update")]
    MissingLedgerPayload,

    #[error("ledger confirmation requires a nonzero block index and timestamp")]
    IncompleteConfirmation,

    #[error(transparent)]
    Transition(#[from] TransitionError),
}
