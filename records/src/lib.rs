//! The persisted payment record.
//!
//! Payment records are stored separately from chat messages: a message can
//! be deleted while the payment record, a financial audit trail, must
//! survive. The record's direction-dependent fields live in a tagged enum
//! ([`PaymentDetails`]) so that the state/shape invariants are enforced by
//! the type system rather than by convention — an incoming payment has no
//! place to put transaction bytes, a failure reason exists only inside the
//! failure states, and direction is computed from the variant, never stored.
//!
//! Mutations here are pure: they update the in-memory record and uphold its
//! invariants. Persisting the result under a write scope is the store
//! layer's concern.

pub mod builder;
pub mod error;
pub mod mobilecoin;
pub mod record;

pub use builder::PaymentRecordBuilder;
pub use error::{RecordError, TransitionError};
pub use mobilecoin::{IncomingMobileCoin, OutgoingMobileCoin};
pub use record::{
    IncomingPayment, IncomingStatus, OutgoingPayment, OutgoingStatus, PaymentDetails,
    PaymentRecord,
};
