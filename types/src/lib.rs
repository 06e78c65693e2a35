//! Fundamental types for the pesa payment-record core.
//!
//! This crate defines the value types shared across every other crate in the
//! workspace: currency amounts, millisecond timestamps, the payment state
//! machine, and identifier newtypes. It performs no I/O and has no errors of
//! its own.

pub mod amount;
pub mod ids;
pub mod state;
pub mod time;

pub use amount::{Currency, PaymentAmount};
pub use ids::{CounterpartyId, MessageId, PaymentId, RequestId};
pub use state::{PaymentDirection, PaymentFailure, PaymentState};
pub use time::Timestamp;
