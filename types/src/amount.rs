//! Currency-tagged payment amounts.
//!
//! Amounts are represented as fixed-point integers (i128) to avoid
//! floating-point errors. For MobileCoin the smallest unit is 1 picoMOB
//! (10^-12 MOB). Amounts are signed: fees and adjustments can be negative
//! in intermediate arithmetic, but a persisted payment amount is positive.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The currency a payment amount is denominated in.
///
/// MobileCoin is the only supported currency; adding one is a breaking
/// change by design, since every consumer must handle its ledger payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    MobileCoin,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MobileCoin => write!(f, "MOB"),
        }
    }
}

/// A signed fixed-point amount tagged with its currency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentAmount {
    currency: Currency,
    picos: i128,
}

impl PaymentAmount {
    pub fn new(currency: Currency, picos: i128) -> Self {
        Self { currency, picos }
    }

    /// A MobileCoin amount in picoMOB.
    pub fn mob(picos: i128) -> Self {
        Self::new(Currency::MobileCoin, picos)
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn picos(&self) -> i128 {
        self.picos
    }

    pub fn is_zero(&self) -> bool {
        self.picos == 0
    }

    pub fn is_positive(&self) -> bool {
        self.picos > 0
    }

    /// Checked addition. `None` on overflow or currency mismatch.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        if self.currency != other.currency {
            return None;
        }
        self.picos
            .checked_add(other.picos)
            .map(|picos| Self::new(self.currency, picos))
    }

    /// Checked subtraction. `None` on overflow or currency mismatch.
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        if self.currency != other.currency {
            return None;
        }
        self.picos
            .checked_sub(other.picos)
            .map(|picos| Self::new(self.currency, picos))
    }
}

impl fmt::Display for PaymentAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.currency {
            Currency::MobileCoin => write!(f, "{} picoMOB", self.picos),
        }
    }
}
