//! The mutation operation set.
//!
//! Each operation takes a write scope, loads the record, applies exactly
//! the targeted change through the record's own invariant-preserving
//! mutators, re-validates the result, writes it back, and returns the
//! updated record. A mutation that would leave the record unreadable
//! under the validate-on-read policy fails here, at write time, before
//! anything is staged. No operation has an internal failure mode beyond
//! the record's typed rejections and the scope's own errors; nothing is
//! silently defaulted.

use pesa_records::{PaymentRecord, RecordError};
use pesa_types::{MessageId, PaymentAmount, PaymentFailure, PaymentId, PaymentState};

use crate::{PaymentWriteScope, StoreError};

fn update<W, F>(scope: &mut W, id: &PaymentId, apply: F) -> Result<PaymentRecord, StoreError>
where
    W: PaymentWriteScope,
    F: FnOnce(&mut PaymentRecord) -> Result<(), RecordError>,
{
    let mut record = scope.get(id)?;
    apply(&mut record)?;
    record.validate()?;
    scope.put(&record)?;
    Ok(record)
}

/// Move a record to a new non-failure state.
pub fn set_state<W: PaymentWriteScope>(
    scope: &mut W,
    id: &PaymentId,
    new_state: PaymentState,
) -> Result<PaymentRecord, StoreError> {
    let record = update(scope, id, |r| {
        r.set_state(new_state).map_err(RecordError::from)
    })?;
    tracing::debug!(record = %id, state = %new_state, "payment state updated");
    Ok(record)
}

/// Move a record to a failure state, recording why.
pub fn set_failure<W: PaymentWriteScope>(
    scope: &mut W,
    id: &PaymentId,
    new_state: PaymentState,
    reason: PaymentFailure,
) -> Result<PaymentRecord, StoreError> {
    let record = update(scope, id, |r| {
        r.set_failure(new_state, reason).map_err(RecordError::from)
    })?;
    tracing::debug!(record = %id, state = %new_state, %reason, "payment failed");
    Ok(record)
}

/// Record a discovered amount. Non-positive amounts are rejected at
/// write time.
pub fn set_amount<W: PaymentWriteScope>(
    scope: &mut W,
    id: &PaymentId,
    amount: PaymentAmount,
) -> Result<PaymentRecord, StoreError> {
    update(scope, id, |r| {
        r.set_amount(amount);
        Ok(())
    })
}

/// Set or clear the unread flag.
pub fn set_unread<W: PaymentWriteScope>(
    scope: &mut W,
    id: &PaymentId,
    unread: bool,
) -> Result<PaymentRecord, StoreError> {
    update(scope, id, |r| {
        r.set_unread(unread);
        Ok(())
    })
}

/// Link the chat message displayed for this payment.
pub fn set_linked_message_id<W: PaymentWriteScope>(
    scope: &mut W,
    id: &PaymentId,
    message_id: MessageId,
) -> Result<PaymentRecord, StoreError> {
    update(scope, id, |r| {
        if let Some(previous) = r.linked_message_id() {
            tracing::debug!(record = %id, %previous, new = %message_id, "relinking chat message");
        }
        r.set_linked_message_id(message_id);
        Ok(())
    })
}

/// Clear the notification request id once the originating notification
/// has been sent. One-way; never errors on an already-clear record.
pub fn clear_request_id<W: PaymentWriteScope>(
    scope: &mut W,
    id: &PaymentId,
) -> Result<PaymentRecord, StoreError> {
    update(scope, id, |r| {
        r.clear_request_id();
        Ok(())
    })
}

/// Record the ledger block index on the MobileCoin payload.
pub fn set_ledger_block_index<W: PaymentWriteScope>(
    scope: &mut W,
    id: &PaymentId,
    index: u64,
) -> Result<PaymentRecord, StoreError> {
    update(scope, id, |r| r.set_ledger_block_index(index))
}

/// Record the ledger block timestamp (epoch ms) on the MobileCoin payload.
/// Callers pairing this with [`set_ledger_block_index`] should prefer
/// [`set_ledger_confirmation`], which sets both atomically.
pub fn set_ledger_block_timestamp<W: PaymentWriteScope>(
    scope: &mut W,
    id: &PaymentId,
    timestamp: u64,
) -> Result<PaymentRecord, StoreError> {
    update(scope, id, |r| r.set_ledger_block_timestamp(timestamp))
}

/// Record a ledger confirmation: block index and timestamp together, both
/// nonzero.
pub fn set_ledger_confirmation<W: PaymentWriteScope>(
    scope: &mut W,
    id: &PaymentId,
    index: u64,
    timestamp: u64,
) -> Result<PaymentRecord, StoreError> {
    let record = update(scope, id, |r| r.set_ledger_confirmation(index, timestamp))?;
    tracing::debug!(record = %id, block_index = index, block_timestamp = timestamp, "ledger confirmation recorded");
    Ok(record)
}
