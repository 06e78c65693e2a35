//! End-to-end tests of the mutation operation set against the in-memory
//! backend: each operation runs inside a write scope, and the sync-service
//! scenarios exercise the full confirm/verify/fail flows.

use pesa_records::{PaymentRecordBuilder, RecordError, TransitionError};
use pesa_store::{ops, PaymentReadScope, PaymentWriteScope, StoreError};
use pesa_store_memory::MemoryPaymentStore;
use pesa_types::{
    MessageId, PaymentAmount, PaymentDirection, PaymentFailure, PaymentId, PaymentState,
    RequestId, Timestamp,
};

fn insert_outgoing(store: &MemoryPaymentStore, created_at: u64) -> PaymentId {
    let record = PaymentRecordBuilder::new(
        PaymentState::OutgoingUnsubmitted,
        Timestamp::from_millis(created_at),
    )
    .amount(PaymentAmount::mob(500))
    .request_id(RequestId::generate())
    .build()
    .expect("valid outgoing record");
    let id = record.id();

    let mut scope = store.write_scope().expect("write_scope");
    scope.insert(&record).expect("insert");
    scope.commit().expect("commit");
    id
}

fn insert_incoming_unverified(store: &MemoryPaymentStore, created_at: u64) -> PaymentId {
    let record = PaymentRecordBuilder::new(
        PaymentState::IncomingUnverified,
        Timestamp::from_millis(created_at),
    )
    .mobilecoin()
    .build()
    .expect("valid incoming record");
    let id = record.id();

    let mut scope = store.write_scope().expect("write_scope");
    scope.insert(&record).expect("insert");
    scope.commit().expect("commit");
    id
}

/// Outgoing payment gets confirmed: sort timestamp moves from creation
/// time to the ledger block time, and the block index finder sees it.
#[test]
fn outgoing_confirmation_scenario() {
    let store = MemoryPaymentStore::new();
    let id = insert_outgoing(&store, 5_000);

    let read = store.read_scope().unwrap();
    let record = read.get(&id).unwrap();
    assert_eq!(record.sort_timestamp(), Timestamp::from_millis(5_000));
    assert_eq!(record.ledger_block_index(), 0);

    let mut scope = store.write_scope().unwrap();
    ops::set_ledger_block_timestamp(&mut scope, &id, 1_000).unwrap();
    ops::set_ledger_block_index(&mut scope, &id, 42).unwrap();
    scope.commit().unwrap();

    let read = store.read_scope().unwrap();
    let record = read.get(&id).unwrap();
    assert_eq!(record.sort_timestamp(), Timestamp::from_millis(1_000));
    assert_eq!(record.ledger_block_index(), 42);

    let at_block = read.by_ledger_block_index(42).unwrap();
    assert_eq!(at_block.len(), 1);
    assert_eq!(at_block[0].id(), id);
}

/// Unverified incoming payment: the amount read is guarded until the sync
/// service discovers the amount and verifies the state.
#[test]
fn incoming_verification_scenario() {
    let store = MemoryPaymentStore::new();
    let id = insert_incoming_unverified(&store, 5_000);

    let read = store.read_scope().unwrap();
    assert_eq!(read.get(&id).unwrap().verified_amount(), None);

    let mut scope = store.write_scope().unwrap();
    ops::set_amount(&mut scope, &id, PaymentAmount::mob(300)).unwrap();
    ops::set_state(&mut scope, &id, PaymentState::IncomingVerified).unwrap();
    scope.commit().unwrap();

    let read = store.read_scope().unwrap();
    let record = read.get(&id).unwrap();
    assert_eq!(record.state(), PaymentState::IncomingVerified);
    assert_eq!(record.verified_amount(), Some(PaymentAmount::mob(300)));
}

/// A sending payment fails: state and reason land together, direction
/// survives.
#[test]
fn outgoing_failure_scenario() {
    let store = MemoryPaymentStore::new();
    let id = insert_outgoing(&store, 5_000);

    let mut scope = store.write_scope().unwrap();
    ops::set_state(&mut scope, &id, PaymentState::OutgoingSending).unwrap();
    ops::set_failure(
        &mut scope,
        &id,
        PaymentState::OutgoingFailed,
        PaymentFailure::InsufficientFunds,
    )
    .unwrap();
    scope.commit().unwrap();

    let read = store.read_scope().unwrap();
    let record = read.get(&id).unwrap();
    assert_eq!(record.state(), PaymentState::OutgoingFailed);
    assert_eq!(
        record.failure_reason(),
        Some(PaymentFailure::InsufficientFunds)
    );
    assert_eq!(record.direction(), PaymentDirection::Outgoing);
}

/// Verifying an amountless incoming record is rejected before anything is
/// staged; the committed row stays readable under the default policy.
#[test]
fn verification_without_amount_rejected_at_write_time() {
    let store = MemoryPaymentStore::new();
    let id = insert_incoming_unverified(&store, 5_000);

    let mut scope = store.write_scope().unwrap();
    let err = ops::set_state(&mut scope, &id, PaymentState::IncomingVerified).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Record(RecordError::Transition(
            TransitionError::AmountRequired { .. }
        ))
    ));
    scope.commit().unwrap();

    let read = store.read_scope().unwrap();
    let record = read.get(&id).expect("row must remain readable");
    assert_eq!(record.state(), PaymentState::IncomingUnverified);
}

/// A non-positive amount fails the operation instead of committing a row
/// the default-config reader would refuse.
#[test]
fn non_positive_amount_rejected_at_write_time() {
    let store = MemoryPaymentStore::new();
    let id = insert_outgoing(&store, 5_000);

    let mut scope = store.write_scope().unwrap();
    let err = ops::set_amount(&mut scope, &id, PaymentAmount::mob(0)).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Record(RecordError::NonPositiveAmount { .. })
    ));
    scope.commit().unwrap();

    let read = store.read_scope().unwrap();
    let record = read.get(&id).expect("row must remain readable");
    assert_eq!(record.amount(), Some(PaymentAmount::mob(500)));
}

#[test]
fn set_state_is_idempotent_through_ops() {
    let store = MemoryPaymentStore::new();
    let id = insert_outgoing(&store, 5_000);

    let mut scope = store.write_scope().unwrap();
    let first = ops::set_state(&mut scope, &id, PaymentState::OutgoingSubmitted).unwrap();
    let second = ops::set_state(&mut scope, &id, PaymentState::OutgoingSubmitted).unwrap();
    assert_eq!(first, second);
}

#[test]
fn illegal_transition_rejected_and_not_persisted() {
    let store = MemoryPaymentStore::new();
    let id = insert_outgoing(&store, 5_000);

    let mut scope = store.write_scope().unwrap();
    ops::set_state(&mut scope, &id, PaymentState::OutgoingSent).unwrap();
    let err = ops::set_state(&mut scope, &id, PaymentState::OutgoingSubmitted).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Record(RecordError::Transition(TransitionError::Illegal { .. }))
    ));
    // The record inside the scope is untouched by the rejected operation
    assert_eq!(scope.get(&id).unwrap().state(), PaymentState::OutgoingSent);
}

#[test]
fn set_failure_rejects_non_failure_target() {
    let store = MemoryPaymentStore::new();
    let id = insert_outgoing(&store, 5_000);

    let mut scope = store.write_scope().unwrap();
    let err = ops::set_failure(
        &mut scope,
        &id,
        PaymentState::OutgoingSent,
        PaymentFailure::Unknown,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Record(RecordError::Transition(
            TransitionError::NotAFailureState { .. }
        ))
    ));
}

#[test]
fn clear_request_id_through_ops() {
    let store = MemoryPaymentStore::new();
    let id = insert_outgoing(&store, 5_000);

    let mut scope = store.write_scope().unwrap();
    let cleared = ops::clear_request_id(&mut scope, &id).unwrap();
    assert_eq!(cleared.request_id(), None);
    // Idempotent
    let again = ops::clear_request_id(&mut scope, &id).unwrap();
    assert_eq!(again.request_id(), None);
    scope.commit().unwrap();

    let read = store.read_scope().unwrap();
    assert_eq!(read.get(&id).unwrap().request_id(), None);
}

#[test]
fn linked_message_set_and_relinked() {
    let store = MemoryPaymentStore::new();
    let id = insert_incoming_unverified(&store, 5_000);

    let mut scope = store.write_scope().unwrap();
    ops::set_linked_message_id(&mut scope, &id, MessageId::new("msg-1")).unwrap();
    ops::set_linked_message_id(&mut scope, &id, MessageId::new("msg-2")).unwrap();
    scope.commit().unwrap();

    let read = store.read_scope().unwrap();
    assert_eq!(
        read.get(&id).unwrap().linked_message_id(),
        Some(&MessageId::new("msg-2"))
    );
}

#[test]
fn unread_flag_through_ops() {
    let store = MemoryPaymentStore::new();
    let id = insert_incoming_unverified(&store, 5_000);

    let mut scope = store.write_scope().unwrap();
    ops::set_unread(&mut scope, &id, true).unwrap();
    scope.commit().unwrap();

    let read = store.read_scope().unwrap();
    assert_eq!(read.unread_count().unwrap(), 1);

    let mut scope = store.write_scope().unwrap();
    ops::set_unread(&mut scope, &id, false).unwrap();
    scope.commit().unwrap();

    let read = store.read_scope().unwrap();
    assert_eq!(read.unread_count().unwrap(), 0);
}

#[test]
fn ledger_confirmation_atomic_through_ops() {
    let store = MemoryPaymentStore::new();
    let id = insert_incoming_unverified(&store, 5_000);

    let mut scope = store.write_scope().unwrap();
    let err = ops::set_ledger_confirmation(&mut scope, &id, 42, 0).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Record(RecordError::IncompleteConfirmation)
    ));

    let record = ops::set_ledger_confirmation(&mut scope, &id, 42, 1_000).unwrap();
    assert_eq!(record.ledger_block_index(), 42);
    assert_eq!(record.sort_timestamp(), Timestamp::from_millis(1_000));
}

#[test]
fn ledger_ops_without_payload_rejected() {
    let store = MemoryPaymentStore::new();
    // No ledger fields, no amount: builder attaches no MobileCoin payload
    let record = PaymentRecordBuilder::new(
        PaymentState::IncomingUnverified,
        Timestamp::from_millis(5_000),
    )
    .build()
    .unwrap();
    let id = record.id();

    let mut scope = store.write_scope().unwrap();
    scope.insert(&record).unwrap();
    let err = ops::set_ledger_block_index(&mut scope, &id, 7).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Record(RecordError::MissingLedgerPayload)
    ));
}

#[test]
fn operating_on_missing_record_fails() {
    let store = MemoryPaymentStore::new();
    let mut scope = store.write_scope().unwrap();
    let err = ops::set_unread(&mut scope, &PaymentId::generate(), true).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}
