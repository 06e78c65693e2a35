use proptest::prelude::*;

use pesa_types::{PaymentAmount, PaymentDirection, PaymentId, PaymentState, Timestamp};
use uuid::Uuid;

const ALL_STATES: [PaymentState; 10] = [
    PaymentState::IncomingUnverified,
    PaymentState::IncomingVerified,
    PaymentState::IncomingComplete,
    PaymentState::IncomingFailed,
    PaymentState::OutgoingUnsubmitted,
    PaymentState::OutgoingSubmitted,
    PaymentState::OutgoingSending,
    PaymentState::OutgoingSent,
    PaymentState::OutgoingComplete,
    PaymentState::OutgoingFailed,
];

fn any_state() -> impl Strategy<Value = PaymentState> {
    prop::sample::select(ALL_STATES.to_vec())
}

proptest! {
    /// Every state belongs to exactly one direction (the partition is total).
    #[test]
    fn state_direction_partition_is_total(state in any_state()) {
        let dir = state.direction();
        prop_assert!(dir == PaymentDirection::Incoming || dir == PaymentDirection::Outgoing);
    }

    /// Self-transitions are always legal (mutations are idempotent).
    #[test]
    fn self_transition_always_legal(state in any_state()) {
        prop_assert!(state.can_transition_to(state));
    }

    /// No transition crosses the direction boundary.
    #[test]
    fn no_direction_change(a in any_state(), b in any_state()) {
        if a.direction() != b.direction() {
            prop_assert!(!a.can_transition_to(b));
        }
    }

    /// Off the diagonal, the transition relation is antisymmetric: if a can
    /// move to b, b can never move back to a.
    #[test]
    fn transitions_antisymmetric(a in any_state(), b in any_state()) {
        if a != b && a.can_transition_to(b) {
            prop_assert!(!b.can_transition_to(a));
        }
    }

    /// Terminal states admit no transition except to themselves.
    #[test]
    fn terminal_states_are_absorbing(a in any_state(), b in any_state()) {
        if a.is_terminal() && a != b {
            prop_assert!(!a.can_transition_to(b));
        }
    }

    /// A failure state is never a legal `set_state`-style target from a
    /// verified incoming or complete state.
    #[test]
    fn failure_only_from_failable_states(a in any_state()) {
        use PaymentState::*;
        if a.can_transition_to(IncomingFailed) && a != IncomingFailed {
            prop_assert_eq!(a, IncomingUnverified);
        }
        if a.can_transition_to(OutgoingFailed) && a != OutgoingFailed {
            prop_assert!(a.direction() == PaymentDirection::Outgoing && !a.is_terminal());
        }
    }

    /// Amount checked addition agrees with i128 arithmetic when it fits.
    #[test]
    fn amount_checked_add(a in -1_000_000_000i128..1_000_000_000, b in -1_000_000_000i128..1_000_000_000) {
        let sum = PaymentAmount::mob(a).checked_add(PaymentAmount::mob(b)).unwrap();
        prop_assert_eq!(sum.picos(), a + b);
    }

    /// Timestamp ordering mirrors the underlying milliseconds.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::from_millis(a);
        let tb = Timestamp::from_millis(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// PaymentId bincode serialization roundtrip.
    #[test]
    fn payment_id_bincode_roundtrip(bytes in prop::array::uniform16(0u8..)) {
        let id = PaymentId::from_uuid(Uuid::from_bytes(bytes));
        let encoded = bincode::serialize(&id).unwrap();
        let decoded: PaymentId = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, id);
    }

    /// PaymentAmount bincode serialization roundtrip.
    #[test]
    fn amount_bincode_roundtrip(picos in any::<i128>()) {
        let amount = PaymentAmount::mob(picos);
        let encoded = bincode::serialize(&amount).unwrap();
        let decoded: PaymentAmount = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, amount);
    }
}
