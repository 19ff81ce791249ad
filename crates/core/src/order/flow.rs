//! The order status transition table.
//!
//! The REST surface exposes a generic "set status" operation; this module
//! is the guard that keeps it honest. Every mutation of `Order.status`
//! must pass through [`ensure_transition`].

use super::error::OrderFlowError;
use super::types::OrderStatus;

/// Returns the statuses reachable from `from` in a single step.
#[must_use]
pub const fn allowed_transitions(from: OrderStatus) -> &'static [OrderStatus] {
    match from {
        OrderStatus::PendingPayment => &[OrderStatus::Paid],
        OrderStatus::Paid => &[OrderStatus::InProgress],
        OrderStatus::InProgress => &[OrderStatus::Completed],
        OrderStatus::Completed => &[],
    }
}

/// Returns true if no further transitions are possible from `status`.
#[must_use]
pub const fn is_terminal(status: OrderStatus) -> bool {
    allowed_transitions(status).is_empty()
}

/// Validates a requested status change against the transition table.
///
/// # Errors
///
/// Returns [`OrderFlowError::IllegalTransition`] if `to` is not reachable
/// from `from`. A no-op transition (`from == to`) is also rejected.
pub fn ensure_transition(from: OrderStatus, to: OrderStatus) -> Result<(), OrderFlowError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(OrderFlowError::IllegalTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn status_strategy() -> impl Strategy<Value = OrderStatus> {
        prop_oneof![
            Just(OrderStatus::PendingPayment),
            Just(OrderStatus::Paid),
            Just(OrderStatus::InProgress),
            Just(OrderStatus::Completed),
        ]
    }

    /// Position of a status along the forward chain.
    const fn rank(status: OrderStatus) -> u8 {
        match status {
            OrderStatus::PendingPayment => 0,
            OrderStatus::Paid => 1,
            OrderStatus::InProgress => 2,
            OrderStatus::Completed => 3,
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every allowed transition moves exactly one step forward.
        #[test]
        fn prop_transitions_move_forward_one_step(from in status_strategy()) {
            for &to in allowed_transitions(from) {
                prop_assert_eq!(rank(to), rank(from) + 1);
            }
        }

        /// Backward and repeated transitions are always rejected.
        #[test]
        fn prop_non_forward_transitions_rejected(
            from in status_strategy(),
            to in status_strategy(),
        ) {
            if rank(to) <= rank(from) {
                prop_assert!(ensure_transition(from, to).is_err());
            }
        }

        /// Skipping a step in the chain is rejected.
        #[test]
        fn prop_skipping_steps_rejected(
            from in status_strategy(),
            to in status_strategy(),
        ) {
            if rank(to) > rank(from) + 1 {
                prop_assert!(ensure_transition(from, to).is_err());
            }
        }

        /// ensure_transition agrees with the transition table.
        #[test]
        fn prop_guard_matches_table(
            from in status_strategy(),
            to in status_strategy(),
        ) {
            let allowed = allowed_transitions(from).contains(&to);
            prop_assert_eq!(ensure_transition(from, to).is_ok(), allowed);
        }
    }

    #[test]
    fn test_happy_path_chain() {
        assert!(ensure_transition(OrderStatus::PendingPayment, OrderStatus::Paid).is_ok());
        assert!(ensure_transition(OrderStatus::Paid, OrderStatus::InProgress).is_ok());
        assert!(ensure_transition(OrderStatus::InProgress, OrderStatus::Completed).is_ok());
    }

    #[test]
    fn test_completed_is_terminal() {
        assert!(is_terminal(OrderStatus::Completed));
        assert!(!is_terminal(OrderStatus::PendingPayment));
        assert!(!is_terminal(OrderStatus::Paid));
        assert!(!is_terminal(OrderStatus::InProgress));
    }

    #[test]
    fn test_backward_transition_rejected() {
        let result = ensure_transition(OrderStatus::Completed, OrderStatus::PendingPayment);
        assert_eq!(
            result,
            Err(OrderFlowError::IllegalTransition {
                from: OrderStatus::Completed,
                to: OrderStatus::PendingPayment,
            })
        );
    }

    #[test]
    fn test_self_transition_rejected() {
        assert!(ensure_transition(OrderStatus::Paid, OrderStatus::Paid).is_err());
    }

    #[test]
    fn test_skip_transition_rejected() {
        assert!(ensure_transition(OrderStatus::PendingPayment, OrderStatus::InProgress).is_err());
        assert!(ensure_transition(OrderStatus::PendingPayment, OrderStatus::Completed).is_err());
        assert!(ensure_transition(OrderStatus::Paid, OrderStatus::Completed).is_err());
    }
}
