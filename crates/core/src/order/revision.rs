//! Revision quota rules.
//!
//! A client gets at most two revisions per order, and only after the
//! order is completed. The cap is enforced here, at the component
//! boundary, not in any UI.

use super::error::OrderFlowError;
use super::types::OrderStatus;

/// Maximum number of revisions a client may file per order.
pub const MAX_REVISIONS_PER_ORDER: u64 = 2;

/// Checks whether another revision may be filed against an order.
///
/// # Errors
///
/// Returns [`OrderFlowError::RevisionNotAllowed`] if the order is not
/// completed, or [`OrderFlowError::RevisionQuotaExceeded`] if the cap
/// is already reached.
pub fn ensure_revision_slot(
    order_status: OrderStatus,
    existing_revisions: u64,
) -> Result<(), OrderFlowError> {
    if order_status != OrderStatus::Completed {
        return Err(OrderFlowError::RevisionNotAllowed(order_status));
    }

    if existing_revisions >= MAX_REVISIONS_PER_ORDER {
        return Err(OrderFlowError::RevisionQuotaExceeded {
            existing: existing_revisions,
            max: MAX_REVISIONS_PER_ORDER,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_and_second_revision_allowed() {
        assert!(ensure_revision_slot(OrderStatus::Completed, 0).is_ok());
        assert!(ensure_revision_slot(OrderStatus::Completed, 1).is_ok());
    }

    #[test]
    fn test_third_revision_rejected() {
        let result = ensure_revision_slot(OrderStatus::Completed, 2);
        assert_eq!(
            result,
            Err(OrderFlowError::RevisionQuotaExceeded { existing: 2, max: 2 })
        );
    }

    #[test]
    fn test_revision_requires_completed_order() {
        for status in [
            OrderStatus::PendingPayment,
            OrderStatus::Paid,
            OrderStatus::InProgress,
        ] {
            assert_eq!(
                ensure_revision_slot(status, 0),
                Err(OrderFlowError::RevisionNotAllowed(status))
            );
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// At or beyond the cap, filing is always rejected regardless of
        /// how far past the cap the count is (e.g. rows inserted before
        /// the cap existed).
        #[test]
        fn prop_cap_is_hard(existing in MAX_REVISIONS_PER_ORDER..1000u64) {
            prop_assert!(ensure_revision_slot(OrderStatus::Completed, existing).is_err());
        }

        /// Below the cap, filing on a completed order always succeeds.
        #[test]
        fn prop_below_cap_allowed(existing in 0..MAX_REVISIONS_PER_ORDER) {
            prop_assert!(ensure_revision_slot(OrderStatus::Completed, existing).is_ok());
        }
    }
}
