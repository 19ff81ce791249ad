//! Error types for order lifecycle rules.

use thiserror::Error;

use super::types::OrderStatus;

/// Violations of the order lifecycle rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderFlowError {
    /// The requested status change is not in the transition table.
    #[error("illegal order transition: {from} -> {to}")]
    IllegalTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },

    /// Revisions may only be filed against completed orders.
    #[error("revisions can only be filed on completed orders, order is {0}")]
    RevisionNotAllowed(OrderStatus),

    /// The per-order revision cap has been reached.
    #[error("revision quota exhausted: {existing} of {max} revisions already filed")]
    RevisionQuotaExceeded {
        /// Revisions already filed.
        existing: u64,
        /// Maximum allowed.
        max: u64,
    },
}
