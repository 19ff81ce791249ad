//! Order lifecycle state machine and revision quota rules.
//!
//! The lifecycle is a strict forward chain:
//!
//! ```text
//! PENDING_PAYMENT -> PAID -> IN_PROGRESS -> COMPLETED
//! ```
//!
//! `COMPLETED` is terminal; revisions may be filed against a completed
//! order but never move its status.

mod error;
mod flow;
mod revision;
mod types;

pub use error::OrderFlowError;
pub use flow::{allowed_transitions, ensure_transition, is_terminal};
pub use revision::{MAX_REVISIONS_PER_ORDER, ensure_revision_slot};
pub use types::{OrderStatus, PaymentStatus, RevisionStatus};
