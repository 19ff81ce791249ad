//! `SeaORM` active enums mapping Postgres enum types.
//!
//! The pure domain equivalents live in `kantor-core`; conversions at the
//! repository boundary keep the core crate free of database types.

use kantor_core::auth::UserRole as CoreUserRole;
use kantor_core::order::{
    OrderStatus as CoreOrderStatus, PaymentStatus as CorePaymentStatus,
    RevisionStatus as CoreRevisionStatus,
};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a portal user.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
pub enum UserRole {
    /// Office administrator.
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    /// Accountant.
    #[sea_orm(string_value = "AKUNTAN")]
    Akuntan,
    /// Client.
    #[sea_orm(string_value = "KLIEN")]
    Klien,
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "order_status")]
pub enum OrderStatus {
    /// Waiting for the client to pay.
    #[sea_orm(string_value = "PENDING_PAYMENT")]
    PendingPayment,
    /// Payment verified.
    #[sea_orm(string_value = "PAID")]
    Paid,
    /// An accountant is working on it.
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    /// Work delivered.
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
}

/// Status of a payment record.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
pub enum PaymentStatus {
    /// Nothing received yet.
    #[sea_orm(string_value = "UNPAID")]
    Unpaid,
    /// Proof submitted, awaiting verification.
    #[sea_orm(string_value = "PENDING_APPROVAL")]
    PendingApproval,
    /// Verified.
    #[sea_orm(string_value = "PAID")]
    Paid,
}

/// Status of a revision request.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "revision_status")]
pub enum RevisionStatus {
    /// Filed, not picked up.
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Claimed by an accountant.
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    /// Delivered.
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    /// Declined.
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl From<CoreUserRole> for UserRole {
    fn from(role: CoreUserRole) -> Self {
        match role {
            CoreUserRole::Admin => Self::Admin,
            CoreUserRole::Akuntan => Self::Akuntan,
            CoreUserRole::Klien => Self::Klien,
        }
    }
}

impl From<UserRole> for CoreUserRole {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => Self::Admin,
            UserRole::Akuntan => Self::Akuntan,
            UserRole::Klien => Self::Klien,
        }
    }
}

impl From<CoreOrderStatus> for OrderStatus {
    fn from(status: CoreOrderStatus) -> Self {
        match status {
            CoreOrderStatus::PendingPayment => Self::PendingPayment,
            CoreOrderStatus::Paid => Self::Paid,
            CoreOrderStatus::InProgress => Self::InProgress,
            CoreOrderStatus::Completed => Self::Completed,
        }
    }
}

impl From<OrderStatus> for CoreOrderStatus {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::PendingPayment => Self::PendingPayment,
            OrderStatus::Paid => Self::Paid,
            OrderStatus::InProgress => Self::InProgress,
            OrderStatus::Completed => Self::Completed,
        }
    }
}

impl From<CorePaymentStatus> for PaymentStatus {
    fn from(status: CorePaymentStatus) -> Self {
        match status {
            CorePaymentStatus::Unpaid => Self::Unpaid,
            CorePaymentStatus::PendingApproval => Self::PendingApproval,
            CorePaymentStatus::Paid => Self::Paid,
        }
    }
}

impl From<PaymentStatus> for CorePaymentStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Unpaid => Self::Unpaid,
            PaymentStatus::PendingApproval => Self::PendingApproval,
            PaymentStatus::Paid => Self::Paid,
        }
    }
}

impl From<CoreRevisionStatus> for RevisionStatus {
    fn from(status: CoreRevisionStatus) -> Self {
        match status {
            CoreRevisionStatus::Pending => Self::Pending,
            CoreRevisionStatus::InProgress => Self::InProgress,
            CoreRevisionStatus::Completed => Self::Completed,
            CoreRevisionStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<RevisionStatus> for CoreRevisionStatus {
    fn from(status: RevisionStatus) -> Self {
        match status {
            RevisionStatus::Pending => Self::Pending,
            RevisionStatus::InProgress => Self::InProgress,
            RevisionStatus::Completed => Self::Completed,
            RevisionStatus::Rejected => Self::Rejected,
        }
    }
}
