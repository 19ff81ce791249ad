//! Payment repository for database operations.
//!
//! Marking a payment `PAID` moves the parent order to `PAID` inside the
//! same database transaction, so the two rows can never disagree.

use kantor_core::order::{OrderFlowError, OrderStatus, PaymentStatus, ensure_transition};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{orders, payments, service_packages, users};

/// Error types for payment operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Payment not found.
    #[error("Payment not found: {0}")]
    NotFound(Uuid),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(Uuid),

    /// The order already has a payment.
    #[error("Order already has a payment: {0}")]
    DuplicatePayment(Uuid),

    /// Lifecycle rule violation on the parent order.
    #[error(transparent)]
    Flow(#[from] OrderFlowError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for updating a payment.
#[derive(Debug, Clone, Default)]
pub struct UpdatePaymentInput {
    /// New payment status.
    pub status: Option<PaymentStatus>,
    /// Payment method used.
    pub payment_method: Option<String>,
    /// URL of the uploaded payment proof.
    pub proof_url: Option<String>,
    /// When the payment was received.
    pub paid_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Payment joined with its order, client, and service for admin listings.
#[derive(Debug, Clone)]
pub struct PaymentOverview {
    /// The payment row.
    pub payment: payments::Model,
    /// The parent order.
    pub order: Option<orders::Model>,
    /// The paying client.
    pub client: Option<users::Model>,
    /// The ordered service.
    pub service: Option<service_packages::Model>,
}

/// Payment repository for invoice operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a payment by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<payments::Model>, DbErr> {
        payments::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds the payment for an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_order(&self, order_id: Uuid) -> Result<Option<payments::Model>, DbErr> {
        payments::Entity::find()
            .filter(payments::Column::OrderId.eq(order_id))
            .one(&self.db)
            .await
    }

    /// Creates the payment record for an order, status `UNPAID`.
    ///
    /// Does not touch the order's status; that happens only when the
    /// payment is later marked `PAID`.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::OrderNotFound`] if the order does not
    /// exist, or [`PaymentError::DuplicatePayment`] if it already has a
    /// payment.
    pub async fn create(
        &self,
        order_id: Uuid,
        amount: Decimal,
        payment_method: Option<String>,
        proof_url: Option<String>,
    ) -> Result<payments::Model, PaymentError> {
        let order = orders::Entity::find_by_id(order_id).one(&self.db).await?;
        if order.is_none() {
            return Err(PaymentError::OrderNotFound(order_id));
        }

        if self.find_by_order(order_id).await?.is_some() {
            return Err(PaymentError::DuplicatePayment(order_id));
        }

        let now = chrono::Utc::now().into();
        let payment = payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            amount: Set(amount),
            status: Set(PaymentStatus::Unpaid.into()),
            payment_method: Set(payment_method),
            proof_url: Set(proof_url),
            paid_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(payment.insert(&self.db).await?)
    }

    /// Updates a payment; marking it `PAID` also moves the parent order
    /// to `PAID` atomically.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::NotFound`] if the payment does not exist,
    /// [`PaymentError::Flow`] if the parent order cannot legally move to
    /// `PAID`, or [`PaymentError::Database`] on failure (the transaction
    /// rolls back, leaving both rows untouched).
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdatePaymentInput,
    ) -> Result<payments::Model, PaymentError> {
        let txn = self.db.begin().await?;

        let payment = payments::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(PaymentError::NotFound(id))?;

        let order_id = payment.order_id;
        let becomes_paid = input.status == Some(PaymentStatus::Paid);

        let mut active: payments::ActiveModel = payment.into();
        if let Some(status) = input.status {
            active.status = Set(status.into());
        }
        if let Some(payment_method) = input.payment_method {
            active.payment_method = Set(Some(payment_method));
        }
        if let Some(proof_url) = input.proof_url {
            active.proof_url = Set(Some(proof_url));
        }
        if let Some(paid_at) = input.paid_at {
            active.paid_at = Set(Some(paid_at.into()));
        } else if becomes_paid {
            active.paid_at = Set(Some(chrono::Utc::now().into()));
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&txn).await?;

        if becomes_paid {
            let order = orders::Entity::find_by_id(order_id)
                .one(&txn)
                .await?
                .ok_or(PaymentError::OrderNotFound(order_id))?;

            ensure_transition(order.status.clone().into(), OrderStatus::Paid)?;

            let mut order_active: orders::ActiveModel = order.into();
            order_active.status = Set(OrderStatus::Paid.into());
            order_active.updated_at = Set(chrono::Utc::now().into());
            order_active.update(&txn).await?;
        }

        txn.commit().await?;

        Ok(updated)
    }

    /// Lists all payments, newest first, joined with order, client, and
    /// service.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<PaymentOverview>, DbErr> {
        let payments_with_orders = payments::Entity::find()
            .order_by_desc(payments::Column::CreatedAt)
            .find_also_related(orders::Entity)
            .all(&self.db)
            .await?;

        let client_ids: Vec<Uuid> = payments_with_orders
            .iter()
            .filter_map(|(_, order)| order.as_ref().map(|o| o.client_id))
            .collect();
        let service_ids: Vec<Uuid> = payments_with_orders
            .iter()
            .filter_map(|(_, order)| order.as_ref().map(|o| o.service_id))
            .collect();

        let clients_by_id: std::collections::HashMap<Uuid, users::Model> = users::Entity::find()
            .filter(users::Column::Id.is_in(client_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        let services_by_id: std::collections::HashMap<Uuid, service_packages::Model> =
            service_packages::Entity::find()
                .filter(service_packages::Column::Id.is_in(service_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|service| (service.id, service))
                .collect();

        Ok(payments_with_orders
            .into_iter()
            .map(|(payment, order)| {
                let client = order
                    .as_ref()
                    .and_then(|o| clients_by_id.get(&o.client_id).cloned());
                let service = order
                    .as_ref()
                    .and_then(|o| services_by_id.get(&o.service_id).cloned());
                PaymentOverview {
                    payment,
                    order,
                    client,
                    service,
                }
            })
            .collect())
    }
}
