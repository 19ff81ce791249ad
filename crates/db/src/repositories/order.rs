//! Order repository for lifecycle database operations.
//!
//! Every mutation of `orders.status` goes through the transition table
//! in `kantor-core`; callers cannot move an order backwards or skip a
//! step.

use kantor_core::order::{OrderFlowError, OrderStatus, ensure_transition};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{documents, orders, payments, service_packages, users};

/// Error types for order operations.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// Order not found.
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    /// Service package not found or inactive.
    #[error("Service package not found: {0}")]
    ServiceNotFound(Uuid),

    /// Client not found.
    #[error("Client not found: {0}")]
    ClientNotFound(Uuid),

    /// Lifecycle rule violation.
    #[error(transparent)]
    Flow(#[from] OrderFlowError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// A document together with its uploader's display name.
#[derive(Debug, Clone)]
pub struct DocumentWithUploader {
    /// The document row.
    pub document: documents::Model,
    /// Uploader full name, if the uploader still exists.
    pub uploader_name: Option<String>,
}

/// Full order detail: order plus everything a detail page shows.
#[derive(Debug, Clone)]
pub struct OrderDetail {
    /// The order row.
    pub order: orders::Model,
    /// The owning client.
    pub client: users::Model,
    /// The ordered service package.
    pub service: service_packages::Model,
    /// The payment, if one was created.
    pub payment: Option<payments::Model>,
    /// Documents on the order, annotated with uploader names.
    pub documents: Vec<DocumentWithUploader>,
}

/// Order with its service and payment, for client listings.
#[derive(Debug, Clone)]
pub struct ClientOrder {
    /// The order row.
    pub order: orders::Model,
    /// The ordered service package.
    pub service: Option<service_packages::Model>,
    /// The payment, if one was created.
    pub payment: Option<payments::Model>,
}

/// Order with its client and service, for admin listings.
#[derive(Debug, Clone)]
pub struct AdminOrder {
    /// The order row.
    pub order: orders::Model,
    /// The owning client.
    pub client: Option<users::Model>,
    /// The ordered service package.
    pub service: Option<service_packages::Model>,
}

/// Order repository for lifecycle operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    db: DatabaseConnection,
}

impl OrderRepository {
    /// Creates a new order repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an order by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<orders::Model>, DbErr> {
        orders::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates an order for a client, snapshotting the package price.
    ///
    /// The order starts in `PENDING_PAYMENT`. `total_amount` is copied
    /// from the package at this moment and never follows later price
    /// changes.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::ServiceNotFound`] if the package does not
    /// exist or is inactive, [`OrderError::ClientNotFound`] if the client
    /// does not exist, or [`OrderError::Database`] on query failure.
    pub async fn create(
        &self,
        client_id: Uuid,
        service_id: Uuid,
        notes: Option<String>,
    ) -> Result<orders::Model, OrderError> {
        let client = users::Entity::find_by_id(client_id).one(&self.db).await?;
        if client.is_none() {
            return Err(OrderError::ClientNotFound(client_id));
        }

        let service = service_packages::Entity::find_by_id(service_id)
            .one(&self.db)
            .await?
            .filter(|package| package.is_active)
            .ok_or(OrderError::ServiceNotFound(service_id))?;

        let now = chrono::Utc::now().into();
        let order = orders::ActiveModel {
            id: Set(Uuid::new_v4()),
            client_id: Set(client_id),
            service_id: Set(service_id),
            accountant_id: Set(None),
            total_amount: Set(service.price),
            status: Set(OrderStatus::PendingPayment.into()),
            notes: Set(notes),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(order.insert(&self.db).await?)
    }

    /// Moves an order to a new status, validating the transition.
    ///
    /// When moving to `IN_PROGRESS`, `accountant_id` records who took
    /// the job.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotFound`] if the order does not exist, or
    /// [`OrderError::Flow`] if the transition is not allowed.
    pub async fn set_status(
        &self,
        id: Uuid,
        new_status: OrderStatus,
        accountant_id: Option<Uuid>,
    ) -> Result<orders::Model, OrderError> {
        let txn = self.db.begin().await?;

        let order = orders::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(OrderError::NotFound(id))?;

        ensure_transition(order.status.clone().into(), new_status)?;

        let mut active: orders::ActiveModel = order.into();
        active.status = Set(new_status.into());
        if let Some(accountant_id) = accountant_id {
            active.accountant_id = Set(Some(accountant_id));
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Loads the full detail for an order.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotFound`] if the order, its client, or its
    /// service no longer exists.
    pub async fn get_detail(&self, id: Uuid) -> Result<OrderDetail, OrderError> {
        let order = self.find_by_id(id).await?.ok_or(OrderError::NotFound(id))?;

        let client = users::Entity::find_by_id(order.client_id)
            .one(&self.db)
            .await?
            .ok_or(OrderError::ClientNotFound(order.client_id))?;

        let service = service_packages::Entity::find_by_id(order.service_id)
            .one(&self.db)
            .await?
            .ok_or(OrderError::ServiceNotFound(order.service_id))?;

        let payment = payments::Entity::find()
            .filter(payments::Column::OrderId.eq(id))
            .one(&self.db)
            .await?;

        let documents = documents::Entity::find()
            .filter(documents::Column::OrderId.eq(id))
            .order_by_asc(documents::Column::CreatedAt)
            .find_also_related(users::Entity)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|(document, uploader)| DocumentWithUploader {
                document,
                uploader_name: uploader.map(|user| user.full_name),
            })
            .collect();

        Ok(OrderDetail {
            order,
            client,
            service,
            payment,
            documents,
        })
    }

    /// Lists a client's orders, newest first, with service and payment.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_client(&self, client_id: Uuid) -> Result<Vec<ClientOrder>, DbErr> {
        let orders_with_services = orders::Entity::find()
            .filter(orders::Column::ClientId.eq(client_id))
            .order_by_desc(orders::Column::CreatedAt)
            .find_also_related(service_packages::Entity)
            .all(&self.db)
            .await?;

        let order_ids: Vec<Uuid> = orders_with_services
            .iter()
            .map(|(order, _)| order.id)
            .collect();

        let mut payments_by_order: std::collections::HashMap<Uuid, payments::Model> =
            payments::Entity::find()
                .filter(payments::Column::OrderId.is_in(order_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|payment| (payment.order_id, payment))
                .collect();

        Ok(orders_with_services
            .into_iter()
            .map(|(order, service)| {
                let payment = payments_by_order.remove(&order.id);
                ClientOrder {
                    order,
                    service,
                    payment,
                }
            })
            .collect())
    }

    /// Lists all orders, newest first, with client and service.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<AdminOrder>, DbErr> {
        let orders_with_clients = orders::Entity::find()
            .order_by_desc(orders::Column::CreatedAt)
            .find_also_related(users::Entity)
            .all(&self.db)
            .await?;

        let service_ids: Vec<Uuid> = orders_with_clients
            .iter()
            .map(|(order, _)| order.service_id)
            .collect();

        let services_by_id: std::collections::HashMap<Uuid, service_packages::Model> =
            service_packages::Entity::find()
                .filter(service_packages::Column::Id.is_in(service_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|service| (service.id, service))
                .collect();

        Ok(orders_with_clients
            .into_iter()
            .map(|(order, client)| {
                let service = services_by_id.get(&order.service_id).cloned();
                AdminOrder {
                    order,
                    client,
                    service,
                }
            })
            .collect())
    }
}
