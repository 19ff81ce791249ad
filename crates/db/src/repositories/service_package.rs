//! Service package repository for database operations.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{documents, orders, payments, revisions, service_packages};

/// Error types for service package operations.
#[derive(Debug, thiserror::Error)]
pub enum ServicePackageError {
    /// Service package not found.
    #[error("Service package not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a service package.
#[derive(Debug, Clone)]
pub struct CreateServicePackageInput {
    /// Display name.
    pub name: String,
    /// Description shown to clients.
    pub description: Option<String>,
    /// Price in the office currency.
    pub price: Decimal,
    /// Expected turnaround, e.g. "7 hari".
    pub duration: String,
    /// Catalog category.
    pub category: Option<String>,
}

/// Input for updating a service package.
#[derive(Debug, Clone, Default)]
pub struct UpdateServicePackageInput {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New price. Existing orders keep their snapshotted amount.
    pub price: Option<Decimal>,
    /// New turnaround.
    pub duration: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// Activate or deactivate the package.
    pub is_active: Option<bool>,
}

/// Service package repository for catalog CRUD and cascading delete.
#[derive(Debug, Clone)]
pub struct ServicePackageRepository {
    db: DatabaseConnection,
}

impl ServicePackageRepository {
    /// Creates a new service package repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a service package by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<service_packages::Model>, DbErr> {
        service_packages::Entity::find_by_id(id).one(&self.db).await
    }

    /// Lists all service packages, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<service_packages::Model>, DbErr> {
        service_packages::Entity::find()
            .order_by_desc(service_packages::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Creates a new service package.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        input: CreateServicePackageInput,
    ) -> Result<service_packages::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let package = service_packages::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            duration: Set(input.duration),
            category: Set(input.category),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        package.insert(&self.db).await
    }

    /// Updates a service package.
    ///
    /// # Errors
    ///
    /// Returns [`ServicePackageError::NotFound`] if the package does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateServicePackageInput,
    ) -> Result<service_packages::Model, ServicePackageError> {
        let package = self
            .find_by_id(id)
            .await?
            .ok_or(ServicePackageError::NotFound(id))?;

        let mut active: service_packages::ActiveModel = package.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(price) = input.price {
            active.price = Set(price);
        }
        if let Some(duration) = input.duration {
            active.duration = Set(duration);
        }
        if let Some(category) = input.category {
            active.category = Set(Some(category));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Deletes a service package and every order depending on it.
    ///
    /// For each dependent order the teardown is leaf-first: payments,
    /// then documents, then revisions, then the order; finally the
    /// package itself. Everything runs in a single transaction.
    ///
    /// # Errors
    ///
    /// Returns [`ServicePackageError::NotFound`] if the package does not
    /// exist, or [`ServicePackageError::Database`] if any statement fails
    /// (the transaction rolls back).
    pub async fn remove(&self, id: Uuid) -> Result<(), ServicePackageError> {
        let package = self
            .find_by_id(id)
            .await?
            .ok_or(ServicePackageError::NotFound(id))?;

        let txn = self.db.begin().await?;

        let dependent_order_ids: Vec<Uuid> = orders::Entity::find()
            .filter(orders::Column::ServiceId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|order| order.id)
            .collect();
        let cascaded_orders = dependent_order_ids.len();

        if !dependent_order_ids.is_empty() {
            payments::Entity::delete_many()
                .filter(payments::Column::OrderId.is_in(dependent_order_ids.clone()))
                .exec(&txn)
                .await?;

            documents::Entity::delete_many()
                .filter(documents::Column::OrderId.is_in(dependent_order_ids.clone()))
                .exec(&txn)
                .await?;

            revisions::Entity::delete_many()
                .filter(revisions::Column::OrderId.is_in(dependent_order_ids.clone()))
                .exec(&txn)
                .await?;

            orders::Entity::delete_many()
                .filter(orders::Column::Id.is_in(dependent_order_ids))
                .exec(&txn)
                .await?;
        }

        service_packages::Entity::delete_by_id(package.id)
            .exec(&txn)
            .await?;

        txn.commit().await?;

        tracing::info!(
            service_id = %id,
            name = %package.name,
            cascaded_orders,
            "Service package deleted with cascading cleanup"
        );

        Ok(())
    }
}
