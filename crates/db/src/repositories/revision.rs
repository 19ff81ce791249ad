//! Revision repository for database operations.
//!
//! The two-revision cap is enforced here. The insert transaction takes
//! an exclusive lock on the parent order row before counting, so
//! concurrent filings against the same order serialize and cannot both
//! slip under the cap.

use kantor_core::order::{OrderFlowError, RevisionStatus, ensure_revision_slot};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{orders, revisions};

/// Error types for revision operations.
#[derive(Debug, thiserror::Error)]
pub enum RevisionError {
    /// Revision not found.
    #[error("Revision not found: {0}")]
    NotFound(Uuid),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(Uuid),

    /// Lifecycle rule violation (quota or order status).
    #[error(transparent)]
    Flow(#[from] OrderFlowError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for updating a revision (claim, complete, reject).
#[derive(Debug, Clone, Default)]
pub struct UpdateRevisionInput {
    /// New revision status.
    pub status: Option<RevisionStatus>,
    /// Accountant claiming the revision.
    pub assigned_to: Option<Uuid>,
}

/// Revision repository.
#[derive(Debug, Clone)]
pub struct RevisionRepository {
    db: DatabaseConnection,
}

impl RevisionRepository {
    /// Creates a new revision repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a revision by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<revisions::Model>, DbErr> {
        revisions::Entity::find_by_id(id).one(&self.db).await
    }

    /// Files a revision against a completed order.
    ///
    /// The order must be `COMPLETED` and have fewer than the maximum
    /// number of revisions. The order row is locked `FOR UPDATE` while
    /// the quota is counted, so concurrent filings serialize.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::OrderNotFound`] if the order does not
    /// exist, or [`RevisionError::Flow`] if the order is not completed
    /// or the quota is exhausted.
    pub async fn create(
        &self,
        order_id: Uuid,
        requester_id: Uuid,
        title: String,
        description: String,
    ) -> Result<revisions::Model, RevisionError> {
        let txn = self.db.begin().await?;

        let order = orders::Entity::find_by_id(order_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(RevisionError::OrderNotFound(order_id))?;

        let existing = revisions::Entity::find()
            .filter(revisions::Column::OrderId.eq(order_id))
            .count(&txn)
            .await?;

        ensure_revision_slot(order.status.into(), existing)?;

        let now = chrono::Utc::now().into();
        let revision = revisions::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            requester_id: Set(requester_id),
            title: Set(title),
            description: Set(description),
            status: Set(RevisionStatus::Pending.into()),
            assigned_to: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = revision.insert(&txn).await?;
        txn.commit().await?;

        Ok(inserted)
    }

    /// Updates a revision: claim it, complete it, or reject it.
    ///
    /// # Errors
    ///
    /// Returns [`RevisionError::NotFound`] if the revision does not
    /// exist.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateRevisionInput,
    ) -> Result<revisions::Model, RevisionError> {
        let revision = self
            .find_by_id(id)
            .await?
            .ok_or(RevisionError::NotFound(id))?;

        let mut active: revisions::ActiveModel = revision.into();
        if let Some(status) = input.status {
            active.status = Set(status.into());
        }
        if let Some(assigned_to) = input.assigned_to {
            active.assigned_to = Set(Some(assigned_to));
        }
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Lists the revisions on an order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_order(&self, order_id: Uuid) -> Result<Vec<revisions::Model>, DbErr> {
        revisions::Entity::find()
            .filter(revisions::Column::OrderId.eq(order_id))
            .order_by_asc(revisions::Column::CreatedAt)
            .all(&self.db)
            .await
    }
}
