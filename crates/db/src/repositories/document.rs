//! Document repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::entities::{documents, orders, users};

/// Error types for document operations.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for recording an uploaded document.
#[derive(Debug, Clone)]
pub struct CreateDocumentInput {
    /// Order the document belongs to.
    pub order_id: Uuid,
    /// User who uploaded it.
    pub uploader_id: Uuid,
    /// Original file name.
    pub file_name: String,
    /// Opaque URL of the stored file.
    pub file_url: String,
    /// MIME type or extension hint.
    pub file_type: Option<String>,
    /// True when this is a work result delivered by the office.
    pub is_result: bool,
}

/// Document repository.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    db: DatabaseConnection,
}

impl DocumentRepository {
    /// Creates a new document repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records an uploaded document against an order.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::OrderNotFound`] if the order does not
    /// exist.
    pub async fn create(
        &self,
        input: CreateDocumentInput,
    ) -> Result<documents::Model, DocumentError> {
        let order = orders::Entity::find_by_id(input.order_id)
            .one(&self.db)
            .await?;
        if order.is_none() {
            return Err(DocumentError::OrderNotFound(input.order_id));
        }

        let document = documents::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(input.order_id),
            uploader_id: Set(input.uploader_id),
            file_name: Set(input.file_name),
            file_url: Set(input.file_url),
            file_type: Set(input.file_type),
            is_result: Set(input.is_result),
            created_at: Set(chrono::Utc::now().into()),
        };

        Ok(document.insert(&self.db).await?)
    }

    /// Lists the documents on an order, oldest first, with uploader names.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<(documents::Model, Option<users::Model>)>, DbErr> {
        documents::Entity::find()
            .filter(documents::Column::OrderId.eq(order_id))
            .order_by_asc(documents::Column::CreatedAt)
            .find_also_related(users::Entity)
            .all(&self.db)
            .await
    }
}
