//! Activity log repository for database operations.
//!
//! Entries are append-only; they are deleted only together with the
//! owning user (see the user repository's cascading delete).

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::activity_logs;

/// Activity log repository.
#[derive(Debug, Clone)]
pub struct ActivityLogRepository {
    db: DatabaseConnection,
}

impl ActivityLogRepository {
    /// Creates a new activity log repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends an activity entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn record(
        &self,
        user_id: Uuid,
        action: &str,
        detail: Option<String>,
    ) -> Result<activity_logs::Model, DbErr> {
        let entry = activity_logs::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            action: Set(action.to_string()),
            detail: Set(detail),
            created_at: Set(chrono::Utc::now().into()),
        };

        entry.insert(&self.db).await
    }

    /// Lists the most recent activity entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_recent(&self, limit: u64) -> Result<Vec<activity_logs::Model>, DbErr> {
        activity_logs::Entity::find()
            .order_by_desc(activity_logs::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
    }

    /// Lists the entries for a single user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<activity_logs::Model>, DbErr> {
        activity_logs::Entity::find()
            .filter(activity_logs::Column::UserId.eq(user_id))
            .order_by_desc(activity_logs::Column::CreatedAt)
            .all(&self.db)
            .await
    }
}
