//! User repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{
    activity_logs, documents, orders, payments, revisions, sea_orm_active_enums::UserRole, users,
};

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// User not found.
    #[error("User not found: {0}")]
    NotFound(Uuid),

    /// Email already registered.
    #[error("Email already registered: {0}")]
    EmailTaken(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for updating a user's profile.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    /// New full name.
    pub full_name: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New address.
    pub address: Option<String>,
    /// New role (admin only).
    pub role: Option<UserRole>,
}

/// User repository for CRUD and cascading delete.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Checks if an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::EmailTaken`] if the email is already registered,
    /// or [`UserError::Database`] if the insert fails.
    pub async fn create(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
        phone: Option<String>,
        address: Option<String>,
        role: UserRole,
    ) -> Result<users::Model, UserError> {
        if self.email_exists(email).await? {
            return Err(UserError::EmailTaken(email.to_string()));
        }

        let now = chrono::Utc::now().into();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            full_name: Set(full_name.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            phone: Set(phone),
            address: Set(address),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(user.insert(&self.db).await?)
    }

    /// Lists all users, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<users::Model>, DbErr> {
        users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Lists all users holding a given role, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_role(&self, role: UserRole) -> Result<Vec<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Role.eq(role))
            .order_by_desc(users::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Updates a user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::NotFound`] if the user does not exist.
    pub async fn update(&self, id: Uuid, input: UpdateUserInput) -> Result<users::Model, UserError> {
        let user = self
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let mut active: users::ActiveModel = user.into();
        if let Some(full_name) = input.full_name {
            active.full_name = Set(full_name);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = input.address {
            active.address = Set(Some(address));
        }
        if let Some(role) = input.role {
            active.role = Set(role);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Deletes a user and everything hanging off them, in one transaction.
    ///
    /// Teardown order is fixed and leaf-first:
    /// 1. activity logs written by the user;
    /// 2. documents the user uploaded and revisions the user filed, on
    ///    any order;
    /// 3. for each order owned as client: payments, documents, revisions,
    ///    then the order itself;
    /// 4. orders the user worked as accountant keep existing with
    ///    `accountant_id` nulled (same for claimed revisions);
    /// 5. the user row.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::NotFound`] if the user does not exist, or
    /// [`UserError::Database`] if any statement fails (the transaction
    /// rolls back).
    pub async fn remove(&self, id: Uuid) -> Result<(), UserError> {
        let user = self
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let txn = self.db.begin().await?;

        activity_logs::Entity::delete_many()
            .filter(activity_logs::Column::UserId.eq(id))
            .exec(&txn)
            .await?;

        documents::Entity::delete_many()
            .filter(documents::Column::UploaderId.eq(id))
            .exec(&txn)
            .await?;

        revisions::Entity::delete_many()
            .filter(revisions::Column::RequesterId.eq(id))
            .exec(&txn)
            .await?;

        let owned_order_ids: Vec<Uuid> = orders::Entity::find()
            .filter(orders::Column::ClientId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|order| order.id)
            .collect();
        let cascaded_orders = owned_order_ids.len();

        if !owned_order_ids.is_empty() {
            payments::Entity::delete_many()
                .filter(payments::Column::OrderId.is_in(owned_order_ids.clone()))
                .exec(&txn)
                .await?;

            documents::Entity::delete_many()
                .filter(documents::Column::OrderId.is_in(owned_order_ids.clone()))
                .exec(&txn)
                .await?;

            revisions::Entity::delete_many()
                .filter(revisions::Column::OrderId.is_in(owned_order_ids.clone()))
                .exec(&txn)
                .await?;

            orders::Entity::delete_many()
                .filter(orders::Column::Id.is_in(owned_order_ids))
                .exec(&txn)
                .await?;
        }

        orders::Entity::update_many()
            .col_expr(orders::Column::AccountantId, sea_orm::sea_query::Expr::value(Option::<Uuid>::None))
            .filter(orders::Column::AccountantId.eq(id))
            .exec(&txn)
            .await?;

        revisions::Entity::update_many()
            .col_expr(revisions::Column::AssignedTo, sea_orm::sea_query::Expr::value(Option::<Uuid>::None))
            .filter(revisions::Column::AssignedTo.eq(id))
            .exec(&txn)
            .await?;

        users::Entity::delete_by_id(user.id).exec(&txn).await?;

        txn.commit().await?;

        tracing::info!(
            user_id = %id,
            email = %user.email,
            cascaded_orders,
            "User deleted with cascading cleanup"
        );

        Ok(())
    }
}
