//! User directory routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::middleware::auth::{AuthUser, forbidden};
use kantor_db::{
    UserRepository,
    entities::sea_orm_active_enums::UserRole,
    repositories::{UpdateUserInput, UserError},
};

/// Creates the user directory router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// Request body for updating a user.
#[derive(Debug, Deserialize)]
struct UpdateUserRequest {
    full_name: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    /// ADMIN, AKUNTAN or KLIEN; only admins may change roles.
    role: Option<String>,
}

/// GET /users - List all users (admin only).
async fn list_users(State(state): State<AppState>, user: AuthUser) -> impl IntoResponse {
    if !user.is_admin() {
        return forbidden();
    }

    let repo = UserRepository::new((*state.db).clone());
    match repo.list_all().await {
        Ok(users) => (StatusCode::OK, Json(json!({ "users": users }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list users");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to list users"
                })),
            )
                .into_response()
        }
    }
}

/// GET /users/{id} - Read a user profile (self or admin).
async fn get_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if !user.is_admin() && user.user_id() != id {
        return forbidden();
    }

    let repo = UserRepository::new((*state.db).clone());
    match repo.find_by_id(id).await {
        Ok(Some(found)) => (StatusCode::OK, Json(json!({ "user": found }))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "User not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, user_id = %id, "Failed to load user");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to load user"
                })),
            )
                .into_response()
        }
    }
}

/// PUT /users/{id} - Update a user profile (self or admin).
async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    if !user.is_admin() && user.user_id() != id {
        return forbidden();
    }

    // Role changes are an admin-only operation
    let role = match payload.role.as_deref() {
        None => None,
        Some(_) if !user.is_admin() => return forbidden(),
        Some("ADMIN") => Some(UserRole::Admin),
        Some("AKUNTAN") => Some(UserRole::Akuntan),
        Some("KLIEN") => Some(UserRole::Klien),
        Some(other) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "validation_error",
                    "message": format!("Unknown role: {other}")
                })),
            )
                .into_response();
        }
    };

    let repo = UserRepository::new((*state.db).clone());
    let input = UpdateUserInput {
        full_name: payload.full_name,
        phone: payload.phone,
        address: payload.address,
        role,
    };

    match repo.update(id, input).await {
        Ok(updated) => (StatusCode::OK, Json(json!({ "user": updated }))).into_response(),
        Err(UserError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "User not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, user_id = %id, "Failed to update user");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to update user"
                })),
            )
                .into_response()
        }
    }
}

/// DELETE /users/{id} - Cascading delete of a user and their data (admin only).
async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if !user.is_admin() {
        return forbidden();
    }

    let repo = UserRepository::new((*state.db).clone());
    match repo.remove(id).await {
        Ok(()) => {
            info!(user_id = %id, deleted_by = %user.user_id(), "User deleted with cascade");
            (
                StatusCode::OK,
                Json(json!({ "message": "User and related data deleted" })),
            )
                .into_response()
        }
        Err(UserError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "User not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, user_id = %id, "Failed to delete user");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to delete user"
                })),
            )
                .into_response()
        }
    }
}
