//! Service catalog routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::middleware::auth::{AuthUser, forbidden};
use kantor_db::{
    ServicePackageRepository,
    repositories::{CreateServicePackageInput, ServicePackageError, UpdateServicePackageInput},
};

/// Creates the service catalog router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/services", get(list_services).post(create_service))
        .route(
            "/services/{id}",
            get(get_service).put(update_service).delete(delete_service),
        )
}

/// Request body for creating a service package.
#[derive(Debug, Deserialize)]
struct CreateServiceRequest {
    name: String,
    description: Option<String>,
    price: Decimal,
    duration: String,
    category: Option<String>,
}

/// Request body for updating a service package.
#[derive(Debug, Deserialize)]
struct UpdateServiceRequest {
    name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    duration: Option<String>,
    category: Option<String>,
    is_active: Option<bool>,
}

/// GET /services - List the catalog (any authenticated user).
async fn list_services(State(state): State<AppState>) -> impl IntoResponse {
    let repo = ServicePackageRepository::new((*state.db).clone());
    match repo.list_all().await {
        Ok(services) => (StatusCode::OK, Json(json!({ "services": services }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list services");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to list services"
                })),
            )
                .into_response()
        }
    }
}

/// GET /services/{id} - Read a single service package.
async fn get_service(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = ServicePackageRepository::new((*state.db).clone());
    match repo.find_by_id(id).await {
        Ok(Some(service)) => (StatusCode::OK, Json(json!({ "service": service }))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Service package not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, service_id = %id, "Failed to load service");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to load service"
                })),
            )
                .into_response()
        }
    }
}

/// POST /services - Create a service package (admin only).
async fn create_service(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateServiceRequest>,
) -> impl IntoResponse {
    if !user.is_admin() {
        return forbidden();
    }

    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": "Service name must not be empty"
            })),
        )
            .into_response();
    }

    let repo = ServicePackageRepository::new((*state.db).clone());
    let input = CreateServicePackageInput {
        name: payload.name,
        description: payload.description,
        price: payload.price,
        duration: payload.duration,
        category: payload.category,
    };

    match repo.create(input).await {
        Ok(service) => {
            info!(service_id = %service.id, name = %service.name, "Service package created");
            (StatusCode::CREATED, Json(json!({ "service": service }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create service");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to create service"
                })),
            )
                .into_response()
        }
    }
}

/// PUT /services/{id} - Update a service package (admin only).
async fn update_service(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateServiceRequest>,
) -> impl IntoResponse {
    if !user.is_admin() {
        return forbidden();
    }

    let repo = ServicePackageRepository::new((*state.db).clone());
    let input = UpdateServicePackageInput {
        name: payload.name,
        description: payload.description,
        price: payload.price,
        duration: payload.duration,
        category: payload.category,
        is_active: payload.is_active,
    };

    match repo.update(id, input).await {
        Ok(service) => (StatusCode::OK, Json(json!({ "service": service }))).into_response(),
        Err(ServicePackageError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Service package not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, service_id = %id, "Failed to update service");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to update service"
                })),
            )
                .into_response()
        }
    }
}

/// DELETE /services/{id} - Delete a package and its dependent orders (admin only).
async fn delete_service(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if !user.is_admin() {
        return forbidden();
    }

    let repo = ServicePackageRepository::new((*state.db).clone());
    match repo.remove(id).await {
        Ok(()) => {
            info!(service_id = %id, deleted_by = %user.user_id(), "Service package deleted with cascade");
            (
                StatusCode::OK,
                Json(json!({ "message": "Service package and dependent orders deleted" })),
            )
                .into_response()
        }
        Err(ServicePackageError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Service package not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, service_id = %id, "Failed to delete service");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to delete service"
                })),
            )
                .into_response()
        }
    }
}
