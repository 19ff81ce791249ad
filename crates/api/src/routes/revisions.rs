//! Revision management routes (claim, complete, reject).

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::put,
};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::middleware::auth::{AuthUser, forbidden};
use kantor_core::order::RevisionStatus;
use kantor_db::{
    OrderRepository, RevisionRepository, UserRepository,
    repositories::{RevisionError, UpdateRevisionInput},
};

/// Creates the revision router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/revisions/{id}", put(update_revision))
}

/// Request body for updating a revision.
#[derive(Debug, Deserialize)]
struct UpdateRevisionRequest {
    status: String,
}

/// PUT /revisions/{id} - Claim, complete, or reject a revision (staff only).
async fn update_revision(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRevisionRequest>,
) -> impl IntoResponse {
    if !user.is_staff() {
        return forbidden();
    }

    let Ok(new_status) = RevisionStatus::from_str(&payload.status) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": format!("Unknown revision status: {}", payload.status)
            })),
        )
            .into_response();
    };

    // Claiming records who picked the revision up
    let assigned_to = (new_status == RevisionStatus::InProgress).then(|| user.user_id());

    let repo = RevisionRepository::new((*state.db).clone());
    let input = UpdateRevisionInput {
        status: Some(new_status),
        assigned_to,
    };

    match repo.update(id, input).await {
        Ok(revision) => {
            info!(revision_id = %id, status = %new_status, changed_by = %user.user_id(), "Revision updated");
            notify_revision_update(&state, &revision, new_status).await;
            (StatusCode::OK, Json(json!({ "revision": revision }))).into_response()
        }
        Err(RevisionError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Revision not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, revision_id = %id, "Failed to update revision");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to update revision"
                })),
            )
                .into_response()
        }
    }
}

/// Dispatches a status email to the requesting client, best-effort.
async fn notify_revision_update(
    state: &AppState,
    revision: &kantor_db::entities::revisions::Model,
    status: RevisionStatus,
) {
    let orders = OrderRepository::new((*state.db).clone());
    let Ok(Some(order)) = orders.find_by_id(revision.order_id).await else {
        return;
    };

    let users = UserRepository::new((*state.db).clone());
    let Ok(Some(client)) = users.find_by_id(order.client_id).await else {
        return;
    };

    let email_service = state.email_service.clone();
    let title = revision.title.clone();
    tokio::spawn(async move {
        if let Err(e) = email_service
            .send_revision_update_email(&client.email, &client.full_name, &title, status.as_str())
            .await
        {
            error!(error = %e, email = %client.email, "Failed to send revision update email");
        }
    });
}
