//! Activity log routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::AppState;
use crate::middleware::auth::{AuthUser, forbidden};
use kantor_db::ActivityLogRepository;

/// Creates the activity log router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/activity-logs", get(list_activity))
}

/// Query parameters for the activity listing.
#[derive(Debug, Deserialize)]
struct ActivityQuery {
    /// Maximum number of entries; defaults to 100.
    limit: Option<u64>,
}

/// GET /activity-logs - Recent activity entries (admin only).
async fn list_activity(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ActivityQuery>,
) -> impl IntoResponse {
    if !user.is_admin() {
        return forbidden();
    }

    let limit = query.limit.unwrap_or(100).min(1000);

    let repo = ActivityLogRepository::new((*state.db).clone());
    match repo.list_recent(limit).await {
        Ok(entries) => (StatusCode::OK, Json(json!({ "activity_logs": entries }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list activity logs");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to list activity logs"
                })),
            )
                .into_response()
        }
    }
}
