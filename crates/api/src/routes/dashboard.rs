//! Admin dashboard aggregate endpoint.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use serde_json::json;
use tracing::error;

use crate::AppState;
use crate::middleware::auth::{AuthUser, forbidden};
use kantor_db::{OrderRepository, PaymentRepository, ServicePackageRepository, UserRepository};

/// Creates the dashboard router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard/sync", get(sync))
}

/// GET /dashboard/sync - Aggregate fetch of users, services, orders and
/// payments for the admin dashboard.
async fn sync(State(state): State<AppState>, user: AuthUser) -> impl IntoResponse {
    if !user.is_staff() {
        return forbidden();
    }

    let db = (*state.db).clone();
    let users_repo = UserRepository::new(db.clone());
    let services_repo = ServicePackageRepository::new(db.clone());
    let orders_repo = OrderRepository::new(db.clone());
    let payments_repo = PaymentRepository::new(db);

    let (users, services, orders, payments) = match tokio::try_join!(
        async { users_repo.list_all().await.map_err(|e| ("users", e)) },
        async { services_repo.list_all().await.map_err(|e| ("services", e)) },
        async { orders_repo.list_all().await.map_err(|e| ("orders", e)) },
        async { payments_repo.list_all().await.map_err(|e| ("payments", e)) },
    ) {
        Ok(data) => data,
        Err((source, e)) => {
            error!(error = %e, source, "Failed to sync dashboard data");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to load dashboard data"
                })),
            )
                .into_response();
        }
    };

    let orders_json: Vec<_> = orders
        .iter()
        .map(|entry| {
            json!({
                "order": entry.order,
                "client": entry.client.as_ref().map(|c| json!({
                    "id": c.id,
                    "full_name": c.full_name,
                    "email": c.email,
                })),
                "service": entry.service,
            })
        })
        .collect();

    let payments_json: Vec<_> = payments
        .iter()
        .map(|entry| {
            json!({
                "payment": entry.payment,
                "order": entry.order,
            })
        })
        .collect();

    (
        StatusCode::OK,
        Json(json!({
            "users": users,
            "services": services,
            "orders": orders_json,
            "payments": payments_json,
        })),
    )
        .into_response()
}
