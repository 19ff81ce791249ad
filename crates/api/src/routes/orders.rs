//! Order lifecycle routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::middleware::auth::{AuthUser, forbidden};
use kantor_core::order::{OrderFlowError, OrderStatus};
use kantor_db::{
    ActivityLogRepository, DocumentRepository, OrderRepository, RevisionRepository, UserRepository,
    entities::sea_orm_active_enums::UserRole,
    repositories::{CreateDocumentInput, DocumentError, OrderError, RevisionError},
};

/// File-name tag distinguishing revision deliverables from the
/// original result set.
const REVISION_RESULT_TAG: &str = "[REVISI]";

/// Creates the order router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/my/{client_id}", get(list_my_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", put(set_order_status))
        .route(
            "/orders/{id}/revisions",
            get(list_order_revisions).post(file_revision),
        )
        .route("/orders/{id}/documents", post(upload_document))
}

/// Request body for creating an order.
#[derive(Debug, Deserialize)]
struct CreateOrderRequest {
    service_id: Uuid,
    /// Defaults to the authenticated user; admins may order on behalf
    /// of a client.
    client_id: Option<Uuid>,
    notes: Option<String>,
}

/// Request body for a status change.
#[derive(Debug, Deserialize)]
struct SetStatusRequest {
    status: String,
}

/// Request body for filing a revision.
#[derive(Debug, Deserialize)]
struct FileRevisionRequest {
    title: String,
    description: String,
}

/// Request body for recording an uploaded document.
#[derive(Debug, Deserialize)]
struct UploadDocumentRequest {
    file_name: String,
    file_url: String,
    file_type: Option<String>,
    #[serde(default)]
    is_result: bool,
}

/// POST /orders - Create an order; snapshots the package price.
async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> impl IntoResponse {
    let client_id = match payload.client_id {
        Some(id) if id != user.user_id() => {
            if !user.is_admin() {
                return forbidden();
            }
            id
        }
        _ => user.user_id(),
    };

    let repo = OrderRepository::new((*state.db).clone());
    let order = match repo
        .create(client_id, payload.service_id, payload.notes)
        .await
    {
        Ok(o) => o,
        Err(OrderError::ServiceNotFound(id)) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": format!("Service package not found: {id}")
                })),
            )
                .into_response();
        }
        Err(OrderError::ClientNotFound(id)) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": format!("Client not found: {id}")
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Failed to create order");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to create order"
                })),
            )
                .into_response();
        }
    };

    info!(order_id = %order.id, client_id = %client_id, "Order created");

    let activity = ActivityLogRepository::new((*state.db).clone());
    if let Err(e) = activity
        .record(
            client_id,
            "ORDER_CREATED",
            Some(format!("order {}", order.id)),
        )
        .await
    {
        error!(error = %e, order_id = %order.id, "Failed to record order activity");
    }

    notify_order_created(&state, &order).await;

    match repo.get_detail(order.id).await {
        Ok(detail) => (StatusCode::CREATED, Json(order_detail_json(&detail))).into_response(),
        Err(e) => {
            error!(error = %e, order_id = %order.id, "Failed to load created order");
            (StatusCode::CREATED, Json(json!({ "order": order }))).into_response()
        }
    }
}

/// Dispatches the order confirmation email after the insert committed.
async fn notify_order_created(state: &AppState, order: &kantor_db::entities::orders::Model) {
    let users = UserRepository::new((*state.db).clone());
    let Ok(Some(client)) = users.find_by_id(order.client_id).await else {
        return;
    };

    let repo = OrderRepository::new((*state.db).clone());
    let service_name = match repo.get_detail(order.id).await {
        Ok(detail) => detail.service.name,
        Err(_) => return,
    };

    let email_service = state.email_service.clone();
    let total = order.total_amount.to_string();
    tokio::spawn(async move {
        if let Err(e) = email_service
            .send_order_created_email(&client.email, &client.full_name, &service_name, &total)
            .await
        {
            error!(error = %e, email = %client.email, "Failed to send order confirmation email");
        }
    });
}

/// GET /orders - List all orders with client and service (admin only).
async fn list_orders(State(state): State<AppState>, user: AuthUser) -> impl IntoResponse {
    if !user.is_staff() {
        return forbidden();
    }

    let repo = OrderRepository::new((*state.db).clone());
    match repo.list_all().await {
        Ok(orders) => {
            let body: Vec<_> = orders
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
            (StatusCode::OK, Json(json!({ "orders": body }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list orders");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to list orders"
                })),
            )
                .into_response()
        }
    }
}

/// GET /orders/my/{client_id} - List a client's orders (self or staff).
async fn list_my_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Path(client_id): Path<Uuid>,
) -> impl IntoResponse {
    if !user.is_staff() && user.user_id() != client_id {
        return forbidden();
    }

    let repo = OrderRepository::new((*state.db).clone());
    match repo.list_for_client(client_id).await {
        Ok(orders) => {
            let body: Vec<_> = orders
                .iter()
                .map(|entry| {
                    json!({
                        "order": entry.order,
                        "service": entry.service,
                        "payment": entry.payment,
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!({ "orders": body }))).into_response()
        }
        Err(e) => {
            error!(error = %e, client_id = %client_id, "Failed to list client orders");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to list orders"
                })),
            )
                .into_response()
        }
    }
}

/// GET /orders/{id} - Full order detail (owner or staff).
async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = OrderRepository::new((*state.db).clone());
    match repo.get_detail(id).await {
        Ok(detail) => {
            if !user.is_staff() && user.user_id() != detail.order.client_id {
                return forbidden();
            }
            (StatusCode::OK, Json(order_detail_json(&detail))).into_response()
        }
        Err(OrderError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Order not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, order_id = %id, "Failed to load order");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to load order"
                })),
            )
                .into_response()
        }
    }
}

/// PUT /orders/{id}/status - Validated forward transition (staff only).
async fn set_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetStatusRequest>,
) -> impl IntoResponse {
    if !user.is_staff() {
        return forbidden();
    }

    let Ok(new_status) = OrderStatus::from_str(&payload.status) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": format!("Unknown order status: {}", payload.status)
            })),
        )
            .into_response();
    };

    // Taking a job records who took it
    let accountant_id = (new_status == OrderStatus::InProgress).then(|| user.user_id());

    let repo = OrderRepository::new((*state.db).clone());
    let order = match repo.set_status(id, new_status, accountant_id).await {
        Ok(o) => o,
        Err(OrderError::NotFound(_)) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": "Order not found"
                })),
            )
                .into_response();
        }
        Err(OrderError::Flow(e)) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": "illegal_transition",
                    "message": e.to_string()
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, order_id = %id, "Failed to change order status");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to change order status"
                })),
            )
                .into_response();
        }
    };

    info!(order_id = %id, status = %new_status, changed_by = %user.user_id(), "Order status changed");

    let activity = ActivityLogRepository::new((*state.db).clone());
    if let Err(e) = activity
        .record(
            user.user_id(),
            "ORDER_STATUS_CHANGED",
            Some(format!("order {id} -> {new_status}")),
        )
        .await
    {
        error!(error = %e, order_id = %id, "Failed to record status activity");
    }

    if new_status == OrderStatus::Completed {
        notify_order_completed(&state, &order).await;
    }

    (StatusCode::OK, Json(json!({ "order": order }))).into_response()
}

/// Dispatches the completion email after the status change committed.
async fn notify_order_completed(state: &AppState, order: &kantor_db::entities::orders::Model) {
    let repo = OrderRepository::new((*state.db).clone());
    let Ok(detail) = repo.get_detail(order.id).await else {
        return;
    };

    let email_service = state.email_service.clone();
    tokio::spawn(async move {
        if let Err(e) = email_service
            .send_order_completed_email(
                &detail.client.email,
                &detail.client.full_name,
                &detail.service.name,
            )
            .await
        {
            error!(error = %e, email = %detail.client.email, "Failed to send completion email");
        }
    });
}

/// GET /orders/{id}/revisions - List the revisions on an order.
async fn list_order_revisions(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let orders = OrderRepository::new((*state.db).clone());
    match orders.find_by_id(id).await {
        Ok(Some(order)) => {
            if !user.is_staff() && user.user_id() != order.client_id {
                return forbidden();
            }
        }
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": "Order not found"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, order_id = %id, "Failed to load order");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to load order"
                })),
            )
                .into_response();
        }
    }

    let repo = RevisionRepository::new((*state.db).clone());
    match repo.list_for_order(id).await {
        Ok(revisions) => (StatusCode::OK, Json(json!({ "revisions": revisions }))).into_response(),
        Err(e) => {
            error!(error = %e, order_id = %id, "Failed to list revisions");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to list revisions"
                })),
            )
                .into_response()
        }
    }
}

/// POST /orders/{id}/revisions - File a revision on a completed order.
async fn file_revision(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<FileRevisionRequest>,
) -> impl IntoResponse {
    if payload.title.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": "Revision title must not be empty"
            })),
        )
            .into_response();
    }

    let orders = OrderRepository::new((*state.db).clone());
    let order = match orders.find_by_id(id).await {
        Ok(Some(order)) => {
            if !user.is_admin() && user.user_id() != order.client_id {
                return forbidden();
            }
            order
        }
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": "Order not found"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, order_id = %id, "Failed to load order");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to load order"
                })),
            )
                .into_response();
        }
    };

    let repo = RevisionRepository::new((*state.db).clone());
    match repo
        .create(id, user.user_id(), payload.title, payload.description)
        .await
    {
        Ok(revision) => {
            info!(order_id = %id, revision_id = %revision.id, "Revision filed");
            notify_revision_filed(&state, &order, &revision).await;
            (StatusCode::CREATED, Json(json!({ "revision": revision }))).into_response()
        }
        Err(RevisionError::Flow(
            e @ (OrderFlowError::RevisionNotAllowed(_) | OrderFlowError::RevisionQuotaExceeded { .. }),
        )) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "revision_not_allowed",
                "message": e.to_string()
            })),
        )
            .into_response(),
        Err(RevisionError::OrderNotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Order not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, order_id = %id, "Failed to file revision");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to file revision"
                })),
            )
                .into_response()
        }
    }
}

/// Dispatches the office-side notification after a revision was filed.
///
/// The assigned accountant is notified when the order has one;
/// otherwise every admin is.
async fn notify_revision_filed(
    state: &AppState,
    order: &kantor_db::entities::orders::Model,
    revision: &kantor_db::entities::revisions::Model,
) {
    let users = UserRepository::new((*state.db).clone());

    let recipients = match order.accountant_id {
        Some(accountant_id) => match users.find_by_id(accountant_id).await {
            Ok(Some(accountant)) => vec![accountant],
            Ok(None) => Vec::new(),
            Err(e) => {
                error!(error = %e, order_id = %order.id, "Failed to load revision recipient");
                return;
            }
        },
        None => Vec::new(),
    };

    let recipients = if recipients.is_empty() {
        match users.list_by_role(UserRole::Admin).await {
            Ok(admins) => admins,
            Err(e) => {
                error!(error = %e, order_id = %order.id, "Failed to load revision recipients");
                return;
            }
        }
    } else {
        recipients
    };

    for recipient in recipients {
        let email_service = state.email_service.clone();
        let title = revision.title.clone();
        tokio::spawn(async move {
            if let Err(e) = email_service
                .send_revision_filed_email(&recipient.email, &recipient.full_name, &title)
                .await
            {
                error!(error = %e, email = %recipient.email, "Failed to send revision filed email");
            }
        });
    }
}

/// POST /orders/{id}/documents - Record an uploaded document.
async fn upload_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UploadDocumentRequest>,
) -> impl IntoResponse {
    let orders = OrderRepository::new((*state.db).clone());
    let order = match orders.find_by_id(id).await {
        Ok(Some(order)) => {
            if !user.is_staff() && user.user_id() != order.client_id {
                return forbidden();
            }
            order
        }
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": "Order not found"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, order_id = %id, "Failed to load order");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to load order"
                })),
            )
                .into_response();
        }
    };

    // Only staff can mark uploads as work results
    let is_result = payload.is_result && user.is_staff();

    // A result landing on an already-completed order answers a revision
    let file_name = if is_result && OrderStatus::from(order.status) == OrderStatus::Completed {
        tag_revision_result(&payload.file_name)
    } else {
        payload.file_name
    };

    let repo = DocumentRepository::new((*state.db).clone());
    let input = CreateDocumentInput {
        order_id: id,
        uploader_id: user.user_id(),
        file_name,
        file_url: payload.file_url,
        file_type: payload.file_type,
        is_result,
    };

    match repo.create(input).await {
        Ok(document) => {
            info!(order_id = %id, document_id = %document.id, "Document recorded");
            (StatusCode::CREATED, Json(json!({ "document": document }))).into_response()
        }
        Err(DocumentError::OrderNotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Order not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, order_id = %id, "Failed to record document");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to record document"
                })),
            )
                .into_response()
        }
    }
}

/// Prefixes a revision deliverable's file name with the revision tag.
fn tag_revision_result(file_name: &str) -> String {
    if file_name.starts_with(REVISION_RESULT_TAG) {
        file_name.to_string()
    } else {
        format!("{REVISION_RESULT_TAG} {file_name}")
    }
}

/// Serializes an order detail the way the detail page consumes it.
fn order_detail_json(detail: &kantor_db::repositories::OrderDetail) -> serde_json::Value {
    json!({
        "order": detail.order,
        "client": {
            "id": detail.client.id,
            "full_name": detail.client.full_name,
            "email": detail.client.email,
        },
        "service": detail.service,
        "payment": detail.payment,
        "documents": detail.documents.iter().map(|d| json!({
            "document": d.document,
            "uploader_name": d.uploader_name,
        })).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_result_names_are_tagged() {
        assert_eq!(
            tag_revision_result("laporan-final.pdf"),
            "[REVISI] laporan-final.pdf"
        );
    }

    #[test]
    fn test_already_tagged_names_are_left_alone() {
        assert_eq!(
            tag_revision_result("[REVISI] laporan-final.pdf"),
            "[REVISI] laporan-final.pdf"
        );
    }
}
