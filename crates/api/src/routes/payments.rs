//! Payment routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::middleware::auth::{AuthUser, forbidden};
use kantor_core::order::PaymentStatus;
use kantor_db::{
    ActivityLogRepository, OrderRepository, PaymentRepository,
    repositories::{PaymentError, UpdatePaymentInput},
};

/// Creates the payment router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments", get(list_payments).post(create_payment))
        .route("/payments/{id}", put(update_payment))
        .route("/payments/order/{order_id}", get(get_payment_for_order))
}

/// Request body for creating a payment.
#[derive(Debug, Deserialize)]
struct CreatePaymentRequest {
    order_id: Uuid,
    amount: Decimal,
    payment_method: Option<String>,
    proof_url: Option<String>,
}

/// Request body for updating a payment.
#[derive(Debug, Deserialize)]
struct UpdatePaymentRequest {
    status: Option<String>,
    payment_method: Option<String>,
    proof_url: Option<String>,
    paid_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// POST /payments - Create the payment record for an order.
async fn create_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePaymentRequest>,
) -> impl IntoResponse {
    // The order's owner submits the payment; staff may record one too
    let orders = OrderRepository::new((*state.db).clone());
    match orders.find_by_id(payload.order_id).await {
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
            error!(error = %e, order_id = %payload.order_id, "Failed to load order");
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

    let repo = PaymentRepository::new((*state.db).clone());
    match repo
        .create(
            payload.order_id,
            payload.amount,
            payload.payment_method,
            payload.proof_url,
        )
        .await
    {
        Ok(payment) => {
            info!(payment_id = %payment.id, order_id = %payload.order_id, "Payment created");
            (StatusCode::CREATED, Json(json!({ "payment": payment }))).into_response()
        }
        Err(PaymentError::DuplicatePayment(_)) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "duplicate_payment",
                "message": "This order already has a payment"
            })),
        )
            .into_response(),
        Err(PaymentError::OrderNotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Order not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, order_id = %payload.order_id, "Failed to create payment");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to create payment"
                })),
            )
                .into_response()
        }
    }
}

/// PUT /payments/{id} - Update a payment; marking it PAID also moves the
/// parent order to PAID in the same transaction (admin only).
async fn update_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentRequest>,
) -> impl IntoResponse {
    if !user.is_admin() {
        return forbidden();
    }

    let status = match payload.status.as_deref() {
        None => None,
        Some(raw) => match PaymentStatus::from_str(raw) {
            Ok(s) => Some(s),
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "validation_error",
                        "message": format!("Unknown payment status: {raw}")
                    })),
                )
                    .into_response();
            }
        },
    };
    let becomes_paid = status == Some(PaymentStatus::Paid);

    let repo = PaymentRepository::new((*state.db).clone());
    let input = UpdatePaymentInput {
        status,
        payment_method: payload.payment_method,
        proof_url: payload.proof_url,
        paid_at: payload.paid_at,
    };

    let payment = match repo.update(id, input).await {
        Ok(p) => p,
        Err(PaymentError::NotFound(_)) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": "Payment not found"
                })),
            )
                .into_response();
        }
        Err(PaymentError::Flow(e)) => {
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
            error!(error = %e, payment_id = %id, "Failed to update payment");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to update payment"
                })),
            )
                .into_response();
        }
    };

    info!(payment_id = %id, verified_by = %user.user_id(), "Payment updated");

    if becomes_paid {
        let activity = ActivityLogRepository::new((*state.db).clone());
        if let Err(e) = activity
            .record(
                user.user_id(),
                "PAYMENT_VERIFIED",
                Some(format!("payment {id}")),
            )
            .await
        {
            error!(error = %e, payment_id = %id, "Failed to record payment activity");
        }

        notify_payment_verified(&state, payment.order_id).await;
    }

    (StatusCode::OK, Json(json!({ "payment": payment }))).into_response()
}

/// Dispatches the verification email after the transaction committed.
async fn notify_payment_verified(state: &AppState, order_id: Uuid) {
    let orders = OrderRepository::new((*state.db).clone());
    let Ok(detail) = orders.get_detail(order_id).await else {
        return;
    };

    let email_service = state.email_service.clone();
    tokio::spawn(async move {
        if let Err(e) = email_service
            .send_payment_verified_email(
                &detail.client.email,
                &detail.client.full_name,
                &detail.service.name,
            )
            .await
        {
            error!(error = %e, email = %detail.client.email, "Failed to send payment verified email");
        }
    });
}

/// GET /payments - List all payments with order context (admin only).
async fn list_payments(State(state): State<AppState>, user: AuthUser) -> impl IntoResponse {
    if !user.is_admin() {
        return forbidden();
    }

    let repo = PaymentRepository::new((*state.db).clone());
    match repo.list_all().await {
        Ok(payments) => {
            let body: Vec<_> = payments
                .iter()
                .map(|entry| {
                    json!({
                        "payment": entry.payment,
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
            (StatusCode::OK, Json(json!({ "payments": body }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list payments");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to list payments"
                })),
            )
                .into_response()
        }
    }
}

/// GET /payments/order/{order_id} - Payment for an order (owner or staff).
async fn get_payment_for_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    let orders = OrderRepository::new((*state.db).clone());
    match orders.find_by_id(order_id).await {
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
            error!(error = %e, order_id = %order_id, "Failed to load order");
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

    let repo = PaymentRepository::new((*state.db).clone());
    match repo.find_by_order(order_id).await {
        Ok(Some(payment)) => (StatusCode::OK, Json(json!({ "payment": payment }))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "No payment for this order"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, order_id = %order_id, "Failed to load payment");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to load payment"
                })),
            )
                .into_response()
        }
    }
}
