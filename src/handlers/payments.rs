//! Payment HTTP handlers.
//!
//! This module implements payment-related API endpoints:
//! - POST /api/v1/payments/subscriptions - Start a subscription checkout
//! - POST /api/v1/payments/notifications - Gateway status callback (public)
//! - GET /api/v1/payments - Own payments
//! - GET /api/v1/payments/{order_id} - One payment

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};

use crate::{
    db::DbPool,
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    gateway::PaymentGateway,
    middleware::auth::AuthContext,
    models::{
        Page, Pagination,
        payment::{NotificationAck, PaymentNotification, PaymentResponse, SubscriptionCheckoutRequest},
    },
    services::payment_service,
};

/// Start paying for a subscription plan.
///
/// # Request Body
///
/// ```json
/// { "plan_id": 1 }
/// ```
///
/// # Response (201)
///
/// ```json
/// {
///   "id": "990e8400-...",
///   "order_id": "SUB-20250115080000-3FA9C1",
///   "plan_id": 1,
///   "gross_amount": 29000,
///   "status": "pending",
///   "payment_type": null,
///   "snap_token": "66e4fa55-fdac-4ef9-91b5-733b97d1b862",
///   "redirect_url": "https://app.sandbox.midtrans.com/snap/v2/vtweb/66e4fa55-...",
///   "created_at": "2025-01-15T08:00:00Z",
///   "updated_at": "2025-01-15T08:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - 404 `plan_not_found`
/// - 500 `payment_gateway_error` when the gateway fails; nothing is stored
pub async fn create_subscription_payment(
    State(pool): State<DbPool>,
    State(gateway): State<Arc<dyn PaymentGateway>>,
    Extension(auth): Extension<AuthContext>,
    AppJson(request): AppJson<SubscriptionCheckoutRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), AppError> {
    let payment =
        payment_service::checkout(&pool, gateway.as_ref(), auth.account_id, request).await?;
    Ok((StatusCode::CREATED, Json(payment.into())))
}

/// Gateway status notification.
///
/// Not behind token auth; trust comes from `signature_key`, which must
/// equal `sha512(order_id + status_code + gross_amount + server_key)`.
/// A mismatch answers 403.
pub async fn handle_notification(
    State(pool): State<DbPool>,
    State(gateway): State<Arc<dyn PaymentGateway>>,
    AppJson(notification): AppJson<PaymentNotification>,
) -> Result<Json<NotificationAck>, AppError> {
    let ack = payment_service::handle_notification(&pool, gateway.server_key(), notification).await?;
    Ok(Json(ack))
}

pub async fn list_payments(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppQuery(pagination): AppQuery<Pagination>,
) -> Result<Json<Page<PaymentResponse>>, AppError> {
    let page = payment_service::list(&pool, auth.account_id, pagination).await?;
    Ok(Json(page.map(Into::into)))
}

pub async fn get_payment(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppPath(order_id): AppPath<String>,
) -> Result<Json<PaymentResponse>, AppError> {
    let payment = payment_service::get(&pool, auth.account_id, &order_id).await?;
    Ok(Json(payment.into()))
}
