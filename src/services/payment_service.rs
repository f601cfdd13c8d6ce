//! Subscription payments through the Midtrans Snap gateway.
//!
//! # Flow
//!
//! 1. `checkout` opens a Snap transaction and stores the payment as
//!    `pending` with the token and redirect URL the client needs
//! 2. The customer pays on the gateway's page
//! 3. The gateway posts a status notification; `handle_notification`
//!    verifies its signature and moves the payment to its new status
//! 4. The first move into `settlement` activates the subscription
//!
//! Notifications may arrive more than once and out of order. Once a
//! payment reaches a final status, later notifications are acknowledged
//! without changing anything.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{AppError, AppResult, Resource},
    gateway::{
        PaymentGateway, SnapRequest,
        midtrans::{CustomerDetails, ItemDetails, TransactionDetails, notification_signature, signature_matches},
    },
    models::{
        Page, Pagination,
        notification::NotificationKind,
        payment::{NotificationAck, Payment, PaymentNotification, PaymentStatus, SubscriptionCheckoutRequest},
    },
    repositories::{
        account_repository, master_repository, payment_repository, payment_repository::NewPayment,
    },
    services::{notification_service, subscription_service},
};

/// Start a subscription purchase.
///
/// The gateway is called once, synchronously. Nothing is stored when it
/// fails.
///
/// # Errors
///
/// - `NotFound(Plan)`: unknown or retired plan
/// - `Gateway`: the gateway was unreachable or rejected the order
pub async fn checkout(
    pool: &DbPool,
    gateway: &dyn PaymentGateway,
    account_id: Uuid,
    request: SubscriptionCheckoutRequest,
) -> AppResult<Payment> {
    let plan = master_repository::find_active_plan(pool, request.plan_id)
        .await?
        .ok_or(AppError::NotFound(Resource::Plan))?;
    let account = account_repository::find_by_id(pool, account_id)
        .await?
        .ok_or(AppError::NotFound(Resource::Account))?;

    let order_id = new_order_id(Utc::now());
    let snap_request = SnapRequest {
        transaction_details: TransactionDetails {
            order_id: order_id.clone(),
            gross_amount: plan.price,
        },
        item_details: vec![ItemDetails {
            id: plan.code.clone(),
            price: plan.price,
            quantity: 1,
            name: plan.name.clone(),
        }],
        customer_details: CustomerDetails {
            first_name: account.name,
            email: account.email,
            phone: account.phone,
        },
    };

    let snap = gateway.create_transaction(&snap_request).await?;

    let payment = payment_repository::insert(
        pool,
        &NewPayment {
            account_id,
            plan_id: plan.id,
            order_id: &order_id,
            gross_amount: plan.price,
            snap_token: &snap.token,
            redirect_url: &snap.redirect_url,
            gateway_response: &snap.raw,
        },
    )
    .await?;

    tracing::info!(%account_id, %order_id, plan = %plan.code, "Checkout opened");
    Ok(payment)
}

/// Apply a gateway status notification.
///
/// The signature is checked before anything is read from the database.
///
/// # Errors
///
/// - `InvalidSignature`: signature does not match the server key
/// - `Validation`: unknown status or an amount that differs from the order
/// - `NotFound(Payment)`: unknown order id
pub async fn handle_notification(
    pool: &DbPool,
    server_key: &str,
    notification: PaymentNotification,
) -> AppResult<NotificationAck> {
    let expected = notification_signature(
        &notification.order_id,
        &notification.status_code,
        &notification.gross_amount,
        server_key,
    );
    if !signature_matches(&expected, &notification.signature_key) {
        tracing::warn!(order_id = %notification.order_id, "Rejected notification with bad signature");
        return Err(AppError::InvalidSignature);
    }

    let status = PaymentStatus::from_gateway(
        &notification.transaction_status,
        notification.fraud_status.as_deref(),
    )
    .ok_or_else(|| {
        AppError::invalid_field(
            "unsupported_transaction_status",
            format!("unsupported transaction_status {:?}", notification.transaction_status),
        )
    })?;

    let raw = serde_json::to_value(&notification)
        .map_err(|e| AppError::Internal(format!("notification serialization failed: {e}")))?;

    let mut tx = pool.begin().await?;

    let payment = payment_repository::lock_by_order_id(&mut *tx, &notification.order_id)
        .await?
        .ok_or(AppError::NotFound(Resource::Payment))?;

    if parse_gross_amount(&notification.gross_amount) != Some(payment.gross_amount) {
        return Err(AppError::invalid_field(
            "gross_amount_mismatch",
            "gross_amount does not match the order",
        ));
    }

    let current = PaymentStatus::from_str(&payment.status).map_err(AppError::Internal)?;
    if current.is_final() {
        tracing::debug!(order_id = %payment.order_id, status = %current, "Notification for settled order ignored");
        return Ok(NotificationAck {
            order_id: payment.order_id,
            status: current,
        });
    }

    payment_repository::update_status(
        &mut *tx,
        payment.id,
        status,
        notification.payment_type.as_deref(),
        &raw,
    )
    .await?;

    match status {
        PaymentStatus::Settlement => {
            let plan = master_repository::find_plan(&mut *tx, payment.plan_id)
                .await?
                .ok_or(AppError::NotFound(Resource::Plan))?;
            let ends_at =
                subscription_service::activate(&mut tx, payment.account_id, &plan, payment.id, Utc::now())
                    .await?;
            notification_service::notify(
                &mut *tx,
                payment.account_id,
                NotificationKind::PaymentSettled,
                "Payment received",
                &format!("{} is active until {}.", plan.name, ends_at.format("%Y-%m-%d")),
            )
            .await?;
        }
        PaymentStatus::Failed | PaymentStatus::Expired | PaymentStatus::Cancelled => {
            notification_service::notify(
                &mut *tx,
                payment.account_id,
                NotificationKind::PaymentFailed,
                "Payment not completed",
                &format!("Payment {} is {}.", payment.order_id, status),
            )
            .await?;
        }
        PaymentStatus::Pending => {}
    }

    tx.commit().await?;

    tracing::info!(order_id = %payment.order_id, from = %current, to = %status, "Payment status updated");
    Ok(NotificationAck {
        order_id: payment.order_id,
        status,
    })
}

pub async fn list(pool: &DbPool, account_id: Uuid, pagination: Pagination) -> AppResult<Page<Payment>> {
    let items = payment_repository::list(pool, account_id, pagination.limit(), pagination.offset()).await?;
    let total = payment_repository::count(pool, account_id).await?;
    Ok(Page::new(items, pagination, total))
}

pub async fn get(pool: &DbPool, account_id: Uuid, order_id: &str) -> AppResult<Payment> {
    payment_repository::find_for_account(pool, account_id, order_id)
        .await?
        .ok_or(AppError::NotFound(Resource::Payment))
}

/// `SUB-<utc timestamp>-<6 random hex digits>`, unique per checkout.
fn new_order_id(now: DateTime<Utc>) -> String {
    let suffix: u32 = rand::rng().random_range(0..0x100_0000);
    format!("SUB-{}-{suffix:06X}", now.format("%Y%m%d%H%M%S"))
}

/// Gateway amounts arrive as decimal strings (`"29000.00"`).
fn parse_gross_amount(value: &str) -> Option<i64> {
    let amount = Decimal::from_str(value.trim()).ok()?;
    if !amount.fract().is_zero() {
        return None;
    }
    amount.to_i64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn order_ids_are_prefixed_and_bounded() {
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 8, 30, 0).unwrap();
        let id = new_order_id(now);
        assert!(id.starts_with("SUB-20250115083000-"));
        assert_eq!(id.len(), "SUB-20250115083000-".len() + 6);
    }

    #[test]
    fn gross_amount_parsing() {
        assert_eq!(parse_gross_amount("29000.00"), Some(29_000));
        assert_eq!(parse_gross_amount("29000"), Some(29_000));
        assert_eq!(parse_gross_amount("29000.50"), None);
        assert_eq!(parse_gross_amount("abc"), None);
    }
}
