//! HTTP router and shared application state.

use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    auth::JwtKeys, config::Config, db::DbPool, gateway::PaymentGateway, handlers,
    middleware::auth::auth_middleware,
};

/// State shared by every handler. Handlers extract the part they need
/// (`State<DbPool>`, `State<JwtKeys>`, ...).
#[derive(Clone, FromRef)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
    pub jwt: JwtKeys,
    pub gateway: Arc<dyn PaymentGateway>,
}

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    // Routes below require a valid bearer token
    let authenticated_routes = Router::new()
        // Accounts
        .route(
            "/api/v1/accounts",
            delete(handlers::accounts::delete_account),
        )
        .route(
            "/api/v1/accounts/profile",
            get(handlers::accounts::get_profile).patch(handlers::accounts::update_profile),
        )
        .route(
            "/api/v1/accounts/password",
            patch(handlers::accounts::change_password),
        )
        .route("/api/v1/tracks", get(handlers::tracks::list_tracks))
        .route("/api/v1/masters/{kind}", get(handlers::masters::list_master))
        // Categories
        .route(
            "/api/v1/categories",
            get(handlers::categories::list_categories_v1),
        )
        .route(
            "/api/v2/categories",
            get(handlers::categories::list_categories_v2)
                .post(handlers::categories::create_personal_category),
        )
        .route(
            "/api/v2/categories/{id}",
            patch(handlers::categories::update_personal_category)
                .delete(handlers::categories::delete_personal_category),
        )
        // Wallets
        .route(
            "/api/v1/wallets",
            post(handlers::wallets::create_wallet).get(handlers::wallets::list_wallets),
        )
        .route(
            "/api/v1/wallets/{id}",
            get(handlers::wallets::get_wallet)
                .patch(handlers::wallets::update_wallet)
                .delete(handlers::wallets::delete_wallet),
        )
        // Transactions
        .route(
            "/api/v1/transactions",
            post(handlers::transactions::create_transaction)
                .get(handlers::transactions::list_transactions),
        )
        .route(
            "/api/v1/transactions/transfer",
            post(handlers::transactions::create_transfer),
        )
        .route(
            "/api/v1/transactions/{id}",
            get(handlers::transactions::get_transaction)
                .delete(handlers::transactions::delete_transaction),
        )
        // Budgets
        .route(
            "/api/v1/budgets",
            post(handlers::budgets::create_budget).get(handlers::budgets::list_budgets),
        )
        .route(
            "/api/v1/budgets/{id}",
            get(handlers::budgets::get_budget)
                .patch(handlers::budgets::update_budget)
                .delete(handlers::budgets::delete_budget),
        )
        // Investments
        .route("/api/v1/investments", get(handlers::investments::list_investments))
        .route("/api/v1/investments/buy", post(handlers::investments::buy))
        .route("/api/v1/investments/sell", post(handlers::investments::sell))
        .route(
            "/api/v1/investments/portfolio",
            get(handlers::investments::portfolio),
        )
        // Referrals
        .route("/api/v1/referrals", get(handlers::referrals::get_referral))
        .route(
            "/api/v1/referrals/apply",
            post(handlers::referrals::apply_referral),
        )
        .route("/api/v1/referrals/tiers", get(handlers::referrals::get_tiers))
        // Subscriptions and payments
        .route(
            "/api/v1/subscriptions/plans",
            get(handlers::subscriptions::list_plans),
        )
        .route(
            "/api/v1/subscriptions/me",
            get(handlers::subscriptions::my_subscription),
        )
        .route(
            "/api/v1/payments/subscriptions",
            post(handlers::payments::create_subscription_payment),
        )
        .route("/api/v1/payments", get(handlers::payments::list_payments))
        .route(
            "/api/v1/payments/{order_id}",
            get(handlers::payments::get_payment),
        )
        // Statistics
        .route(
            "/api/v1/statistics/summary",
            get(handlers::statistics::summary),
        )
        .route(
            "/api/v1/statistics/categories",
            get(handlers::statistics::categories),
        )
        .route("/api/v1/statistics/trend", get(handlers::statistics::trend))
        // Notifications
        .route(
            "/api/v1/notifications",
            get(handlers::notifications::list_notifications),
        )
        .route(
            "/api/v1/notifications/unread-count",
            get(handlers::notifications::unread_count),
        )
        .route(
            "/api/v1/notifications/read-all",
            patch(handlers::notifications::mark_all_read),
        )
        .route(
            "/api/v1/notifications/{id}",
            delete(handlers::notifications::delete_notification),
        )
        .route(
            "/api/v1/notifications/{id}/read",
            patch(handlers::notifications::mark_read),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let mut app = Router::new()
        // Public routes (no authentication required)
        .route("/health", get(handlers::health::health_check))
        .route("/api/v1/accounts/sign-up", post(handlers::accounts::sign_up))
        .route("/api/v1/accounts/sign-in", post(handlers::accounts::sign_in))
        // Trusted through the payload signature instead of a token
        .route(
            "/api/v1/payments/notifications",
            post(handlers::payments::handle_notification),
        )
        .merge(authenticated_routes)
        .layer(TraceLayer::new_for_http());

    if state.config.cors_allow_any {
        app = app.layer(CorsLayer::permissive());
    }

    app.with_state(state)
}
