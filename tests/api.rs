//! HTTP-level tests.
//!
//! The first tests run against a pool that never connects and cover
//! requests rejected before any query. The rest need a Postgres database in
//! `TEST_DATABASE_URL` and are ignored by default; run them with
//! `cargo test -- --ignored`.

use axum::http::StatusCode;
use chrono::Utc;
use fintrack_server::{
    auth::JwtKeys,
    db,
    gateway::midtrans::notification_signature,
    models::account::AccountTier,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use uuid::Uuid;

mod common;

use common::{
    JWT_SECRET, SERVER_KEY, app_with_pool, app_without_db, first_error_code, get_with_authorization, send,
};

#[tokio::test]
async fn protected_route_without_token_is_unauthorized() {
    let app = app_without_db();
    let (status, body) = send(&app, "GET", "/api/v1/wallets", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(first_error_code(&body), "invalid_token");
}

#[tokio::test]
async fn only_bearer_authorization_is_accepted() {
    let app = app_without_db();
    for value in ["Basic YnVkaTpzM2NyZXRwYXNz", "Bearer", "eyJhbGciOiJIUzI1NiJ9.e30.x", "Token abc"] {
        let (status, body) = get_with_authorization(&app, "/api/v1/wallets", value).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{value}");
        assert_eq!(first_error_code(&body), "invalid_token");
    }
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let app = app_without_db();
    let other = JwtKeys::new("a-completely-different-secret-0123456789", 60);
    let (token, _) = other
        .issue(Uuid::new_v4(), "budi@example.com", AccountTier::Free, Utc::now())
        .unwrap();

    let (status, _) = send(&app, "GET", "/api/v1/accounts/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = app_without_db();
    let keys = JwtKeys::new(JWT_SECRET, 60);
    let (token, _) = keys
        .issue(
            Uuid::new_v4(),
            "budi@example.com",
            AccountTier::Free,
            Utc::now() - chrono::Duration::hours(3),
        )
        .unwrap();

    let (status, _) = send(&app, "GET", "/api/v1/notifications", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn sign_up_reports_every_invalid_field() {
    let app = app_without_db();
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/accounts/sign-up",
        None,
        Some(json!({ "name": " ", "email": "not-an-email", "password": "short" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let codes: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["error_code"].as_str())
        .collect();
    assert_eq!(codes, ["name_required", "invalid_email", "weak_password"]);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = app_without_db();
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/accounts/sign-in",
        None,
        Some(json!({ "email": "budi@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(first_error_code(&body), "invalid_body");
}

#[tokio::test]
async fn payment_notification_with_bad_signature_is_forbidden() {
    let app = app_without_db();
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/payments/notifications",
        None,
        Some(json!({
            "order_id": "SUB-20250115080000-3FA9C1",
            "status_code": "200",
            "gross_amount": "29000.00",
            "signature_key": "deadbeef",
            "transaction_status": "settlement"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(first_error_code(&body), "invalid_signature");
}

async fn db_app() -> axum::Router {
    let url = std::env::var("TEST_DATABASE_URL").unwrap();
    let pool = db::create_pool(&url, 5).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    app_with_pool(pool, &url)
}

fn unique_email(name: &str) -> String {
    format!("{name}-{}@example.com", Uuid::new_v4().simple())
}

/// Sign up, optionally with a referral code, and return the sign-up body.
async fn sign_up(app: &axum::Router, email: &str, referral_code: Option<&str>) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/accounts/sign-up",
        None,
        Some(json!({
            "name": "Budi Santoso",
            "email": email,
            "password": "s3cretpass",
            "referral_code": referral_code
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

async fn sign_in(app: &axum::Router, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/accounts/sign-in",
        None,
        Some(json!({ "email": email, "password": "s3cretpass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

async fn sign_up_and_in(app: &axum::Router, email: &str) -> String {
    sign_up(app, email, None).await;
    sign_in(app, email).await
}

async fn master_id(app: &axum::Router, token: Option<&str>, kind: &str, code: &str) -> Value {
    let (_, items) = send(app, "GET", &format!("/api/v1/masters/{kind}"), token, None).await;
    id_named(&items, "code", code).clone()
}

async fn category_id(app: &axum::Router, token: Option<&str>, transaction_type: &str, name: &str) -> Value {
    let uri = format!("/api/v1/categories?transaction_type={transaction_type}");
    let (_, categories) = send(app, "GET", &uri, token, None).await;
    id_named(&categories, "name", name).clone()
}

async fn create_wallet(app: &axum::Router, token: Option<&str>, name: &str, wallet_type_id: &Value, balance: i64) -> Value {
    let (status, wallet) = send(
        app,
        "POST",
        "/api/v1/wallets",
        token,
        Some(json!({ "name": name, "wallet_type_id": wallet_type_id, "initial_balance": balance })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{wallet}");
    wallet
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

fn id_named<'a>(items: &'a Value, key: &str, value: &str) -> &'a Value {
    &items
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item[key] == value)
        .unwrap()["id"]
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn full_money_flow() {
    let app = db_app().await;

    let token = sign_up_and_in(&app, &unique_email("budi")).await;
    let token = Some(token.as_str());

    let (_, wallet_types) = send(&app, "GET", "/api/v1/masters/wallet-types", token, None).await;
    let cash_type = id_named(&wallet_types, "code", "cash").clone();
    let (_, categories) = send(
        &app,
        "GET",
        "/api/v1/categories?transaction_type=spending",
        token,
        None,
    )
    .await;
    let food = id_named(&categories, "name", "Food & Drink").clone();

    // Two wallets, the free tier limit
    let (status, cash) = send(
        &app,
        "POST",
        "/api/v1/wallets",
        token,
        Some(json!({ "name": "Cash", "wallet_type_id": cash_type, "initial_balance": 100000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, bank) = send(
        &app,
        "POST",
        "/api/v1/wallets",
        token,
        Some(json!({ "name": "Bank", "wallet_type_id": cash_type })),
    )
    .await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/wallets",
        token,
        Some(json!({ "name": "Third", "wallet_type_id": cash_type })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(first_error_code(&body), "wallet_limit_reached");

    // Budget of 50000 on food, then spend 60000 of it
    let period = Utc::now().format("%Y-%m").to_string();
    let (status, budget) = send(
        &app,
        "POST",
        "/api/v1/budgets",
        token,
        Some(json!({ "category_id": food, "period": period, "amount": 50000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, spending) = send(
        &app,
        "POST",
        "/api/v1/transactions",
        token,
        Some(json!({
            "wallet_id": cash["id"],
            "transaction_type": "spending",
            "amount": 60000,
            "category_id": food,
            "note": "team lunch"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(spending["detail"]["note"], "team lunch");

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/transactions",
        token,
        Some(json!({
            "wallet_id": cash["id"],
            "transaction_type": "spending",
            "amount": 50000,
            "category_id": food
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(first_error_code(&body), "insufficient_balance");

    let uri = format!("/api/v1/budgets/{}", budget["id"].as_str().unwrap());
    let (_, budget) = send(&app, "GET", &uri, token, None).await;
    assert_eq!(budget["spent"], 60000);
    assert_eq!(budget["is_exceeded"], true);

    let (_, unread) = send(&app, "GET", "/api/v1/notifications/unread-count", token, None).await;
    // welcome plus budget exceeded
    assert_eq!(unread["unread"], 2);

    // Transfer the rest to the bank wallet
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/transactions/transfer",
        token,
        Some(json!({
            "from_wallet_id": cash["id"],
            "to_wallet_id": bank["id"],
            "amount": 40000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, wallets) = send(&app, "GET", "/api/v1/wallets", token, None).await;
    let balances: Vec<i64> = wallets
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["balance"].as_i64().unwrap())
        .collect();
    assert_eq!(balances.iter().sum::<i64>(), 40000);
    assert!(balances.contains(&0));

    // Deleting the spending puts the money back
    let uri = format!("/api/v1/transactions/{}", spending["id"].as_str().unwrap());
    let (status, _) = send(&app, "DELETE", &uri, token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let uri = format!("/api/v1/wallets/{}", cash["id"].as_str().unwrap());
    let (_, cash) = send(&app, "GET", &uri, token, None).await;
    assert_eq!(cash["balance"], 60000);

    // Subscription checkout settled by a signed notification
    let (_, plans) = send(&app, "GET", "/api/v1/subscriptions/plans", token, None).await;
    let monthly = id_named(&plans, "code", "premium_monthly").clone();
    let (status, payment) = send(
        &app,
        "POST",
        "/api/v1/payments/subscriptions",
        token,
        Some(json!({ "plan_id": monthly })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payment["status"], "pending");

    let order_id = payment["order_id"].as_str().unwrap();
    let notification = json!({
        "order_id": order_id,
        "status_code": "200",
        "gross_amount": "29000.00",
        "signature_key": notification_signature(order_id, "200", "29000.00", SERVER_KEY),
        "transaction_status": "settlement",
        "payment_type": "bank_transfer"
    });
    let (status, ack) = send(
        &app,
        "POST",
        "/api/v1/payments/notifications",
        None,
        Some(notification.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["status"], "settlement");

    // Redelivery changes nothing
    let (status, _) = send(&app, "POST", "/api/v1/payments/notifications", None, Some(notification)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, me) = send(&app, "GET", "/api/v1/subscriptions/me", token, None).await;
    assert_eq!(me["role"], "premium");
    assert_eq!(me["history"].as_array().unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn deleted_account_token_is_rejected() {
    let app = db_app().await;
    let token = sign_up_and_in(&app, &unique_email("deleted")).await;
    let token = Some(token.as_str());

    let (status, _) = send(&app, "GET", "/api/v1/wallets", token, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", "/api/v1/accounts", token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The token is still within its lifetime but the account is gone
    let (status, body) = send(&app, "GET", "/api/v1/wallets", token, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(first_error_code(&body), "invalid_token");

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/transactions",
        token,
        Some(json!({
            "wallet_id": Uuid::new_v4(),
            "transaction_type": "income",
            "amount": 1000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(first_error_code(&body), "invalid_token");
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn lookups_reject_unknown_kind_and_bad_ids() {
    let app = db_app().await;
    let token = sign_up_and_in(&app, &unique_email("lookup")).await;
    let token = Some(token.as_str());

    let (status, body) = send(&app, "GET", "/api/v1/masters/planets", token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(first_error_code(&body), "master_not_found");

    let (status, _) = send(&app, "GET", "/api/v1/wallets/not-a-uuid", token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/v1/wallets/{}", Uuid::new_v4());
    let (status, body) = send(&app, "GET", &uri, token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(first_error_code(&body), "wallet_not_found");
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn referral_apply_and_tiers() {
    let app = db_app().await;

    let ani_email = unique_email("ani");
    let ani = sign_up(&app, &ani_email, None).await;
    let ani_token = sign_in(&app, &ani_email).await;
    let ani_token = Some(ani_token.as_str());
    let ani_code = ani["referral_code"].as_str().unwrap().to_string();

    let budi_email = unique_email("budi");
    let budi = sign_up(&app, &budi_email, None).await;
    let budi_token = sign_in(&app, &budi_email).await;
    let budi_token = Some(budi_token.as_str());
    let budi_code = budi["referral_code"].as_str().unwrap().to_string();

    // Own code
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/referrals/apply",
        ani_token,
        Some(json!({ "referral_code": ani_code })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(first_error_code(&body), "self_referral");

    // Unknown code
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/referrals/apply",
        budi_token,
        Some(json!({ "referral_code": "ZZZZZZZZ" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(first_error_code(&body), "referral_code_not_found");

    // Budi joins under Ani; codes are matched case-insensitively
    let (status, overview) = send(
        &app,
        "POST",
        "/api/v1/referrals/apply",
        budi_token,
        Some(json!({ "referral_code": ani_code.to_lowercase() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["referred_by"], ani_code.as_str());

    // A second referrer is refused
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/referrals/apply",
        budi_token,
        Some(json!({ "referral_code": ani_code })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(first_error_code(&body), "referral_already_applied");

    // Citra signs up under Budi, two levels below Ani
    let citra = sign_up(&app, &unique_email("citra"), Some(&budi_code)).await;
    let citra_code = citra["referral_code"].as_str().unwrap().to_string();

    // Ani joining under her own downline would close a loop
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/referrals/apply",
        ani_token,
        Some(json!({ "referral_code": citra_code })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(first_error_code(&body), "referral_cycle");

    let (_, overview) = send(&app, "GET", "/api/v1/referrals", ani_token, None).await;
    assert_eq!(overview["direct_referrals"], 1);
    assert_eq!(overview["referred_by"], Value::Null);

    let (status, tiers) = send(&app, "GET", "/api/v1/referrals/tiers", ani_token, None).await;
    assert_eq!(status, StatusCode::OK);
    let tiers_list = tiers["tiers"].as_array().unwrap();
    assert_eq!(tiers_list.len(), 3);
    assert_eq!(tiers_list[0]["level"], 1);
    assert_eq!(tiers_list[0]["rate_bps"], 1000);
    assert_eq!(tiers_list[0]["members"][0]["account_id"], budi["account_id"]);
    assert_eq!(tiers_list[1]["members"][0]["account_id"], citra["account_id"]);
    assert_eq!(tiers_list[1]["members"].as_array().unwrap().len(), 1);
    assert!(tiers_list[2]["members"].as_array().unwrap().is_empty());
    // Nobody has paid yet
    assert_eq!(tiers_list[0]["subscribed_members"], 0);
    assert_eq!(tiers["total_commission"], 0);
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn investment_orders_and_portfolio() {
    let app = db_app().await;
    let token = sign_up_and_in(&app, &unique_email("investor")).await;
    let token = Some(token.as_str());

    let investment_type = master_id(&app, token, "wallet-types", "investment").await;
    let cash_type = master_id(&app, token, "wallet-types", "cash").await;
    let gold = master_id(&app, token, "investment-items", "gold").await;

    let broker = create_wallet(&app, token, "Broker", &investment_type, 100_000).await;
    let cash = create_wallet(&app, token, "Cash", &cash_type, 10_000).await;

    let order = |wallet: &Value, quantity: &str, price: i64| {
        json!({
            "wallet_id": wallet["id"],
            "investment_item_id": gold,
            "quantity": quantity,
            "price_per_unit": price
        })
    };

    // Orders only go through investment wallets
    let (status, body) = send(&app, "POST", "/api/v1/investments/buy", token, Some(order(&cash, "1", 1_000))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(first_error_code(&body), "invalid_wallet_type");

    let (status, first) = send(&app, "POST", "/api/v1/investments/buy", token, Some(order(&broker, "2", 10_000))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["amount"], 20_000);
    let (status, _) = send(&app, "POST", "/api/v1/investments/buy", token, Some(order(&broker, "2", 20_000))).await;
    assert_eq!(status, StatusCode::CREATED);

    // 4 grams held, selling 5 is refused
    let (status, body) = send(&app, "POST", "/api/v1/investments/sell", token, Some(order(&broker, "5", 25_000))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(first_error_code(&body), "insufficient_holding");

    let (status, sold) = send(&app, "POST", "/api/v1/investments/sell", token, Some(order(&broker, "1", 25_000))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sold["side"], "sell");

    // 100000 - 20000 - 40000 + 25000
    let uri = format!("/api/v1/wallets/{}", broker["id"].as_str().unwrap());
    let (_, wallet) = send(&app, "GET", &uri, token, None).await;
    assert_eq!(wallet["balance"], 65_000);

    // Average cost of 15000 per gram survives the sell
    let (status, portfolio) = send(&app, "GET", "/api/v1/investments/portfolio", token, None).await;
    assert_eq!(status, StatusCode::OK);
    let holding = &portfolio["holdings"][0];
    assert_eq!(holding["investment_item_id"], gold);
    assert_eq!(decimal(&holding["quantity"]), dec!(3));
    assert_eq!(holding["cost_basis"], 45_000);
    assert_eq!(decimal(&holding["average_price"]), dec!(15000));
    assert_eq!(portfolio["total_cost_basis"], 45_000);

    // Orders live in history but cannot be deleted from it
    let uri = format!("/api/v1/transactions/{}", sold["transaction_id"].as_str().unwrap());
    let (status, body) = send(&app, "DELETE", &uri, token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(first_error_code(&body), "investment_transaction");
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn personal_categories_are_private() {
    let app = db_app().await;
    let owner = sign_up_and_in(&app, &unique_email("owner")).await;
    let owner = Some(owner.as_str());
    let other = sign_up_and_in(&app, &unique_email("other")).await;
    let other = Some(other.as_str());

    let (status, category) = send(
        &app,
        "POST",
        "/api/v2/categories",
        owner,
        Some(json!({ "transaction_type": "spending", "name": "  Pets ", "icon": "paw" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(category["name"], "Pets");
    let uri = format!("/api/v2/categories/{}", category["id"].as_str().unwrap());

    let (status, listing) = send(&app, "GET", "/api/v2/categories", owner, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["personal"].as_array().unwrap().len(), 1);
    assert!(!listing["categories"].as_array().unwrap().is_empty());

    let (status, updated) = send(&app, "PATCH", &uri, owner, Some(json!({ "name": "Pet care" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Pet care");
    assert_eq!(updated["icon"], "paw");

    // Another account sees nothing and can change nothing
    let (_, listing) = send(&app, "GET", "/api/v2/categories", other, None).await;
    assert!(listing["personal"].as_array().unwrap().is_empty());
    let (status, body) = send(&app, "PATCH", &uri, other, Some(json!({ "name": "Mine" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(first_error_code(&body), "category_not_found");
    let (status, _) = send(&app, "DELETE", &uri, other, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let cash_type = master_id(&app, other, "wallet-types", "cash").await;
    let wallet = create_wallet(&app, other, "Cash", &cash_type, 5_000).await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/transactions",
        other,
        Some(json!({
            "wallet_id": wallet["id"],
            "transaction_type": "spending",
            "amount": 1000,
            "personal_category_id": category["id"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(first_error_code(&body), "category_not_found");

    let (status, _) = send(&app, "DELETE", &uri, owner, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &uri, owner, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn statistics_for_the_current_month() {
    let app = db_app().await;
    let token = sign_up_and_in(&app, &unique_email("stats")).await;
    let token = Some(token.as_str());

    let cash_type = master_id(&app, token, "wallet-types", "cash").await;
    let investment_type = master_id(&app, token, "wallet-types", "investment").await;
    let gold = master_id(&app, token, "investment-items", "gold").await;
    let salary = category_id(&app, token, "income", "Salary").await;
    let food = category_id(&app, token, "spending", "Food & Drink").await;
    let bills = category_id(&app, token, "spending", "Bills").await;

    let cash = create_wallet(&app, token, "Cash", &cash_type, 0).await;
    let broker = create_wallet(&app, token, "Broker", &investment_type, 0).await;

    for (transaction_type, amount, category) in [
        ("income", 100_000, &salary),
        ("spending", 30_000, &food),
        ("spending", 10_000, &bills),
    ] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/transactions",
            token,
            Some(json!({
                "wallet_id": cash["id"],
                "transaction_type": transaction_type,
                "amount": amount,
                "category_id": category
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/transactions/transfer",
        token,
        Some(json!({ "from_wallet_id": cash["id"], "to_wallet_id": broker["id"], "amount": 20_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/investments/buy",
        token,
        Some(json!({
            "wallet_id": broker["id"],
            "investment_item_id": gold,
            "quantity": "1",
            "price_per_unit": 15_000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, summary) = send(&app, "GET", "/api/v1/statistics/summary", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["income"], 100_000);
    assert_eq!(summary["spending"], 40_000);
    assert_eq!(summary["net"], 60_000);
    assert_eq!(summary["investment_out"], 15_000);
    assert_eq!(summary["investment_in"], 0);
    assert_eq!(summary["net_investment"], 15_000);
    // three categorized, one transfer, one buy
    assert_eq!(summary["transaction_count"], 5);
    assert_eq!(summary["total_balance"], 45_000);

    let (status, breakdown) = send(&app, "GET", "/api/v1/statistics/categories", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(breakdown["transaction_type"], "spending");
    assert_eq!(breakdown["total"], 40_000);
    assert_eq!(breakdown["categories"][0]["category_name"], "Food & Drink");
    assert_eq!(breakdown["categories"][0]["percentage"], 75.0);
    assert_eq!(breakdown["categories"][1]["percentage"], 25.0);

    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/statistics/categories?transaction_type=transfer",
        token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(first_error_code(&body), "invalid_transaction_type");

    let (status, trend) = send(&app, "GET", "/api/v1/statistics/trend?months=3", token, None).await;
    assert_eq!(status, StatusCode::OK);
    let months = trend["months"].as_array().unwrap();
    assert_eq!(months.len(), 3);
    assert_eq!(months[0]["income"], 0);
    assert_eq!(months[2]["period"], summary["period"]);
    assert_eq!(months[2]["net"], 60_000);

    let (status, _) = send(&app, "GET", "/api/v1/statistics/trend?months=25", token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "needs TEST_DATABASE_URL"]
async fn wallet_with_money_cannot_be_deleted() {
    let app = db_app().await;
    let token = sign_up_and_in(&app, &unique_email("wallets")).await;
    let token = Some(token.as_str());

    let cash_type = master_id(&app, token, "wallet-types", "cash").await;
    let cash = create_wallet(&app, token, "Cash", &cash_type, 5_000).await;
    let spare = create_wallet(&app, token, "Spare", &cash_type, 0).await;

    let uri = format!("/api/v1/wallets/{}", cash["id"].as_str().unwrap());
    let (status, body) = send(&app, "DELETE", &uri, token, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(first_error_code(&body), "wallet_not_empty");

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/transactions/transfer",
        token,
        Some(json!({ "from_wallet_id": cash["id"], "to_wallet_id": spare["id"], "amount": 5_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, "DELETE", &uri, token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &uri, token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The freed slot can be used again under the free tier limit
    create_wallet(&app, token, "Savings", &cash_type, 0).await;
}
