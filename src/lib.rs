//! Personal finance back-end: accounts, wallets, transactions, budgets,
//! investments, referrals and paid subscriptions over a JSON HTTP API.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: HS256 bearer tokens, bcrypt password hashes
//! - **Payments**: Midtrans Snap behind the [`gateway::PaymentGateway`] trait
//!
//! Requests flow handlers -> services -> repositories. Services own the
//! business rules and transactions; repositories hold the SQL.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod validation;

pub use routes::{AppState, build_router};
