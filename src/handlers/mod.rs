//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Extracts the request (JSON body, query, path, auth context)
//! 2. Calls the matching service
//! 3. Returns the JSON response and status code

pub mod accounts;
pub mod budgets;
pub mod categories;
pub mod health;
pub mod investments;
pub mod masters;
pub mod notifications;
pub mod payments;
pub mod referrals;
pub mod statistics;
pub mod subscriptions;
pub mod tracks;
pub mod transactions;
pub mod wallets;
