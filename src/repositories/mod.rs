//! SQL access, one module per feature area.
//!
//! Repository functions are generic over [`sqlx::PgExecutor`] so the same
//! query runs against the pool or inside a transaction opened by a service
//! (`&mut *tx`). They return raw `sqlx::Error`s; services decide what a
//! missing row or a constraint violation means.

pub mod account_repository;
pub mod budget_repository;
pub mod category_repository;
pub mod investment_repository;
pub mod master_repository;
pub mod notification_repository;
pub mod payment_repository;
pub mod referral_repository;
pub mod statistic_repository;
pub mod subscription_repository;
pub mod track_repository;
pub mod transaction_repository;
pub mod wallet_repository;
