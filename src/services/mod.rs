//! Business logic services (use cases).
//!
//! Services contain core business logic separated from HTTP handlers.
//! They validate input, open database transactions where several writes
//! must succeed together, and call into `repositories` for SQL.

pub mod account_service;
pub mod budget_service;
pub mod category_service;
pub mod investment_service;
pub mod master_service;
pub mod notification_service;
pub mod payment_service;
pub mod referral_service;
pub mod statistic_service;
pub mod subscription_service;
pub mod track_service;
pub mod transaction_service;
pub mod wallet_service;
