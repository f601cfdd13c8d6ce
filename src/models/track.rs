//! Sign-in activity records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One successful sign-in, from the `tracks` table.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Track {
    pub id: Uuid,
    #[serde(skip)]
    pub account_id: Uuid,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Client details captured at sign-in.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}
