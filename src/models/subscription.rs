//! Subscription plans and subscription periods.

use chrono::{DateTime, Months, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::account::AccountTier;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct SubscriptionPlan {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub price: i64,
    pub duration_months: i32,
    #[serde(skip)]
    pub is_active: bool,
}

/// One paid subscription period.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Subscription {
    pub id: Uuid,
    #[serde(skip)]
    pub account_id: Uuid,
    pub plan_id: i32,
    pub plan_name: String,
    pub payment_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MySubscriptionResponse {
    pub role: AccountTier,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub history: Vec<Subscription>,
}

/// Period granted by a new purchase.
///
/// A purchase made while still subscribed stacks on top of the current
/// expiry; otherwise it starts now. Returns `None` if the end date
/// overflows the calendar.
pub fn extend_subscription(
    current_expiry: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    duration_months: u32,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let starts_at = match current_expiry {
        Some(expiry) if expiry > now => expiry,
        _ => now,
    };
    let ends_at = starts_at.checked_add_months(Months::new(duration_months))?;
    Some((starts_at, ends_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fresh_purchase_starts_now() {
        let now = Utc.with_ymd_and_hms(2025, 1, 31, 10, 0, 0).unwrap();
        let (start, end) = extend_subscription(None, now, 1).unwrap();
        assert_eq!(start, now);
        // month arithmetic clamps to the last day of February
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 2, 28, 10, 0, 0).unwrap());
    }

    #[test]
    fn active_subscription_is_extended() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let expiry = Utc.with_ymd_and_hms(2025, 3, 20, 0, 0, 0).unwrap();
        let (start, end) = extend_subscription(Some(expiry), now, 3).unwrap();
        assert_eq!(start, expiry);
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 6, 20, 0, 0, 0).unwrap());
    }

    #[test]
    fn lapsed_subscription_restarts() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let expiry = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let (start, _) = extend_subscription(Some(expiry), now, 1).unwrap();
        assert_eq!(start, now);
    }
}
