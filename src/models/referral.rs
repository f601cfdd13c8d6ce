//! Referral tree and multi-level commissions.
//!
//! Every account owns one `rewards` row holding its referral code and,
//! optionally, the code of the account that referred it. Following
//! `referred_by` downward from an account yields its downline; tier 1 are
//! direct referrals, tier 2 their referrals, and so on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Reward {
    pub account_id: Uuid,
    pub referral_code: String,
    pub referred_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReferralOverview {
    pub referral_code: String,
    pub referred_by: Option<String>,
    pub direct_referrals: i64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ApplyReferralRequest {
    pub referral_code: String,
}

/// One downline member as produced by the recursive tree query.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReferralTreeRow {
    pub level: i32,
    pub account_id: Uuid,
    pub name: String,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    /// Sum of the member's settled payments
    pub paid_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferralMember {
    pub account_id: Uuid,
    pub name: String,
    pub is_premium: bool,
    pub paid_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferralTier {
    pub level: i32,
    pub members: Vec<ReferralMember>,
    pub subscribed_members: i64,
    /// Settled payment volume of the tier's members
    pub volume: i64,
    pub rate_bps: i64,
    pub commission: i64,
}

#[derive(Debug, Serialize)]
pub struct ReferralTiersResponse {
    pub referral_code: String,
    pub tiers: Vec<ReferralTier>,
    pub total_commission: i64,
}

/// Commission for `volume` at `rate_bps` basis points, rounded down.
pub fn commission(volume: i64, rate_bps: i64) -> i64 {
    // i128 keeps large volumes from overflowing before the division
    (i128::from(volume) * i128::from(rate_bps) / 10_000) as i64
}

/// Group tree rows into one tier per configured rate.
///
/// Tier `n` uses `rates_bps[n - 1]`. Every configured tier is present in the
/// result even when empty; rows deeper than the configured depth are ignored.
pub fn build_tiers(rows: Vec<ReferralTreeRow>, rates_bps: &[i64], now: DateTime<Utc>) -> Vec<ReferralTier> {
    let mut tiers: Vec<ReferralTier> = rates_bps
        .iter()
        .zip(1..)
        .map(|(&rate_bps, level)| ReferralTier {
            level,
            members: Vec::new(),
            subscribed_members: 0,
            volume: 0,
            rate_bps,
            commission: 0,
        })
        .collect();

    for row in rows {
        let Some(tier) = usize::try_from(row.level - 1)
            .ok()
            .and_then(|index| tiers.get_mut(index))
        else {
            continue;
        };

        let is_premium = row.subscription_expires_at.is_some_and(|at| at > now);
        if is_premium {
            tier.subscribed_members += 1;
        }
        tier.volume += row.paid_amount;
        tier.members.push(ReferralMember {
            account_id: row.account_id,
            name: row.name,
            is_premium,
            paid_amount: row.paid_amount,
        });
    }

    for tier in &mut tiers {
        tier.commission = commission(tier.volume, tier.rate_bps);
    }

    tiers
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn row(level: i32, paid: i64, premium: bool) -> ReferralTreeRow {
        let now = Utc::now();
        ReferralTreeRow {
            level,
            account_id: Uuid::new_v4(),
            name: format!("member-{level}-{paid}"),
            subscription_expires_at: premium.then(|| now + Duration::days(10)),
            paid_amount: paid,
        }
    }

    #[test]
    fn commission_rounds_down() {
        assert_eq!(commission(29_000, 1000), 2_900);
        assert_eq!(commission(999, 500), 49);
        assert_eq!(commission(0, 1000), 0);
    }

    #[test]
    fn groups_rows_per_tier() {
        let rows = vec![
            row(1, 29_000, true),
            row(1, 0, false),
            row(2, 79_000, true),
            row(3, 290_000, true),
        ];
        let tiers = build_tiers(rows, &[1000, 500, 200], Utc::now());

        assert_eq!(tiers.len(), 3);
        assert_eq!(tiers[0].members.len(), 2);
        assert_eq!(tiers[0].subscribed_members, 1);
        assert_eq!(tiers[0].commission, 2_900);
        assert_eq!(tiers[1].commission, 3_950);
        assert_eq!(tiers[2].commission, 5_800);
    }

    #[test]
    fn rows_past_configured_depth_are_ignored() {
        let tiers = build_tiers(vec![row(2, 10_000, true)], &[1000], Utc::now());
        assert_eq!(tiers.len(), 1);
        assert!(tiers[0].members.is_empty());
        assert_eq!(tiers[0].commission, 0);
    }

    #[test]
    fn empty_tree_yields_empty_tiers() {
        let tiers = build_tiers(Vec::new(), &[1000, 500], Utc::now());
        assert_eq!(tiers.iter().map(|t| t.level).collect::<Vec<_>>(), [1, 2]);
        assert!(tiers.iter().all(|t| t.volume == 0));
    }
}
