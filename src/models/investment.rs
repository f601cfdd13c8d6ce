//! Investment orders and portfolio holdings.
//!
//! Quantities are `Decimal` (grams of gold, fractional fund units); prices
//! and amounts are minor-unit integers like every other amount.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Pagination;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentSide {
    Buy,
    Sell,
}

impl InvestmentSide {
    pub fn as_str(self) -> &'static str {
        match self {
            InvestmentSide::Buy => "buy",
            InvestmentSide::Sell => "sell",
        }
    }

    /// Sign applied to the wallet balance.
    pub fn balance_sign(self) -> i64 {
        match self {
            InvestmentSide::Buy => -1,
            InvestmentSide::Sell => 1,
        }
    }
}

/// Row of `investments` joined with the item lookup.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Investment {
    pub id: Uuid,
    #[serde(skip)]
    pub account_id: Uuid,
    pub wallet_id: Uuid,
    pub investment_item_id: i32,
    pub item_name: String,
    pub item_unit: String,
    pub transaction_id: Uuid,
    pub side: String,
    pub quantity: Decimal,
    pub price_per_unit: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /api/v1/investments/buy` and `/sell`.
///
/// ```json
/// {
///   "wallet_id": "550e8400-e29b-41d4-a716-446655440000",
///   "investment_item_id": 1,
///   "quantity": "2.5",
///   "price_per_unit": 1150000
/// }
/// ```
#[derive(Debug, Deserialize, Serialize)]
pub struct InvestmentOrderRequest {
    pub wallet_id: Uuid,
    pub investment_item_id: i32,
    pub quantity: Decimal,
    pub price_per_unit: i64,
    #[serde(default)]
    pub transaction_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InvestmentQuery {
    #[serde(default)]
    pub investment_item_id: Option<i32>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl InvestmentQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Current position in one investment item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub investment_item_id: i32,
    pub item_name: String,
    pub unit: String,
    pub quantity: Decimal,
    /// Remaining cost of the position under the average-cost method
    pub cost_basis: i64,
    pub average_price: Decimal,
}

#[derive(Debug, Serialize)]
pub struct PortfolioResponse {
    pub holdings: Vec<Holding>,
    pub total_cost_basis: i64,
}

/// `round(quantity × price)`; `None` if the result does not fit in `i64`.
pub fn order_amount(quantity: Decimal, price_per_unit: i64) -> Option<i64> {
    quantity
        .checked_mul(Decimal::from(price_per_unit))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Fold the order history into holdings with the average-cost method.
///
/// `orders` must be in chronological order. A sell reduces the cost basis
/// by the sold share of the current position. Fully closed positions are
/// omitted.
pub fn summarize_holdings(orders: &[Investment]) -> Vec<Holding> {
    let mut positions: BTreeMap<i32, Holding> = BTreeMap::new();

    for order in orders {
        let holding = positions
            .entry(order.investment_item_id)
            .or_insert_with(|| Holding {
                investment_item_id: order.investment_item_id,
                item_name: order.item_name.clone(),
                unit: order.item_unit.clone(),
                quantity: Decimal::ZERO,
                cost_basis: 0,
                average_price: Decimal::ZERO,
            });

        if order.side == InvestmentSide::Buy.as_str() {
            holding.quantity += order.quantity;
            holding.cost_basis += order.amount;
        } else if holding.quantity > Decimal::ZERO {
            let sold = order.quantity.min(holding.quantity);
            let released = (Decimal::from(holding.cost_basis) * sold / holding.quantity)
                .round()
                .to_i64()
                .unwrap_or(holding.cost_basis);
            holding.quantity -= sold;
            holding.cost_basis -= released;
        }
    }

    positions
        .into_values()
        .filter(|h| h.quantity > Decimal::ZERO)
        .map(|mut h| {
            h.average_price = (Decimal::from(h.cost_basis) / h.quantity).round_dp(2);
            h
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order(item: i32, side: InvestmentSide, quantity: Decimal, price: i64) -> Investment {
        Investment {
            id: Uuid::new_v4(),
            account_id: Uuid::nil(),
            wallet_id: Uuid::nil(),
            investment_item_id: item,
            item_name: "Gold".to_string(),
            item_unit: "gram".to_string(),
            transaction_id: Uuid::new_v4(),
            side: side.as_str().to_string(),
            quantity,
            price_per_unit: price,
            amount: order_amount(quantity, price).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn amount_rounds_half_away_from_zero() {
        assert_eq!(order_amount(dec!(2.5), 1_000_001), Some(2_500_003));
        assert_eq!(order_amount(dec!(0.1), 5), Some(1));
        assert_eq!(order_amount(dec!(1), 1_000), Some(1_000));
    }

    #[test]
    fn average_cost_after_buys_and_sell() {
        let orders = vec![
            order(1, InvestmentSide::Buy, dec!(2), 1_000),
            order(1, InvestmentSide::Buy, dec!(2), 2_000),
            // average is 1500, selling half releases 3000 of the 6000 basis
            order(1, InvestmentSide::Sell, dec!(2), 2_500),
        ];

        let holdings = summarize_holdings(&orders);
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].quantity, dec!(2));
        assert_eq!(holdings[0].cost_basis, 3_000);
        assert_eq!(holdings[0].average_price, dec!(1500));
    }

    #[test]
    fn closed_positions_are_omitted() {
        let orders = vec![
            order(1, InvestmentSide::Buy, dec!(1), 1_000),
            order(1, InvestmentSide::Sell, dec!(1), 1_200),
            order(2, InvestmentSide::Buy, dec!(3), 100),
        ];

        let holdings = summarize_holdings(&orders);
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].investment_item_id, 2);
        assert_eq!(holdings[0].cost_basis, 300);
    }

    #[test]
    fn side_signs() {
        assert_eq!(InvestmentSide::Buy.balance_sign(), -1);
        assert_eq!(InvestmentSide::Sell.balance_sign(), 1);
    }
}
