//! Investment orders and portfolio.
//!
//! A buy moves money out of an investment wallet into a holding; a sell
//! moves it back. Each order is stored three ways in one transaction: an
//! `investment` transaction (so it shows in history and statistics), its
//! detail row with quantity and price, and an `investments` row that
//! holdings are computed from.
//!
//! Holdings are per account and item, not per wallet. The account row is
//! locked for the duration of an order so concurrent sells cannot both pass
//! the holding check.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{AppError, AppResult, Resource},
    models::{
        Page,
        investment::{
            Investment, InvestmentOrderRequest, InvestmentQuery, InvestmentSide, PortfolioResponse,
            order_amount, summarize_holdings,
        },
        master::WalletType,
        transaction::{NewTransaction, NewTransactionDetail, TransactionType},
    },
    repositories::{
        account_repository, investment_repository,
        investment_repository::NewInvestment,
        master_repository, transaction_repository, wallet_repository,
    },
    validation::{MAX_AMOUNT, Validator},
};

/// Quantities are stored as `NUMERIC(20, 8)`.
const MAX_QUANTITY_SCALE: u32 = 8;

/// Place a buy or sell order.
///
/// # Errors
///
/// - `Validation`: bad quantity or price, amount out of range, or the
///   wallet is not an investment wallet
/// - `NotFound(InvestmentItem | Wallet)`
/// - `InsufficientBalance`: buy exceeds the wallet balance
/// - `InsufficientHolding`: sell exceeds the quantity held
pub async fn place_order(
    pool: &DbPool,
    account_id: Uuid,
    side: InvestmentSide,
    request: InvestmentOrderRequest,
) -> AppResult<Investment> {
    let amount = validate_order(&request)?;

    let item = master_repository::find_investment_item(pool, request.investment_item_id)
        .await?
        .ok_or(AppError::NotFound(Resource::InvestmentItem))?;

    let mut tx = pool.begin().await?;

    account_repository::lock_by_id(&mut *tx, account_id)
        .await?
        .ok_or(AppError::NotFound(Resource::Account))?;

    let wallet = wallet_repository::lock(&mut *tx, account_id, request.wallet_id)
        .await?
        .ok_or(AppError::NotFound(Resource::Wallet))?;
    if wallet.wallet_type_code != WalletType::INVESTMENT {
        return Err(AppError::invalid_field(
            "invalid_wallet_type",
            "investment orders need an investment wallet",
        ));
    }

    match side {
        InvestmentSide::Buy if wallet.balance < amount => {
            return Err(AppError::InsufficientBalance);
        }
        InvestmentSide::Sell => {
            let held =
                investment_repository::held_quantity(&mut *tx, account_id, item.id).await?;
            if held < request.quantity {
                return Err(AppError::InsufficientHolding);
            }
        }
        InvestmentSide::Buy => {}
    }

    let verb = match side {
        InvestmentSide::Buy => "Buy",
        InvestmentSide::Sell => "Sell",
    };
    let transaction = transaction_repository::insert(
        &mut *tx,
        &NewTransaction {
            account_id,
            wallet_id: wallet.id,
            transaction_type: TransactionType::Investment,
            category_id: None,
            personal_category_id: None,
            amount,
            description: Some(format!(
                "{verb} {} {} {}",
                request.quantity.normalize(),
                item.unit,
                item.name
            )),
            transaction_at: request.transaction_at.unwrap_or_else(Utc::now),
        },
    )
    .await?;
    transaction_repository::insert_detail(
        &mut *tx,
        transaction.id,
        &NewTransactionDetail {
            investment_item_id: Some(item.id),
            quantity: Some(request.quantity),
            price_per_unit: Some(request.price_per_unit),
            ..Default::default()
        },
    )
    .await?;

    wallet_repository::adjust_balance(&mut *tx, wallet.id, side.balance_sign() * amount).await?;

    let investment_id = investment_repository::insert(
        &mut *tx,
        &NewInvestment {
            account_id,
            wallet_id: wallet.id,
            investment_item_id: item.id,
            transaction_id: transaction.id,
            side,
            quantity: request.quantity,
            price_per_unit: request.price_per_unit,
            amount,
        },
    )
    .await?;

    let investment = investment_repository::find(&mut *tx, account_id, investment_id)
        .await?
        .ok_or_else(|| AppError::Internal("investment vanished after insert".to_string()))?;

    tx.commit().await?;

    tracing::info!(
        %account_id,
        %investment_id,
        side = side.as_str(),
        item = %item.code,
        %amount,
        "Investment order placed"
    );

    Ok(investment)
}

pub async fn list(pool: &DbPool, account_id: Uuid, query: InvestmentQuery) -> AppResult<Page<Investment>> {
    let pagination = query.pagination();
    let items = investment_repository::list(
        pool,
        account_id,
        query.investment_item_id,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;
    let total = investment_repository::count(pool, account_id, query.investment_item_id).await?;
    Ok(Page::new(items, pagination, total))
}

pub async fn portfolio(pool: &DbPool, account_id: Uuid) -> AppResult<PortfolioResponse> {
    let orders = investment_repository::list_chronological(pool, account_id).await?;
    let holdings = summarize_holdings(&orders);
    let total_cost_basis = holdings.iter().map(|h| h.cost_basis).sum();
    Ok(PortfolioResponse {
        holdings,
        total_cost_basis,
    })
}

/// Validate the order and return its amount.
fn validate_order(request: &InvestmentOrderRequest) -> AppResult<i64> {
    Validator::new()
        .check(
            request.quantity > Decimal::ZERO,
            "invalid_quantity",
            "quantity must be positive",
        )
        .check(
            request.quantity.normalize().scale() <= MAX_QUANTITY_SCALE,
            "invalid_quantity",
            "quantity supports at most 8 decimal places",
        )
        .amount("price_per_unit", request.price_per_unit)
        .finish()?;

    match order_amount(request.quantity, request.price_per_unit) {
        Some(amount) if (1..=MAX_AMOUNT).contains(&amount) => Ok(amount),
        _ => Err(AppError::invalid_field(
            "invalid_amount",
            format!("quantity × price_per_unit must be between 1 and {MAX_AMOUNT}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order(quantity: Decimal, price_per_unit: i64) -> InvestmentOrderRequest {
        InvestmentOrderRequest {
            wallet_id: Uuid::new_v4(),
            investment_item_id: 1,
            quantity,
            price_per_unit,
            transaction_at: None,
        }
    }

    #[test]
    fn valid_order_yields_amount() {
        assert_eq!(validate_order(&order(dec!(2.5), 1_150_000)).unwrap(), 2_875_000);
    }

    #[test]
    fn rejects_non_positive_quantity() {
        let err = validate_order(&order(dec!(0), 1_000)).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref items) if items[0].error_code == "invalid_quantity"));
    }

    #[test]
    fn rejects_excess_precision() {
        assert!(validate_order(&order(dec!(0.123456789), 1_000)).is_err());
        assert!(validate_order(&order(dec!(0.12345678), 1_000)).is_ok());
    }

    #[test]
    fn rejects_amount_rounding_to_zero() {
        let err = validate_order(&order(dec!(0.0001), 1)).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref items) if items[0].error_code == "invalid_amount"));
    }
}
