//! Lookup ("master") data shared by every account.

use std::str::FromStr;

use serde::Serialize;

/// Which lookup table `GET /api/v1/masters/{kind}` reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterKind {
    WalletTypes,
    TransactionTypes,
    InvestmentItems,
}

impl MasterKind {
    pub fn table(self) -> &'static str {
        match self {
            MasterKind::WalletTypes => "master_wallet_types",
            MasterKind::TransactionTypes => "master_transaction_types",
            MasterKind::InvestmentItems => "master_investment_items",
        }
    }
}

impl FromStr for MasterKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wallet-types" => Ok(MasterKind::WalletTypes),
            "transaction-types" => Ok(MasterKind::TransactionTypes),
            "investment-items" => Ok(MasterKind::InvestmentItems),
            _ => Err(()),
        }
    }
}

/// Generic lookup row. `unit` is only set for investment items.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct MasterItem {
    pub id: i32,
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct WalletType {
    pub id: i32,
    pub code: String,
    pub name: String,
}

impl WalletType {
    pub const INVESTMENT: &'static str = "investment";
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct InvestmentItem {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub unit: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_kinds_only() {
        assert_eq!("wallet-types".parse(), Ok(MasterKind::WalletTypes));
        assert_eq!("investment-items".parse(), Ok(MasterKind::InvestmentItems));
        assert!("users".parse::<MasterKind>().is_err());
        assert!("master_wallet_types; DROP TABLE".parse::<MasterKind>().is_err());
    }
}
