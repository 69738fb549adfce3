//! String-backed enums shared by the entities.
//!
//! Stored as short strings so the same schema works on PostgreSQL and SQLite.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::transaction::{CategoryKind, TransactionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[sea_orm(string_value = "expense")]
    Expense,
    #[sea_orm(string_value = "income")]
    Income,
    #[sea_orm(string_value = "transfer")]
    Transfer,
}

impl From<TransactionKind> for TransactionType {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Expense => Self::Expense,
            TransactionKind::Income => Self::Income,
            TransactionKind::Transfer => Self::Transfer,
        }
    }
}

impl From<TransactionType> for TransactionKind {
    fn from(kind: TransactionType) -> Self {
        match kind {
            TransactionType::Expense => Self::Expense,
            TransactionType::Income => Self::Income,
            TransactionType::Transfer => Self::Transfer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    #[sea_orm(string_value = "expense")]
    Expense,
    #[sea_orm(string_value = "income")]
    Income,
}

impl From<CategoryKind> for CategoryType {
    fn from(kind: CategoryKind) -> Self {
        match kind {
            CategoryKind::Expense => Self::Expense,
            CategoryKind::Income => Self::Income,
        }
    }
}

impl From<CategoryType> for CategoryKind {
    fn from(kind: CategoryType) -> Self {
        match kind {
            CategoryType::Expense => Self::Expense,
            CategoryType::Income => Self::Income,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[sea_orm(string_value = "checking")]
    Checking,
    #[sea_orm(string_value = "savings")]
    Savings,
    #[sea_orm(string_value = "credit")]
    Credit,
    #[sea_orm(string_value = "investment")]
    Investment,
    #[sea_orm(string_value = "other")]
    Other,
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            "credit" => Ok(Self::Credit),
            "investment" => Ok(Self::Investment),
            "other" => Ok(Self::Other),
            other => Err(other.to_string()),
        }
    }
}
