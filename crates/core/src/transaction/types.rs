//! Transaction domain types.
//!
//! Inbound data arrives as a [`TransactionDraft`] with the kind as raw text
//! and both kind-dependent references optional. Validation turns it into a
//! [`NewTransaction`], whose [`TransactionDetail`] makes the
//! category/destination combinations that violate the kind rules
//! unrepresentable.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tally_shared::types::{BankAccountId, CategoryId, TransactionId};

/// Kind of a recorded transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money leaving through a spending category.
    Expense,
    /// Money arriving through an income category.
    Income,
    /// Money moved between two bank accounts.
    Transfer,
}

impl TransactionKind {
    /// Wire name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
            Self::Transfer => "transfer",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            "transfer" => Ok(Self::Transfer),
            other => Err(other.to_string()),
        }
    }
}

/// Kind of a category. Transfers never carry a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Spending category.
    Expense,
    /// Income category.
    Income,
}

impl CategoryKind {
    /// Wire name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }

    /// The transaction kind that may reference a category of this kind.
    #[must_use]
    pub const fn transaction_kind(self) -> TransactionKind {
        match self {
            Self::Expense => TransactionKind::Expense,
            Self::Income => TransactionKind::Income,
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            other => Err(other.to_string()),
        }
    }
}

/// Kind-dependent part of a valid transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransactionDetail {
    /// Expense booked against an expense category.
    Expense {
        /// Category of the expense.
        category_id: CategoryId,
    },
    /// Income booked against an income category.
    Income {
        /// Category of the income.
        category_id: CategoryId,
    },
    /// Transfer to a second account.
    Transfer {
        /// Receiving account, never the source account.
        destination_account_id: BankAccountId,
    },
}

impl TransactionDetail {
    /// The transaction kind.
    #[must_use]
    pub const fn kind(&self) -> TransactionKind {
        match self {
            Self::Expense { .. } => TransactionKind::Expense,
            Self::Income { .. } => TransactionKind::Income,
            Self::Transfer { .. } => TransactionKind::Transfer,
        }
    }

    /// Category reference, absent for transfers.
    #[must_use]
    pub const fn category_id(&self) -> Option<CategoryId> {
        match self {
            Self::Expense { category_id } | Self::Income { category_id } => Some(*category_id),
            Self::Transfer { .. } => None,
        }
    }

    /// Destination reference, present only for transfers.
    #[must_use]
    pub const fn destination_account_id(&self) -> Option<BankAccountId> {
        match self {
            Self::Transfer {
                destination_account_id,
            } => Some(*destination_account_id),
            _ => None,
        }
    }
}

/// Proposed transaction fields before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDraft {
    /// Caller-supplied external reference.
    pub external_ref: Option<String>,
    /// Amount, must be positive.
    pub amount: Decimal,
    /// Raw kind text.
    #[serde(rename = "type")]
    pub kind: String,
    /// Category, required for expense and income.
    pub category_id: Option<CategoryId>,
    /// Source account.
    pub bank_account_id: BankAccountId,
    /// Destination account, required for transfers.
    pub destination_bank_account_id: Option<BankAccountId>,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// When the movement happened. Defaults to now on create.
    pub occurred_at: Option<DateTime<Utc>>,
}

impl From<&Transaction> for TransactionDraft {
    fn from(tx: &Transaction) -> Self {
        Self {
            external_ref: tx.external_ref.clone(),
            amount: tx.amount,
            kind: tx.detail.kind().as_str().to_string(),
            category_id: tx.detail.category_id(),
            bank_account_id: tx.bank_account_id,
            destination_bank_account_id: tx.detail.destination_account_id(),
            description: tx.description.clone(),
            occurred_at: Some(tx.occurred_at),
        }
    }
}

/// Partial update of a transaction.
///
/// `None` keeps the stored value. The nullable references use a nested
/// option so a caller can clear them explicitly when changing kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionPatch {
    /// New external reference, `Some(None)` clears it.
    pub external_ref: Option<Option<String>>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New raw kind text.
    pub kind: Option<String>,
    /// New category, `Some(None)` clears it.
    pub category_id: Option<Option<CategoryId>>,
    /// New source account.
    pub bank_account_id: Option<BankAccountId>,
    /// New destination, `Some(None)` clears it.
    pub destination_bank_account_id: Option<Option<BankAccountId>>,
    /// New description.
    pub description: Option<String>,
    /// New occurrence time.
    pub occurred_at: Option<DateTime<Utc>>,
}

impl TransactionPatch {
    /// Overlays the supplied fields onto `draft`.
    #[must_use]
    pub fn apply(self, mut draft: TransactionDraft) -> TransactionDraft {
        if let Some(external_ref) = self.external_ref {
            draft.external_ref = external_ref;
        }
        if let Some(amount) = self.amount {
            draft.amount = amount;
        }
        if let Some(kind) = self.kind {
            draft.kind = kind;
        }
        if let Some(category_id) = self.category_id {
            draft.category_id = category_id;
        }
        if let Some(bank_account_id) = self.bank_account_id {
            draft.bank_account_id = bank_account_id;
        }
        if let Some(destination) = self.destination_bank_account_id {
            draft.destination_bank_account_id = destination;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(occurred_at) = self.occurred_at {
            draft.occurred_at = Some(occurred_at);
        }
        draft
    }
}

/// A validated transaction ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Caller-supplied external reference.
    pub external_ref: Option<String>,
    /// Positive amount.
    pub amount: Decimal,
    /// Kind and its reference.
    pub detail: TransactionDetail,
    /// Source account.
    pub bank_account_id: BankAccountId,
    /// Free-form description.
    pub description: String,
    /// UTC, second precision.
    pub occurred_at: DateTime<Utc>,
}

/// A persisted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Identifier.
    pub id: TransactionId,
    /// Caller-supplied external reference.
    pub external_ref: Option<String>,
    /// Positive amount.
    pub amount: Decimal,
    /// Kind and its reference.
    pub detail: TransactionDetail,
    /// Source account.
    pub bank_account_id: BankAccountId,
    /// Free-form description.
    pub description: String,
    /// When the movement happened.
    pub occurred_at: DateTime<Utc>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Category data needed for validation and display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInfo {
    /// Identifier.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Expense or income.
    pub kind: CategoryKind,
}

/// Bank account data needed for validation and display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    /// Identifier.
    pub id: BankAccountId,
    /// Display name.
    pub name: String,
    /// Name of the bank holding the account.
    pub bank_name: String,
}

/// A transaction with its references resolved for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionView {
    /// The stored transaction.
    pub transaction: Transaction,
    /// Category name, absent for transfers.
    pub category_name: Option<String>,
    /// Source account.
    pub bank_account: Option<AccountInfo>,
    /// Destination account, transfers only.
    pub destination_bank_account: Option<AccountInfo>,
}

impl TransactionView {
    /// The transaction kind.
    #[must_use]
    pub const fn kind(&self) -> TransactionKind {
        self.transaction.detail.kind()
    }
}
