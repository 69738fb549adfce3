//! Kind rules for proposed transactions.
//!
//! Pure: the caller supplies lookups over already-loaded categories and
//! accounts, so the same input always yields the same outcome.

use rust_decimal::Decimal;
use tally_shared::types::{BankAccountId, CategoryId};

use super::error::ValidationError;
use super::types::{AccountInfo, CategoryInfo, TransactionDetail, TransactionDraft, TransactionKind};

/// Checks `draft` against the kind rules and resolves its detail.
///
/// Checks run in a fixed order: kind, amount, source account, then the
/// kind-specific references. The first violation is returned.
///
/// # Arguments
///
/// * `draft` - The proposed fields
/// * `category_lookup` - Returns a live category by id
/// * `account_lookup` - Returns a live bank account by id
///
/// # Errors
///
/// Returns the first `ValidationError` encountered.
pub fn validate_transaction<C, A>(
    draft: &TransactionDraft,
    category_lookup: C,
    account_lookup: A,
) -> Result<TransactionDetail, ValidationError>
where
    C: Fn(CategoryId) -> Option<CategoryInfo>,
    A: Fn(BankAccountId) -> Option<AccountInfo>,
{
    let kind: TransactionKind = draft
        .kind
        .parse()
        .map_err(ValidationError::InvalidKind)?;

    if draft.amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount);
    }

    if account_lookup(draft.bank_account_id).is_none() {
        return Err(ValidationError::UnknownAccount(draft.bank_account_id));
    }

    match kind {
        TransactionKind::Transfer => {
            if draft.category_id.is_some() {
                return Err(ValidationError::UnexpectedCategory);
            }
            let destination = draft
                .destination_bank_account_id
                .ok_or(ValidationError::MissingDestination)?;
            if destination == draft.bank_account_id {
                return Err(ValidationError::SameAccountTransfer);
            }
            if account_lookup(destination).is_none() {
                return Err(ValidationError::UnknownAccount(destination));
            }
            Ok(TransactionDetail::Transfer {
                destination_account_id: destination,
            })
        }
        TransactionKind::Expense | TransactionKind::Income => {
            if draft.destination_bank_account_id.is_some() {
                return Err(ValidationError::UnexpectedDestination);
            }
            let category_id = draft.category_id.ok_or(ValidationError::MissingCategory)?;
            let category =
                category_lookup(category_id).ok_or(ValidationError::UnknownCategory(category_id))?;
            if category.kind.transaction_kind() != kind {
                return Err(ValidationError::CategoryTypeMismatch {
                    category: category.kind,
                    transaction: kind,
                });
            }
            Ok(if kind == TransactionKind::Expense {
                TransactionDetail::Expense { category_id }
            } else {
                TransactionDetail::Income { category_id }
            })
        }
    }
}
