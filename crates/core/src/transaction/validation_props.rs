//! Property-based tests for the transaction kind rules.

use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{BankAccountId, CategoryId};

use super::error::ValidationError;
use super::types::{AccountInfo, CategoryInfo, CategoryKind, TransactionDraft, TransactionKind};
use super::validation::validate_transaction;

/// Strategy to generate a positive amount from 0.01 to 1,000,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a zero or negative amount.
fn non_positive_amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(-cents, 2))
}

fn kind_strategy() -> impl Strategy<Value = TransactionKind> {
    prop_oneof![
        Just(TransactionKind::Expense),
        Just(TransactionKind::Income),
        Just(TransactionKind::Transfer),
    ]
}

fn category_kind_strategy() -> impl Strategy<Value = CategoryKind> {
    prop_oneof![Just(CategoryKind::Expense), Just(CategoryKind::Income)]
}

/// Fixed world: one category of the given kind, two accounts.
struct World {
    category: CategoryInfo,
    source: AccountInfo,
    other: AccountInfo,
}

impl World {
    fn new(category_kind: CategoryKind) -> Self {
        let account = |name: &str| AccountInfo {
            id: BankAccountId::new(),
            name: name.to_string(),
            bank_name: "Bank".to_string(),
        };
        Self {
            category: CategoryInfo {
                id: CategoryId::new(),
                name: "Cat".to_string(),
                kind: category_kind,
            },
            source: account("Source"),
            other: account("Other"),
        }
    }

    fn check(
        &self,
        draft: &TransactionDraft,
    ) -> Result<super::types::TransactionDetail, ValidationError> {
        validate_transaction(
            draft,
            |id| (id == self.category.id).then(|| self.category.clone()),
            |id| {
                [&self.source, &self.other]
                    .into_iter()
                    .find(|a| a.id == id)
                    .cloned()
            },
        )
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Whatever combination of optional fields is supplied, an accepted
    /// draft always resolves to a detail consistent with its kind.
    #[test]
    fn prop_accepted_drafts_satisfy_kind_rules(
        kind in kind_strategy(),
        category_kind in category_kind_strategy(),
        amount in positive_amount(),
        with_category in any::<bool>(),
        destination_choice in 0u8..3,
    ) {
        let world = World::new(category_kind);
        let destination = match destination_choice {
            0 => None,
            1 => Some(world.other.id),
            _ => Some(world.source.id),
        };
        let draft = TransactionDraft {
            external_ref: None,
            amount,
            kind: kind.as_str().to_string(),
            category_id: with_category.then_some(world.category.id),
            bank_account_id: world.source.id,
            destination_bank_account_id: destination,
            description: String::new(),
            occurred_at: None,
        };

        if let Ok(detail) = world.check(&draft) {
            prop_assert_eq!(detail.kind(), kind);
            if kind == TransactionKind::Transfer {
                prop_assert!(detail.category_id().is_none());
                let dest = detail.destination_account_id();
                prop_assert!(dest.is_some());
                prop_assert_ne!(dest, Some(world.source.id));
            } else {
                prop_assert_eq!(detail.category_id(), Some(world.category.id));
                prop_assert_eq!(world.category.kind.transaction_kind(), kind);
                prop_assert!(detail.destination_account_id().is_none());
            }
        }
    }

    /// Zero and negative amounts are rejected for every kind.
    #[test]
    fn prop_non_positive_amount_rejected(
        kind in kind_strategy(),
        amount in non_positive_amount(),
    ) {
        let world = World::new(CategoryKind::Expense);
        let draft = TransactionDraft {
            external_ref: None,
            amount,
            kind: kind.as_str().to_string(),
            category_id: Some(world.category.id),
            bank_account_id: world.source.id,
            destination_bank_account_id: None,
            description: String::new(),
            occurred_at: None,
        };
        prop_assert_eq!(world.check(&draft), Err(ValidationError::NonPositiveAmount));
    }

    /// Any kind text outside the three known kinds is rejected first.
    #[test]
    fn prop_unknown_kind_rejected(kind in "[a-z]{1,12}") {
        prop_assume!(kind.parse::<TransactionKind>().is_err());
        let world = World::new(CategoryKind::Expense);
        let draft = TransactionDraft {
            external_ref: None,
            amount: Decimal::ZERO,
            kind: kind.clone(),
            category_id: None,
            bank_account_id: BankAccountId::new(),
            destination_bank_account_id: None,
            description: String::new(),
            occurred_at: None,
        };
        prop_assert_eq!(world.check(&draft), Err(ValidationError::InvalidKind(kind)));
    }
}
