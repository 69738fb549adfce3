//! In-memory `LedgerStore` for unit tests.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Mutex;
use tally_shared::types::{BankAccountId, CategoryId, TransactionId};

use super::store::{LedgerStore, StoreError, TransactionFilter};
use super::types::{
    AccountInfo, CategoryInfo, CategoryKind, NewTransaction, Transaction, TransactionView,
};

#[derive(Default)]
struct State {
    categories: Vec<CategoryInfo>,
    accounts: Vec<(AccountInfo, Decimal)>,
    transactions: HashMap<TransactionId, Transaction>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Food, Transport and Salary categories; Checking and Savings accounts.
    pub fn seeded() -> Self {
        let category = |name: &str, kind| CategoryInfo {
            id: CategoryId::new(),
            name: name.to_string(),
            kind,
        };
        let account = |name: &str| AccountInfo {
            id: BankAccountId::new(),
            name: name.to_string(),
            bank_name: "First Bank".to_string(),
        };
        let state = State {
            categories: vec![
                category("Food", CategoryKind::Expense),
                category("Transport", CategoryKind::Expense),
                category("Salary", CategoryKind::Income),
            ],
            accounts: vec![
                (account("Checking"), dec!(1000)),
                (account("Savings"), dec!(5000)),
            ],
            transactions: HashMap::new(),
        };
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn category_id(&self, name: &str) -> CategoryId {
        let state = self.state.lock().unwrap();
        state.categories.iter().find(|c| c.name == name).unwrap().id
    }

    pub fn account_id(&self, name: &str) -> BankAccountId {
        let state = self.state.lock().unwrap();
        state.accounts.iter().find(|(a, _)| a.name == name).unwrap().0.id
    }

    pub fn transaction_count(&self) -> usize {
        self.state.lock().unwrap().transactions.len()
    }

    pub fn balances(&self) -> Vec<Decimal> {
        let state = self.state.lock().unwrap();
        state.accounts.iter().map(|(_, balance)| *balance).collect()
    }

    fn view(state: &State, tx: &Transaction) -> TransactionView {
        let account = |id: BankAccountId| {
            state
                .accounts
                .iter()
                .find(|(a, _)| a.id == id)
                .map(|(a, _)| a.clone())
        };
        TransactionView {
            transaction: tx.clone(),
            category_name: tx.detail.category_id().and_then(|id| {
                state
                    .categories
                    .iter()
                    .find(|c| c.id == id)
                    .map(|c| c.name.clone())
            }),
            bank_account: account(tx.bank_account_id),
            destination_bank_account: tx.detail.destination_account_id().and_then(account),
        }
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn find_category(&self, id: CategoryId) -> Result<Option<CategoryInfo>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_account(&self, id: BankAccountId) -> Result<Option<AccountInfo>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .accounts
            .iter()
            .find(|(a, _)| a.id == id)
            .map(|(a, _)| a.clone()))
    }

    async fn insert_transaction(&self, tx: NewTransaction) -> Result<TransactionView, StoreError> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let stored = Transaction {
            id: TransactionId::new(),
            external_ref: tx.external_ref,
            amount: tx.amount,
            detail: tx.detail,
            bank_account_id: tx.bank_account_id,
            description: tx.description,
            occurred_at: tx.occurred_at,
            created_at: now,
            updated_at: now,
        };
        state.transactions.insert(stored.id, stored.clone());
        Ok(Self::view(&state, &stored))
    }

    async fn find_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<TransactionView>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.transactions.get(&id).map(|tx| Self::view(&state, tx)))
    }

    async fn update_transaction(
        &self,
        id: TransactionId,
        tx: NewTransaction,
    ) -> Result<Option<TransactionView>, StoreError> {
        let mut state = self.state.lock().unwrap();
        let Some(existing) = state.transactions.get_mut(&id) else {
            return Ok(None);
        };
        existing.external_ref = tx.external_ref;
        existing.amount = tx.amount;
        existing.detail = tx.detail;
        existing.bank_account_id = tx.bank_account_id;
        existing.description = tx.description;
        existing.occurred_at = tx.occurred_at;
        existing.updated_at = Utc::now();
        let updated = existing.clone();
        Ok(Some(Self::view(&state, &updated)))
    }

    async fn delete_transaction(&self, id: TransactionId) -> Result<bool, StoreError> {
        Ok(self.state.lock().unwrap().transactions.remove(&id).is_some())
    }

    async fn list_transactions(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<TransactionView>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut views: Vec<_> = state
            .transactions
            .values()
            .map(|tx| Self::view(&state, tx))
            .filter(|view| filter.matches(view))
            .collect();
        views.sort_by(|a, b| b.transaction.occurred_at.cmp(&a.transaction.occurred_at));
        Ok(views)
    }
}
