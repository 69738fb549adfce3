//! Repository abstractions for data access.
//!
//! Repositories hide the `SeaORM` details from the rest of the application.
//! [`TransactionRepository`] is the ledger store behind the transaction
//! lifecycle; the other two are plain CRUD.

pub mod bank_account;
pub mod category;
pub mod transaction;

pub use bank_account::{
    BankAccountError, BankAccountRepository, CreateBankAccountInput, UpdateBankAccountInput,
};
pub use category::{CategoryError, CategoryRepository, CreateCategoryInput, UpdateCategoryInput};
pub use transaction::TransactionRepository;
