//! `SeaORM` entity definitions.

pub mod bank_accounts;
pub mod categories;
pub mod sea_orm_active_enums;
pub mod transactions;
