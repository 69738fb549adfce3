//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `transaction` - Transaction kinds, validation, lifecycle and bulk operations
//! - `dates` - Date range windows and lenient timestamp parsing
//! - `reports` - Category aggregates and summaries

pub mod dates;
pub mod reports;
pub mod transaction;
