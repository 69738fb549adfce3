//! Aggregate reports over recorded transactions.
//!
//! This module provides pure business logic for:
//! - Flat per-category totals
//! - Date-windowed income/expense tables
//! - The dashboard summary
//!
//! Transfers carry no category and never count toward income or expense totals.

pub mod service;
pub mod types;


pub use service::ReportService;
pub use types::*;
