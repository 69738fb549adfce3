//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tally_shared::types::CategoryId;

use crate::transaction::TransactionView;

/// Totals keyed by category name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateReport {
    /// Sum per category name.
    pub categories: BTreeMap<String, Decimal>,
    /// Sum of income amounts.
    pub total_income: Decimal,
    /// Sum of expense amounts.
    pub total_expenses: Decimal,
    /// Income minus expenses.
    pub net_amount: Decimal,
}

/// One category row in a table report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryAggregate {
    /// Category ID.
    pub category_id: CategoryId,
    /// Category name.
    pub category_name: String,
    /// Sum of amounts.
    pub total_amount: Decimal,
    /// Number of transactions.
    pub transaction_count: u64,
}

/// All rows of one kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KindAggregate {
    /// Rows, ascending by category ID.
    pub categories: Vec<CategoryAggregate>,
    /// Sum over all rows.
    pub total_amount: Decimal,
    /// Transactions over all rows.
    pub total_transactions: u64,
}

/// The echoed query window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportDateRange {
    /// First day, inclusive.
    pub start_date: NaiveDate,
    /// Last day, inclusive.
    pub end_date: NaiveDate,
}

/// Bottom line of a table report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateSummary {
    /// Income minus expenses.
    pub net_amount: Decimal,
    /// Income total.
    pub total_income: Decimal,
    /// Expense total.
    pub total_expenses: Decimal,
}

/// Income and expenses within a date window, grouped by category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateTableReport {
    /// Requested window.
    pub date_range: ReportDateRange,
    /// Income rows.
    pub income: KindAggregate,
    /// Expense rows.
    pub expenses: KindAggregate,
    /// Totals.
    pub summary: AggregateSummary,
}

/// Transaction counts for the summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryOverview {
    /// All transactions, transfers included.
    pub total_transactions: u64,
    /// Expense transactions.
    pub total_expenses: u64,
    /// Income transactions.
    pub total_income: u64,
}

/// Amount totals for the summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryTotals {
    /// Sum of expense amounts.
    pub total_expense_amount: Decimal,
    /// Sum of income amounts.
    pub total_income_amount: Decimal,
    /// Income minus expenses.
    pub net_amount: Decimal,
}

/// Dashboard summary.
#[derive(Debug, Clone)]
pub struct SummaryReport {
    /// Counts.
    pub overview: SummaryOverview,
    /// Amounts.
    pub totals: SummaryTotals,
    /// Most recently created transactions, newest first.
    pub recent_transactions: Vec<TransactionView>,
}
