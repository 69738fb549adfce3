//! Report generation service.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::types::{
    AggregateReport, AggregateSummary, AggregateTableReport, CategoryAggregate, KindAggregate,
    ReportDateRange, SummaryOverview, SummaryReport, SummaryTotals,
};
use crate::dates::DateRange;
use crate::transaction::{TransactionKind, TransactionView};

/// Name shown for a categorized transaction whose category name is unknown.
const UNCATEGORIZED: &str = "Uncategorized";

/// How many transactions the summary lists.
pub const RECENT_LIMIT: usize = 5;

/// Service for generating aggregate reports.
pub struct ReportService;

impl ReportService {
    /// Sums amounts per category name across all non-transfer transactions.
    #[must_use]
    pub fn generate_aggregate(transactions: &[TransactionView]) -> AggregateReport {
        let mut report = AggregateReport::default();

        for view in transactions {
            let amount = view.transaction.amount;
            match view.kind() {
                TransactionKind::Income => report.total_income += amount,
                TransactionKind::Expense => report.total_expenses += amount,
                TransactionKind::Transfer => continue,
            }
            let name = view.category_name.as_deref().unwrap_or(UNCATEGORIZED);
            *report.categories.entry(name.to_string()).or_default() += amount;
        }

        report.net_amount = report.total_income - report.total_expenses;
        report
    }

    /// Builds the income/expense table for the transactions inside `range`.
    ///
    /// Transactions outside the window are skipped here as well, so callers
    /// may pass an unfiltered set.
    #[must_use]
    pub fn generate_aggregate_table(
        transactions: &[TransactionView],
        range: &DateRange,
    ) -> AggregateTableReport {
        let in_window = |kind: TransactionKind| {
            transactions
                .iter()
                .filter(move |v| v.kind() == kind && range.contains(v.transaction.occurred_at))
        };

        let income = Self::build_section(in_window(TransactionKind::Income));
        let expenses = Self::build_section(in_window(TransactionKind::Expense));

        let summary = AggregateSummary {
            net_amount: income.total_amount - expenses.total_amount,
            total_income: income.total_amount,
            total_expenses: expenses.total_amount,
        };

        AggregateTableReport {
            date_range: ReportDateRange {
                start_date: range.start_date(),
                end_date: range.end_date(),
            },
            income,
            expenses,
            summary,
        }
    }

    /// Counts, sums and the most recent transactions.
    #[must_use]
    pub fn generate_summary(transactions: &[TransactionView]) -> SummaryReport {
        let mut overview = SummaryOverview::default();
        let mut totals = SummaryTotals::default();

        for view in transactions {
            overview.total_transactions += 1;
            match view.kind() {
                TransactionKind::Expense => {
                    overview.total_expenses += 1;
                    totals.total_expense_amount += view.transaction.amount;
                }
                TransactionKind::Income => {
                    overview.total_income += 1;
                    totals.total_income_amount += view.transaction.amount;
                }
                TransactionKind::Transfer => {}
            }
        }
        totals.net_amount = totals.total_income_amount - totals.total_expense_amount;

        let mut recent = transactions.to_vec();
        recent.sort_by(|a, b| b.transaction.created_at.cmp(&a.transaction.created_at));
        recent.truncate(RECENT_LIMIT);

        SummaryReport {
            overview,
            totals,
            recent_transactions: recent,
        }
    }

    /// Groups one kind's transactions by category.
    fn build_section<'a>(views: impl Iterator<Item = &'a TransactionView>) -> KindAggregate {
        let mut groups: BTreeMap<Uuid, CategoryAggregate> = BTreeMap::new();

        for view in views {
            let Some(category_id) = view.transaction.detail.category_id() else {
                continue;
            };
            let row = groups
                .entry(category_id.into_inner())
                .or_insert_with(|| CategoryAggregate {
                    category_id,
                    category_name: view
                        .category_name
                        .clone()
                        .unwrap_or_else(|| UNCATEGORIZED.to_string()),
                    total_amount: Decimal::ZERO,
                    transaction_count: 0,
                });
            row.total_amount += view.transaction.amount;
            row.transaction_count += 1;
        }

        let categories: Vec<CategoryAggregate> = groups.into_values().collect();
        KindAggregate {
            total_amount: categories.iter().map(|c| c.total_amount).sum(),
            total_transactions: categories.iter().map(|c| c.transaction_count).sum(),
            categories,
        }
    }
}
