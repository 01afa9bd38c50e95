//! Income/expense aggregation over a reporting period.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::period::{DateWindow, Period};
use crate::records::{Transaction, TransactionType};

/// Bucket for transactions whose currency is blank. They stay visible in
/// summaries so totals remain auditable.
pub const UNKNOWN_CURRENCY: &str = "(unknown)";

/// Optional sub-grouping inside each currency partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryGroupBy {
    Category,
    Account,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub total_income: f64,
    pub total_expense: f64,
    pub net_amount: f64,
    pub transaction_count: usize,
}

impl Totals {
    fn absorb(&mut self, txn: &Transaction) {
        match txn.transaction_type {
            TransactionType::Income => self.total_income += txn.amount,
            TransactionType::Expense => self.total_expense += txn.amount,
        }
        self.net_amount = self.total_income - self.total_expense;
        self.transaction_count += 1;
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CurrencySummary {
    pub totals: Totals,
    /// Per category or account, when sub-grouping was requested.
    pub groups: BTreeMap<String, Totals>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodSummary {
    pub label: String,
    pub window: DateWindow,
    pub currencies: BTreeMap<String, CurrencySummary>,
}

impl PeriodSummary {
    pub fn transaction_count(&self) -> usize {
        self.currencies
            .values()
            .map(|summary| summary.totals.transaction_count)
            .sum()
    }
}

/// Summarizes the period of `date`, partitioned by currency. A period with
/// no matching transactions yields empty partitions, not an error.
pub fn summarize(
    transactions: &[Transaction],
    date: NaiveDate,
    period: Period,
    group_by: Option<SummaryGroupBy>,
) -> PeriodSummary {
    summarize_window(transactions, period.window(date), period.label(date), group_by)
}

/// Same aggregation over an arbitrary window with a caller-chosen label.
pub fn summarize_window(
    transactions: &[Transaction],
    window: DateWindow,
    label: String,
    group_by: Option<SummaryGroupBy>,
) -> PeriodSummary {
    let mut currencies: BTreeMap<String, CurrencySummary> = BTreeMap::new();

    for txn in transactions {
        if !window.contains(txn.date) {
            continue;
        }
        let currency = currency_key(&txn.currency);
        let partition = currencies.entry(currency).or_default();
        partition.totals.absorb(txn);

        if let Some(group_by) = group_by {
            let group = match group_by {
                SummaryGroupBy::Category => txn.category.clone(),
                SummaryGroupBy::Account => txn.account.clone(),
            };
            partition.groups.entry(group).or_default().absorb(txn);
        }
    }

    PeriodSummary {
        label,
        window,
        currencies,
    }
}

fn currency_key(currency: &str) -> String {
    let trimmed = currency.trim();
    if trimmed.is_empty() {
        UNKNOWN_CURRENCY.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::TransactionDraft;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn txn(
        id: &str,
        day: u32,
        amount: f64,
        transaction_type: TransactionType,
        currency: &str,
        category: &str,
    ) -> Transaction {
        TransactionDraft {
            date: date(2024, 3, day),
            amount,
            transaction_type,
            category: category.into(),
            account: "Cash".into(),
            description: None,
            currency: currency.into(),
        }
        .materialize(id.into())
    }

    #[test]
    fn month_summary_reports_income_expense_and_net_per_currency() {
        let transactions = vec![
            txn("a", 5, 5000.0, TransactionType::Income, "CNY", "Salary"),
            txn("b", 12, 2000.0, TransactionType::Expense, "CNY", "Rent"),
        ];
        let summary = summarize(&transactions, date(2024, 3, 1), Period::Month, None);
        assert_eq!(summary.label, "2024-03");
        let cny = &summary.currencies["CNY"];
        assert_eq!(cny.totals.total_income, 5000.0);
        assert_eq!(cny.totals.total_expense, 2000.0);
        assert_eq!(cny.totals.net_amount, 3000.0);
    }

    #[test]
    fn partitions_conserve_totals_and_counts() {
        let transactions = vec![
            txn("a", 1, 10.0, TransactionType::Income, "USD", "x"),
            txn("b", 2, 4.0, TransactionType::Expense, "USD", "x"),
            txn("c", 3, 7.5, TransactionType::Expense, "EUR", "x"),
            txn("d", 4, 1.0, TransactionType::Income, "", "x"),
        ];
        let summary = summarize(&transactions, date(2024, 3, 15), Period::Month, None);
        assert_eq!(summary.transaction_count(), transactions.len());
        for partition in summary.currencies.values() {
            assert_eq!(
                partition.totals.net_amount,
                partition.totals.total_income - partition.totals.total_expense
            );
        }
    }

    #[test]
    fn blank_currency_lands_in_the_unknown_bucket() {
        let transactions = vec![txn("a", 1, 3.0, TransactionType::Expense, "  ", "x")];
        let summary = summarize(&transactions, date(2024, 3, 1), Period::Month, None);
        assert!(summary.currencies.contains_key(UNKNOWN_CURRENCY));
    }

    #[test]
    fn empty_period_yields_empty_partitions() {
        let transactions = vec![txn("a", 1, 3.0, TransactionType::Expense, "USD", "x")];
        let summary = summarize(&transactions, date(2025, 6, 1), Period::Month, None);
        assert!(summary.currencies.is_empty());
        assert_eq!(summary.transaction_count(), 0);
    }

    #[test]
    fn grouping_by_category_splits_each_partition() {
        let transactions = vec![
            txn("a", 1, 50.0, TransactionType::Expense, "USD", "Food"),
            txn("b", 2, 30.0, TransactionType::Expense, "USD", "Food"),
            txn("c", 3, 100.0, TransactionType::Income, "USD", "Salary"),
        ];
        let summary = summarize(
            &transactions,
            date(2024, 3, 1),
            Period::Month,
            Some(SummaryGroupBy::Category),
        );
        let usd = &summary.currencies["USD"];
        assert_eq!(usd.groups["Food"].total_expense, 80.0);
        assert_eq!(usd.groups["Salary"].total_income, 100.0);
        assert_eq!(usd.groups["Food"].transaction_count, 2);
    }

    #[test]
    fn transactions_outside_the_window_are_excluded() {
        let transactions = vec![
            txn("in", 20, 5.0, TransactionType::Expense, "USD", "x"),
            txn("out", 28, 5.0, TransactionType::Expense, "USD", "x"),
        ];
        // Week of 2024-03-18..24.
        let summary = summarize(&transactions, date(2024, 3, 20), Period::Week, None);
        assert_eq!(summary.transaction_count(), 1);
    }
}
