use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::codec::{
    self, Block, BUDGET_KIND, RECURRING_KIND, TRANSACTION_KIND,
};
use crate::errors::{MalformedBlock, Result};
use crate::events::Topic;
use crate::period::Period;
use crate::query::RecordFilter;
use crate::records::{
    Budget, BudgetDraft, RecurringTransaction, RecurringTransactionDraft, Transaction,
    TransactionDraft,
};
use crate::store::DocumentStore;
use crate::summary::{self, PeriodSummary, SummaryGroupBy};

use super::{RecordKind, Repository};

pub enum TransactionKind {}

impl RecordKind for TransactionKind {
    type Record = Transaction;
    type Draft = TransactionDraft;

    const KIND: &'static str = TRANSACTION_KIND;
    const KIND_LABEL: &'static str = "transaction";
    const DOC_TITLE: &'static str = "Transactions";
    const FILE_STEM: &'static str = "transactions";
    const TOPIC: Topic = Topic::Transactions;
    const DATE_BUCKETED: bool = true;

    fn materialize(draft: Self::Draft, id: String) -> Self::Record {
        draft.materialize(id)
    }

    fn validate(record: &Self::Record) -> Result<()> {
        record.validate()
    }

    fn storage_year(record: &Self::Record, _active_year: i32) -> i32 {
        record.storage_year()
    }

    fn encode(record: &Self::Record) -> Block {
        codec::encode_transaction(record)
    }

    fn decode(block: &Block) -> std::result::Result<Self::Record, MalformedBlock> {
        codec::decode_transaction(block)
    }
}

pub enum BudgetKind {}

impl RecordKind for BudgetKind {
    type Record = Budget;
    type Draft = BudgetDraft;

    const KIND: &'static str = BUDGET_KIND;
    const KIND_LABEL: &'static str = "budget";
    const DOC_TITLE: &'static str = "Budgets";
    const FILE_STEM: &'static str = "budgets";
    const TOPIC: Topic = Topic::Budgets;
    const DATE_BUCKETED: bool = false;

    fn materialize(draft: Self::Draft, id: String) -> Self::Record {
        draft.materialize(id)
    }

    fn validate(record: &Self::Record) -> Result<()> {
        record.validate()
    }

    /// Budgets carry no date; they bind to the year the repository was
    /// configured with, never to the wall clock at call time.
    fn storage_year(_record: &Self::Record, active_year: i32) -> i32 {
        active_year
    }

    fn encode(record: &Self::Record) -> Block {
        codec::encode_budget(record)
    }

    fn decode(block: &Block) -> std::result::Result<Self::Record, MalformedBlock> {
        codec::decode_budget(block)
    }
}

pub enum RecurringKind {}

impl RecordKind for RecurringKind {
    type Record = RecurringTransaction;
    type Draft = RecurringTransactionDraft;

    const KIND: &'static str = RECURRING_KIND;
    const KIND_LABEL: &'static str = "recurring transaction";
    const DOC_TITLE: &'static str = "Recurring Transactions";
    const FILE_STEM: &'static str = "recurring-transactions";
    const TOPIC: Topic = Topic::RecurringTransactions;
    const DATE_BUCKETED: bool = true;

    fn materialize(draft: Self::Draft, id: String) -> Self::Record {
        draft.materialize(id)
    }

    fn validate(record: &Self::Record) -> Result<()> {
        record.validate()
    }

    fn storage_year(record: &Self::Record, _active_year: i32) -> i32 {
        record.storage_year()
    }

    fn encode(record: &Self::Record) -> Block {
        codec::encode_recurring(record)
    }

    fn decode(block: &Block) -> std::result::Result<Self::Record, MalformedBlock> {
        codec::decode_recurring(block)
    }
}

pub type TransactionRepository<S> = Repository<TransactionKind, S>;
pub type BudgetRepository<S> = Repository<BudgetKind, S>;
pub type RecurringTransactionRepository<S> = Repository<RecurringKind, S>;

impl<S: DocumentStore> Repository<TransactionKind, S> {
    /// Every category observed in the loaded transactions plus the
    /// configured defaults, deduplicated and sorted ascending.
    pub fn categories(&mut self) -> Result<Vec<String>> {
        self.ensure_initialized()?;
        let mut values: BTreeSet<String> = self
            .config()
            .default_categories
            .iter()
            .cloned()
            .collect();
        values.extend(
            self.cache()
                .iter()
                .map(|txn| txn.category.clone())
                .filter(|category| !category.is_empty()),
        );
        Ok(values.into_iter().collect())
    }

    /// Every account observed plus the configured default account.
    pub fn accounts(&mut self) -> Result<Vec<String>> {
        self.ensure_initialized()?;
        let mut values = BTreeSet::new();
        values.insert(self.config().default_account.clone());
        values.extend(
            self.cache()
                .iter()
                .map(|txn| txn.account.clone())
                .filter(|account| !account.is_empty()),
        );
        Ok(values.into_iter().collect())
    }

    /// Queries the period's window and aggregates it per currency.
    pub fn summarize(
        &mut self,
        date: NaiveDate,
        period: Period,
        group_by: Option<SummaryGroupBy>,
    ) -> Result<PeriodSummary> {
        let window = period.window(date);
        let transactions = self.query(&RecordFilter::between(window.start, window.end))?;
        Ok(summary::summarize_window(
            &transactions,
            window,
            period.label(date),
            group_by,
        ))
    }
}
