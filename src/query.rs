//! Filtering, multi-key sorting, and pagination over loaded records.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::records::{Budget, RecurringTransaction, Transaction, TransactionType};

/// Filter descriptor. Absent members impose no constraint.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Inclusive lower bound on the record's date, where the kind has one.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound.
    pub end_date: Option<NaiveDate>,
    pub categories: Option<Vec<String>>,
    pub accounts: Option<Vec<String>>,
    pub types: Option<Vec<TransactionType>>,
    pub sort: Vec<SortKey>,
    /// 1-indexed page; pagination applies only when both page and page_size
    /// are present.
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl RecordFilter {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Date,
    Amount,
    Type,
    Category,
    Account,
    Description,
    Currency,
    Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
    /// Lower priority compares first.
    pub priority: u32,
}

impl SortKey {
    pub fn ascending(field: SortField, priority: u32) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
            priority,
        }
    }

    pub fn descending(field: SortField, priority: u32) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
            priority,
        }
    }
}

/// Field access the engine needs from a record. Kinds without a given field
/// answer `None`; date bounds skip such records, membership filters exclude
/// them.
pub trait Queryable {
    fn record_id(&self) -> &str;
    fn record_date(&self) -> Option<NaiveDate>;
    fn amount(&self) -> f64;
    fn category(&self) -> Option<&str>;
    fn account(&self) -> Option<&str>;
    fn transaction_type(&self) -> Option<TransactionType>;
    fn description(&self) -> Option<&str>;
    fn currency(&self) -> Option<&str>;
}

/// Runs the full pipeline: filter, sort, paginate.
pub fn apply<T: Queryable>(mut records: Vec<T>, filter: &RecordFilter) -> Vec<T> {
    records.retain(|record| matches(record, filter));

    if !filter.sort.is_empty() {
        let mut keys = filter.sort.clone();
        keys.sort_by_key(|key| key.priority);
        // Stable sort: full ties keep their original relative order.
        records.sort_by(|a, b| compare_by_keys(a, b, &keys));
    }

    match (filter.page, filter.page_size) {
        (Some(page), Some(page_size)) if page >= 1 && page_size > 0 => records
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect(),
        _ => records,
    }
}

fn matches<T: Queryable>(record: &T, filter: &RecordFilter) -> bool {
    if let Some(date) = record.record_date() {
        if filter.start_date.map_or(false, |start| date < start) {
            return false;
        }
        if filter.end_date.map_or(false, |end| date > end) {
            return false;
        }
    }
    if let Some(categories) = &filter.categories {
        match record.category() {
            Some(category) if categories.iter().any(|c| c == category) => {}
            _ => return false,
        }
    }
    if let Some(accounts) = &filter.accounts {
        match record.account() {
            Some(account) if accounts.iter().any(|a| a == account) => {}
            _ => return false,
        }
    }
    if let Some(types) = &filter.types {
        match record.transaction_type() {
            Some(transaction_type) if types.contains(&transaction_type) => {}
            _ => return false,
        }
    }
    true
}

fn compare_by_keys<T: Queryable>(a: &T, b: &T, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ordering = compare_field(a, b, key.field);
        let ordering = match key.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Comparison keyed on the field's semantic type: chronological for dates,
/// numeric for amounts, lexicographic for the open-vocabulary strings.
fn compare_field<T: Queryable>(a: &T, b: &T, field: SortField) -> Ordering {
    match field {
        SortField::Date => a.record_date().cmp(&b.record_date()),
        SortField::Amount => a.amount().total_cmp(&b.amount()),
        SortField::Type => {
            let type_str = |r: &T| r.transaction_type().map(|t| t.as_str());
            type_str(a).cmp(&type_str(b))
        }
        SortField::Category => a.category().cmp(&b.category()),
        SortField::Account => a.account().cmp(&b.account()),
        SortField::Description => a.description().cmp(&b.description()),
        SortField::Currency => a.currency().cmp(&b.currency()),
        SortField::Id => a.record_id().cmp(b.record_id()),
    }
}

impl Queryable for Transaction {
    fn record_id(&self) -> &str {
        &self.id
    }
    fn record_date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
    fn amount(&self) -> f64 {
        self.amount
    }
    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }
    fn account(&self) -> Option<&str> {
        Some(&self.account)
    }
    fn transaction_type(&self) -> Option<TransactionType> {
        Some(self.transaction_type)
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn currency(&self) -> Option<&str> {
        Some(&self.currency)
    }
}

impl Queryable for Budget {
    fn record_id(&self) -> &str {
        &self.id
    }
    fn record_date(&self) -> Option<NaiveDate> {
        None
    }
    fn amount(&self) -> f64 {
        self.amount
    }
    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }
    fn account(&self) -> Option<&str> {
        None
    }
    fn transaction_type(&self) -> Option<TransactionType> {
        None
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn currency(&self) -> Option<&str> {
        Some(&self.currency)
    }
}

impl Queryable for RecurringTransaction {
    fn record_id(&self) -> &str {
        &self.id
    }
    fn record_date(&self) -> Option<NaiveDate> {
        Some(self.start_date)
    }
    fn amount(&self) -> f64 {
        self.amount
    }
    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }
    fn account(&self) -> Option<&str> {
        Some(&self.account)
    }
    fn transaction_type(&self) -> Option<TransactionType> {
        Some(self.transaction_type)
    }
    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
    fn currency(&self) -> Option<&str> {
        Some(&self.currency)
    }
}
