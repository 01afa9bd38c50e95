use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};

use super::validate_amount;

/// A single dated ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub category: String,
    pub account: String,
    pub description: Option<String>,
    pub currency: String,
}

impl Transaction {
    /// The calendar year whose document holds this transaction.
    pub fn storage_year(&self) -> i32 {
        self.date.year()
    }

    pub fn validate(&self) -> Result<()> {
        validate_amount(self.amount)
    }
}

/// Transaction fields as supplied by a caller; the repository assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub date: NaiveDate,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub category: String,
    pub account: String,
    pub description: Option<String>,
    pub currency: String,
}

impl TransactionDraft {
    pub fn materialize(self, id: String) -> Transaction {
        Transaction {
            id,
            date: self.date,
            amount: self.amount,
            transaction_type: self.transaction_type,
            category: self.category,
            account: self.account,
            description: self.description,
            currency: self.currency,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = VaultError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(VaultError::validation(format!(
                "unknown transaction type `{other}`"
            ))),
        }
    }
}
