use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};

use super::validate_amount;

/// A spending guardrail for a category over a repeating period.
///
/// Budgets carry no date of their own; they live in the document of the year
/// the owning repository was configured with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub category: String,
    pub amount: f64,
    pub period: BudgetPeriod,
    pub status: Option<BudgetStatus>,
    pub description: Option<String>,
    pub currency: String,
}

impl Budget {
    pub fn validate(&self) -> Result<()> {
        validate_amount(self.amount)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetDraft {
    pub category: String,
    pub amount: f64,
    pub period: BudgetPeriod,
    pub status: Option<BudgetStatus>,
    pub description: Option<String>,
    pub currency: String,
}

impl BudgetDraft {
    pub fn materialize(self, id: String) -> Budget {
        Budget {
            id,
            category: self.category,
            amount: self.amount,
            period: self.period,
            status: self.status,
            description: self.description,
            currency: self.currency,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetPeriod {
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Yearly => "yearly",
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetPeriod {
    type Err = VaultError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(BudgetPeriod::Monthly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            other => Err(VaultError::validation(format!(
                "unknown budget period `{other}`"
            ))),
        }
    }
}

/// Advisory lifecycle marker; not enforced by the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetStatus {
    Active,
    Completed,
    Cancelled,
}

impl BudgetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetStatus::Active => "active",
            BudgetStatus::Completed => "completed",
            BudgetStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetStatus {
    type Err = VaultError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(BudgetStatus::Active),
            "completed" => Ok(BudgetStatus::Completed),
            "cancelled" => Ok(BudgetStatus::Cancelled),
            other => Err(VaultError::validation(format!(
                "unknown budget status `{other}`"
            ))),
        }
    }
}
