use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};

use super::{validate_amount, TransactionType};

/// A template that repeats on a fixed cadence. Rules are never expanded into
/// ledger rows automatically; expansion is a pure reporting primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringTransaction {
    pub id: String,
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub category: String,
    pub account: String,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    /// Open-ended when absent.
    pub end_date: Option<NaiveDate>,
    pub status: RuleStatus,
    pub description: Option<String>,
    pub currency: String,
}

impl RecurringTransaction {
    pub fn storage_year(&self) -> i32 {
        self.start_date.year()
    }

    pub fn validate(&self) -> Result<()> {
        validate_amount(self.amount)?;
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(VaultError::validation(format!(
                    "end date {end} precedes start date {}",
                    self.start_date
                )));
            }
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, RuleStatus::Active)
    }

    /// Suspends an active rule. Paused rules keep their definition but are
    /// excluded from expansion until resumed.
    pub fn pause(&mut self) -> Result<()> {
        match self.status {
            RuleStatus::Active => {
                self.status = RuleStatus::Paused;
                Ok(())
            }
            _ => Err(VaultError::validation(
                "only an active rule can be paused",
            )),
        }
    }

    pub fn resume(&mut self) -> Result<()> {
        match self.status {
            RuleStatus::Paused => {
                self.status = RuleStatus::Active;
                Ok(())
            }
            _ => Err(VaultError::validation(
                "only a paused rule can be resumed",
            )),
        }
    }

    /// Retires the rule permanently without deleting it.
    pub fn end(&mut self) {
        self.status = RuleStatus::Ended;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecurringTransactionDraft {
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub category: String,
    pub account: String,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub currency: String,
}

impl RecurringTransactionDraft {
    pub fn materialize(self, id: String) -> RecurringTransaction {
        RecurringTransaction {
            id,
            transaction_type: self.transaction_type,
            amount: self.amount,
            category: self.category,
            account: self.account,
            frequency: self.frequency,
            start_date: self.start_date,
            end_date: self.end_date,
            status: RuleStatus::Active,
            description: self.description,
            currency: self.currency,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = VaultError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(VaultError::validation(format!(
                "unknown frequency `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RuleStatus {
    #[default]
    Active,
    Paused,
    Ended,
}

impl RuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleStatus::Active => "active",
            RuleStatus::Paused => "paused",
            RuleStatus::Ended => "ended",
        }
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleStatus {
    type Err = VaultError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(RuleStatus::Active),
            "paused" => Ok(RuleStatus::Paused),
            "ended" => Ok(RuleStatus::Ended),
            other => Err(VaultError::validation(format!(
                "unknown rule status `{other}`"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rule() -> RecurringTransaction {
        RecurringTransactionDraft {
            transaction_type: TransactionType::Expense,
            amount: 15.0,
            category: "Subscriptions".into(),
            account: "Checking".into(),
            frequency: Frequency::Monthly,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: None,
            description: None,
            currency: "USD".into(),
        }
        .materialize("r1".into())
    }

    #[test]
    fn end_date_before_start_fails_validation() {
        let mut rule = sample_rule();
        rule.end_date = Some(NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
        assert!(rule.validate().is_err());
    }

    #[test]
    fn pause_and_resume_follow_the_state_machine() {
        let mut rule = sample_rule();
        assert!(rule.resume().is_err());
        rule.pause().unwrap();
        assert!(rule.pause().is_err());
        rule.resume().unwrap();
        assert!(rule.is_active());
        rule.end();
        assert!(rule.pause().is_err());
    }
}
