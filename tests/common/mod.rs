#![allow(dead_code)]

use std::sync::Mutex;

use chrono::NaiveDate;
use finvault::config::VaultConfig;
use finvault::events::EventBus;
use finvault::records::{
    BudgetDraft, BudgetPeriod, Frequency, RecurringTransactionDraft, TransactionDraft,
    TransactionType,
};
use finvault::repository::{
    BudgetRepository, RecurringTransactionRepository, Repository, TransactionRepository,
};
use finvault::store::FileVault;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary vaults live for the duration of the
/// test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub struct TestVault {
    pub store: FileVault,
    pub config: VaultConfig,
    pub bus: EventBus,
}

pub fn setup_vault() -> TestVault {
    let temp = TempDir::new().expect("create temp dir");
    let store = FileVault::new(temp.path());
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    TestVault {
        store,
        config: VaultConfig::default(),
        bus: EventBus::new(),
    }
}

impl TestVault {
    pub fn transactions(&self, year: i32) -> TransactionRepository<FileVault> {
        Repository::new(
            self.store.clone(),
            self.config.clone(),
            year,
            self.bus.clone(),
        )
    }

    pub fn budgets(&self, year: i32) -> BudgetRepository<FileVault> {
        Repository::new(
            self.store.clone(),
            self.config.clone(),
            year,
            self.bus.clone(),
        )
    }

    pub fn recurring(&self, year: i32) -> RecurringTransactionRepository<FileVault> {
        Repository::new(
            self.store.clone(),
            self.config.clone(),
            year,
            self.bus.clone(),
        )
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn transaction_draft(
    day: NaiveDate,
    amount: f64,
    transaction_type: TransactionType,
    category: &str,
    account: &str,
    currency: &str,
) -> TransactionDraft {
    TransactionDraft {
        date: day,
        amount,
        transaction_type,
        category: category.into(),
        account: account.into(),
        description: None,
        currency: currency.into(),
    }
}

pub fn budget_draft(category: &str, amount: f64) -> BudgetDraft {
    BudgetDraft {
        category: category.into(),
        amount,
        period: BudgetPeriod::Monthly,
        status: None,
        description: None,
        currency: "USD".into(),
    }
}

pub fn recurring_draft(
    start: NaiveDate,
    end: Option<NaiveDate>,
    frequency: Frequency,
) -> RecurringTransactionDraft {
    RecurringTransactionDraft {
        transaction_type: TransactionType::Expense,
        amount: 15.0,
        category: "Subscriptions".into(),
        account: "Checking".into(),
        frequency,
        start_date: start,
        end_date: end,
        description: None,
        currency: "USD".into(),
    }
}
