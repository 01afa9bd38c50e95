//! Record kinds persisted in the vault and their shared vocabulary.

pub mod budget;
pub mod expansion;
pub mod recurring;
pub mod transaction;

pub use budget::{Budget, BudgetDraft, BudgetPeriod, BudgetStatus};
pub use expansion::occurrences_in;
pub use recurring::{Frequency, RecurringTransaction, RecurringTransactionDraft, RuleStatus};
pub use transaction::{Transaction, TransactionDraft, TransactionType};

use crate::errors::{Result, VaultError};

pub(crate) fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() {
        return Err(VaultError::validation("amount must be a finite number"));
    }
    if amount < 0.0 {
        return Err(VaultError::validation("amount must not be negative"));
    }
    Ok(())
}
