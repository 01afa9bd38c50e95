//! Bidirectional mapping between records and their textual blocks.
//!
//! Label strings and header tokens are wire-compatible constants; documents
//! written by other tools interoperate as long as they reproduce them.

pub mod block;

pub use block::{Block, Document};

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDate;
use tracing::warn;

use crate::errors::MalformedBlock;
use crate::records::{
    Budget, BudgetPeriod, BudgetStatus, Frequency, RecurringTransaction, RuleStatus, Transaction,
    TransactionType,
};

pub const TRANSACTION_KIND: &str = "Transaction";
pub const BUDGET_KIND: &str = "Budget";
pub const RECURRING_KIND: &str = "RecurringTransaction";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Typed records recovered from a document, plus how many recognized blocks
/// were malformed and had to be skipped.
#[derive(Debug, Clone)]
pub struct DecodeOutcome<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

/// Decodes every block of `kind` in the document. Malformed blocks are
/// logged and counted, never fatal, so one corrupt block cannot take the
/// rest of the document down with it.
pub fn decode_blocks<T>(
    document: &Document,
    kind: &str,
    decode: impl Fn(&Block) -> Result<T, MalformedBlock>,
) -> DecodeOutcome<T> {
    let mut records = Vec::new();
    let mut skipped = 0;
    for block in document.blocks() {
        if block.kind != kind {
            continue;
        }
        match decode(block) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(%err, "skipping malformed block");
                skipped += 1;
            }
        }
    }
    DecodeOutcome { records, skipped }
}

pub fn encode_transaction(txn: &Transaction) -> Block {
    let fields = [
        ("Date", txn.date.format(DATE_FORMAT).to_string()),
        ("Amount", txn.amount.to_string()),
        ("Type", txn.transaction_type.to_string()),
        ("Category", txn.category.clone()),
        ("Account", txn.account.clone()),
        ("Description", txn.description.clone().unwrap_or_default()),
        ("Currency", txn.currency.clone()),
        ("ID", txn.id.clone()),
    ];
    Block::from_fields(TRANSACTION_KIND, &txn.id, &fields)
}

pub fn decode_transaction(block: &Block) -> Result<Transaction, MalformedBlock> {
    let id = required_id(block)?;
    Ok(Transaction {
        date: parse_date(block, "Date")?,
        amount: parse_amount(block)?,
        transaction_type: parse_token::<TransactionType>(block, "Type")?,
        category: text_field(block, "Category"),
        account: text_field(block, "Account"),
        description: optional_text(block, "Description"),
        currency: text_field(block, "Currency"),
        id,
    })
}

pub fn encode_budget(budget: &Budget) -> Block {
    let fields = [
        ("Category", budget.category.clone()),
        ("Amount", budget.amount.to_string()),
        ("Period", budget.period.to_string()),
        (
            "Status",
            budget.status.map(|s| s.to_string()).unwrap_or_default(),
        ),
        ("Description", budget.description.clone().unwrap_or_default()),
        ("Currency", budget.currency.clone()),
        ("ID", budget.id.clone()),
    ];
    Block::from_fields(BUDGET_KIND, &budget.id, &fields)
}

pub fn decode_budget(block: &Block) -> Result<Budget, MalformedBlock> {
    let id = required_id(block)?;
    Ok(Budget {
        category: text_field(block, "Category"),
        amount: parse_amount(block)?,
        period: parse_token::<BudgetPeriod>(block, "Period")?,
        status: parse_optional_token::<BudgetStatus>(block, "Status")?,
        description: optional_text(block, "Description"),
        currency: text_field(block, "Currency"),
        id,
    })
}

pub fn encode_recurring(rule: &RecurringTransaction) -> Block {
    let fields = [
        ("Type", rule.transaction_type.to_string()),
        ("Amount", rule.amount.to_string()),
        ("Category", rule.category.clone()),
        ("Account", rule.account.clone()),
        ("Frequency", rule.frequency.to_string()),
        ("StartDate", rule.start_date.format(DATE_FORMAT).to_string()),
        (
            "EndDate",
            rule.end_date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
        ),
        ("Status", rule.status.to_string()),
        ("Description", rule.description.clone().unwrap_or_default()),
        ("Currency", rule.currency.clone()),
        ("ID", rule.id.clone()),
    ];
    Block::from_fields(RECURRING_KIND, &rule.id, &fields)
}

pub fn decode_recurring(block: &Block) -> Result<RecurringTransaction, MalformedBlock> {
    let id = required_id(block)?;
    Ok(RecurringTransaction {
        transaction_type: parse_token::<TransactionType>(block, "Type")?,
        amount: parse_amount(block)?,
        category: text_field(block, "Category"),
        account: text_field(block, "Account"),
        frequency: parse_token::<Frequency>(block, "Frequency")?,
        start_date: parse_date(block, "StartDate")?,
        end_date: parse_optional_date(block, "EndDate")?,
        status: parse_optional_token::<RuleStatus>(block, "Status")?.unwrap_or_default(),
        description: optional_text(block, "Description"),
        currency: text_field(block, "Currency"),
        id,
    })
}

/// Field `ID` wins; the header id is the fallback for hand-written blocks.
fn required_id(block: &Block) -> Result<String, MalformedBlock> {
    if let Some(id) = block.field_opt("ID") {
        return Ok(id.trim().to_string());
    }
    if !block.id.is_empty() {
        return Ok(block.id.clone());
    }
    Err(malformed(block, "missing ID"))
}

fn require<'a>(block: &'a Block, label: &str) -> Result<&'a str, MalformedBlock> {
    block
        .field_opt(label)
        .ok_or_else(|| malformed(block, format!("missing {label}")))
}

fn parse_amount(block: &Block) -> Result<f64, MalformedBlock> {
    let raw = require(block, "Amount")?;
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|_| malformed(block, format!("unparseable Amount `{raw}`")))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(malformed(block, format!("invalid Amount `{raw}`")));
    }
    Ok(amount)
}

fn parse_date(block: &Block, label: &str) -> Result<NaiveDate, MalformedBlock> {
    let raw = require(block, label)?;
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| malformed(block, format!("unparseable {label} `{raw}`")))
}

fn parse_optional_date(block: &Block, label: &str) -> Result<Option<NaiveDate>, MalformedBlock> {
    match block.field_opt(label) {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
            .map(Some)
            .map_err(|_| malformed(block, format!("unparseable {label} `{raw}`"))),
        None => Ok(None),
    }
}

fn parse_token<T>(block: &Block, label: &str) -> Result<T, MalformedBlock>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = require(block, label)?;
    raw.parse()
        .map_err(|err| malformed(block, format!("bad {label}: {err}")))
}

fn parse_optional_token<T>(block: &Block, label: &str) -> Result<Option<T>, MalformedBlock>
where
    T: FromStr,
    T::Err: Display,
{
    match block.field_opt(label) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|err| malformed(block, format!("bad {label}: {err}"))),
        None => Ok(None),
    }
}

fn text_field(block: &Block, label: &str) -> String {
    block.field(label).unwrap_or_default().trim().to_string()
}

fn optional_text(block: &Block, label: &str) -> Option<String> {
    block.field_opt(label).map(|value| value.trim().to_string())
}

fn malformed(block: &Block, reason: impl Into<String>) -> MalformedBlock {
    MalformedBlock::new(&block.kind, &block.id, reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{BudgetDraft, RecurringTransactionDraft, TransactionDraft};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_transaction() -> Transaction {
        TransactionDraft {
            date: date(2024, 3, 20),
            amount: 100.5,
            transaction_type: TransactionType::Expense,
            category: "餐饮".into(),
            account: "支付宝".into(),
            description: Some("lunch: noodles".into()),
            currency: "CNY".into(),
        }
        .materialize("txn-1".into())
    }

    #[test]
    fn transaction_round_trips() {
        let txn = sample_transaction();
        let decoded = decode_transaction(&encode_transaction(&txn)).unwrap();
        assert_eq!(decoded, txn);
    }

    #[test]
    fn budget_round_trips_with_and_without_status() {
        let mut budget = BudgetDraft {
            category: "Groceries".into(),
            amount: 400.0,
            period: BudgetPeriod::Monthly,
            status: Some(BudgetStatus::Active),
            description: None,
            currency: "EUR".into(),
        }
        .materialize("bud-1".into());
        assert_eq!(decode_budget(&encode_budget(&budget)).unwrap(), budget);

        budget.status = None;
        assert_eq!(decode_budget(&encode_budget(&budget)).unwrap(), budget);
    }

    #[test]
    fn recurring_round_trips_open_ended() {
        let rule = RecurringTransactionDraft {
            transaction_type: TransactionType::Income,
            amount: 2500.0,
            category: "Salary".into(),
            account: "Checking".into(),
            frequency: Frequency::Monthly,
            start_date: date(2024, 1, 31),
            end_date: None,
            description: Some("payday".into()),
            currency: "USD".into(),
        }
        .materialize("rec-1".into());
        assert_eq!(decode_recurring(&encode_recurring(&rule)).unwrap(), rule);
    }

    #[test]
    fn malformed_block_is_skipped_not_fatal() {
        let good = encode_transaction(&sample_transaction());
        let mut doc = Document::with_title(2024, "Transactions");
        doc.append(good);
        doc.append(Block::from_fields(
            TRANSACTION_KIND,
            "broken",
            &[
                ("Date", "2024-03-21".to_string()),
                ("Type", "expense".to_string()),
            ],
        ));

        let reparsed = Document::parse(&doc.render());
        let outcome = decode_blocks(&reparsed, TRANSACTION_KIND, decode_transaction);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].id, "txn-1");
        assert_eq!(outcome.skipped, 1);
    }

    #[test]
    fn unrecognized_labels_are_ignored() {
        let mut doc = Document::with_title(2024, "Transactions");
        doc.append(encode_transaction(&sample_transaction()));
        let text = doc.render().replace("- ID:", "- Flagged: yes\n- ID:");
        let doc = Document::parse(&text);
        let outcome = decode_blocks(&doc, TRANSACTION_KIND, decode_transaction);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.skipped, 0);
    }

    #[test]
    fn header_id_backstops_a_missing_id_field() {
        let text = "\
## Transaction manual-7

- Date: 2024-06-01
- Amount: 12
- Type: income
";
        let doc = Document::parse(text);
        let outcome = decode_blocks(&doc, TRANSACTION_KIND, decode_transaction);
        assert_eq!(outcome.records[0].id, "manual-7");
    }

    #[test]
    fn foreign_kinds_are_not_counted_as_skips() {
        let mut doc = Document::with_title(2024, "Transactions");
        doc.append(Block::from_fields("Journal", "j1", &[]));
        let outcome = decode_blocks(&doc, TRANSACTION_KIND, decode_transaction);
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.skipped, 0);
    }
}
