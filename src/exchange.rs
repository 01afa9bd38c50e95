//! Spreadsheet import/export mapping for transactions.
//!
//! Columns map 1:1 to the codec's field labels. Dates round-trip as
//! `YYYY-MM-DD` and the `Type` column accepts case-insensitive tokens on
//! import. The `ID` column is exported for reference only; imported rows
//! become drafts and receive fresh ids when added to a repository.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::errors::{Result, VaultError};
use crate::records::{Transaction, TransactionDraft, TransactionType};

pub const CSV_HEADERS: [&str; 8] = [
    "Date",
    "Amount",
    "Type",
    "Category",
    "Account",
    "Description",
    "Currency",
    "ID",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn export_transactions(transactions: &[Transaction]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADERS).map_err(csv_error)?;
    for txn in transactions {
        writer
            .write_record(&[
                txn.date.format(DATE_FORMAT).to_string(),
                txn.amount.to_string(),
                txn.transaction_type.to_string(),
                txn.category.clone(),
                txn.account.clone(),
                txn.description.clone().unwrap_or_default(),
                txn.currency.clone(),
                txn.id.clone(),
            ])
            .map_err(csv_error)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| VaultError::storage(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| VaultError::storage(err.to_string()))
}

pub fn import_transactions(text: &str) -> Result<Vec<TransactionDraft>> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let columns: HashMap<String, usize> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .enumerate()
        .map(|(index, name)| (name.trim().to_ascii_lowercase(), index))
        .collect();

    let mut drafts = Vec::new();
    for (index, row) in reader.records().enumerate() {
        // Row 1 is the header line.
        let line = index + 2;
        let row = row.map_err(|err| {
            VaultError::validation(format!("row {line}: unreadable ({err})"))
        })?;
        let value = |label: &str| -> &str {
            columns
                .get(label)
                .and_then(|column| row.get(*column))
                .unwrap_or("")
                .trim()
        };

        let date = NaiveDate::parse_from_str(value("date"), DATE_FORMAT).map_err(|_| {
            VaultError::validation(format!("row {line}: unparseable Date `{}`", value("date")))
        })?;
        let amount: f64 = value("amount").parse().map_err(|_| {
            VaultError::validation(format!(
                "row {line}: unparseable Amount `{}`",
                value("amount")
            ))
        })?;
        let transaction_type: TransactionType = value("type")
            .parse()
            .map_err(|_| {
                VaultError::validation(format!("row {line}: unknown Type `{}`", value("type")))
            })?;

        let description = value("description");
        drafts.push(TransactionDraft {
            date,
            amount,
            transaction_type,
            category: value("category").to_string(),
            account: value("account").to_string(),
            description: if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            },
            currency: value("currency").to_string(),
        });
    }
    Ok(drafts)
}

fn csv_error(err: csv::Error) -> VaultError {
    VaultError::storage(err.to_string())
}
