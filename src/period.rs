use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(VaultError::validation(format!(
                "window end {end} precedes start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Reporting bucket sizes. Weeks follow the ISO calendar (Monday start).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Period {
    /// The window of this period containing `date`.
    pub fn window(&self, date: NaiveDate) -> DateWindow {
        match self {
            Period::Day => DateWindow {
                start: date,
                end: date,
            },
            Period::Week => {
                let start = date - Duration::days(date.weekday().num_days_from_monday() as i64);
                DateWindow {
                    start,
                    end: start + Duration::days(6),
                }
            }
            Period::Month => {
                let start = date.with_day(1).unwrap();
                DateWindow {
                    start,
                    end: end_of_month(date.year(), date.month()),
                }
            }
            Period::Quarter => {
                let first_month = quarter_first_month(date.month());
                let start = NaiveDate::from_ymd_opt(date.year(), first_month, 1).unwrap();
                DateWindow {
                    start,
                    end: end_of_month(date.year(), first_month + 2),
                }
            }
            Period::Year => DateWindow {
                start: NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap(),
            },
        }
    }

    /// Stable identifier for the period containing `date`, e.g. `2024-03`,
    /// `2024-W12`, `2024-Q1`.
    pub fn label(&self, date: NaiveDate) -> String {
        match self {
            Period::Day => date.format("%Y-%m-%d").to_string(),
            Period::Week => {
                let week = date.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Period::Month => date.format("%Y-%m").to_string(),
            Period::Quarter => {
                format!("{}-Q{}", date.year(), (date.month() - 1) / 3 + 1)
            }
            Period::Year => date.year().to_string(),
        }
    }
}

fn quarter_first_month(month: u32) -> u32 {
    (month - 1) / 3 * 3 + 1
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1).unwrap();
    (first_next - Duration::days(1)).day()
}

pub(crate) fn end_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)).unwrap()
}
