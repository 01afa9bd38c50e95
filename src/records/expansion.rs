//! Occurrence projection for recurring rules.
//!
//! Expansion never touches persistence; it answers which dates of a window a
//! rule lands on, for summaries and forecasts to consume.

use chrono::{Datelike, Duration, NaiveDate};

use crate::period::{days_in_month, DateWindow};

use super::recurring::{Frequency, RecurringTransaction};

const MAX_EXPANSION_OCCURRENCES: usize = 4096;

/// Dates inside `window` on which `rule` occurs, in ascending order.
///
/// Paused and ended rules expand to nothing. Day-of-month anchors beyond a
/// short month clamp to its last day, so a rule starting on the 31st still
/// fires once in February.
pub fn occurrences_in(rule: &RecurringTransaction, window: DateWindow) -> Vec<NaiveDate> {
    if !rule.is_active() {
        return Vec::new();
    }
    let limit = match rule.end_date {
        Some(end) => end.min(window.end),
        None => window.end,
    };
    if limit < window.start || rule.start_date > window.end {
        return Vec::new();
    }

    match rule.frequency {
        Frequency::Daily => daily(rule.start_date, window.start, limit),
        Frequency::Weekly => weekly(rule.start_date, window.start, limit),
        Frequency::Monthly => monthly(rule.start_date, window.start, limit),
        Frequency::Yearly => yearly(rule.start_date, window.start, limit),
    }
}

fn daily(start: NaiveDate, window_start: NaiveDate, limit: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut candidate = start.max(window_start);
    while candidate <= limit && dates.len() < MAX_EXPANSION_OCCURRENCES {
        dates.push(candidate);
        candidate += Duration::days(1);
    }
    dates
}

fn weekly(start: NaiveDate, window_start: NaiveDate, limit: NaiveDate) -> Vec<NaiveDate> {
    let from = start.max(window_start);
    let offset = (from - start).num_days();
    let steps = offset.div_euclid(7) + if offset.rem_euclid(7) == 0 { 0 } else { 1 };
    let mut candidate = start + Duration::weeks(steps);
    let mut dates = Vec::new();
    while candidate <= limit && dates.len() < MAX_EXPANSION_OCCURRENCES {
        dates.push(candidate);
        candidate += Duration::weeks(1);
    }
    dates
}

fn monthly(start: NaiveDate, window_start: NaiveDate, limit: NaiveDate) -> Vec<NaiveDate> {
    let anchor_day = start.day();
    let (mut year, mut month) = if window_start > start {
        (window_start.year(), window_start.month())
    } else {
        (start.year(), start.month())
    };
    let mut dates = Vec::new();
    loop {
        let candidate = clamped_date(year, month, anchor_day);
        if candidate > limit || dates.len() >= MAX_EXPANSION_OCCURRENCES {
            break;
        }
        if candidate >= start && candidate >= window_start {
            dates.push(candidate);
        }
        if month == 12 {
            month = 1;
            year += 1;
        } else {
            month += 1;
        }
    }
    dates
}

fn yearly(start: NaiveDate, window_start: NaiveDate, limit: NaiveDate) -> Vec<NaiveDate> {
    let first_year = start.year().max(window_start.year());
    let mut dates = Vec::new();
    for year in first_year..=limit.year() {
        let candidate = clamped_date(year, start.month(), start.day());
        if candidate > limit || dates.len() >= MAX_EXPANSION_OCCURRENCES {
            break;
        }
        if candidate >= start && candidate >= window_start {
            dates.push(candidate);
        }
    }
    dates
}

fn clamped_date(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{RecurringTransactionDraft, TransactionType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rule(frequency: Frequency, start: NaiveDate, end: Option<NaiveDate>) -> RecurringTransaction {
        RecurringTransactionDraft {
            transaction_type: TransactionType::Expense,
            amount: 9.99,
            category: "Subscriptions".into(),
            account: "Checking".into(),
            frequency,
            start_date: start,
            end_date: end,
            description: None,
            currency: "USD".into(),
        }
        .materialize("rule".into())
    }

    fn window(start: NaiveDate, end: NaiveDate) -> DateWindow {
        DateWindow::new(start, end).unwrap()
    }

    #[test]
    fn monthly_rule_clamps_to_short_months() {
        let rule = rule(Frequency::Monthly, date(2024, 1, 31), None);
        let leap = occurrences_in(&rule, window(date(2024, 2, 1), date(2024, 2, 29)));
        assert_eq!(leap, vec![date(2024, 2, 29)]);

        let rule = rule_with_start(date(2023, 1, 31));
        let plain = occurrences_in(&rule, window(date(2023, 2, 1), date(2023, 2, 28)));
        assert_eq!(plain, vec![date(2023, 2, 28)]);
    }

    fn rule_with_start(start: NaiveDate) -> RecurringTransaction {
        rule(Frequency::Monthly, start, None)
    }

    #[test]
    fn daily_rule_covers_every_day_of_the_overlap() {
        let rule = rule(
            Frequency::Daily,
            date(2024, 3, 10),
            Some(date(2024, 3, 20)),
        );
        let dates = occurrences_in(&rule, window(date(2024, 3, 15), date(2024, 3, 31)));
        assert_eq!(dates.len(), 6);
        assert_eq!(dates.first(), Some(&date(2024, 3, 15)));
        assert_eq!(dates.last(), Some(&date(2024, 3, 20)));
    }

    #[test]
    fn weekly_rule_steps_from_the_start_date() {
        let rule = rule(Frequency::Weekly, date(2024, 1, 3), None);
        let dates = occurrences_in(&rule, window(date(2024, 1, 10), date(2024, 1, 31)));
        assert_eq!(
            dates,
            vec![date(2024, 1, 10), date(2024, 1, 17), date(2024, 1, 24), date(2024, 1, 31)]
        );
    }

    #[test]
    fn weekly_rule_aligns_to_the_next_step_inside_the_window() {
        let rule = rule(Frequency::Weekly, date(2024, 1, 3), None);
        let dates = occurrences_in(&rule, window(date(2024, 1, 12), date(2024, 1, 25)));
        assert_eq!(dates, vec![date(2024, 1, 17), date(2024, 1, 24)]);
    }

    #[test]
    fn yearly_rule_clamps_leap_day() {
        let rule = rule(Frequency::Yearly, date(2024, 2, 29), None);
        let dates = occurrences_in(&rule, window(date(2025, 1, 1), date(2025, 12, 31)));
        assert_eq!(dates, vec![date(2025, 2, 28)]);
    }

    #[test]
    fn disjoint_rule_and_window_yield_nothing() {
        let ended = rule(
            Frequency::Monthly,
            date(2023, 1, 1),
            Some(date(2023, 6, 30)),
        );
        assert!(occurrences_in(&ended, window(date(2024, 1, 1), date(2024, 1, 31))).is_empty());

        let future = rule(Frequency::Monthly, date(2025, 1, 1), None);
        assert!(occurrences_in(&future, window(date(2024, 1, 1), date(2024, 1, 31))).is_empty());
    }

    #[test]
    fn paused_rule_expands_to_nothing() {
        let mut rule = rule(Frequency::Monthly, date(2024, 1, 1), None);
        rule.pause().unwrap();
        assert!(occurrences_in(&rule, window(date(2024, 1, 1), date(2024, 12, 31))).is_empty());
    }
}
