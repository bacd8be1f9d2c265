//! Simple-interest arithmetic over calendar-day spans.

use chrono::{Datelike, NaiveDate};

use crate::ledger::loan::InterestType;

const DAYS_PER_YEAR: f64 = 365.0;

/// Rounds a monetary amount to two decimal places.
pub fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Whole calendar days between two dates, clamped at zero.
pub fn day_count(from: NaiveDate, to: NaiveDate) -> u32 {
    (to - from).num_days().max(0) as u32
}

/// Converts a percentage rate to its daily equivalent.
///
/// Monthly rates are annualized (x12) before de-annualizing to daily; this
/// is the established business rule for monthly-rate loans, not `rate / 30`.
pub fn daily_rate(rate: f64, interest_type: InterestType) -> f64 {
    match interest_type {
        InterestType::PerMonth => rate * 12.0 / DAYS_PER_YEAR,
        InterestType::PerAnnum => rate / DAYS_PER_YEAR,
    }
}

/// Simple interest on `principal` over `days`, rounded to two decimals.
pub fn interest_for(principal: f64, rate: f64, days: u32, interest_type: InterestType) -> f64 {
    let daily = daily_rate(rate, interest_type);
    round2(principal * daily * days as f64 / 100.0)
}

/// Human-readable elapsed time since `start`, e.g. "1 year, 2 months, 3 days".
pub fn loan_age(start: NaiveDate, on: NaiveDate) -> String {
    if on < start {
        return "Not started yet".into();
    }

    let mut years = on.year() - start.year();
    let mut months = on.month() as i32 - start.month() as i32;
    let mut days = on.day() as i32 - start.day() as i32;

    if days < 0 {
        months -= 1;
        let (prev_year, prev_month) = previous_month(on.year(), on.month());
        days += days_in_month(prev_year, prev_month) as i32;
    }
    if months < 0 {
        years -= 1;
        months += 12;
    }

    let mut parts = Vec::new();
    if years > 0 {
        parts.push(format!("{} year{}", years, if years > 1 { "s" } else { "" }));
    }
    if months > 0 {
        parts.push(format!("{} month{}", months, if months > 1 { "s" } else { "" }));
    }
    if days > 0 {
        parts.push(format!("{} day{}", days, if days > 1 { "s" } else { "" }));
    }

    if parts.is_empty() {
        "Today".into()
    } else {
        parts.join(", ")
    }
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    (first_next - chrono::Duration::days(1)).day()
}
