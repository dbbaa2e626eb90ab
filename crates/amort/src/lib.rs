//! Fixed-payment loan amortization and calendar math.
//!
//! Pure helpers behind the financial fields a loan servicing view derives
//! at assembly time: amortized monthly payments, loan-to-value, maturity
//! dates, and tenure wording. No I/O, deterministic, testable in isolation
//! from any network layer.

use chrono::{Datelike, Months, NaiveDate};

/// Monthly payment for a fully amortizing fixed-rate loan.
///
/// `annual_rate_pct` is a percentage (18.99 means 18.99% APR) and
/// `term_months` must be at least 1. A zero rate degenerates to
/// straight-line `principal / term`.
///
/// The result is not clamped: callers that feed non-finite inputs get a
/// non-finite result back and are expected to substitute zero before
/// anything user-facing sees it.
pub fn monthly_payment(principal: f64, annual_rate_pct: f64, term_months: u32) -> f64 {
    let n = term_months as f64;
    let i = annual_rate_pct / 100.0 / 12.0;

    if i == 0.0 {
        return principal / n;
    }

    let growth = (1.0 + i).powf(n);
    principal * i * growth / (growth - 1.0)
}

/// Loan principal as a percentage of the collateral's estimated value.
///
/// A zero, absent, or non-finite collateral value yields 0 rather than a
/// division by zero.
pub fn loan_to_value(loan_amount: f64, vehicle_value: Option<f64>) -> f64 {
    match vehicle_value {
        Some(value) if value.is_finite() && value != 0.0 => loan_amount / value * 100.0,
        _ => 0.0,
    }
}

/// Maturity date: `start` plus `term_months` calendar months.
///
/// Month arithmetic is calendar-aware; a start date past the end of the
/// target month clamps to that month's last day (Jan 31 + 1 month is
/// Feb 28/29), never spilling into the following month.
pub fn maturity_date(start: NaiveDate, term_months: u32) -> NaiveDate {
    start + Months::new(term_months)
}

/// Whole calendar months from `from` to `to`, ignoring days-of-month.
/// Negative when `to` precedes `from`.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

/// Human-readable tenure between two dates, e.g. "2 years 3 months" or
/// "1 month". Clamps at zero months before the first full month.
pub fn tenure_since(from: NaiveDate, to: NaiveDate) -> String {
    let months = months_between(from, to).max(0);
    let years = months / 12;
    let remainder = months % 12;

    if years > 0 {
        format!(
            "{} year{} {} month{}",
            years,
            if years > 1 { "s" } else { "" },
            remainder,
            if remainder != 1 { "s" } else { "" }
        )
    } else {
        format!("{} month{}", months, if months != 1 { "s" } else { "" })
    }
}
