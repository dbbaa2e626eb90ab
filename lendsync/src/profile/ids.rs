//! Deterministic customer and loan identifiers.
//!
//! Identifiers are pure functions of their inputs - no randomness, no
//! side-table lookups - so every aggregation cycle reproduces the same
//! values.

use chrono::{DateTime, Datelike, Utc};

pub const CUSTOMER_ID_PREFIX: &str = "CU";
pub const LOAN_NUMBER_PREFIX: &str = "TL";

/// Customer identifier in the form `CU-<join year>-<zero-padded user id>`.
pub fn customer_id(user_id: i64, joined: DateTime<Utc>) -> String {
    format!("{}-{}-{:03}", CUSTOMER_ID_PREFIX, joined.year(), user_id)
}

/// Loan number in the form `TL-<year>-<month>-<zero-padded sequence>`,
/// keyed by application date and per-customer sequence.
pub fn loan_number(applied: DateTime<Utc>, sequence: u32) -> String {
    format!(
        "{}-{}-{:02}-{:03}",
        LOAN_NUMBER_PREFIX,
        applied.year(),
        applied.month(),
        sequence
    )
}

/// Parsed pieces of a customer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerIdParts {
    pub year: i32,
    pub sequence: i64,
}

/// Parse a customer identifier, returning `None` for anything that does
/// not match the `CU-<year>-<sequence>` shape.
pub fn parse_customer_id(id: &str) -> Option<CustomerIdParts> {
    let mut parts = id.split('-');

    if parts.next()? != CUSTOMER_ID_PREFIX {
        return None;
    }

    let year = parts.next()?.parse().ok()?;
    let sequence = parts.next()?.parse().ok()?;

    if parts.next().is_some() {
        return None;
    }

    Some(CustomerIdParts { year, sequence })
}

pub fn is_valid_customer_id(id: &str) -> bool {
    parse_customer_id(id).is_some()
}
