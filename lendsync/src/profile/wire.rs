//! Wire shapes returned by the upstream lending API.
//!
//! Deserialization is deliberately lenient: the backend omits or nulls
//! fields freely, decimal fields arrive as strings, and timestamp formats
//! vary between endpoints. Anything unparseable degrades to its default
//! instead of failing the whole branch.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Application status that marks a loan as active.
pub const STATUS_APPROVED: &str = "approved";

/// Payment statuses used by the summary derivations.
pub const PAYMENT_COMPLETED: &str = "completed";
pub const PAYMENT_FAILED: &str = "failed";

/// Interest rate assumed when the backend omits one, in percent.
pub const DEFAULT_INTEREST_RATE: f64 = 18.99;

/// Term assumed when the backend omits one, in months.
pub const DEFAULT_TERM_MONTHS: u32 = 24;

/// `accounts/profile/` record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One `loans/applications/` entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanApplication {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub application_id: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub approved_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub interest_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub term: Option<u32>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub applicant_estimated_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub credit_score: Option<u32>,
    #[serde(default)]
    pub ai_risk_assessment: Option<String>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub personal_info: Option<PersonalInfoRecord>,
    #[serde(default)]
    pub identification_info: Option<IdentificationRecord>,
    #[serde(default)]
    pub financial_profile: Option<FinancialProfileRecord>,
    #[serde(default)]
    pub address: Option<AddressRecord>,
    #[serde(default)]
    pub vehicle_info: Option<VehicleRecord>,
}

impl LoanApplication {
    /// Approved amount when present, else the requested amount.
    pub fn principal(&self) -> f64 {
        self.approved_amount.or(self.amount).unwrap_or(0.0)
    }

    pub fn rate(&self) -> f64 {
        self.interest_rate.unwrap_or(DEFAULT_INTEREST_RATE)
    }

    pub fn term_months(&self) -> u32 {
        self.term.unwrap_or(DEFAULT_TERM_MONTHS)
    }

    #[inline]
    pub fn is_approved(&self) -> bool {
        self.status == STATUS_APPROVED
    }

    /// Approval time when known, else submission time.
    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        self.approved_at.or(self.created_at)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalInfoRecord {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub social_security: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentificationRecord {
    #[serde(default)]
    pub identification_no: String,
    #[serde(default)]
    pub id_issuing_agency: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialProfileRecord {
    #[serde(default)]
    pub income_source: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub gross_monthly_income: Option<f64>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub employment_length: Option<u32>,
    /// "Yes" / "No" free-text flag from the application form.
    #[serde(default)]
    pub direct_deposit: Option<String>,
}

impl FinancialProfileRecord {
    pub fn has_direct_deposit(&self) -> bool {
        self.direct_deposit.as_deref() == Some("Yes")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressRecord {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleRecord {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub year: Option<u32>,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub vin: String,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub mileage: Option<u32>,
    #[serde(default)]
    pub license_plate: String,
    #[serde(default)]
    pub registration_state: String,
}

/// One `loans/payments/` entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub loan_id: Option<i64>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub is_late: bool,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub payment_date: Option<DateTime<Utc>>,
}

impl PaymentRecord {
    #[inline]
    pub fn is_completed(&self) -> bool {
        self.status == PAYMENT_COMPLETED
    }

    /// Whether this payment belongs to `loan`.
    pub fn is_for(&self, loan: &LoanApplication) -> bool {
        self.loan_id.is_some() && self.loan_id == loan.id
    }
}

/// One `loans/documents/` entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentUpload {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub document_type: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expiration_date: Option<String>,
}

/// Accept a float, a stringified decimal, or null; anything else degrades
/// to `None`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(value)) => Some(value),
        Some(Raw::Text(value)) => value.trim().parse().ok(),
        _ => None,
    })
}

/// Accept an integer, a stringified integer, or null; anything else
/// degrades to `None`.
fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(value)) => u32::try_from(value).ok(),
        Some(Raw::Text(value)) => value.trim().parse().ok(),
        _ => None,
    })
}

/// Accept RFC 3339 or a bare `YYYY-MM-DDTHH:MM:SS[.f]` timestamp (taken as
/// UTC), or null. Unparseable values degrade to `None`.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    let Some(Raw::Text(raw)) = Option::<Raw>::deserialize(deserializer)? else {
        return Ok(None);
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Some(naive.and_utc()));
    }

    Ok(None)
}
