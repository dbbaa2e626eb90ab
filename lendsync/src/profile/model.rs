//! Normalized customer profile.
//!
//! The profile is rebuilt wholesale on every aggregation cycle so each
//! snapshot stays internally consistent; derived fields are computed at
//! assembly time and never persisted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids;

/// Aggregated, derived view of one customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub customer_id: String,
    pub account_status: AccountStatus,
    pub personal_info: PersonalInfo,
    pub contact: Contact,
    pub employment: Employment,
    pub membership: Membership,
    pub title_loans: Vec<TitleLoan>,
    pub payment_history: PaymentHistorySummary,
    pub documents: Vec<DocumentRecord>,
    pub preferences: Preferences,
    /// Branches that failed during aggregation, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<BranchDiagnostic>,
}

impl Profile {
    /// Known-good placeholder served when the account branch itself is
    /// unavailable and the fallback flag is set.
    pub fn fallback(user_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            customer_id: ids::customer_id(user_id, now),
            membership: Membership {
                join_date: Some(now.date_naive()),
                customer_since: "New Customer".to_owned(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Overall account standing derived from the applications on file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// At least one approved loan.
    Active,
    /// Applications on file, none approved yet.
    Registered,
    /// No applications on file.
    #[default]
    New,
}

impl AccountStatus {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Active => "Active - Good Standing",
            Self::Registered => "Registered",
            Self::New => "New Customer",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Last four digits only, e.g. "***-**-1234". Empty when unknown.
    pub ssn_masked: String,
    pub drivers_license: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contact {
    pub phone: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Employment {
    pub employer: String,
    pub monthly_income: f64,
    pub employment_length: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Membership {
    pub join_date: Option<NaiveDate>,
    /// Tenure wording, e.g. "2 years 3 months" or "New Customer".
    pub customer_since: String,
    pub credit_score: u32,
    pub risk_category: RiskCategory,
}

/// Risk band mapped from the upstream assessment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Low,
    #[default]
    Standard,
    High,
    VeryHigh,
}

impl RiskCategory {
    /// Fixed mapping from the upstream assessment tag; anything unknown is
    /// Standard.
    pub fn from_assessment(assessment: Option<&str>) -> Self {
        match assessment {
            Some("low") => Self::Low,
            Some("medium") => Self::Standard,
            Some("high") => Self::High,
            Some("very_high") => Self::VeryHigh,
            _ => Self::Standard,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Standard => "Standard",
            Self::High => "High Risk",
            Self::VeryHigh => "Very High Risk",
        }
    }
}

/// One active title loan with its derived financials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TitleLoan {
    pub loan_number: String,
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub term_months: u32,
    pub start_date: Option<NaiveDate>,

    // Derived at assembly time, never persisted.
    pub monthly_payment: f64,
    pub current_balance: f64,
    pub loan_to_value: f64,
    pub maturity_date: Option<NaiveDate>,
    pub next_payment_due: Option<NaiveDate>,
    pub total_paid: f64,
    pub payments_remaining: u32,

    pub collateral: CollateralVehicle,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollateralVehicle {
    pub year: Option<u32>,
    pub make: String,
    pub model: String,
    pub vin: String,
    pub mileage: Option<u32>,
    pub license_plate: String,
    pub registration_state: String,
    pub estimated_value: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentHistorySummary {
    pub total_payments: u32,
    pub on_time_payments: u32,
    pub late_payments: u32,
    pub missed_payments: u32,
    pub average_payment_amount: f64,
    pub last_payment_date: Option<NaiveDate>,
    pub last_payment_amount: f64,
    pub payment_method: PaymentMethod,
    pub next_payment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    AutoDebit,
    #[default]
    Manual,
}

/// Normalized document entry with its category tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Display name for the document type, e.g. "Driver's License".
    pub kind: String,
    pub name: String,
    pub status: DocumentStatus,
    pub uploaded_on: Option<NaiveDate>,
    pub expires_on: Option<NaiveDate>,
    pub required: bool,
    pub category: DocumentCategory,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Verified,
    #[default]
    Uploaded,
}

/// Document grouping used by the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    Identification,
    Income,
    Address,
    Collateral,
    Vehicle,
    #[default]
    Other,
}

impl DocumentCategory {
    /// Fixed mapping from the upstream document type tag.
    pub fn from_document_type(document_type: &str) -> Self {
        match document_type {
            "id" => Self::Identification,
            "income" => Self::Income,
            "address" => Self::Address,
            "vehicle_title" => Self::Collateral,
            "vehicle_image" => Self::Vehicle,
            _ => Self::Other,
        }
    }
}

/// Display name for an upstream document type tag.
pub fn document_display_name(document_type: &str) -> &'static str {
    match document_type {
        "id" => "Driver's License",
        "income" => "Proof of Income",
        "address" => "Address Proof",
        "vehicle_title" => "Vehicle Title",
        "vehicle_image" => "Vehicle Photos",
        "other" => "Other Document",
        _ => "Document",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    pub communication_method: String,
    pub payment_reminders: bool,
    pub marketing_emails: bool,
    pub paperless_statements: bool,
    pub auto_pay_enabled: bool,
    pub preferred_contact_time: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            communication_method: "Email & SMS".to_owned(),
            payment_reminders: true,
            marketing_emails: false,
            paperless_statements: true,
            auto_pay_enabled: false,
            preferred_contact_time: "Evening (6-8 PM)".to_owned(),
        }
    }
}

/// One of the independent data fetches that compose a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    Account,
    Applications,
    Payments,
    Documents,
}

impl Branch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Applications => "applications",
            Self::Payments => "payments",
            Self::Documents => "documents",
        }
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of one failed branch, attached to the profile it degraded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchDiagnostic {
    pub branch: Branch,
    pub message: String,
}
