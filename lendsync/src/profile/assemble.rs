//! Pure assembly of a [`Profile`] from raw branch data.
//!
//! Branch-level failures are absorbed before this module runs; everything
//! here is a deterministic function of `(user_id, bundle, now)`. An error
//! out of [`compose_profile`] means the upstream contract itself was
//! violated and is fatal to the aggregation.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};

use amort::{loan_to_value, maturity_date, monthly_payment, tenure_since};

use crate::error::{Error, Result};

use super::ids;
use super::model::{
    AccountStatus, BranchDiagnostic, CollateralVehicle, Contact, DocumentRecord, DocumentStatus,
    DocumentCategory, Employment, Membership, PaymentHistorySummary, PaymentMethod, PersonalInfo,
    Preferences, Profile, RiskCategory, TitleLoan, document_display_name,
};
use super::wire::{AccountRecord, DocumentUpload, LoanApplication, PAYMENT_FAILED, PaymentRecord};

/// Raw branch results captured by the aggregator.
///
/// Failed branches hold their defaults; the failures themselves ride along
/// as diagnostics.
#[derive(Debug, Default)]
pub struct RawBundle {
    pub account: Option<AccountRecord>,
    pub applications: Vec<LoanApplication>,
    pub payments: Vec<PaymentRecord>,
    pub documents: Vec<DocumentUpload>,
    pub diagnostics: Vec<BranchDiagnostic>,
}

/// Compose the normalized profile for `user_id` from `bundle`.
pub fn compose_profile(user_id: i64, bundle: &RawBundle, now: DateTime<Utc>) -> Result<Profile> {
    let account = bundle.account.clone().unwrap_or_default();
    let joined = account.created_at.unwrap_or(now);
    let primary = primary_application(&bundle.applications);

    let title_loans = bundle
        .applications
        .iter()
        .filter(|app| app.is_approved())
        .enumerate()
        .map(|(index, loan)| build_title_loan(loan, index as u32 + 1, &bundle.payments, now))
        .collect::<Result<Vec<_>>>()?;

    Ok(Profile {
        customer_id: ids::customer_id(user_id, joined),
        account_status: account_status(&bundle.applications),
        personal_info: build_personal_info(&account, primary),
        contact: build_contact(&account, primary),
        employment: build_employment(primary),
        membership: build_membership(&account, primary, joined, now),
        title_loans,
        payment_history: summarize_payments(&bundle.payments, primary, now),
        documents: map_documents(&bundle.documents),
        preferences: build_preferences(primary),
        diagnostics: bundle.diagnostics.clone(),
    })
}

/// Primary loan selection: prefer an approved application, otherwise the
/// first in received order.
pub fn primary_application(applications: &[LoanApplication]) -> Option<&LoanApplication> {
    applications
        .iter()
        .find(|app| app.is_approved())
        .or_else(|| applications.first())
}

/// Account standing derived from the applications on file.
pub fn account_status(applications: &[LoanApplication]) -> AccountStatus {
    if applications.iter().any(|app| app.is_approved()) {
        AccountStatus::Active
    } else if !applications.is_empty() {
        AccountStatus::Registered
    } else {
        AccountStatus::New
    }
}

fn build_personal_info(account: &AccountRecord, primary: Option<&LoanApplication>) -> PersonalInfo {
    let personal = primary.and_then(|app| app.personal_info.as_ref());
    let identification = primary.and_then(|app| app.identification_info.as_ref());

    let first_name = or_fallback(
        &account.first_name,
        personal.map_or("", |p| p.first_name.as_str()),
    );
    let last_name = or_fallback(
        &account.last_name,
        personal.map_or("", |p| p.last_name.as_str()),
    );
    let full_name = format!("{} {}", first_name, last_name).trim().to_owned();

    let date_of_birth = account
        .date_of_birth
        .as_deref()
        .or(personal.and_then(|p| p.dob.as_deref()))
        .and_then(parse_date);

    PersonalInfo {
        first_name,
        last_name,
        full_name,
        date_of_birth,
        ssn_masked: personal
            .and_then(|p| p.social_security.as_deref())
            .map(mask_ssn)
            .unwrap_or_default(),
        drivers_license: identification
            .map(|id| id.identification_no.clone())
            .unwrap_or_default(),
    }
}

fn build_contact(account: &AccountRecord, primary: Option<&LoanApplication>) -> Contact {
    let personal = primary.and_then(|app| app.personal_info.as_ref());
    let address = primary.and_then(|app| app.address.as_ref());

    Contact {
        phone: or_fallback(
            &account.phone_number,
            personal.map_or("", |p| p.phone.as_str()),
        ),
        email: or_fallback(&account.email, personal.map_or("", |p| p.email.as_str())),
        street: address.map(|a| a.street.clone()).unwrap_or_default(),
        city: address.map(|a| a.city.clone()).unwrap_or_default(),
        state: address.map(|a| a.state.clone()).unwrap_or_default(),
        zip_code: address.map(|a| a.zip_code.clone()).unwrap_or_default(),
    }
}

fn build_employment(primary: Option<&LoanApplication>) -> Employment {
    let financial = primary.and_then(|app| app.financial_profile.as_ref());

    Employment {
        employer: financial.map(|f| f.income_source.clone()).unwrap_or_default(),
        monthly_income: finite_or_zero(
            financial.and_then(|f| f.gross_monthly_income).unwrap_or(0.0),
        ),
        employment_length: financial.and_then(|f| f.employment_length).map(|years| {
            format!("{} year{}", years, if years == 1 { "" } else { "s" })
        }),
    }
}

fn build_membership(
    account: &AccountRecord,
    primary: Option<&LoanApplication>,
    joined: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Membership {
    let customer_since = if account.created_at.is_some() {
        tenure_since(joined.date_naive(), now.date_naive())
    } else {
        "New Customer".to_owned()
    };

    Membership {
        join_date: Some(joined.date_naive()),
        customer_since,
        credit_score: primary.and_then(|app| app.credit_score).unwrap_or(0),
        risk_category: RiskCategory::from_assessment(
            primary.and_then(|app| app.ai_risk_assessment.as_deref()),
        ),
    }
}

fn build_title_loan(
    loan: &LoanApplication,
    sequence: u32,
    payments: &[PaymentRecord],
    now: DateTime<Utc>,
) -> Result<TitleLoan> {
    let principal = loan.principal();
    if principal <= 0.0 || !principal.is_finite() {
        // Approved applications always carry an amount; a missing one is a
        // contract violation, not missing data.
        return Err(Error::assembly(format!(
            "approved application {} has no usable amount",
            loan.id.unwrap_or_default()
        )));
    }

    let rate = loan.rate();
    let term = loan.term_months().max(1);
    let started = loan.start_date();

    let completed: Vec<&PaymentRecord> = payments
        .iter()
        .filter(|payment| payment.is_for(loan) && payment.is_completed())
        .collect();
    let total_paid: f64 = completed
        .iter()
        .map(|payment| payment.amount.unwrap_or(0.0))
        .sum();

    Ok(TitleLoan {
        loan_number: ids::loan_number(loan.created_at.unwrap_or(now), sequence),
        loan_amount: principal,
        interest_rate: rate,
        term_months: term,
        start_date: started.map(|t| t.date_naive()),
        monthly_payment: finite_or_zero(monthly_payment(principal, rate, term)),
        current_balance: principal - total_paid,
        loan_to_value: finite_or_zero(loan_to_value(
            principal,
            loan.applicant_estimated_value,
        )),
        maturity_date: started.map(|t| maturity_date(t.date_naive(), term)),
        next_payment_due: Some(next_payment_date(now)),
        total_paid,
        payments_remaining: term.saturating_sub(completed.len() as u32),
        collateral: build_collateral(loan),
    })
}

fn build_collateral(loan: &LoanApplication) -> CollateralVehicle {
    let vehicle = loan.vehicle_info.as_ref();
    let address = loan.address.as_ref();

    CollateralVehicle {
        year: vehicle.and_then(|v| v.year),
        make: vehicle.map(|v| v.make.clone()).unwrap_or_default(),
        model: vehicle.map(|v| v.model.clone()).unwrap_or_default(),
        vin: vehicle.map(|v| v.vin.clone()).unwrap_or_default(),
        mileage: vehicle.and_then(|v| v.mileage),
        license_plate: vehicle.map(|v| v.license_plate.clone()).unwrap_or_default(),
        registration_state: or_fallback(
            vehicle.map_or("", |v| v.registration_state.as_str()),
            address.map_or("", |a| a.state.as_str()),
        ),
        estimated_value: finite_or_zero(loan.applicant_estimated_value.unwrap_or(0.0)),
    }
}

fn summarize_payments(
    payments: &[PaymentRecord],
    primary: Option<&LoanApplication>,
    now: DateTime<Utc>,
) -> PaymentHistorySummary {
    let completed: Vec<&PaymentRecord> = payments
        .iter()
        .filter(|payment| payment.is_completed())
        .collect();
    let total: f64 = completed
        .iter()
        .map(|payment| payment.amount.unwrap_or(0.0))
        .sum();
    let last = completed.iter().max_by_key(|payment| payment.payment_date);

    PaymentHistorySummary {
        total_payments: payments.len() as u32,
        on_time_payments: completed.iter().filter(|p| !p.is_late).count() as u32,
        late_payments: payments.iter().filter(|p| p.is_late).count() as u32,
        missed_payments: payments
            .iter()
            .filter(|p| p.status == PAYMENT_FAILED)
            .count() as u32,
        average_payment_amount: if completed.is_empty() {
            0.0
        } else {
            total / completed.len() as f64
        },
        last_payment_date: last.and_then(|p| p.payment_date).map(|t| t.date_naive()),
        last_payment_amount: last.and_then(|p| p.amount).unwrap_or(0.0),
        payment_method: if auto_pay(primary) {
            PaymentMethod::AutoDebit
        } else {
            PaymentMethod::Manual
        },
        next_payment_date: Some(next_payment_date(now)),
    }
}

fn map_documents(documents: &[DocumentUpload]) -> Vec<DocumentRecord> {
    documents
        .iter()
        .map(|doc| DocumentRecord {
            kind: document_display_name(&doc.document_type).to_owned(),
            name: doc
                .title
                .clone()
                .filter(|title| !title.is_empty())
                .or_else(|| {
                    doc.file
                        .as_deref()
                        .and_then(|file| file.rsplit('/').next())
                        .map(str::to_owned)
                })
                .unwrap_or_else(|| "Document".to_owned()),
            status: if doc.is_verified {
                DocumentStatus::Verified
            } else {
                DocumentStatus::Uploaded
            },
            uploaded_on: doc.uploaded_at.map(|t| t.date_naive()),
            expires_on: doc.expiration_date.as_deref().and_then(parse_date),
            required: true,
            category: DocumentCategory::from_document_type(&doc.document_type),
        })
        .collect()
}

fn build_preferences(primary: Option<&LoanApplication>) -> Preferences {
    Preferences {
        auto_pay_enabled: auto_pay(primary),
        ..Default::default()
    }
}

fn auto_pay(primary: Option<&LoanApplication>) -> bool {
    primary
        .and_then(|app| app.financial_profile.as_ref())
        .is_some_and(|financial| financial.has_direct_deposit())
}

/// Payments fall due on the 15th of the following month.
fn next_payment_date(now: DateTime<Utc>) -> NaiveDate {
    let next_month = now.date_naive() + Months::new(1);
    next_month.with_day(15).unwrap_or(next_month)
}

fn or_fallback(preferred: &str, fallback: &str) -> String {
    if preferred.is_empty() {
        fallback.to_owned()
    } else {
        preferred.to_owned()
    }
}

/// Mask an SSN down to its last four digits.
fn mask_ssn(ssn: &str) -> String {
    let digits: String = ssn.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 4 {
        return String::new();
    }
    format!("***-**-{}", &digits[digits.len() - 4..])
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::model::Branch;
    use crate::profile::wire::{
        AddressRecord, FinancialProfileRecord, PersonalInfoRecord, VehicleRecord,
    };
    use chrono::{Datelike, TimeZone};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn account() -> AccountRecord {
        AccountRecord {
            id: Some(7),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone_number: "555-0100".into(),
            date_of_birth: Some("1990-05-04".into()),
            created_at: Some(at(2022, 3, 1)),
        }
    }

    fn approved_loan() -> LoanApplication {
        LoanApplication {
            id: Some(4),
            status: "approved".into(),
            amount: Some(10_000.0),
            approved_amount: Some(8500.0),
            interest_rate: Some(18.99),
            term: Some(24),
            applicant_estimated_value: Some(16_800.0),
            credit_score: Some(680),
            ai_risk_assessment: Some("low".into()),
            created_at: Some(at(2024, 1, 10)),
            approved_at: Some(at(2024, 1, 15)),
            financial_profile: Some(FinancialProfileRecord {
                income_source: "Acme Corp".into(),
                gross_monthly_income: Some(4200.0),
                employment_length: Some(3),
                direct_deposit: Some("Yes".into()),
            }),
            personal_info: Some(PersonalInfoRecord {
                social_security: Some("123-45-6789".into()),
                ..Default::default()
            }),
            address: Some(AddressRecord {
                street: "1 Main St".into(),
                city: "Austin".into(),
                state: "TX".into(),
                zip_code: "78701".into(),
            }),
            vehicle_info: Some(VehicleRecord {
                year: Some(2019),
                make: "Honda".into(),
                model: "Civic".into(),
                vin: "VIN123".into(),
                mileage: Some(42_000),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn payment(loan_id: i64, amount: f64, status: &str, when: DateTime<Utc>) -> PaymentRecord {
        PaymentRecord {
            id: Some(1),
            loan_id: Some(loan_id),
            status: status.into(),
            is_late: false,
            amount: Some(amount),
            payment_date: Some(when),
        }
    }

    #[test]
    fn test_primary_application_prefers_approved() {
        let pending = LoanApplication {
            id: Some(1),
            status: "pending".into(),
            ..Default::default()
        };
        let approved = approved_loan();

        let applications = vec![pending.clone(), approved.clone()];
        assert_eq!(primary_application(&applications).unwrap().id, approved.id);

        let applications = vec![pending.clone()];
        assert_eq!(primary_application(&applications).unwrap().id, pending.id);

        assert!(primary_application(&[]).is_none());
    }

    #[test]
    fn test_account_status_variants() {
        assert_eq!(account_status(&[]), AccountStatus::New);
        assert_eq!(
            account_status(&[LoanApplication {
                status: "pending".into(),
                ..Default::default()
            }]),
            AccountStatus::Registered
        );
        assert_eq!(account_status(&[approved_loan()]), AccountStatus::Active);
    }

    #[test]
    fn test_compose_full_profile() {
        let now = at(2024, 6, 1);
        let bundle = RawBundle {
            account: Some(account()),
            applications: vec![approved_loan()],
            payments: vec![
                payment(4, 428.43, "completed", at(2024, 3, 15)),
                payment(4, 428.43, "completed", at(2024, 4, 15)),
                payment(4, 428.43, "failed", at(2024, 5, 15)),
            ],
            documents: vec![DocumentUpload {
                document_type: "vehicle_title".into(),
                title: Some("Certificate of Title".into()),
                is_verified: true,
                uploaded_at: Some(at(2024, 1, 12)),
                ..Default::default()
            }],
            diagnostics: Vec::new(),
        };

        let profile = compose_profile(7, &bundle, now).unwrap();

        assert_eq!(profile.customer_id, "CU-2022-007");
        assert_eq!(profile.account_status, AccountStatus::Active);
        assert_eq!(profile.personal_info.full_name, "Ada Lovelace");
        assert_eq!(profile.personal_info.ssn_masked, "***-**-6789");
        assert_eq!(profile.contact.city, "Austin");
        assert_eq!(profile.employment.employer, "Acme Corp");
        assert_eq!(profile.employment.employment_length.as_deref(), Some("3 years"));
        assert_eq!(profile.membership.customer_since, "2 years 3 months");
        assert_eq!(profile.membership.risk_category, RiskCategory::Low);

        assert_eq!(profile.title_loans.len(), 1);
        let loan = &profile.title_loans[0];
        assert_eq!(loan.loan_number, "TL-2024-01-001");
        assert_eq!(loan.loan_amount, 8500.0);
        assert!((loan.monthly_payment - 428.43).abs() < 0.05);
        assert!((loan.loan_to_value - 50.6).abs() < 0.1);
        assert!((loan.total_paid - 856.86).abs() < 0.001);
        assert!((loan.current_balance - (8500.0 - 856.86)).abs() < 0.001);
        assert_eq!(loan.payments_remaining, 22);
        assert_eq!(
            loan.maturity_date,
            Some(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap())
        );
        assert_eq!(
            loan.next_payment_due,
            Some(NaiveDate::from_ymd_opt(2024, 7, 15).unwrap())
        );

        assert_eq!(profile.payment_history.total_payments, 3);
        assert_eq!(profile.payment_history.on_time_payments, 2);
        assert_eq!(profile.payment_history.missed_payments, 1);
        assert_eq!(
            profile.payment_history.payment_method,
            PaymentMethod::AutoDebit
        );
        assert!((profile.payment_history.average_payment_amount - 428.43).abs() < 0.001);

        assert_eq!(profile.documents.len(), 1);
        assert_eq!(profile.documents[0].kind, "Vehicle Title");
        assert_eq!(profile.documents[0].category, DocumentCategory::Collateral);
        assert_eq!(profile.documents[0].status, DocumentStatus::Verified);

        assert!(profile.preferences.auto_pay_enabled);
    }

    #[test]
    fn test_compose_with_empty_bundle() {
        let now = at(2024, 6, 1);
        let bundle = RawBundle {
            diagnostics: vec![BranchDiagnostic {
                branch: Branch::Payments,
                message: "boom".into(),
            }],
            ..Default::default()
        };

        let profile = compose_profile(3, &bundle, now).unwrap();

        assert_eq!(profile.customer_id, format!("CU-{}-003", now.year()));
        assert_eq!(profile.account_status, AccountStatus::New);
        assert_eq!(profile.membership.customer_since, "New Customer");
        assert!(profile.title_loans.is_empty());
        assert_eq!(profile.payment_history.total_payments, 0);
        assert_eq!(profile.payment_history.payment_method, PaymentMethod::Manual);
        assert_eq!(profile.diagnostics.len(), 1);
        assert_eq!(profile.diagnostics[0].branch, Branch::Payments);
    }

    #[test]
    fn test_compose_rejects_approved_loan_without_amount() {
        let bundle = RawBundle {
            applications: vec![LoanApplication {
                id: Some(9),
                status: "approved".into(),
                ..Default::default()
            }],
            ..Default::default()
        };

        let error = compose_profile(1, &bundle, Utc::now()).unwrap_err();
        assert!(matches!(error, Error::Assembly(_)));
    }

    #[test]
    fn test_document_name_falls_back_to_file_basename() {
        let documents = vec![DocumentUpload {
            document_type: "income".into(),
            file: Some("uploads/2024/paystub.pdf".into()),
            ..Default::default()
        }];

        let mapped = map_documents(&documents);
        assert_eq!(mapped[0].name, "paystub.pdf");
        assert_eq!(mapped[0].kind, "Proof of Income");
        assert_eq!(mapped[0].status, DocumentStatus::Uploaded);
    }

    #[test]
    fn test_mask_ssn() {
        assert_eq!(mask_ssn("123-45-6789"), "***-**-6789");
        assert_eq!(mask_ssn("6789"), "***-**-6789");
        assert_eq!(mask_ssn("89"), "");
    }

    #[test]
    fn test_next_payment_date_is_fifteenth_of_next_month() {
        assert_eq!(
            next_payment_date(at(2024, 12, 20)),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
        );
    }
}
