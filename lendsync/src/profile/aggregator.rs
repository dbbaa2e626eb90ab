//! Multi-source profile aggregation with partial-failure tolerance.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::{ApiClient, endpoints};
use crate::error::Result;

use super::assemble::{RawBundle, compose_profile};
use super::model::{Branch, BranchDiagnostic, Profile};
use super::wire::{AccountRecord, DocumentUpload, LoanApplication, PaymentRecord};

/// Configuration for the profile aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Serve a known-good placeholder profile when the account branch
    /// itself fails, instead of a partially-empty one.
    #[serde(default = "default_true")]
    pub fallback_to_static: bool,
}

fn default_true() -> bool {
    true
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            fallback_to_static: true,
        }
    }
}

/// Fans out to the account, application, payment, and document branches
/// concurrently and folds the outcomes into one profile snapshot.
///
/// A branch failure never rejects the aggregate: the branch's default is
/// substituted and a diagnostic is attached to the resulting profile. Only
/// a composition failure (an upstream contract violation) is fatal.
pub struct ProfileAggregator {
    client: Arc<ApiClient>,
    config: AggregatorConfig,
}

impl ProfileAggregator {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self::with_config(client, AggregatorConfig::default())
    }

    pub fn with_config(client: Arc<ApiClient>, config: AggregatorConfig) -> Self {
        Self { client, config }
    }

    /// Aggregate the profile for `user_id`.
    pub async fn aggregate(&self, user_id: i64) -> Result<Profile> {
        let bundle = self.gather().await;

        let account_failed = bundle
            .diagnostics
            .iter()
            .any(|diagnostic| diagnostic.branch == Branch::Account);

        if account_failed && self.config.fallback_to_static {
            warn!(user_id, "Account branch failed; serving fallback profile");
            return Ok(Profile::fallback(user_id, Utc::now()));
        }

        compose_profile(user_id, &bundle, Utc::now())
    }

    /// Fetch all four branches concurrently, capturing each outcome
    /// independently so one failure cannot abort the others.
    async fn gather(&self) -> RawBundle {
        let (account, applications, payments, documents) = tokio::join!(
            self.client.get::<AccountRecord>(endpoints::ACCOUNT_PROFILE),
            self.client
                .get::<Vec<LoanApplication>>(endpoints::LOAN_APPLICATIONS),
            self.client.get::<Vec<PaymentRecord>>(endpoints::LOAN_PAYMENTS),
            self.client
                .get::<Vec<DocumentUpload>>(endpoints::LOAN_DOCUMENTS),
        );

        let mut diagnostics = Vec::new();
        let account = settle(Branch::Account, account, &mut diagnostics);
        let applications =
            settle(Branch::Applications, applications, &mut diagnostics).unwrap_or_default();
        let payments = settle(Branch::Payments, payments, &mut diagnostics).unwrap_or_default();
        let documents = settle(Branch::Documents, documents, &mut diagnostics).unwrap_or_default();

        RawBundle {
            account,
            applications,
            payments,
            documents,
            diagnostics,
        }
    }
}

/// Capture one branch outcome: a failure becomes `None` plus a diagnostic.
fn settle<T>(
    branch: Branch,
    outcome: Result<T>,
    diagnostics: &mut Vec<BranchDiagnostic>,
) -> Option<T> {
    match outcome {
        Ok(value) => Some(value),
        Err(error) => {
            debug!(branch = %branch, error = %error, "Profile branch failed");
            diagnostics.push(BranchDiagnostic {
                branch,
                message: error.to_string(),
            });
            None
        }
    }
}
