//! Account and session flows, consumed through the shared request path.
//!
//! Login-shaped responses carry `{user, tokens: {access, refresh}}`; the
//! helpers here persist the issued tokens (and the admin flag for the
//! two-step admin login) into the credential store as a side effect.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::credentials::CredentialUpdate;
use crate::error::Result;
use crate::profile::wire::AccountRecord;

use super::ApiClient;
use super::endpoints;

/// Registration payload.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    pub password: String,
    pub password2: String,
}

/// Registration response; the account stays pending until OTP verification.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Access/refresh pair issued by the login-shaped endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct IssuedTokens {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Response shape shared by login, OTP verification, and the second admin
/// login step.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub user: Option<AccountRecord>,
    pub tokens: IssuedTokens,
}

impl ApiClient {
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse> {
        self.post(endpoints::REGISTER, serde_json::to_value(request)?)
            .await
    }

    /// Verify the one-time code sent at registration. Issued tokens are
    /// persisted on success.
    pub async fn verify_otp(&self, user_id: i64, otp_code: &str) -> Result<LoginResponse> {
        let response: LoginResponse = self
            .post(
                endpoints::VERIFY_OTP,
                json!({ "user_id": user_id, "otp_code": otp_code }),
            )
            .await?;
        self.adopt_tokens(&response.tokens);
        Ok(response)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let response: LoginResponse = self
            .post(
                endpoints::LOGIN,
                json!({ "email": email, "password": password }),
            )
            .await?;
        self.adopt_tokens(&response.tokens);
        Ok(response)
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<serde_json::Value> {
        self.post(endpoints::PASSWORD_RESET_REQUEST, json!({ "email": email }))
            .await
    }

    pub async fn reset_password(
        &self,
        email: &str,
        otp_code: &str,
        password: &str,
        password2: &str,
    ) -> Result<serde_json::Value> {
        self.post(
            endpoints::PASSWORD_RESET,
            json!({
                "email": email,
                "otp_code": otp_code,
                "password": password,
                "password2": password2,
            }),
        )
        .await
    }

    /// First admin login step: request an OTP for `username`.
    pub async fn admin_login_step1(&self, username: &str) -> Result<serde_json::Value> {
        self.post(endpoints::ADMIN_LOGIN_STEP1, json!({ "username": username }))
            .await
    }

    /// Second admin login step: verify the OTP. Persists tokens and the
    /// admin role flag.
    pub async fn admin_login_step2(&self, user_id: i64, otp_code: &str) -> Result<LoginResponse> {
        let response: LoginResponse = self
            .post(
                endpoints::ADMIN_LOGIN_STEP2,
                json!({ "user_id": user_id, "otp_code": otp_code }),
            )
            .await?;
        self.adopt_tokens(&response.tokens);
        self.store().set_is_admin(true);
        Ok(response)
    }

    /// Fetch the authenticated account record.
    pub async fn account_profile(&self) -> Result<AccountRecord> {
        self.get(endpoints::ACCOUNT_PROFILE).await
    }

    /// Patch fields on the authenticated account record.
    pub async fn update_profile(&self, fields: serde_json::Value) -> Result<AccountRecord> {
        self.patch(endpoints::ACCOUNT_PROFILE, fields).await
    }

    /// Drop tokens, the session-expiry marker, and the role flag.
    pub fn logout(&self) {
        let store = self.store();
        store.clear();
        store.clear_session_expiry();
        store.set_is_admin(false);
    }

    fn adopt_tokens(&self, tokens: &IssuedTokens) {
        self.store().update(CredentialUpdate::tokens(
            tokens.access.clone(),
            tokens.refresh.clone(),
        ));
    }
}
