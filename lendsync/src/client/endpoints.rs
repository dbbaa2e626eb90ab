//! Logical endpoint paths on the lending API.
//!
//! Paths are joined against the configured base URL; the exact prefix is a
//! deployment detail.

pub const ACCOUNT_PROFILE: &str = "accounts/profile/";
pub const TOKEN_REFRESH: &str = "accounts/token/refresh/";
pub const REGISTER: &str = "accounts/register/";
pub const VERIFY_OTP: &str = "accounts/verify-otp/";
pub const LOGIN: &str = "accounts/login/";
pub const PASSWORD_RESET_REQUEST: &str = "accounts/password-reset-request/";
pub const PASSWORD_RESET: &str = "accounts/password-reset/";
pub const ADMIN_LOGIN_STEP1: &str = "accounts/admin/login/step1/";
pub const ADMIN_LOGIN_STEP2: &str = "accounts/admin/login/step2/";

pub const LOAN_APPLICATIONS: &str = "loans/applications/";
pub const MY_APPLICATIONS: &str = "loans/applications/my_applications/";
pub const LOAN_PAYMENTS: &str = "loans/payments/";
pub const LOAN_DOCUMENTS: &str = "loans/documents/";
