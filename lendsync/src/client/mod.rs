//! Authenticated HTTP access to the lending platform API.
//!
//! All traffic funnels through [`ApiClient::request`], which attaches the
//! stored access token and performs at most one token-refresh-and-retry
//! cycle on a 401 before giving up.

pub mod auth;
pub mod endpoints;
mod http;

pub use auth::{IssuedTokens, LoginResponse, RegisterRequest, RegisterResponse};
pub use http::ApiClient;
