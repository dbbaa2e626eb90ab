//! The authenticated request client.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::credentials::{CredentialStore, CredentialUpdate};
use crate::error::{Error, Result};

use super::endpoints;

/// Phase of the bounded retry cycle.
///
/// A request is re-issued at most once, strictly after a successful token
/// refresh; the enum makes the "at most one refresh per request" invariant
/// structural rather than a flag to remember.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Initial,
    Retry,
}

/// Refresh endpoint response body.
#[derive(Debug, Deserialize)]
struct TokenPair {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

/// Authenticated JSON client over the lending platform API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: url::Url,
    store: Arc<dyn CredentialStore>,
}

impl ApiClient {
    /// Create a client from `config`, reading and refreshing tokens through
    /// `store`.
    pub fn new(config: &ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        Self::with_http_client(config.build_http_client(), &config.base_url, store)
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_http_client(
        http: reqwest::Client,
        base_url: &str,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self> {
        // A trailing slash makes Url::join treat the last path segment as a
        // directory instead of replacing it.
        let mut base = base_url.to_owned();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            http,
            base_url: url::Url::parse(&base)?,
            store,
        })
    }

    /// The credential store this client reads and refreshes through.
    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn patch<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    /// Issue an authenticated request and decode the JSON response.
    ///
    /// On a 401 the client performs exactly one token refresh and re-issues
    /// the original request; a second 401 falls through to the ordinary
    /// failure path. Refresh failure (or a missing refresh token) surfaces
    /// as [`Error::AuthExpired`].
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        let mut attempt = Attempt::Initial;

        loop {
            let response = self.send(&method, &url, body.as_ref()).await?;

            if response.status() == StatusCode::UNAUTHORIZED && attempt == Attempt::Initial {
                debug!(path, "Access token rejected; attempting refresh");
                self.refresh_credentials().await?;
                attempt = Attempt::Retry;
                continue;
            }

            return Self::decode(response).await;
        }
    }

    fn endpoint(&self, path: &str) -> Result<url::Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn send(
        &self,
        method: &Method,
        url: &url::Url,
        body: Option<&Value>,
    ) -> Result<reqwest::Response> {
        let mut request = self.http.request(method.clone(), url.clone());

        if let Some(token) = self.store.credentials().access_token {
            request = request.bearer_auth(token);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| server_message(&body))
            .unwrap_or_else(|| "Request failed".to_owned());

        Err(Error::request_failed(status.as_u16(), message))
    }

    /// Exchange the stored refresh token for a new token pair and persist
    /// it.
    ///
    /// Any failure here is terminal for the calling request: the session is
    /// considered dead and the caller gets [`Error::AuthExpired`]. This
    /// path never re-enters [`Self::request`], which bounds the cycle to a
    /// single refresh attempt even if the server answers 401 forever.
    async fn refresh_credentials(&self) -> Result<()> {
        let Some(refresh) = self.store.credentials().refresh_token else {
            return Err(Error::AuthExpired);
        };

        let url = self.endpoint(endpoints::TOKEN_REFRESH)?;
        let response = self
            .http
            .post(url)
            .json(&serde_json::json!({ "refresh": refresh }))
            .send()
            .await
            .map_err(|_| Error::AuthExpired)?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Token refresh rejected");
            return Err(Error::AuthExpired);
        }

        let tokens: TokenPair = response.json().await.map_err(|_| Error::AuthExpired)?;
        self.store
            .update(CredentialUpdate::tokens(tokens.access, tokens.refresh));
        debug!("Access token refreshed");

        Ok(())
    }
}

/// Pull the server-provided failure message out of an error body.
fn server_message(body: &Value) -> Option<String> {
    for key in ["error", "message", "detail"] {
        if let Some(message) = body.get(key).and_then(Value::as_str) {
            return Some(message.to_owned());
        }
    }
    None
}
