//! Token acquisition and caching
//!
//! The provider owns the only credential cache in the system. Two paths:
//! a key id/secret pair exchanged for a JWT via the API's own `apiKeyUser`
//! mutation, or a pre-issued token passed through untouched. Either way the
//! result is cached for the lifetime of the provider and dropped on
//! [`TokenProvider::invalidate`], so the next call re-acquires.

use serde_json::json;
use tokio::sync::Mutex;

use crate::config::{ApiConfig, Credentials};
use crate::error::{Error, Result};

use super::queries;

/// Owns the bearer token used for every authenticated request.
pub struct TokenProvider {
    http: reqwest::Client,
    /// GraphQL URL the exchange mutation is POSTed to (un-authenticated)
    url: String,
    credentials: Credentials,
    /// Locked across the exchange so concurrent callers single-flight;
    /// a redundant exchange after invalidation is acceptable, losing a
    /// valid token is not.
    cached: Mutex<Option<String>>,
}

impl TokenProvider {
    pub fn new(http: reqwest::Client, url: String, credentials: Credentials) -> Self {
        Self {
            http,
            url,
            credentials,
            cached: Mutex::new(None),
        }
    }

    /// Build a provider from API configuration.
    ///
    /// Fails with [`Error::AuthConfiguration`] when no usable credential
    /// material is configured.
    pub fn from_config(http: reqwest::Client, api: &ApiConfig) -> Result<Self> {
        let credentials = api.credentials()?;
        let url = api.route.graphql_url(api.endpoint()?);
        Ok(Self::new(http, url, credentials))
    }

    /// Returns the cached token, acquiring one first if necessary.
    pub async fn token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let token = match &self.credentials {
            Credentials::Token(token) => token.clone(),
            Credentials::ApiKey { key_id, key_secret } => {
                tracing::debug!("exchanging API key for token");
                self.exchange(key_id, key_secret).await?
            }
        };

        *cached = Some(token.clone());
        Ok(token)
    }

    /// Drop the cached token so the next [`token`](Self::token) call
    /// re-acquires. Called by the transport on a 401 rejection.
    pub async fn invalidate(&self) {
        self.cached.lock().await.take();
    }

    /// Perform the `apiKeyUser` exchange. No Authorization header: this is
    /// the call that produces one.
    async fn exchange(&self, key_id: &str, key_secret: &str) -> Result<String> {
        let body = json!({
            "query": queries::API_KEY_USER,
            "variables": { "id": key_id, "secret": key_secret },
        });

        let response = self
            .http
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::AuthExchange(format!("exchange request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::AuthExchange(format!(
                "exchange returned HTTP {}",
                status
            )));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::AuthExchange(format!("invalid exchange response: {}", e)))?;

        if let Some(message) = first_graphql_error(&payload) {
            return Err(Error::AuthExchange(message));
        }

        let jwt = payload
            .pointer("/data/apiKeyUser/jwt")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::AuthExchange("exchange response carried no token".to_string())
            })?;

        Ok(jwt.to_string())
    }
}

/// First message from a GraphQL `errors` array, if present.
pub(crate) fn first_graphql_error(payload: &serde_json::Value) -> Option<String> {
    let errors = payload.get("errors")?.as_array()?;
    let first = errors.first()?;
    Some(
        first
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown GraphQL error")
            .to_string(),
    )
}
