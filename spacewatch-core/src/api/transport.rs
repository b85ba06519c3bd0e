//! GraphQL-over-HTTP transport
//!
//! Every request is a POST of `{query, variables}` with a bearer token from
//! the [`TokenProvider`]. A 401 invalidates the cached token and retries the
//! same request exactly once with a fresh one; any further rejection
//! surfaces as [`Error::Transport`]. Persistently invalid credentials must
//! fail fast, never loop.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::config::{ApiConfig, ApiRoute};
use crate::error::{Error, Result};

use super::auth::{first_graphql_error, TokenProvider};

/// Issues authenticated GraphQL requests against one endpoint.
pub struct GraphQlTransport {
    http: reqwest::Client,
    url: String,
    route: ApiRoute,
    tokens: Arc<TokenProvider>,
}

impl GraphQlTransport {
    pub fn new(http: reqwest::Client, api: &ApiConfig, tokens: Arc<TokenProvider>) -> Result<Self> {
        let url = api.route.graphql_url(api.endpoint()?);
        Ok(Self {
            http,
            url,
            route: api.route,
            tokens,
        })
    }

    /// The routing strategy this transport was built with.
    pub fn route(&self) -> ApiRoute {
        self.route
    }

    /// Execute a GraphQL document and return its `data` payload.
    ///
    /// A 2xx response carrying an `errors` array fails with
    /// [`Error::GraphQl`] even when partial `data` is present alongside.
    pub async fn execute(&self, query: &str, variables: Value) -> Result<Value> {
        let response = self.post(query, &variables).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!(url = %self.url, "token rejected, refreshing and retrying once");
            self.tokens.invalidate().await;
            let retry = self.post(query, &variables).await?;
            return decode(retry).await;
        }

        decode(response).await
    }

    async fn post(&self, query: &str, variables: &Value) -> Result<reqwest::Response> {
        let token = self.tokens.token().await?;
        let response = self
            .http
            .post(&self.url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(CONTENT_TYPE, "application/json")
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;
        Ok(response)
    }
}

async fn decode(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Transport {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            body: response.text().await.ok().filter(|b| !b.is_empty()),
        });
    }

    let mut payload: Value = response.json().await?;

    if let Some(message) = first_graphql_error(&payload) {
        return Err(Error::GraphQl(message));
    }

    match payload.get_mut("data") {
        Some(data) if !data.is_null() => Ok(data.take()),
        _ => Err(Error::GraphQl("response carried no data".to_string())),
    }
}
