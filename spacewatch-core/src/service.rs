//! Top-level service facade
//!
//! Wires the HTTP client, token provider, transport, repository and
//! dispatcher together from one [`Config`]. The service is long-lived:
//! construction validates configuration and resolves credentials material
//! (authentication itself is lazy, on the first request), and every fetch
//! call is an independent cycle — an error leaves the service usable for
//! the next refresh.

use std::sync::Arc;
use std::time::Duration;

use crate::actions::RunDispatcher;
use crate::api::{GraphQlTransport, TokenProvider};
use crate::config::Config;
use crate::error::Result;
use crate::metrics::{summarize, FleetSummary};
use crate::repository::StackRepository;
use crate::types::{Stack, StacksWithMetrics};

pub struct StackService {
    repository: StackRepository,
    dispatcher: RunDispatcher,
}

impl StackService {
    /// Build a service from configuration.
    ///
    /// Fails fast on missing endpoint or credential material; no network
    /// traffic happens until the first fetch.
    pub fn new(config: &Config) -> Result<Self> {
        config.api.validate()?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()?;

        let tokens = Arc::new(TokenProvider::from_config(http.clone(), &config.api)?);
        let transport = Arc::new(GraphQlTransport::new(http, &config.api, tokens)?);

        Ok(Self {
            repository: StackRepository::new(Arc::clone(&transport), config.api.page_size),
            dispatcher: RunDispatcher::new(transport),
        })
    }

    /// Every stack, without derived metrics.
    pub async fn stacks(&self) -> Result<Vec<Stack>> {
        self.repository.fetch_all().await
    }

    /// Every stack plus one metrics record per stack id.
    pub async fn stacks_with_metrics(&self) -> Result<StacksWithMetrics> {
        self.repository.fetch_all_with_metrics().await
    }

    /// Fleet rollup for one fetch cycle.
    pub fn summary(&self, result: &StacksWithMetrics) -> FleetSummary {
        summarize(result)
    }

    /// Trigger a run; returns the created run's id.
    pub async fn trigger_run(&self, stack_id: &str) -> Result<Option<String>> {
        self.dispatcher.trigger_run(stack_id).await
    }
}
