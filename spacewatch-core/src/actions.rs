//! One-shot mutations against stacks
//!
//! Triggering a run is not idempotent, so unlike the 401 token-refresh path
//! there is no local retry of any kind here: transport and GraphQL failures
//! propagate as-is and the caller decides whether to try again.

use std::sync::Arc;

use serde_json::json;

use crate::api::{queries, GraphQlTransport};
use crate::error::Result;

pub struct RunDispatcher {
    transport: Arc<GraphQlTransport>,
}

impl RunDispatcher {
    pub fn new(transport: Arc<GraphQlTransport>) -> Self {
        Self { transport }
    }

    /// Trigger a run against a stack, returning the created run's id.
    ///
    /// `None` when the API accepts the mutation but reports no run payload.
    pub async fn trigger_run(&self, stack_id: &str) -> Result<Option<String>> {
        let data = self
            .transport
            .execute(queries::RUN_TRIGGER, json!({ "stack": stack_id }))
            .await?;

        let run_id = data
            .pointer("/runTrigger/id")
            .and_then(|v| v.as_str())
            .map(String::from);

        match &run_id {
            Some(id) => tracing::info!(stack = %stack_id, run = %id, "run triggered"),
            None => tracing::warn!(stack = %stack_id, "run triggered but API returned no run id"),
        }

        Ok(run_id)
    }
}
