//! Stack fetching and response normalization
//!
//! Deployments disagree on the shape of the `stacks` payload: some return a
//! flat array, some a paginated collection of edge wrappers. Normalization
//! runs here, immediately after every fetch, so nothing downstream ever
//! branches on shape.
//!
//! Metrics come from one of two paths. The optimized path gets runs and
//! resources embedded in the bulk query. When a stack comes back without
//! embedded run data, a concurrent per-stack fallback query fills the gap;
//! one stack's failure degrades that stack to an empty metrics record
//! instead of aborting the batch.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{queries, GraphQlTransport};
use crate::config::ApiRoute;
use crate::error::{Error, Result};
use crate::metrics::compute_metrics;
use crate::types::{ManagedResource, Run, Stack, StackMetrics, StacksWithMetrics};

pub struct StackRepository {
    transport: Arc<GraphQlTransport>,
    page_size: usize,
}

impl StackRepository {
    pub fn new(transport: Arc<GraphQlTransport>, page_size: usize) -> Self {
        Self {
            transport,
            page_size,
        }
    }

    /// Fetch every stack, runs and resources embedded where the deployment
    /// supports it.
    pub async fn fetch_all(&self) -> Result<Vec<Stack>> {
        let data = match self.transport.route() {
            ApiRoute::Direct => self.transport.execute(queries::STACKS, json!({})).await?,
            ApiRoute::Proxied => {
                self.transport
                    .execute(queries::STACKS_PAGINATED, json!({ "first": self.page_size }))
                    .await?
            }
        };

        let stacks = data
            .get("stacks")
            .cloned()
            .ok_or_else(|| Error::GraphQl("response carried no stacks field".to_string()))?;

        normalize_stacks(stacks)
    }

    /// Fetch a single stack without run history; `None` when the id is
    /// unknown to the API.
    pub async fn fetch_stack(&self, id: &str) -> Result<Option<Stack>> {
        let data = self
            .transport
            .execute(queries::STACK, json!({ "id": id }))
            .await?;

        match data.get("stack") {
            None | Some(Value::Null) => Ok(None),
            Some(stack) => Ok(Some(serde_json::from_value(stack.clone())?)),
        }
    }

    /// Fetch one stack's raw run history and resource list (the per-stack
    /// fallback query).
    pub async fn fetch_stack_runs(&self, id: &str) -> Result<(Vec<Run>, Vec<ManagedResource>)> {
        #[derive(Deserialize)]
        struct StackRuns {
            #[serde(default)]
            runs: Vec<Run>,
            #[serde(rename = "entities", default)]
            resources: Vec<ManagedResource>,
        }

        let data = self
            .transport
            .execute(queries::STACK_RUNS, json!({ "stack": id }))
            .await?;

        match data.get("stack") {
            None | Some(Value::Null) => {
                Err(Error::GraphQl(format!("stack {} not found", id)))
            }
            Some(stack) => {
                let stack: StackRuns = serde_json::from_value(stack.clone())?;
                Ok((stack.runs, stack.resources))
            }
        }
    }

    /// Compute one stack's metrics via the fallback query.
    pub async fn stack_metrics(&self, id: &str) -> Result<StackMetrics> {
        let (runs, resources) = self.fetch_stack_runs(id).await?;
        Ok(compute_metrics(&runs, &resources))
    }

    /// Fetch every stack together with one metrics record per stack id.
    ///
    /// Stacks with embedded run data are computed in place; the rest fan
    /// out to concurrent per-stack queries. A failed per-stack query is
    /// logged and that stack gets [`StackMetrics::unknown`] — the batch
    /// itself only fails when the stacks cannot be listed at all.
    pub async fn fetch_all_with_metrics(&self) -> Result<StacksWithMetrics> {
        let stacks = self.fetch_all().await?;
        let mut metrics = HashMap::with_capacity(stacks.len());

        let mut missing: Vec<&Stack> = Vec::new();
        for stack in &stacks {
            match &stack.runs {
                Some(runs) => {
                    let resources = stack.resources.as_deref().unwrap_or(&[]);
                    metrics.insert(stack.id.clone(), compute_metrics(runs, resources));
                }
                None => missing.push(stack),
            }
        }

        if !missing.is_empty() {
            tracing::debug!(
                count = missing.len(),
                "bulk query embedded no runs, falling back to per-stack queries"
            );
            let outcomes = join_all(missing.iter().map(|s| self.stack_metrics(&s.id))).await;
            for (stack, outcome) in missing.iter().zip(outcomes) {
                let record = match outcome {
                    Ok(record) => record,
                    Err(e) => {
                        tracing::warn!(
                            stack = %stack.id,
                            error = %e,
                            "per-stack run fetch failed, degrading to empty metrics"
                        );
                        StackMetrics::unknown(0)
                    }
                };
                metrics.insert(stack.id.clone(), record);
            }
        }

        Ok(StacksWithMetrics { stacks, metrics })
    }
}

/// Flatten either `stacks` payload shape into the internal model.
fn normalize_stacks(value: Value) -> Result<Vec<Stack>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StacksPayload {
        Flat(Vec<Stack>),
        Paginated { edges: Vec<StackEdge> },
    }

    #[derive(Deserialize)]
    struct StackEdge {
        node: Stack,
    }

    match serde_json::from_value(value)? {
        StacksPayload::Flat(stacks) => Ok(stacks),
        StacksPayload::Paginated { edges } => Ok(edges.into_iter().map(|e| e.node).collect()),
    }
}
