//! Core domain types for spacewatch
//!
//! These types are the normalized internal model for the remote API's
//! heterogeneous shapes. The repository unwraps both the flat-array and the
//! paginated edge/node response forms into these structs immediately after
//! every fetch, so everything downstream only ever sees this model.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Stack** | A managed infrastructure workload with a repository/branch source |
//! | **Run** | One execution (plan/apply/destroy) against a stack |
//! | **Resource** | A managed sub-item tracked under a stack (counted, not inspected) |
//! | **StackMetrics** | Derived per-stack run/health statistics, rebuilt on every fetch |
//!
//! ### Stack state vs run state
//!
//! The remote API conflates two lifecycles that look superficially similar:
//! the stack itself (READY, PREPARING, ...) and its most recent run
//! (FINISHED, FAILED, QUEUED, ...). We keep them as two separate enums,
//! [`StackState`] and [`RunState`], and never merge them. Health is always a
//! statement about the last *run*, not the stack state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

// ============================================
// Stack
// ============================================

/// A managed infrastructure stack tracked by the remote system.
///
/// `runs` and `resources` are only populated by the optimized fetch that
/// embeds them; the per-stack fallback query fills them in separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stack {
    /// Unique identifier within a fetch batch
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub state: StackState,
    pub administrative: bool,
    pub autodeploy: bool,
    pub autoretry: bool,
    pub repository: String,
    pub branch: String,
    pub provider: Provider,
    /// Space identifier; the wire carries either a plain string or a nested
    /// `{ id }` object depending on deployment, both normalize to the id
    #[serde(default, deserialize_with = "space_id")]
    pub space: Option<String>,
    /// Order is insertion order from the API and is display-significant
    #[serde(default)]
    pub labels: Vec<String>,
    /// Managed resources (the API calls these `entities`)
    #[serde(rename = "entities", default)]
    pub resources: Option<Vec<ManagedResource>>,
    #[serde(default)]
    pub runs: Option<Vec<Run>>,
    /// Drift detection settings, when configured on the stack. Nothing reads
    /// this into metrics yet; `StackMetrics::drift_detected` stays false
    /// until a drift query is wired up.
    #[serde(rename = "driftDetection", default)]
    pub drift_detection: Option<DriftDetection>,
}

/// Lifecycle state of the stack itself (not of its runs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StackState {
    Ready,
    Preparing,
    Discarded,
    Deleting,
    /// Catch-all for states this version does not model
    #[serde(other)]
    Unknown,
}

/// Provisioning tool backing a stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Provider {
    Terraform,
    Pulumi,
    Cloudformation,
    Ansible,
    Kubernetes,
    #[serde(other)]
    Unknown,
}

/// A managed sub-item tracked under a stack; used only for counting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagedResource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
}

/// Drift detection settings as reported by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftDetection {
    pub reconcile: bool,
    #[serde(default)]
    pub schedule: Vec<String>,
}

// ============================================
// Run
// ============================================

/// One execution against a stack.
///
/// The API does not guarantee run order; "most recent" is always defined by
/// `created_at` descending, never by array position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub id: String,
    pub state: RunState,
    #[serde(rename = "type")]
    pub run_type: RunType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub triggered_by: Option<String>,
    #[serde(default)]
    pub commit: Option<Commit>,
    /// Change delta, when the run reported one
    #[serde(default)]
    pub delta: Option<RunDelta>,
}

/// State of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    Queued,
    Preparing,
    Planning,
    Tracked,
    Applying,
    Finished,
    Failed,
    Stopped,
    Skipped,
    Discarded,
    /// Doubles as the "no runs yet" sentinel and the catch-all for states
    /// this version does not model
    #[serde(other)]
    Unknown,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Queued => "QUEUED",
            RunState::Preparing => "PREPARING",
            RunState::Planning => "PLANNING",
            RunState::Tracked => "TRACKED",
            RunState::Applying => "APPLYING",
            RunState::Finished => "FINISHED",
            RunState::Failed => "FAILED",
            RunState::Stopped => "STOPPED",
            RunState::Skipped => "SKIPPED",
            RunState::Discarded => "DISCARDED",
            RunState::Unknown => "UNKNOWN",
        }
    }

    /// A stack is considered healthy when its most recent run finished
    /// successfully or is still making progress.
    pub fn is_healthy(&self) -> bool {
        matches!(
            self,
            RunState::Finished
                | RunState::Queued
                | RunState::Preparing
                | RunState::Planning
                | RunState::Applying
        )
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunType {
    Proposed,
    Tracked,
    Destroy,
    #[serde(other)]
    Unknown,
}

/// Commit that triggered a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub hash: String,
    pub message: String,
    pub author_name: String,
    pub timestamp: String,
}

/// Resource change counts reported by a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDelta {
    pub added: i64,
    pub changed: i64,
    pub deleted: i64,
}

// ============================================
// Derived metrics
// ============================================

/// Per-stack run/health statistics.
///
/// Never mutated in place; rebuilt from the current run/resource snapshot on
/// every fetch cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackMetrics {
    pub total_runs: usize,
    pub successful_runs: usize,
    pub failed_runs: usize,
    pub last_run_state: RunState,
    #[serde(default)]
    pub last_run_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_triggered_by: Option<String>,
    /// Always false: no drift query is wired to this version. The field is
    /// kept so consumers do not need a schema change when one lands.
    pub drift_detected: bool,
    pub resource_count: usize,
}

impl StackMetrics {
    /// The zero-valued record substituted when a stack's runs cannot be
    /// fetched, so the aggregate view degrades instead of failing wholesale.
    pub fn unknown(resource_count: usize) -> Self {
        Self {
            total_runs: 0,
            successful_runs: 0,
            failed_runs: 0,
            last_run_state: RunState::Unknown,
            last_run_time: None,
            last_triggered_by: None,
            drift_detected: false,
            resource_count,
        }
    }
}

/// Combined result of a full fetch cycle: the stacks plus one metrics record
/// per stack id, never fewer.
#[derive(Debug, Clone, Serialize)]
pub struct StacksWithMetrics {
    pub stacks: Vec<Stack>,
    pub metrics: HashMap<String, StackMetrics>,
}

fn space_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SpaceRef {
        Id(String),
        Nested { id: String },
    }

    let space = Option::<SpaceRef>::deserialize(deserializer)?;
    Ok(space.map(|s| match s {
        SpaceRef::Id(id) | SpaceRef::Nested { id } => id,
    }))
}
