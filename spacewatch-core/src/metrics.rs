//! Per-stack metrics computation and fleet health
//!
//! Everything here is pure: raw run/resource lists in, derived records out.
//! The one rule that matters most: "most recent" means `created_at`
//! descending, never array position. The API does not guarantee run order,
//! so sorting happens before truncation and before any last-run derivation.

use serde::Serialize;

use crate::types::{ManagedResource, Run, RunState, StackMetrics, StacksWithMetrics};

/// Only the most recent runs feed metrics computation.
pub const MAX_RUNS_PER_STACK: usize = 50;

/// Compute a stack's metrics from its raw run and resource lists.
///
/// Runs are sorted by `created_at` descending and truncated to
/// [`MAX_RUNS_PER_STACK`] before any counting, so `total_runs` caps at 50
/// and the last-run fields always describe the genuinely newest run.
pub fn compute_metrics(runs: &[Run], resources: &[ManagedResource]) -> StackMetrics {
    let mut recent: Vec<&Run> = runs.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(MAX_RUNS_PER_STACK);

    let last = recent.first();

    StackMetrics {
        total_runs: recent.len(),
        successful_runs: recent
            .iter()
            .filter(|r| r.state == RunState::Finished)
            .count(),
        failed_runs: recent.iter().filter(|r| r.state == RunState::Failed).count(),
        last_run_state: last.map(|r| r.state).unwrap_or(RunState::Unknown),
        last_run_time: last.map(|r| r.updated_at),
        last_triggered_by: last.and_then(|r| r.triggered_by.clone()),
        // No drift query is wired to this version; see types::StackMetrics
        drift_detected: false,
        resource_count: resources.len(),
    }
}

/// Fleet-wide rollup across one fetch cycle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetSummary {
    pub total_stacks: usize,
    pub healthy_stacks: usize,
    /// round(healthy / total * 100); 0 for an empty fleet
    pub health_percent: u32,
    pub total_resources: usize,
    pub total_runs: usize,
}

/// Roll the per-stack metrics of a fetch cycle up into a fleet summary.
pub fn summarize(result: &StacksWithMetrics) -> FleetSummary {
    let total_stacks = result.stacks.len();
    let healthy_stacks = result
        .stacks
        .iter()
        .filter_map(|stack| result.metrics.get(&stack.id))
        .filter(|m| m.last_run_state.is_healthy())
        .count();

    FleetSummary {
        total_stacks,
        healthy_stacks,
        health_percent: percent(healthy_stacks, total_stacks),
        total_resources: result.metrics.values().map(|m| m.resource_count).sum(),
        total_runs: result.metrics.values().map(|m| m.total_runs).sum(),
    }
}

fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RunType, Stack, StackState};
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::HashMap;

    fn run(id: &str, state: RunState, minutes_ago: i64) -> Run {
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        Run {
            id: id.to_string(),
            state,
            run_type: RunType::Tracked,
            created_at: base - Duration::minutes(minutes_ago),
            updated_at: base - Duration::minutes(minutes_ago) + Duration::minutes(2),
            title: None,
            triggered_by: Some(format!("user-{}", id)),
            commit: None,
            delta: None,
        }
    }

    fn resource(id: &str) -> ManagedResource {
        ManagedResource {
            id: id.to_string(),
            name: id.to_string(),
            resource_type: "aws_instance".to_string(),
        }
    }

    fn stack(id: &str) -> Stack {
        Stack {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            state: StackState::Ready,
            administrative: false,
            autodeploy: false,
            autoretry: false,
            repository: format!("org/{}", id),
            branch: "main".to_string(),
            provider: crate::types::Provider::Terraform,
            space: None,
            labels: vec![],
            resources: None,
            runs: None,
            drift_detection: None,
        }
    }

    #[test]
    fn test_zero_runs_yields_unknown_record() {
        let metrics = compute_metrics(&[], &[resource("r1"), resource("r2")]);
        assert_eq!(metrics.total_runs, 0);
        assert_eq!(metrics.successful_runs, 0);
        assert_eq!(metrics.failed_runs, 0);
        assert_eq!(metrics.last_run_state, RunState::Unknown);
        assert!(metrics.last_run_time.is_none());
        assert!(metrics.last_triggered_by.is_none());
        assert_eq!(metrics.resource_count, 2);
        assert!(!metrics.drift_detected);
    }

    #[test]
    fn test_most_recent_by_created_at_not_position() {
        // Older FAILED run first in the array; the newer FINISHED run must
        // still win the last-run fields.
        let runs = vec![
            run("old-failed", RunState::Failed, 60),
            run("new-finished", RunState::Finished, 5),
        ];
        let metrics = compute_metrics(&runs, &[]);
        assert_eq!(metrics.total_runs, 2);
        assert_eq!(metrics.successful_runs, 1);
        assert_eq!(metrics.failed_runs, 1);
        assert_eq!(metrics.last_run_state, RunState::Finished);
        assert_eq!(
            metrics.last_triggered_by.as_deref(),
            Some("user-new-finished")
        );
    }

    #[test]
    fn test_truncates_to_most_recent_fifty() {
        // 61 runs: the 11 oldest are FAILED, the 50 newest FINISHED. Only
        // the newest 50 may feed the counts.
        let mut runs = Vec::new();
        for i in 0..50 {
            runs.push(run(&format!("new-{}", i), RunState::Finished, i));
        }
        for i in 0..11 {
            runs.push(run(&format!("old-{}", i), RunState::Failed, 1000 + i));
        }

        let metrics = compute_metrics(&runs, &[]);
        assert_eq!(metrics.total_runs, 50);
        assert_eq!(metrics.successful_runs, 50);
        assert_eq!(metrics.failed_runs, 0);
        assert_eq!(metrics.last_run_state, RunState::Finished);
    }

    #[test]
    fn test_fleet_summary_health_percent() {
        let stacks = vec![stack("a"), stack("b"), stack("c")];
        let mut metrics = HashMap::new();
        metrics.insert("a".to_string(), compute_metrics(&[run("1", RunState::Finished, 1)], &[]));
        metrics.insert("b".to_string(), compute_metrics(&[run("2", RunState::Failed, 1)], &[]));
        metrics.insert("c".to_string(), compute_metrics(&[run("3", RunState::Queued, 1)], &[]));

        let summary = summarize(&StacksWithMetrics { stacks, metrics });
        assert_eq!(summary.total_stacks, 3);
        assert_eq!(summary.healthy_stacks, 2);
        assert_eq!(summary.health_percent, 67);
        assert_eq!(summary.total_runs, 3);
    }

    #[test]
    fn test_empty_fleet_is_zero_percent() {
        let summary = summarize(&StacksWithMetrics {
            stacks: vec![],
            metrics: HashMap::new(),
        });
        assert_eq!(summary.total_stacks, 0);
        assert_eq!(summary.health_percent, 0);
    }

    #[test]
    fn test_summary_counts_resources() {
        let stacks = vec![stack("a"), stack("b")];
        let mut metrics = HashMap::new();
        metrics.insert(
            "a".to_string(),
            compute_metrics(&[], &[resource("r1"), resource("r2")]),
        );
        metrics.insert("b".to_string(), compute_metrics(&[], &[resource("r3")]));

        let summary = summarize(&StacksWithMetrics { stacks, metrics });
        assert_eq!(summary.total_resources, 3);
        // Both stacks have no runs: neither is healthy
        assert_eq!(summary.healthy_stacks, 0);
        assert_eq!(summary.health_percent, 0);
    }
}
