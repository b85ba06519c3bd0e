//! # spacewatch-core
//!
//! Data access and aggregation core for monitoring infrastructure stacks
//! managed by a remote GraphQL API.
//!
//! This library provides:
//! - Token acquisition, caching and invalidation ([`api::TokenProvider`])
//! - An authenticated GraphQL transport with a single refresh-and-retry on
//!   rejection ([`api::GraphQlTransport`])
//! - Stack fetching with transparent normalization of flat and paginated
//!   response shapes ([`repository::StackRepository`])
//! - Per-stack health metrics and fleet rollups ([`metrics`])
//! - Run triggering ([`actions::RunDispatcher`])
//!
//! ## Example
//!
//! ```rust,no_run
//! use spacewatch_core::{Config, StackService};
//!
//! # async fn example() -> spacewatch_core::Result<()> {
//! let config = Config::load()?;
//! let service = StackService::new(&config)?;
//!
//! let result = service.stacks_with_metrics().await?;
//! let summary = service.summary(&result);
//! println!("{}% of {} stacks healthy", summary.health_percent, summary.total_stacks);
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use metrics::{compute_metrics, summarize, FleetSummary, MAX_RUNS_PER_STACK};
pub use repository::StackRepository;
pub use service::StackService;
pub use types::*;

// Public modules
pub mod actions;
pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod repository;
pub mod service;
pub mod types;
