//! Staleness engine for GitHub issues and pull requests
//!
//! This crate decides which open items have gone stale, labels and
//! comments on them, and closes those left inactive after the warning.
//!
//! # Example
//!
//! ```rust,no_run
//! use gh_client::{connect, TokenResolver};
//! use gh_stale_config::StaleOptions;
//! use gh_stale_core::{FileStateStore, StaleEngine};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = connect(&TokenResolver::new(), None).await?;
//! let store = FileStateStore::new("stale.state");
//! let mut engine = StaleEngine::new(client, store, "owner", "repo", StaleOptions::default())?;
//! let report = engine.run().await;
//! println!("closed {} items", report.closed_issues.len());
//! # Ok(())
//! # }
//! ```

pub mod budget;
pub mod clock;
pub mod engine;
pub mod error;
pub mod exemptions;
pub mod item;
pub mod labels;
pub mod start_date;
pub mod state;
pub mod statistics;

pub use budget::OperationBudget;
pub use engine::{RunReport, StaleEngine, DEFAULT_ACTOR, PAGE_SIZE};
pub use error::EngineError;
pub use item::{item_prefix, Item};
pub use start_date::{parse_start_date, StartDateError};
pub use state::{FileStateStore, MemoryStateStore, ProcessedItems, StateStore};
pub use statistics::{KindCounters, Statistics};
