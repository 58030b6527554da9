//! GitHub issue tracker client
//!
//! This crate provides a trait-based GitHub API client covering the
//! operations a stale bot needs: listing open issues, reading comments
//! and label history, and labeling, commenting on and closing issues.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              GitHubClient trait                  │
//! │  - fetch_issues() / fetch_comments()             │
//! │  - add_labels() / remove_label()                 │
//! │  - create_comment() / close_issue()              │
//! └─────────────────────────────────────────────────┘
//!                        │
//!        ┌───────────────┴───────────────┐
//!        ▼                               ▼
//! ┌─────────────────┐         ┌─────────────────────┐
//! │ OctocrabClient  │         │ test fakes          │
//! │ (direct API)    │         │ (in-memory)         │
//! └─────────────────┘         └─────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use gh_client::{connect, GitHubClient, IssueQuery, TokenResolver};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = connect(&TokenResolver::new(), None).await?;
//! let query = IssueQuery { page: 1, per_page: 100, ..Default::default() };
//! let issues = client.fetch_issues("owner", "repo", &query).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod octocrab_client;
pub mod types;

/// Default GitHub host (public GitHub)
pub const DEFAULT_HOST: &str = "github.com";

pub use auth::{api_base_uri, connect, TokenResolver};
pub use client::GitHubClient;
pub use octocrab_client::OctocrabClient;
pub use types::{
    CloseReason, Issue, IssueComment, IssueEvent, IssueQuery, IssueState, Label, Milestone,
    PullRequest, PullRequestRef, RateLimit, SortDirection, User,
};

// Re-export octocrab so consumers don't need to depend on it directly
pub use octocrab;
