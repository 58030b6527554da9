//! GitHub client trait
//!
//! This module defines the core `GitHubClient` trait: every remote
//! operation the stale bot performs against an issue tracker.

use crate::types::{CloseReason, Issue, IssueComment, IssueEvent, IssueQuery, PullRequest, RateLimit};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// GitHub API client trait
///
/// Defines the interface for interacting with the GitHub API.
/// Implementations can be direct (hitting the API) or fakes used
/// by tests.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow sharing across
/// async tasks and threads.
///
/// # Example
///
/// ```rust,ignore
/// use gh_client::{GitHubClient, IssueQuery};
///
/// async fn first_page(client: &dyn GitHubClient) -> anyhow::Result<usize> {
///     let query = IssueQuery { page: 1, per_page: 100, ..Default::default() };
///     Ok(client.fetch_issues("rust-lang", "rust", &query).await?.len())
/// }
/// ```
#[async_trait]
pub trait GitHubClient: Send + Sync {
    /// Fetch one page of open issues, pull requests included
    ///
    /// Sorted by last update in the direction given by the query.
    async fn fetch_issues(
        &self,
        owner: &str,
        repo: &str,
        query: &IssueQuery,
    ) -> anyhow::Result<Vec<Issue>>;

    /// Login of the authenticated account
    async fn fetch_authenticated_login(&self) -> anyhow::Result<String>;

    /// Fetch comments on an issue created since the given instant
    async fn fetch_comments(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<IssueComment>>;

    /// Fetch the full event timeline of an issue, oldest first
    async fn fetch_issue_events(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
    ) -> anyhow::Result<Vec<IssueEvent>>;

    /// Fetch a single pull request by number
    async fn fetch_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<PullRequest>;

    /// Fetch the core API rate limit
    async fn fetch_rate_limit(&self) -> anyhow::Result<RateLimit>;

    // === Issue Operations ===

    /// Post a comment on an issue or pull request
    async fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> anyhow::Result<()>;

    /// Add labels to an issue
    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        labels: &[String],
    ) -> anyhow::Result<()>;

    /// Remove a single label from an issue
    async fn remove_label(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        label: &str,
    ) -> anyhow::Result<()>;

    /// Close an issue or pull request
    async fn close_issue(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        reason: Option<CloseReason>,
    ) -> anyhow::Result<()>;

    /// Delete a branch
    async fn delete_branch(&self, owner: &str, repo: &str, branch: &str) -> anyhow::Result<()>;
}
