//! GitHub API data transfer objects
//!
//! These types mirror the JSON returned by the issues, pulls and
//! rate limit endpoints. They are intentionally separate from the
//! stale engine's item model to keep this crate pure and reusable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An issue or pull request as returned by the issues list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number (e.g., 123)
    pub number: u64,

    /// Issue title
    #[serde(default)]
    pub title: String,

    /// When the issue was created
    pub created_at: DateTime<Utc>,

    /// When the issue was last updated
    pub updated_at: DateTime<Utc>,

    /// Labels currently applied
    #[serde(default)]
    pub labels: Vec<Label>,

    /// Open or closed
    pub state: IssueState,

    /// Whether the conversation is locked
    #[serde(default)]
    pub locked: bool,

    /// Milestone, if any
    #[serde(default)]
    pub milestone: Option<Milestone>,

    /// Present only when this issue is a pull request
    #[serde(default)]
    pub pull_request: Option<PullRequestRef>,

    /// Draft flag (reported for pull requests only)
    #[serde(default)]
    pub draft: Option<bool>,

    /// Author of the issue
    #[serde(default)]
    pub user: Option<User>,

    /// Users assigned to the issue
    #[serde(default)]
    pub assignees: Vec<User>,
}

impl Issue {
    /// Whether the issues endpoint flagged this entry as a pull request
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

/// Open/closed state of an issue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    #[default]
    Open,
    Closed,
}

/// A label attached to an issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// A milestone attached to an issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub title: String,
}

/// Link object present on issues that are pull requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    #[serde(default)]
    pub url: Option<String>,
}

/// A GitHub account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// GitHub username
    pub login: String,

    /// Account type: "User", "Bot" or "Organization"
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl User {
    /// Whether this account is a regular human account
    pub fn is_human(&self) -> bool {
        self.kind == "User"
    }
}

/// A comment on an issue or pull request conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueComment {
    /// GitHub comment ID
    pub id: u64,
    /// Comment author (absent for deleted accounts)
    #[serde(default)]
    pub user: Option<User>,
    /// When the comment was created
    pub created_at: DateTime<Utc>,
}

/// An entry from an issue's event timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueEvent {
    /// Event name (e.g., "labeled", "closed")
    pub event: String,
    /// When the event happened
    pub created_at: DateTime<Utc>,
    /// Label involved, for "labeled"/"unlabeled" events
    #[serde(default)]
    pub label: Option<Label>,
}

/// The pull request details the stale bot needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// HEAD branch name (e.g., "feature/foo")
    pub head_branch: String,
    /// Whether the PR is a draft
    pub draft: bool,
}

/// Reason given when closing an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// The issue was resolved
    Completed,
    /// The issue won't be worked on
    NotPlanned,
}

impl CloseReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloseReason::Completed => "completed",
            CloseReason::NotPlanned => "not_planned",
        }
    }
}

/// Sort direction for the issues list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Parameters for fetching one page of open issues
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueQuery {
    /// 1-indexed page number
    pub page: u32,
    /// Page size (GitHub caps this at 100)
    pub per_page: u8,
    /// Only return issues carrying all of these labels
    pub labels: Vec<String>,
    /// Sort direction on the update timestamp
    pub direction: SortDirection,
}

/// Snapshot of the core API rate limit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub limit: u64,
    pub used: u64,
    pub remaining: u64,
    /// When the window resets
    pub reset: DateTime<Utc>,
}

impl RateLimit {
    /// Build a snapshot from the raw numbers of the rate limit endpoint
    ///
    /// `reset_epoch_secs` is the window reset time in seconds since the epoch.
    pub fn from_raw(limit: u64, used: u64, remaining: u64, reset_epoch_secs: i64) -> Self {
        Self {
            limit,
            used,
            remaining,
            reset: DateTime::from_timestamp(reset_epoch_secs, 0).unwrap_or_default(),
        }
    }
}
