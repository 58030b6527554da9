//! Item model
//!
//! One representation for issues and pull requests, tagged with its
//! `ItemKind`. Derived fields are computed once from the fetched issue
//! and the options snapshot of the run.

use crate::labels;
use chrono::{DateTime, Utc};
use gh_client::{Issue, IssueState};
use gh_stale_config::{ItemKind, StaleOptions};

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub number: u64,
    pub title: String,
    pub kind: ItemKind,
    pub created_at: DateTime<Utc>,
    /// Last update as reported by GitHub
    pub updated_at: DateTime<Utc>,
    /// Logical last activity; moves to "now" when the engine marks the item stale
    pub last_activity_at: DateTime<Utc>,
    pub labels: Vec<String>,
    pub state: IssueState,
    pub locked: bool,
    pub milestone: Option<String>,
    /// Draft flag as listed; `None` for issues
    pub draft: Option<bool>,
    pub author: Option<String>,
    pub assignees: Vec<String>,
    /// Stale label for this item's kind
    pub stale_label: String,
    /// Whether the item carries its stale label
    pub is_stale: bool,
}

impl Item {
    pub fn new(issue: Issue, options: &StaleOptions) -> Self {
        let kind = if issue.is_pull_request() {
            ItemKind::PullRequest
        } else {
            ItemKind::Issue
        };
        let stale_label = match kind {
            ItemKind::Issue => options.stale_issue_label.clone(),
            ItemKind::PullRequest => options.stale_pr_label.clone(),
        };
        let labels: Vec<String> = issue.labels.into_iter().map(|label| label.name).collect();
        let is_stale = labels::has_label(&labels, &stale_label);

        Self {
            number: issue.number,
            title: issue.title,
            kind,
            created_at: issue.created_at,
            updated_at: issue.updated_at,
            last_activity_at: issue.updated_at,
            labels,
            state: issue.state,
            locked: issue.locked,
            milestone: issue.milestone.map(|milestone| milestone.title),
            draft: issue.draft,
            author: issue.user.map(|user| user.login),
            assignees: issue.assignees.into_iter().map(|user| user.login).collect(),
            stale_label,
            is_stale,
        }
    }

    pub fn is_pull_request(&self) -> bool {
        self.kind.is_pull_request()
    }

    pub fn has_label(&self, label: &str) -> bool {
        labels::has_label(&self.labels, label)
    }

    /// Record activity at `at` for the rest of the run
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_activity_at = at;
    }
}

/// Log prefix identifying an item, e.g. `[#12] ` or `[PR #7] `
pub fn item_prefix(item: &Item) -> String {
    match item.kind {
        ItemKind::Issue => format!("[#{}] ", item.number),
        ItemKind::PullRequest => format!("[PR #{}] ", item.number),
    }
}
