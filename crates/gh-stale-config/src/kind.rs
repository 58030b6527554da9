//! Item kinds and per-kind settings
//!
//! Issues and pull requests share one option set; most options have an
//! issue and a pull request flavour. `KindSettings` is that option set
//! resolved for one kind, so the engine never branches on the kind again.

use gh_client::CloseReason;
use std::fmt;

/// Whether an item is an issue or a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Issue,
    PullRequest,
}

impl ItemKind {
    /// Both kinds, issues first
    pub const ALL: [ItemKind; 2] = [ItemKind::Issue, ItemKind::PullRequest];

    pub fn is_pull_request(&self) -> bool {
        matches!(self, ItemKind::PullRequest)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Issue => f.write_str("issue"),
            ItemKind::PullRequest => f.write_str("pull request"),
        }
    }
}

/// Options resolved for a single item kind
#[derive(Debug, Clone, PartialEq)]
pub struct KindSettings {
    pub kind: ItemKind,
    /// Comment posted when marking stale; empty disables marking
    pub stale_message: String,
    /// Comment posted when closing; empty skips the comment
    pub close_message: String,
    pub stale_label: String,
    pub close_label: Option<String>,
    /// Negative disables marking
    pub days_before_stale: f64,
    /// Negative disables closing
    pub days_before_close: f64,
    pub exempt_labels: Vec<String>,
    pub exempt_milestones: Vec<String>,
    pub exempt_assignees: Vec<String>,
    pub exempt_all_assignees: bool,
    pub skip_stale_message: bool,
    pub remove_stale_when_updated: bool,
    pub close_reason: Option<CloseReason>,
}

impl KindSettings {
    /// Whether the stale threshold allows marking at all
    pub fn should_mark_when_stale(&self) -> bool {
        self.days_before_stale >= 0.0
    }

    /// Whether the close threshold allows closing at all
    pub fn should_close_when_stale(&self) -> bool {
        self.days_before_close >= 0.0
    }
}
