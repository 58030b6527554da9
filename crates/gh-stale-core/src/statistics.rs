//! Run statistics
//!
//! Passive counters filled by the engine and logged at the end of a run.

use gh_stale_config::ItemKind;
use log::info;

/// Counters kept separately for issues and pull requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindCounters {
    pub processed: u64,
    pub new_stale: u64,
    pub already_stale: u64,
    pub undo_stale: u64,
    pub closed: u64,
    pub exempt: u64,
}

impl KindCounters {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    pub issues: KindCounters,
    pub pull_requests: KindCounters,
    pub deleted_branches: u64,
    pub added_comments: u64,
    pub fetched_items: u64,
    pub fetched_comments: u64,
    pub fetched_events: u64,
    pub fetched_pull_requests: u64,
    pub operations: i64,
}

impl Statistics {
    pub fn counters(&self, kind: ItemKind) -> &KindCounters {
        match kind {
            ItemKind::Issue => &self.issues,
            ItemKind::PullRequest => &self.pull_requests,
        }
    }

    pub fn counters_mut(&mut self, kind: ItemKind) -> &mut KindCounters {
        match kind {
            ItemKind::Issue => &mut self.issues,
            ItemKind::PullRequest => &mut self.pull_requests,
        }
    }

    pub fn log_stats(&self) {
        info!("Statistics:");
        for kind in ItemKind::ALL {
            let counters = self.counters(kind);
            if counters.is_empty() {
                continue;
            }
            info!(
                "  {}s: processed={} new_stale={} already_stale={} undo_stale={} closed={} exempt={}",
                kind,
                counters.processed,
                counters.new_stale,
                counters.already_stale,
                counters.undo_stale,
                counters.closed,
                counters.exempt
            );
        }
        info!(
            "  deleted_branches={} added_comments={} fetched_items={} fetched_comments={} fetched_events={} fetched_pull_requests={} operations={}",
            self.deleted_branches,
            self.added_comments,
            self.fetched_items,
            self.fetched_comments,
            self.fetched_events,
            self.fetched_pull_requests,
            self.operations
        );
    }
}
