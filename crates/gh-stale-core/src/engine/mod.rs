//! Staleness engine
//!
//! Walks the open items page by page and moves each one through the
//! stale lifecycle:
//!
//! ```text
//! Fetched ─┬─► Skipped (processed | closed | locked | filtered | exempt)
//!          ├─► MarkedStale ─┐
//!          └─► AlreadyStale ┴─► LeftStale | UnStaled | Closed (+ branch deleted)
//! ```
//!
//! Every remote call consumes one operation from the run's budget. Remote
//! failures are logged and treated as "did not happen"; they never abort
//! the run. In debug-only mode mutations are skipped at the client
//! boundary while all bookkeeping proceeds as usual.

use crate::budget::OperationBudget;
use crate::clock;
use crate::error::EngineError;
use crate::exemptions;
use crate::item::{item_prefix, Item};
use crate::labels;
use crate::start_date::parse_start_date;
use crate::state::{ProcessedItems, StateStore};
use crate::statistics::Statistics;
use chrono::{DateTime, SubsecRound, Utc};
use gh_client::{GitHubClient, IssueComment, IssueQuery, IssueState, PullRequest};
use gh_stale_config::{ItemKind, KindSettings, StaleOptions};
use log::{debug, error, info, warn};

#[cfg(test)]
mod tests;

/// Items fetched per page
pub const PAGE_SIZE: u8 = 100;

/// Login assumed for the bot when the authenticated user cannot be fetched
pub const DEFAULT_ACTOR: &str = "github-actions[bot]";

/// Outcome of one run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Items newly marked stale
    pub stale_issues: Vec<Item>,
    pub closed_issues: Vec<Item>,
    /// Pull requests whose head branch was deleted
    pub deleted_branch_issues: Vec<Item>,
    /// Items whose stale label was removed
    pub removed_label_issues: Vec<Item>,
    /// Items that received labels when leaving the stale state
    pub added_label_issues: Vec<Item>,
    /// Budget left at the end of the run, never negative
    pub remaining_operations: i64,
    /// All pages were drained and the processed state was reset
    pub completed_cycle: bool,
    pub statistics: Statistics,
}

/// How a page ended the pagination loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageOutcome {
    /// Fetch the next page
    Continue,
    /// The page was empty: every item has been seen
    Drained,
    /// The operation budget ran out
    Exhausted,
    /// The page could not be fetched
    Failed,
}

/// Mutable bookkeeping threaded through one run
struct Pass {
    actor: String,
    budget: OperationBudget,
    report: RunReport,
}

pub struct StaleEngine<C, S> {
    client: C,
    store: S,
    owner: String,
    repo: String,
    options: StaleOptions,
    issue_settings: KindSettings,
    pr_settings: KindSettings,
    any_of_labels: Vec<String>,
    any_of_authors: Vec<String>,
    labels_to_remove_when_stale: Vec<String>,
    labels_to_remove_when_unstale: Vec<String>,
    labels_to_add_when_unstale: Vec<String>,
    start_date: Option<DateTime<Utc>>,
    fallback_actor: String,
    processed: ProcessedItems,
}

impl<C: GitHubClient, S: StateStore> StaleEngine<C, S> {
    pub fn new(
        client: C,
        store: S,
        owner: impl Into<String>,
        repo: impl Into<String>,
        options: StaleOptions,
    ) -> Result<Self, EngineError> {
        options
            .validate()
            .map_err(|e| EngineError::InvalidOptions(format!("{:#}", e)))?;
        let start_date = parse_start_date(&options.start_date)?;

        Ok(Self {
            client,
            store,
            owner: owner.into(),
            repo: repo.into(),
            issue_settings: options.kind_settings(ItemKind::Issue),
            pr_settings: options.kind_settings(ItemKind::PullRequest),
            any_of_labels: options.any_of_labels(),
            any_of_authors: options.any_of_authors(),
            labels_to_remove_when_stale: options.labels_to_remove_when_stale(),
            labels_to_remove_when_unstale: options.labels_to_remove_when_unstale(),
            labels_to_add_when_unstale: options.labels_to_add_when_unstale(),
            start_date,
            fallback_actor: DEFAULT_ACTOR.to_string(),
            processed: ProcessedItems::new(),
            options,
        })
    }

    /// Identity used for comment filtering when the API cannot tell us
    pub fn with_fallback_actor(mut self, actor: impl Into<String>) -> Self {
        self.fallback_actor = actor.into();
        self
    }

    pub fn options(&self) -> &StaleOptions {
        &self.options
    }

    pub fn processed(&self) -> &ProcessedItems {
        &self.processed
    }

    fn settings(&self, kind: ItemKind) -> &KindSettings {
        match kind {
            ItemKind::Issue => &self.issue_settings,
            ItemKind::PullRequest => &self.pr_settings,
        }
    }

    /// Process every open item until the pages or the budget run out
    pub async fn run(&mut self) -> RunReport {
        self.restore_state().await;
        self.log_rate_limit().await;

        let mut pass = Pass {
            actor: self.resolve_actor().await,
            budget: OperationBudget::new(self.options.operations_per_run),
            report: RunReport::default(),
        };

        let mut page = 1u32;
        loop {
            match self.process_page(page, &mut pass).await {
                PageOutcome::Continue => page += 1,
                PageOutcome::Drained => {
                    info!("No more items found to process. Exiting...");
                    self.processed.reset();
                    pass.report.completed_cycle = true;
                    break;
                }
                PageOutcome::Exhausted => {
                    warn!(
                        "No more operations left! Exiting... (consumed {} operations)",
                        pass.budget.consumed()
                    );
                    break;
                }
                PageOutcome::Failed => break,
            }
        }

        let mut report = pass.report;
        report.remaining_operations = pass.budget.remaining();
        report.statistics.operations = pass.budget.consumed();
        if self.options.enable_statistics {
            report.statistics.log_stats();
        }

        self.persist_state().await;
        report
    }

    async fn process_page(&mut self, page: u32, pass: &mut Pass) -> PageOutcome {
        let query = IssueQuery {
            page,
            per_page: PAGE_SIZE,
            labels: self.options.only_labels(),
            direction: self.options.sort_direction(),
        };

        pass.budget.consume();
        let issues = match self
            .client
            .fetch_issues(&self.owner, &self.repo, &query)
            .await
        {
            Ok(issues) => issues,
            Err(e) => {
                error!("Getting items was blocked by the error: {:#}", e);
                return PageOutcome::Failed;
            }
        };
        pass.report.statistics.fetched_items += issues.len() as u64;
        info!("Processing the batch of items #{} ({} items)", page, issues.len());

        if issues.is_empty() {
            return PageOutcome::Drained;
        }

        for issue in issues {
            if !pass.budget.has_remaining() {
                break;
            }

            let number = issue.number;
            if self.processed.is_issue_processed(number) {
                debug!("[#{}] Skipped: processed during a previous run", number);
                continue;
            }

            let item = Item::new(issue, &self.options);
            self.process_item(item, pass).await;
            self.processed.add_issue_to_processed(number);
        }

        if pass.budget.has_remaining() {
            PageOutcome::Continue
        } else {
            PageOutcome::Exhausted
        }
    }

    async fn process_item(&self, mut item: Item, pass: &mut Pass) {
        let settings = self.settings(item.kind);
        let prefix = item_prefix(&item);
        pass.report.statistics.counters_mut(item.kind).processed += 1;
        info!(
            "{}Found this {} last updated at: {}",
            prefix, item.kind, item.updated_at
        );

        if settings.stale_message.is_empty()
            && settings.should_mark_when_stale()
            && !item.is_stale
        {
            warn!(
                "{}Skipping {} due to empty stale message",
                prefix, item.kind
            );
            return;
        }

        if item.state == IssueState::Closed {
            info!("{}Skipping this {} because it is closed", prefix, item.kind);
            return;
        }

        if item.locked {
            info!("{}Skipping this {} because it is locked", prefix, item.kind);
            return;
        }

        if let Some(start_date) = self.start_date {
            if item.created_at < start_date {
                info!(
                    "{}Skipping this {} because it was created before the start date {}",
                    prefix, item.kind, start_date
                );
                return;
            }
        }

        if exemptions::is_missing_any_of_labels(&self.any_of_labels, &item) {
            info!(
                "{}Skipping this {} because it has none of the required labels",
                prefix, item.kind
            );
            return;
        }

        if exemptions::is_author_excluded(&self.any_of_authors, &item) {
            info!(
                "{}Skipping this {} because its author is not in the allowed authors",
                prefix, item.kind
            );
            return;
        }

        if exemptions::is_skipped_by_only_draft(self.options.only_draft_pr, &item) {
            info!("{}Skipping this pull request because it is not a draft", prefix);
            return;
        }

        if self.is_exempt(&item, settings, pass).await {
            pass.report.statistics.counters_mut(item.kind).exempt += 1;
            return;
        }

        let mut is_stale = item.is_stale;
        if is_stale {
            info!("{}This {} has a stale label", prefix, item.kind);
            pass.report.statistics.counters_mut(item.kind).already_stale += 1;
        } else {
            let should_be_stale =
                clock::was_last_updated_before(item.last_activity_at, settings.days_before_stale);
            if should_be_stale && settings.should_mark_when_stale() {
                info!("{}Marking this {} as stale", prefix, item.kind);
                self.mark_stale(&mut item, settings, pass).await;
                is_stale = item.is_stale;
            } else if should_be_stale {
                info!(
                    "{}This {} should be stale but marking is disabled",
                    prefix, item.kind
                );
            } else {
                info!("{}This {} should not be stale yet", prefix, item.kind);
            }
        }

        if is_stale {
            self.process_stale_item(&mut item, settings, pass).await;
        }
    }

    /// Label, milestone, assignee and draft exemptions
    ///
    /// A label exemption also removes an existing stale label.
    async fn is_exempt(&self, item: &Item, settings: &KindSettings, pass: &mut Pass) -> bool {
        let prefix = item_prefix(item);

        if exemptions::is_label_exempt(settings, item) {
            if item.is_stale {
                info!(
                    "{}An exempt label was added after the stale label",
                    prefix
                );
                self.remove_stale_label(item, settings, pass).await;
            }
            info!("{}Skipping this {} because it has an exempt label", prefix, item.kind);
            return true;
        }

        if exemptions::is_milestone_exempt(settings, item) {
            info!(
                "{}Skipping this {} because it has an exempt milestone",
                prefix, item.kind
            );
            return true;
        }

        if exemptions::is_assignee_exempt(settings, item) {
            info!(
                "{}Skipping this {} because it has an exempt assignee",
                prefix, item.kind
            );
            return true;
        }

        if exemptions::needs_draft_detail(self.options.exempt_draft_pr, item) {
            let detail = self.fetch_pull_request(item, pass).await;
            if exemptions::is_draft_exempt(self.options.exempt_draft_pr, item, detail.as_ref()) {
                info!("{}Skipping this pull request because it is a draft", prefix);
                return true;
            }
        }

        false
    }

    async fn mark_stale(&self, item: &mut Item, settings: &KindSettings, pass: &mut Pass) {
        pass.report.stale_issues.push(item.clone());
        pass.report.statistics.counters_mut(item.kind).new_stale += 1;

        // Second precision, like the timestamps the API reports
        item.touch(Utc::now().trunc_subsecs(0));

        if !settings.skip_stale_message {
            self.add_comment(item, &settings.stale_message, pass).await;
        }
        self.add_labels(item, std::slice::from_ref(&settings.stale_label), pass)
            .await;

        for label in &self.labels_to_remove_when_stale {
            if item.has_label(label) {
                self.remove_label(item, label, pass).await;
            }
        }

        let removed = &self.labels_to_remove_when_stale;
        item.labels
            .retain(|existing| !removed.iter().any(|l| labels::labels_match(existing, l)));
        item.labels.push(settings.stale_label.clone());
        item.is_stale = true;
    }

    async fn process_stale_item(&self, item: &mut Item, settings: &KindSettings, pass: &mut Pass) {
        let prefix = item_prefix(item);

        let marked_stale_on = self
            .label_applied_at(item, &settings.stale_label, pass)
            .await
            .unwrap_or(item.last_activity_at);
        info!("{}This {} was marked stale on {}", prefix, item.kind, marked_stale_on);

        let actor = pass.actor.clone();
        let has_comments = self
            .has_comments_since(item, marked_stale_on, &actor, pass)
            .await;
        debug!("{}Comments since marked stale: {}", prefix, has_comments);

        if settings.remove_stale_when_updated && has_comments {
            info!(
                "{}Removing the stale label because this {} was commented on",
                prefix, item.kind
            );
            self.remove_stale_label(item, settings, pass).await;
            self.apply_unstale_labels(item, pass).await;
            return;
        }

        if !settings.should_close_when_stale() {
            info!("{}Closing is disabled for {}s", prefix, item.kind);
            return;
        }

        let updated_in_close_window =
            clock::updated_since(item.last_activity_at, settings.days_before_close);
        if !has_comments && !updated_in_close_window {
            self.close_item(item, settings, pass).await;
            if self.options.delete_branch && item.is_pull_request() {
                self.delete_branch(item, pass).await;
            }
        } else {
            info!(
                "{}Stale {} is not old enough to close yet (comments: {}, updated in window: {})",
                prefix, item.kind, has_comments, updated_in_close_window
            );
        }
    }

    async fn apply_unstale_labels(&self, item: &Item, pass: &mut Pass) {
        for label in &self.labels_to_remove_when_unstale {
            if item.has_label(label) {
                self.remove_label(item, label, pass).await;
            }
        }

        if !self.labels_to_add_when_unstale.is_empty() {
            pass.report.added_label_issues.push(item.clone());
            self.add_labels(item, &self.labels_to_add_when_unstale, pass)
                .await;
        }
    }

    async fn close_item(&self, item: &mut Item, settings: &KindSettings, pass: &mut Pass) {
        let prefix = item_prefix(item);
        info!("{}Closing this {} for being stale", prefix, item.kind);

        pass.report.closed_issues.push(item.clone());
        pass.report.statistics.counters_mut(item.kind).closed += 1;

        if !settings.close_message.is_empty() {
            self.add_comment(item, &settings.close_message, pass).await;
        }
        if let Some(close_label) = &settings.close_label {
            self.add_labels(item, std::slice::from_ref(close_label), pass)
                .await;
        }

        pass.budget.consume();
        if self.options.debug_only {
            return;
        }
        if let Err(e) = self
            .client
            .close_issue(&self.owner, &self.repo, item.number, settings.close_reason)
            .await
        {
            error!("{}Error when closing this {}: {:#}", prefix, item.kind, e);
        }
    }

    async fn delete_branch(&self, item: &Item, pass: &mut Pass) {
        let prefix = item_prefix(item);

        let Some(pull_request) = self.fetch_pull_request(item, pass).await else {
            info!("{}Not deleting the branch as no pull request was found", prefix);
            return;
        };

        info!(
            "{}Deleting the branch \"{}\" of this closed pull request",
            prefix, pull_request.head_branch
        );
        pass.report.deleted_branch_issues.push(item.clone());
        pass.report.statistics.deleted_branches += 1;

        pass.budget.consume();
        if self.options.debug_only {
            return;
        }
        if let Err(e) = self
            .client
            .delete_branch(&self.owner, &self.repo, &pull_request.head_branch)
            .await
        {
            error!(
                "{}Error when deleting the branch \"{}\": {:#}",
                prefix, pull_request.head_branch, e
            );
        }
    }

    async fn remove_stale_label(&self, item: &Item, settings: &KindSettings, pass: &mut Pass) {
        pass.report.removed_label_issues.push(item.clone());
        pass.report.statistics.counters_mut(item.kind).undo_stale += 1;
        self.remove_label(item, &settings.stale_label, pass).await;
    }

    // === Remote calls ===

    async fn add_comment(&self, item: &Item, body: &str, pass: &mut Pass) {
        pass.budget.consume();
        pass.report.statistics.added_comments += 1;
        if self.options.debug_only {
            return;
        }
        if let Err(e) = self
            .client
            .create_comment(&self.owner, &self.repo, item.number, body)
            .await
        {
            error!("{}Error when creating a comment: {:#}", item_prefix(item), e);
        }
    }

    async fn add_labels(&self, item: &Item, labels: &[String], pass: &mut Pass) {
        pass.budget.consume();
        if self.options.debug_only {
            return;
        }
        if let Err(e) = self
            .client
            .add_labels(&self.owner, &self.repo, item.number, labels)
            .await
        {
            error!(
                "{}Error when adding labels {:?}: {:#}",
                item_prefix(item),
                labels,
                e
            );
        }
    }

    async fn remove_label(&self, item: &Item, label: &str, pass: &mut Pass) {
        pass.budget.consume();
        if self.options.debug_only {
            return;
        }
        if let Err(e) = self
            .client
            .remove_label(&self.owner, &self.repo, item.number, label)
            .await
        {
            error!(
                "{}Error when removing the label \"{}\": {:#}",
                item_prefix(item),
                label,
                e
            );
        }
    }

    async fn fetch_pull_request(&self, item: &Item, pass: &mut Pass) -> Option<PullRequest> {
        pass.budget.consume();
        pass.report.statistics.fetched_pull_requests += 1;
        match self
            .client
            .fetch_pull_request(&self.owner, &self.repo, item.number)
            .await
        {
            Ok(pull_request) => Some(pull_request),
            Err(e) => {
                error!(
                    "{}Error when getting this pull request: {:#}",
                    item_prefix(item),
                    e
                );
                None
            }
        }
    }

    /// When the label was last applied, newest "labeled" event first
    async fn label_applied_at(
        &self,
        item: &Item,
        label: &str,
        pass: &mut Pass,
    ) -> Option<DateTime<Utc>> {
        pass.budget.consume();
        let events = match self
            .client
            .fetch_issue_events(&self.owner, &self.repo, item.number)
            .await
        {
            Ok(events) => events,
            Err(e) => {
                error!("{}Error when listing events: {:#}", item_prefix(item), e);
                return None;
            }
        };
        pass.report.statistics.fetched_events += events.len() as u64;

        events
            .iter()
            .rev()
            .find(|event| {
                event.event == "labeled"
                    && event
                        .label
                        .as_ref()
                        .is_some_and(|l| labels::labels_match(&l.name, label))
            })
            .map(|event| event.created_at)
    }

    /// Whether a human other than the bot commented since `since`
    ///
    /// A failed listing counts as "no comments".
    async fn has_comments_since(
        &self,
        item: &Item,
        since: DateTime<Utc>,
        actor: &str,
        pass: &mut Pass,
    ) -> bool {
        pass.budget.consume();
        let comments = match self
            .client
            .fetch_comments(&self.owner, &self.repo, item.number, since)
            .await
        {
            Ok(comments) => comments,
            Err(e) => {
                error!("{}Error when listing comments: {:#}", item_prefix(item), e);
                return false;
            }
        };
        pass.report.statistics.fetched_comments += comments.len() as u64;

        comments
            .iter()
            .any(|comment| is_qualifying_comment(comment, actor))
    }

    // === Run lifecycle ===

    async fn resolve_actor(&self) -> String {
        match self.client.fetch_authenticated_login().await {
            Ok(login) => {
                debug!("Running as {}", login);
                login
            }
            Err(e) => {
                warn!(
                    "Could not get the authenticated user, assuming \"{}\": {:#}",
                    self.fallback_actor, e
                );
                self.fallback_actor.clone()
            }
        }
    }

    async fn log_rate_limit(&self) {
        match self.client.fetch_rate_limit().await {
            Ok(rate) => info!(
                "GitHub API rate status: limit={}, used={}, remaining={}, reset={}",
                rate.limit, rate.used, rate.remaining, rate.reset
            ),
            Err(e) => warn!("Could not get the GitHub API rate status: {:#}", e),
        }
    }

    async fn restore_state(&mut self) {
        match self.store.restore().await {
            Ok(serialized) => {
                self.processed = ProcessedItems::deserialize(&serialized);
                info!(
                    "Restored state: {} items already processed",
                    self.processed.len()
                );
            }
            Err(e) => {
                warn!("Restoring the state failed, starting fresh: {:#}", e);
                self.processed = ProcessedItems::new();
            }
        }
    }

    async fn persist_state(&self) {
        if self.options.debug_only {
            info!("Debug-only mode: the state is not persisted");
            return;
        }
        if let Err(e) = self.store.save(&self.processed.serialize()).await {
            error!("Persisting the state failed: {:#}", e);
        }
    }
}

/// A comment by a human account other than the bot itself
fn is_qualifying_comment(comment: &IssueComment, actor: &str) -> bool {
    comment
        .user
        .as_ref()
        .is_some_and(|user| user.is_human() && user.login != actor)
}
