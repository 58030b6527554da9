use super::*;
use crate::item::fixtures::{issue, pull_request};
use crate::state::MemoryStateStore;
use async_trait::async_trait;
use gh_client::{CloseReason, Issue, IssueEvent, Label, Milestone, RateLimit, User};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

const BOT_LOGIN: &str = "stale-bot";

/// A mutation the engine asked the fake to perform
#[derive(Debug, Clone, PartialEq)]
enum Call {
    Comment(u64, String),
    AddLabels(u64, Vec<String>),
    RemoveLabel(u64, String),
    Close(u64, Option<CloseReason>),
    DeleteBranch(String),
}

#[derive(Default)]
struct FakeState {
    issues: Vec<Issue>,
    comments: HashMap<u64, Vec<IssueComment>>,
    events: HashMap<u64, Vec<IssueEvent>>,
    pull_requests: HashMap<u64, PullRequest>,
    failing_pages: Vec<u32>,
    fail_comments: bool,
    fail_login: bool,
    calls: Vec<Call>,
}

/// In-memory repository that applies mutations to its own issues
#[derive(Clone, Default)]
struct FakeClient {
    state: Arc<Mutex<FakeState>>,
}

impl FakeClient {
    fn with_issues(issues: Vec<Issue>) -> Self {
        let client = Self::default();
        client.state().issues = issues;
        client
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    fn add_comment(&self, number: u64, comment: IssueComment) {
        self.state().comments.entry(number).or_default().push(comment);
    }

    fn add_pull_request(&self, number: u64, head_branch: &str, draft: bool) {
        self.state().pull_requests.insert(
            number,
            PullRequest {
                number,
                head_branch: head_branch.to_string(),
                draft,
            },
        );
    }

    fn issue_mut(state: &mut FakeState, number: u64) -> Option<&mut Issue> {
        state.issues.iter_mut().find(|issue| issue.number == number)
    }
}

#[async_trait]
impl GitHubClient for FakeClient {
    async fn fetch_issues(
        &self,
        _owner: &str,
        _repo: &str,
        query: &IssueQuery,
    ) -> anyhow::Result<Vec<Issue>> {
        let state = self.state();
        if state.failing_pages.contains(&query.page) {
            anyhow::bail!("page {} unavailable", query.page);
        }
        let per_page = query.per_page as usize;
        let start = (query.page as usize - 1) * per_page;
        Ok(state
            .issues
            .iter()
            .filter(|issue| issue.state == IssueState::Open)
            .filter(|issue| {
                query.labels.iter().all(|wanted| {
                    issue
                        .labels
                        .iter()
                        .any(|label| labels::labels_match(&label.name, wanted))
                })
            })
            .skip(start)
            .take(per_page)
            .cloned()
            .collect())
    }

    async fn fetch_authenticated_login(&self) -> anyhow::Result<String> {
        if self.state().fail_login {
            anyhow::bail!("forbidden");
        }
        Ok(BOT_LOGIN.to_string())
    }

    async fn fetch_comments(
        &self,
        _owner: &str,
        _repo: &str,
        issue_number: u64,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<IssueComment>> {
        let state = self.state();
        if state.fail_comments {
            anyhow::bail!("comments unavailable");
        }
        Ok(state
            .comments
            .get(&issue_number)
            .map(|comments| {
                comments
                    .iter()
                    .filter(|comment| comment.created_at >= since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_issue_events(
        &self,
        _owner: &str,
        _repo: &str,
        issue_number: u64,
    ) -> anyhow::Result<Vec<IssueEvent>> {
        Ok(self
            .state()
            .events
            .get(&issue_number)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_pull_request(
        &self,
        _owner: &str,
        _repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<PullRequest> {
        self.state()
            .pull_requests
            .get(&pr_number)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("pull request #{} not found", pr_number))
    }

    async fn fetch_rate_limit(&self) -> anyhow::Result<RateLimit> {
        Ok(RateLimit::from_raw(5000, 10, 4990, 1_700_000_000))
    }

    async fn create_comment(
        &self,
        _owner: &str,
        _repo: &str,
        issue_number: u64,
        body: &str,
    ) -> anyhow::Result<()> {
        let now = Utc::now();
        let mut state = self.state();
        state.calls.push(Call::Comment(issue_number, body.to_string()));
        state.comments.entry(issue_number).or_default().push(IssueComment {
            id: 1000 + issue_number,
            user: Some(User {
                login: BOT_LOGIN.to_string(),
                kind: "Bot".to_string(),
            }),
            created_at: now,
        });
        if let Some(issue) = Self::issue_mut(&mut state, issue_number) {
            issue.updated_at = now;
        }
        Ok(())
    }

    async fn add_labels(
        &self,
        _owner: &str,
        _repo: &str,
        issue_number: u64,
        labels: &[String],
    ) -> anyhow::Result<()> {
        let now = Utc::now();
        let mut state = self.state();
        state.calls.push(Call::AddLabels(issue_number, labels.to_vec()));
        for name in labels {
            state.events.entry(issue_number).or_default().push(IssueEvent {
                event: "labeled".to_string(),
                created_at: now,
                label: Some(Label { name: name.clone() }),
            });
        }
        if let Some(issue) = Self::issue_mut(&mut state, issue_number) {
            issue
                .labels
                .extend(labels.iter().map(|name| Label { name: name.clone() }));
            issue.updated_at = now;
        }
        Ok(())
    }

    async fn remove_label(
        &self,
        _owner: &str,
        _repo: &str,
        issue_number: u64,
        label: &str,
    ) -> anyhow::Result<()> {
        let mut state = self.state();
        state
            .calls
            .push(Call::RemoveLabel(issue_number, label.to_string()));
        if let Some(issue) = Self::issue_mut(&mut state, issue_number) {
            issue.labels.retain(|existing| existing.name != label);
            issue.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn close_issue(
        &self,
        _owner: &str,
        _repo: &str,
        issue_number: u64,
        reason: Option<CloseReason>,
    ) -> anyhow::Result<()> {
        let mut state = self.state();
        state.calls.push(Call::Close(issue_number, reason));
        if let Some(issue) = Self::issue_mut(&mut state, issue_number) {
            issue.state = IssueState::Closed;
        }
        Ok(())
    }

    async fn delete_branch(&self, _owner: &str, _repo: &str, branch: &str) -> anyhow::Result<()> {
        self.state()
            .calls
            .push(Call::DeleteBranch(branch.to_string()));
        Ok(())
    }
}

/// Options with messages set and a one day stale threshold
fn stale_options() -> StaleOptions {
    StaleOptions {
        stale_issue_message: "This issue is stale".to_string(),
        stale_pr_message: "This PR is stale".to_string(),
        days_before_stale: 1.0,
        ..Default::default()
    }
}

fn comment(login: &str, kind: &str, at: &str) -> IssueComment {
    IssueComment {
        id: 1,
        user: Some(User {
            login: login.to_string(),
            kind: kind.to_string(),
        }),
        created_at: crate::clock::parse_timestamp(at).unwrap(),
    }
}

async fn run_with(
    client: &FakeClient,
    store: &MemoryStateStore,
    options: StaleOptions,
) -> RunReport {
    let mut engine = StaleEngine::new(client.clone(), store.clone(), "owner", "repo", options)
        .unwrap()
        .with_fallback_actor(BOT_LOGIN);
    engine.run().await
}

fn numbers(items: &[Item]) -> Vec<u64> {
    items.iter().map(|item| item.number).collect()
}

#[tokio::test]
async fn test_marks_and_closes_in_one_pass_with_zero_close_days() {
    let client = FakeClient::with_issues(vec![issue(1, "2020-01-01T17:00:00Z", &[])]);
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        days_before_close: 0.0,
        ..stale_options()
    };

    let report = run_with(&client, &store, options).await;

    assert_eq!(numbers(&report.stale_issues), vec![1]);
    assert_eq!(numbers(&report.closed_issues), vec![1]);
    assert_eq!(
        client.calls(),
        vec![
            Call::Comment(1, "This issue is stale".to_string()),
            Call::AddLabels(1, vec!["Stale".to_string()]),
            Call::Close(1, Some(CloseReason::NotPlanned)),
        ]
    );
    assert!(report.completed_cycle);
}

#[tokio::test]
async fn test_recent_issue_is_left_alone() {
    let recent = Utc::now().to_rfc3339();
    let client = FakeClient::with_issues(vec![issue(1, &recent, &[])]);
    let store = MemoryStateStore::default();

    let report = run_with(&client, &store, stale_options()).await;

    assert!(report.stale_issues.is_empty());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_start_date_skips_older_items() {
    let client = FakeClient::with_issues(vec![
        issue(1, "2020-01-01T17:00:00Z", &[]),
        issue(2, "2022-06-01T17:00:00Z", &[]),
    ]);
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        start_date: "2021-01-01T00:00:00Z".to_string(),
        ..stale_options()
    };

    let report = run_with(&client, &store, options).await;

    assert_eq!(numbers(&report.stale_issues), vec![2]);
}

#[tokio::test]
async fn test_epoch_start_date_after_creation_excludes_item() {
    let client = FakeClient::with_issues(vec![issue(1, "2020-01-01T17:00:00Z", &[])]);
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        // 2021-01-01T00:00:00Z in seconds
        start_date: "1609459200".to_string(),
        days_before_close: 0.0,
        ..stale_options()
    };

    let report = run_with(&client, &store, options).await;

    assert!(report.stale_issues.is_empty());
    assert!(report.closed_issues.is_empty());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_start_date_is_rejected() {
    let options = StaleOptions {
        start_date: "not a date".to_string(),
        ..stale_options()
    };
    let result = StaleEngine::new(
        FakeClient::default(),
        MemoryStateStore::default(),
        "owner",
        "repo",
        options,
    );
    assert!(matches!(result, Err(EngineError::InvalidStartDate(_))));
}

#[tokio::test]
async fn test_already_stale_issue_closes_after_close_window() {
    let client = FakeClient::with_issues(vec![issue(1, "2020-01-01T17:00:00Z", &["Stale"])]);
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        days_before_close: 30.0,
        ..stale_options()
    };

    let report = run_with(&client, &store, options).await;

    assert!(report.stale_issues.is_empty());
    assert_eq!(numbers(&report.closed_issues), vec![1]);
    assert_eq!(
        client.calls(),
        vec![Call::Close(1, Some(CloseReason::NotPlanned))]
    );
    assert_eq!(report.statistics.issues.already_stale, 1);
    assert_eq!(report.statistics.issues.closed, 1);
}

#[tokio::test]
async fn test_close_message_label_and_reason() {
    let client = FakeClient::with_issues(vec![issue(1, "2020-01-01T17:00:00Z", &["Stale"])]);
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        close_issue_message: "Closing for inactivity".to_string(),
        close_issue_label: "closed-stale".to_string(),
        close_issue_reason: "completed".to_string(),
        ..stale_options()
    };

    run_with(&client, &store, options).await;

    assert_eq!(
        client.calls(),
        vec![
            Call::Comment(1, "Closing for inactivity".to_string()),
            Call::AddLabels(1, vec!["closed-stale".to_string()]),
            Call::Close(1, Some(CloseReason::Completed)),
        ]
    );
}

#[tokio::test]
async fn test_locked_issue_is_untouched() {
    let locked = Issue {
        locked: true,
        ..issue(1, "2020-01-01T17:00:00Z", &["Stale"])
    };
    let client = FakeClient::with_issues(vec![locked]);
    let store = MemoryStateStore::default();

    let report = run_with(&client, &store, stale_options()).await;

    assert!(report.closed_issues.is_empty());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_human_comment_removes_stale_label() {
    let client = FakeClient::with_issues(vec![issue(1, "2020-01-01T17:00:00Z", &["Stale"])]);
    client.add_comment(1, comment("alice", "User", "2021-01-01T00:00:00Z"));
    let store = MemoryStateStore::default();

    let report = run_with(&client, &store, stale_options()).await;

    assert_eq!(numbers(&report.removed_label_issues), vec![1]);
    assert!(report.closed_issues.is_empty());
    assert_eq!(
        client.calls(),
        vec![Call::RemoveLabel(1, "Stale".to_string())]
    );
    assert_eq!(report.statistics.issues.undo_stale, 1);
}

#[tokio::test]
async fn test_comment_is_ignored_when_removal_disabled_for_issues() {
    let client = FakeClient::with_issues(vec![issue(1, "2020-01-01T17:00:00Z", &["Stale"])]);
    client.add_comment(1, comment("alice", "User", "2021-01-01T00:00:00Z"));
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        remove_issue_stale_when_updated: Some(false),
        ..stale_options()
    };

    let report = run_with(&client, &store, options).await;

    // The comment still blocks closing
    assert!(report.removed_label_issues.is_empty());
    assert!(report.closed_issues.is_empty());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_own_and_bot_comments_do_not_unstale() {
    let client = FakeClient::with_issues(vec![issue(1, "2020-01-01T17:00:00Z", &["Stale"])]);
    client.add_comment(1, comment(BOT_LOGIN, "User", "2021-01-01T00:00:00Z"));
    client.add_comment(1, comment("dependabot[bot]", "Bot", "2021-01-02T00:00:00Z"));
    let store = MemoryStateStore::default();

    let report = run_with(&client, &store, stale_options()).await;

    assert!(report.removed_label_issues.is_empty());
    assert_eq!(numbers(&report.closed_issues), vec![1]);
}

#[tokio::test]
async fn test_fallback_actor_used_when_login_unavailable() {
    let client = FakeClient::with_issues(vec![issue(1, "2020-01-01T17:00:00Z", &["Stale"])]);
    client.state().fail_login = true;
    client.add_comment(1, comment(BOT_LOGIN, "User", "2021-01-01T00:00:00Z"));
    let store = MemoryStateStore::default();

    let report = run_with(&client, &store, stale_options()).await;

    assert_eq!(numbers(&report.closed_issues), vec![1]);
}

#[tokio::test]
async fn test_comment_fetch_failure_counts_as_no_comment() {
    let client = FakeClient::with_issues(vec![issue(1, "2020-01-01T17:00:00Z", &["Stale"])]);
    client.add_comment(1, comment("alice", "User", "2021-01-01T00:00:00Z"));
    client.state().fail_comments = true;
    let store = MemoryStateStore::default();

    let report = run_with(&client, &store, stale_options()).await;

    assert_eq!(numbers(&report.closed_issues), vec![1]);
}

#[tokio::test]
async fn test_negative_stale_threshold_never_marks() {
    let client = FakeClient::with_issues(vec![issue(1, "2020-01-01T17:00:00Z", &[])]);
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        days_before_stale: -1.0,
        ..stale_options()
    };

    let report = run_with(&client, &store, options).await;

    assert!(report.stale_issues.is_empty());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_negative_close_threshold_keeps_stale_items_open() {
    let client = FakeClient::with_issues(vec![issue(1, "2020-01-01T17:00:00Z", &["Stale"])]);
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        days_before_close: -1.0,
        ..stale_options()
    };

    let report = run_with(&client, &store, options).await;

    assert!(report.closed_issues.is_empty());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_second_run_does_not_repeat_marking() {
    let client = FakeClient::with_issues(vec![issue(1, "2020-01-01T17:00:00Z", &[])]);
    let store = MemoryStateStore::default();

    let first = run_with(&client, &store, stale_options()).await;
    assert_eq!(numbers(&first.stale_issues), vec![1]);
    let calls_after_first = client.calls().len();

    let second = run_with(&client, &store, stale_options()).await;
    assert!(second.stale_issues.is_empty());
    assert!(second.closed_issues.is_empty());
    assert_eq!(client.calls().len(), calls_after_first);
}

#[tokio::test]
async fn test_stale_label_matches_ignoring_case_and_accents() {
    let client = FakeClient::with_issues(vec![issue(1, "2020-01-01T17:00:00Z", &["stale"])]);
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        stale_issue_label: "Stâle".to_string(),
        ..stale_options()
    };

    let report = run_with(&client, &store, options).await;

    assert!(report.stale_issues.is_empty());
    assert_eq!(numbers(&report.closed_issues), vec![1]);
}

#[tokio::test]
async fn test_empty_stale_message_skips_marking() {
    let client = FakeClient::with_issues(vec![issue(1, "2020-01-01T17:00:00Z", &[])]);
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        stale_issue_message: String::new(),
        ..stale_options()
    };

    let report = run_with(&client, &store, options).await;

    assert!(report.stale_issues.is_empty());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_empty_stale_message_still_closes_stale_items() {
    let client = FakeClient::with_issues(vec![issue(1, "2020-01-01T17:00:00Z", &["Stale"])]);
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        stale_issue_message: String::new(),
        ..stale_options()
    };

    let report = run_with(&client, &store, options).await;

    assert_eq!(numbers(&report.closed_issues), vec![1]);
}

#[tokio::test]
async fn test_skip_stale_message_only_labels() {
    let client = FakeClient::with_issues(vec![issue(1, "2020-01-01T17:00:00Z", &[])]);
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        skip_stale_issue_message: true,
        ..stale_options()
    };

    let report = run_with(&client, &store, options).await;

    assert_eq!(numbers(&report.stale_issues), vec![1]);
    assert_eq!(
        client.calls(),
        vec![Call::AddLabels(1, vec!["Stale".to_string()])]
    );
}

#[tokio::test]
async fn test_exempt_label_removes_existing_stale_label() {
    let client = FakeClient::with_issues(vec![issue(
        1,
        "2020-01-01T17:00:00Z",
        &["Stale", "keep-open"],
    )]);
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        exempt_issue_labels: "keep-open, pinned".to_string(),
        ..stale_options()
    };

    let report = run_with(&client, &store, options).await;

    assert_eq!(numbers(&report.removed_label_issues), vec![1]);
    assert!(report.closed_issues.is_empty());
    assert_eq!(
        client.calls(),
        vec![Call::RemoveLabel(1, "Stale".to_string())]
    );
    assert_eq!(report.statistics.issues.exempt, 1);
}

#[tokio::test]
async fn test_milestone_override_for_pull_requests() {
    let with_milestone = |item: Issue| Issue {
        milestone: Some(Milestone {
            title: "v1".to_string(),
        }),
        ..item
    };
    let client = FakeClient::with_issues(vec![
        with_milestone(issue(1, "2020-01-01T17:00:00Z", &[])),
        with_milestone(pull_request(2, "2020-01-01T17:00:00Z", &[])),
    ]);
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        exempt_milestones: "v1".to_string(),
        exempt_pr_milestones: Some(String::new()),
        ..stale_options()
    };

    let report = run_with(&client, &store, options).await;

    assert_eq!(numbers(&report.stale_issues), vec![2]);
}

#[tokio::test]
async fn test_exempt_all_assignees() {
    let assigned = Issue {
        assignees: vec![User {
            login: "bob".to_string(),
            kind: "User".to_string(),
        }],
        ..issue(1, "2020-01-01T17:00:00Z", &[])
    };
    let client = FakeClient::with_issues(vec![assigned, issue(2, "2020-01-01T17:00:00Z", &[])]);
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        exempt_all_issue_assignees: Some(true),
        ..stale_options()
    };

    let report = run_with(&client, &store, options).await;

    assert_eq!(numbers(&report.stale_issues), vec![2]);
}

#[tokio::test]
async fn test_any_of_labels_and_authors_filters() {
    let by_alice = Issue {
        user: Some(User {
            login: "alice".to_string(),
            kind: "User".to_string(),
        }),
        ..issue(2, "2020-01-01T17:00:00Z", &["bug"])
    };
    let client = FakeClient::with_issues(vec![
        issue(1, "2020-01-01T17:00:00Z", &["bug"]),
        by_alice,
        issue(3, "2020-01-01T17:00:00Z", &["question"]),
    ]);
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        any_of_labels: "bug,enhancement".to_string(),
        any_of_authors: "alice".to_string(),
        ..stale_options()
    };

    let report = run_with(&client, &store, options).await;

    assert_eq!(numbers(&report.stale_issues), vec![2]);
}

#[tokio::test]
async fn test_draft_pull_request_is_exempt() {
    let client = FakeClient::with_issues(vec![pull_request(5, "2020-01-01T17:00:00Z", &[])]);
    client.add_pull_request(5, "feature", true);
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        exempt_draft_pr: true,
        ..stale_options()
    };

    let report = run_with(&client, &store, options).await;

    assert!(report.stale_issues.is_empty());
    assert_eq!(report.statistics.pull_requests.exempt, 1);
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_only_draft_pr_skips_ready_pull_requests() {
    let client = FakeClient::with_issues(vec![
        issue(1, "2020-01-01T17:00:00Z", &[]),
        pull_request(2, "2020-01-01T17:00:00Z", &[]),
    ]);
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        only_draft_pr: true,
        ..stale_options()
    };

    let report = run_with(&client, &store, options).await;

    assert_eq!(numbers(&report.stale_issues), vec![1]);
}

#[tokio::test]
async fn test_closing_pull_request_deletes_branch() {
    let client = FakeClient::with_issues(vec![pull_request(5, "2020-01-01T17:00:00Z", &["Stale"])]);
    client.add_pull_request(5, "feature/old", false);
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        delete_branch: true,
        ..stale_options()
    };

    let report = run_with(&client, &store, options).await;

    assert_eq!(numbers(&report.deleted_branch_issues), vec![5]);
    assert_eq!(
        client.calls(),
        vec![
            Call::Close(5, None),
            Call::DeleteBranch("feature/old".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_missing_pull_request_skips_branch_deletion() {
    let client = FakeClient::with_issues(vec![pull_request(5, "2020-01-01T17:00:00Z", &["Stale"])]);
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        delete_branch: true,
        ..stale_options()
    };

    let report = run_with(&client, &store, options).await;

    assert_eq!(numbers(&report.closed_issues), vec![5]);
    assert!(report.deleted_branch_issues.is_empty());
    assert_eq!(client.calls(), vec![Call::Close(5, None)]);
}

#[tokio::test]
async fn test_unstale_label_changes() {
    let client = FakeClient::with_issues(vec![issue(
        1,
        "2020-01-01T17:00:00Z",
        &["Stale", "awaiting-response"],
    )]);
    client.add_comment(1, comment("alice", "User", "2021-01-01T00:00:00Z"));
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        labels_to_remove_when_unstale: "awaiting-response".to_string(),
        labels_to_add_when_unstale: "needs-triage".to_string(),
        ..stale_options()
    };

    let report = run_with(&client, &store, options).await;

    assert_eq!(numbers(&report.added_label_issues), vec![1]);
    assert_eq!(
        client.calls(),
        vec![
            Call::RemoveLabel(1, "Stale".to_string()),
            Call::RemoveLabel(1, "awaiting-response".to_string()),
            Call::AddLabels(1, vec!["needs-triage".to_string()]),
        ]
    );
}

#[tokio::test]
async fn test_labels_removed_when_marking_stale() {
    let client = FakeClient::with_issues(vec![issue(
        1,
        "2020-01-01T17:00:00Z",
        &["in-progress"],
    )]);
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        labels_to_remove_when_stale: "in-progress".to_string(),
        ..stale_options()
    };

    run_with(&client, &store, options).await;

    assert_eq!(
        client.calls(),
        vec![
            Call::Comment(1, "This issue is stale".to_string()),
            Call::AddLabels(1, vec!["Stale".to_string()]),
            Call::RemoveLabel(1, "in-progress".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_processed_items_are_skipped() {
    let client = FakeClient::with_issues(vec![
        issue(1, "2020-01-01T17:00:00Z", &[]),
        issue(2, "2020-01-01T17:00:00Z", &[]),
    ]);
    let store = MemoryStateStore::new("1");

    let report = run_with(&client, &store, stale_options()).await;

    assert_eq!(numbers(&report.stale_issues), vec![2]);
}

#[tokio::test]
async fn test_budget_exhaustion_persists_progress() {
    let client = FakeClient::with_issues(vec![
        issue(1, "2020-01-01T17:00:00Z", &[]),
        issue(2, "2020-01-01T17:00:00Z", &[]),
    ]);
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        operations_per_run: 3,
        ..stale_options()
    };

    let report = run_with(&client, &store, options).await;

    assert_eq!(numbers(&report.stale_issues), vec![1]);
    assert!(!report.completed_cycle);
    assert_eq!(report.remaining_operations, 0);
    assert_eq!(store.contents(), "1");
    assert_eq!(store.saves(), 1);
}

#[tokio::test]
async fn test_completed_cycle_resets_state() {
    let client = FakeClient::with_issues(vec![issue(1, "2020-01-01T17:00:00Z", &[])]);
    let store = MemoryStateStore::new("1");

    let report = run_with(&client, &store, stale_options()).await;

    assert!(report.completed_cycle);
    assert!(report.stale_issues.is_empty());
    assert_eq!(store.contents(), "");
    assert_eq!(store.saves(), 1);
}

#[tokio::test]
async fn test_page_failure_keeps_processed_state() {
    let client = FakeClient::with_issues(vec![issue(1, "2020-01-01T17:00:00Z", &[])]);
    client.state().failing_pages.push(1);
    let store = MemoryStateStore::new("7");

    let report = run_with(&client, &store, stale_options()).await;

    assert!(!report.completed_cycle);
    assert_eq!(store.contents(), "7");
    assert_eq!(store.saves(), 1);
}

#[tokio::test]
async fn test_debug_only_reports_without_mutating() {
    let client = FakeClient::with_issues(vec![issue(1, "2020-01-01T17:00:00Z", &[])]);
    let store = MemoryStateStore::default();
    let options = StaleOptions {
        debug_only: true,
        days_before_close: 0.0,
        ..stale_options()
    };

    let report = run_with(&client, &store, options).await;

    assert_eq!(numbers(&report.stale_issues), vec![1]);
    assert_eq!(numbers(&report.closed_issues), vec![1]);
    assert!(client.calls().is_empty());
    assert_eq!(store.saves(), 0);
}

#[tokio::test]
async fn test_operations_are_counted() {
    let client = FakeClient::with_issues(vec![issue(1, "2020-01-01T17:00:00Z", &["Stale"])]);
    let store = MemoryStateStore::default();

    let report = run_with(&client, &store, stale_options()).await;

    // two pages, events, comments, close
    assert_eq!(report.statistics.operations, 5);
    assert_eq!(report.remaining_operations, 25);
    assert_eq!(report.statistics.fetched_items, 1);
}
