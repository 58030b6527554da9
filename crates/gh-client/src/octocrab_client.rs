//! Octocrab-based GitHub API client
//!
//! Direct implementation of the `GitHubClient` trait using the octocrab library.
//! Read endpoints go through raw routes deserialized into our own DTOs;
//! mutations use octocrab's typed handlers where they exist.

use crate::client::GitHubClient;
use crate::types::{
    CloseReason, Issue, IssueComment, IssueEvent, IssueQuery, PullRequest, RateLimit,
};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Largest page size GitHub accepts
const MAX_PER_PAGE: u8 = 100;

/// Direct GitHub API client using octocrab
#[derive(Debug, Clone)]
pub struct OctocrabClient {
    octocrab: Arc<Octocrab>,
}

impl OctocrabClient {
    /// Create a new client with the given octocrab instance
    pub fn new(octocrab: Arc<Octocrab>) -> Self {
        Self { octocrab }
    }

    /// Get a reference to the underlying octocrab instance
    pub fn octocrab(&self) -> &Octocrab {
        &self.octocrab
    }
}

/// Query string for `GET /repos/{owner}/{repo}/issues`
#[derive(Debug, Serialize)]
struct IssueListParams {
    state: &'static str,
    sort: &'static str,
    direction: &'static str,
    per_page: u8,
    page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    labels: Option<String>,
}

impl From<&IssueQuery> for IssueListParams {
    fn from(query: &IssueQuery) -> Self {
        let labels = (!query.labels.is_empty()).then(|| query.labels.join(","));
        Self {
            state: "open",
            sort: "updated",
            direction: match query.direction {
                crate::types::SortDirection::Asc => "asc",
                crate::types::SortDirection::Desc => "desc",
            },
            per_page: query.per_page.min(MAX_PER_PAGE),
            page: query.page.max(1),
            labels,
        }
    }
}

#[derive(Debug, Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    since: Option<String>,
}

/// Subset of `GET /repos/{owner}/{repo}/pulls/{number}`
#[derive(Debug, Deserialize)]
struct ApiPullRequest {
    number: u64,
    #[serde(default)]
    draft: Option<bool>,
    head: ApiPullRequestHead,
}

#[derive(Debug, Deserialize)]
struct ApiPullRequestHead {
    #[serde(rename = "ref")]
    ref_field: String,
}

/// Subset of `GET /rate_limit`
#[derive(Debug, Deserialize)]
struct ApiRateLimit {
    resources: ApiRateResources,
}

#[derive(Debug, Deserialize)]
struct ApiRateResources {
    core: ApiRate,
}

#[derive(Debug, Deserialize)]
struct ApiRate {
    limit: u64,
    used: u64,
    remaining: u64,
    reset: i64,
}

#[async_trait]
impl GitHubClient for OctocrabClient {
    async fn fetch_issues(
        &self,
        owner: &str,
        repo: &str,
        query: &IssueQuery,
    ) -> anyhow::Result<Vec<Issue>> {
        debug!("Fetching issues page {} for {}/{}", query.page, owner, repo);

        let route = format!("/repos/{}/{}/issues", owner, repo);
        let params = IssueListParams::from(query);
        let issues: Vec<Issue> = self.octocrab.get(route, Some(&params)).await?;

        debug!(
            "Fetched {} issues on page {} for {}/{}",
            issues.len(),
            query.page,
            owner,
            repo
        );
        Ok(issues)
    }

    async fn fetch_authenticated_login(&self) -> anyhow::Result<String> {
        let user = self.octocrab.current().user().await?;
        Ok(user.login)
    }

    async fn fetch_comments(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<IssueComment>> {
        debug!(
            "Fetching comments for {}/{}#{} since {}",
            owner, repo, issue_number, since
        );

        let route = format!("/repos/{}/{}/issues/{}/comments", owner, repo, issue_number);
        let params = PageParams {
            per_page: MAX_PER_PAGE,
            page: 1,
            since: Some(since.to_rfc3339_opts(SecondsFormat::Secs, true)),
        };
        let comments: Vec<IssueComment> = self.octocrab.get(route, Some(&params)).await?;
        Ok(comments)
    }

    async fn fetch_issue_events(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
    ) -> anyhow::Result<Vec<IssueEvent>> {
        debug!("Fetching events for {}/{}#{}", owner, repo, issue_number);

        let route = format!("/repos/{}/{}/issues/{}/events", owner, repo, issue_number);
        let mut events = Vec::new();
        let mut page = 1u32;

        loop {
            let params = PageParams {
                per_page: MAX_PER_PAGE,
                page,
                since: None,
            };
            let batch: Vec<IssueEvent> = self.octocrab.get(&route, Some(&params)).await?;
            let is_last = batch.len() < usize::from(MAX_PER_PAGE);
            events.extend(batch);

            if is_last {
                break;
            }
            page += 1;
        }

        Ok(events)
    }

    async fn fetch_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<PullRequest> {
        debug!("Fetching PR #{} for {}/{}", pr_number, owner, repo);

        let route = format!("/repos/{}/{}/pulls/{}", owner, repo, pr_number);
        let pr: ApiPullRequest = self.octocrab.get(route, None::<&()>).await?;
        Ok(convert_pull_request(pr))
    }

    async fn fetch_rate_limit(&self) -> anyhow::Result<RateLimit> {
        let rate: ApiRateLimit = self.octocrab.get("/rate_limit", None::<&()>).await?;
        Ok(convert_rate_limit(rate))
    }

    async fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> anyhow::Result<()> {
        debug!("Commenting on {}/{}#{}", owner, repo, issue_number);
        self.octocrab
            .issues(owner, repo)
            .create_comment(issue_number, body)
            .await?;
        Ok(())
    }

    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        labels: &[String],
    ) -> anyhow::Result<()> {
        debug!(
            "Adding labels {:?} to {}/{}#{}",
            labels, owner, repo, issue_number
        );
        self.octocrab
            .issues(owner, repo)
            .add_labels(issue_number, labels)
            .await?;
        Ok(())
    }

    async fn remove_label(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        label: &str,
    ) -> anyhow::Result<()> {
        debug!(
            "Removing label '{}' from {}/{}#{}",
            label, owner, repo, issue_number
        );
        self.octocrab
            .issues(owner, repo)
            .remove_label(issue_number, label)
            .await?;
        Ok(())
    }

    async fn close_issue(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        reason: Option<CloseReason>,
    ) -> anyhow::Result<()> {
        debug!("Closing {}/{}#{}", owner, repo, issue_number);

        let route = format!("/repos/{}/{}/issues/{}", owner, repo, issue_number);
        let body = match reason {
            Some(reason) => serde_json::json!({ "state": "closed", "state_reason": reason.as_str() }),
            None => serde_json::json!({ "state": "closed" }),
        };
        let _: serde_json::Value = self.octocrab.patch(route, Some(&body)).await?;
        Ok(())
    }

    async fn delete_branch(&self, owner: &str, repo: &str, branch: &str) -> anyhow::Result<()> {
        debug!("Deleting branch {} in {}/{}", branch, owner, repo);
        self.octocrab
            .repos(owner, repo)
            .delete_ref(&octocrab::params::repos::Reference::Branch(
                branch.to_string(),
            ))
            .await?;
        Ok(())
    }
}

/// Convert the pulls endpoint payload to our PullRequest type
fn convert_pull_request(pr: ApiPullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        head_branch: pr.head.ref_field,
        draft: pr.draft.unwrap_or(false),
    }
}

/// Convert the rate limit endpoint payload to our RateLimit type
fn convert_rate_limit(rate: ApiRateLimit) -> RateLimit {
    let core = rate.resources.core;
    RateLimit::from_raw(core.limit, core.used, core.remaining, core.reset)
}
