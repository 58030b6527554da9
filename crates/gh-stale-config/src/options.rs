//! Stale bot options
//!
//! Loaded from a TOML file; every field has a default so a partial file
//! (or no file at all) yields a usable configuration.

use crate::kind::{ItemKind, KindSettings};
use anyhow::{bail, Context, Result};
use gh_client::{CloseReason, SortDirection};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Resolved stale bot options for one run
///
/// Kind-specific overrides (`*_issue_*` / `*_pr_*`) are `None` when unset
/// and fall back to the generic option.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StaleOptions {
    /// Comment posted when marking an issue stale (empty disables marking issues)
    #[serde(default)]
    pub stale_issue_message: String,

    /// Comment posted when marking a pull request stale (empty disables marking PRs)
    #[serde(default)]
    pub stale_pr_message: String,

    /// Comment posted when closing an issue
    #[serde(default)]
    pub close_issue_message: String,

    /// Comment posted when closing a pull request
    #[serde(default)]
    pub close_pr_message: String,

    /// Days of inactivity before marking stale (negative disables)
    #[serde(default = "default_days_before_stale")]
    pub days_before_stale: f64,
    #[serde(default)]
    pub days_before_issue_stale: Option<f64>,
    #[serde(default)]
    pub days_before_pr_stale: Option<f64>,

    /// Days after being marked stale before closing (negative disables)
    #[serde(default = "default_days_before_close")]
    pub days_before_close: f64,
    #[serde(default)]
    pub days_before_issue_close: Option<f64>,
    #[serde(default)]
    pub days_before_pr_close: Option<f64>,

    #[serde(default = "default_stale_label")]
    pub stale_issue_label: String,
    #[serde(default)]
    pub close_issue_label: String,
    /// Comma-separated labels exempting issues
    #[serde(default)]
    pub exempt_issue_labels: String,

    #[serde(default = "default_stale_label")]
    pub stale_pr_label: String,
    #[serde(default)]
    pub close_pr_label: String,
    /// Comma-separated labels exempting pull requests
    #[serde(default)]
    pub exempt_pr_labels: String,

    /// Only fetch items carrying all of these labels
    #[serde(default)]
    pub only_labels: String,

    /// Only process items carrying at least one of these labels
    #[serde(default)]
    pub any_of_labels: String,

    /// Budget of API operations for one run
    #[serde(default = "default_operations_per_run")]
    pub operations_per_run: i64,

    #[serde(default = "default_true")]
    pub remove_stale_when_updated: bool,
    #[serde(default)]
    pub remove_issue_stale_when_updated: Option<bool>,
    #[serde(default)]
    pub remove_pr_stale_when_updated: Option<bool>,

    /// Dry-run: evaluate everything, mutate nothing
    #[serde(default)]
    pub debug_only: bool,

    /// Fetch least recently updated items first
    #[serde(default)]
    pub ascending: bool,

    #[serde(default)]
    pub skip_stale_issue_message: bool,
    #[serde(default)]
    pub skip_stale_pr_message: bool,

    /// Delete the head branch of closed pull requests
    #[serde(default)]
    pub delete_branch: bool,

    /// Ignore items created before this date (empty = no floor)
    #[serde(default)]
    pub start_date: String,

    #[serde(default)]
    pub exempt_milestones: String,
    #[serde(default)]
    pub exempt_issue_milestones: Option<String>,
    #[serde(default)]
    pub exempt_pr_milestones: Option<String>,

    #[serde(default)]
    pub exempt_assignees: String,
    #[serde(default)]
    pub exempt_issue_assignees: Option<String>,
    #[serde(default)]
    pub exempt_pr_assignees: Option<String>,

    #[serde(default)]
    pub exempt_all_assignees: bool,
    #[serde(default)]
    pub exempt_all_issue_assignees: Option<bool>,
    #[serde(default)]
    pub exempt_all_pr_assignees: Option<bool>,

    /// Skip draft pull requests
    #[serde(default)]
    pub exempt_draft_pr: bool,

    /// Process only draft pull requests
    #[serde(default)]
    pub only_draft_pr: bool,

    /// When set, only items opened by these authors are processed
    #[serde(default)]
    pub any_of_authors: String,

    #[serde(default)]
    pub labels_to_add_when_unstale: String,
    #[serde(default)]
    pub labels_to_remove_when_stale: String,
    #[serde(default)]
    pub labels_to_remove_when_unstale: String,

    /// "completed", "not_planned" or empty
    #[serde(default = "default_close_issue_reason")]
    pub close_issue_reason: String,

    #[serde(default = "default_true")]
    pub enable_statistics: bool,
}

fn default_days_before_stale() -> f64 {
    60.0
}

fn default_days_before_close() -> f64 {
    7.0
}

fn default_stale_label() -> String {
    "Stale".to_string()
}

fn default_operations_per_run() -> i64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_close_issue_reason() -> String {
    "not_planned".to_string()
}

impl Default for StaleOptions {
    fn default() -> Self {
        Self {
            stale_issue_message: String::new(),
            stale_pr_message: String::new(),
            close_issue_message: String::new(),
            close_pr_message: String::new(),
            days_before_stale: default_days_before_stale(),
            days_before_issue_stale: None,
            days_before_pr_stale: None,
            days_before_close: default_days_before_close(),
            days_before_issue_close: None,
            days_before_pr_close: None,
            stale_issue_label: default_stale_label(),
            close_issue_label: String::new(),
            exempt_issue_labels: String::new(),
            stale_pr_label: default_stale_label(),
            close_pr_label: String::new(),
            exempt_pr_labels: String::new(),
            only_labels: String::new(),
            any_of_labels: String::new(),
            operations_per_run: default_operations_per_run(),
            remove_stale_when_updated: true,
            remove_issue_stale_when_updated: None,
            remove_pr_stale_when_updated: None,
            debug_only: false,
            ascending: false,
            skip_stale_issue_message: false,
            skip_stale_pr_message: false,
            delete_branch: false,
            start_date: String::new(),
            exempt_milestones: String::new(),
            exempt_issue_milestones: None,
            exempt_pr_milestones: None,
            exempt_assignees: String::new(),
            exempt_issue_assignees: None,
            exempt_pr_assignees: None,
            exempt_all_assignees: false,
            exempt_all_issue_assignees: None,
            exempt_all_pr_assignees: None,
            exempt_draft_pr: false,
            only_draft_pr: false,
            any_of_authors: String::new(),
            labels_to_add_when_unstale: String::new(),
            labels_to_remove_when_stale: String::new(),
            labels_to_remove_when_unstale: String::new(),
            close_issue_reason: default_close_issue_reason(),
            enable_statistics: true,
        }
    }
}

/// Split a comma-separated option into trimmed, non-empty entries
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

impl StaleOptions {
    /// Load options from an explicit file, or discover one (CWD, then home)
    ///
    /// An explicit path that cannot be read or parsed is an error; a
    /// discovered file that fails to parse is logged and defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let options = Self::from_toml(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            log::info!("Loaded stale options from {:?}", path);
            return Ok(options);
        }

        if let Some((path, content)) = crate::load_config_file() {
            match Self::from_toml(&content) {
                Ok(options) => {
                    log::info!("Loaded stale options from {:?}", path);
                    return Ok(options);
                }
                Err(e) => {
                    log::warn!("Failed to parse config file {:?}: {:#}", path, e);
                }
            }
        }

        log::debug!("Using default stale options");
        Ok(Self::default())
    }

    /// Parse and validate options from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let options: Self = toml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Reject values no run could make sense of
    pub fn validate(&self) -> Result<()> {
        if self.days_thresholds().any(f64::is_nan) {
            bail!("day thresholds must be numbers");
        }
        if !matches!(
            self.close_issue_reason.as_str(),
            "" | "completed" | "not_planned"
        ) {
            bail!(
                "close_issue_reason must be \"completed\", \"not_planned\" or empty, got {:?}",
                self.close_issue_reason
            );
        }
        Ok(())
    }

    fn days_thresholds(&self) -> impl Iterator<Item = f64> + '_ {
        [self.days_before_stale, self.days_before_close]
            .into_iter()
            .chain(self.days_before_issue_stale)
            .chain(self.days_before_pr_stale)
            .chain(self.days_before_issue_close)
            .chain(self.days_before_pr_close)
    }

    /// Resolve every kind-specific option for one item kind
    pub fn kind_settings(&self, kind: ItemKind) -> KindSettings {
        match kind {
            ItemKind::Issue => KindSettings {
                kind,
                stale_message: self.stale_issue_message.clone(),
                close_message: self.close_issue_message.clone(),
                stale_label: self.stale_issue_label.clone(),
                close_label: non_empty(&self.close_issue_label),
                days_before_stale: self.days_before_issue_stale.unwrap_or(self.days_before_stale),
                days_before_close: self.days_before_issue_close.unwrap_or(self.days_before_close),
                exempt_labels: parse_list(&self.exempt_issue_labels),
                exempt_milestones: parse_list(
                    self.exempt_issue_milestones
                        .as_deref()
                        .unwrap_or(&self.exempt_milestones),
                ),
                exempt_assignees: parse_list(
                    self.exempt_issue_assignees
                        .as_deref()
                        .unwrap_or(&self.exempt_assignees),
                ),
                exempt_all_assignees: self
                    .exempt_all_issue_assignees
                    .unwrap_or(self.exempt_all_assignees),
                skip_stale_message: self.skip_stale_issue_message,
                remove_stale_when_updated: self
                    .remove_issue_stale_when_updated
                    .unwrap_or(self.remove_stale_when_updated),
                close_reason: self.close_reason(),
            },
            ItemKind::PullRequest => KindSettings {
                kind,
                stale_message: self.stale_pr_message.clone(),
                close_message: self.close_pr_message.clone(),
                stale_label: self.stale_pr_label.clone(),
                close_label: non_empty(&self.close_pr_label),
                days_before_stale: self.days_before_pr_stale.unwrap_or(self.days_before_stale),
                days_before_close: self.days_before_pr_close.unwrap_or(self.days_before_close),
                exempt_labels: parse_list(&self.exempt_pr_labels),
                exempt_milestones: parse_list(
                    self.exempt_pr_milestones
                        .as_deref()
                        .unwrap_or(&self.exempt_milestones),
                ),
                exempt_assignees: parse_list(
                    self.exempt_pr_assignees
                        .as_deref()
                        .unwrap_or(&self.exempt_assignees),
                ),
                exempt_all_assignees: self
                    .exempt_all_pr_assignees
                    .unwrap_or(self.exempt_all_assignees),
                skip_stale_message: self.skip_stale_pr_message,
                remove_stale_when_updated: self
                    .remove_pr_stale_when_updated
                    .unwrap_or(self.remove_stale_when_updated),
                close_reason: None,
            },
        }
    }

    /// Reason sent when closing issues
    pub fn close_reason(&self) -> Option<CloseReason> {
        match self.close_issue_reason.as_str() {
            "completed" => Some(CloseReason::Completed),
            "not_planned" => Some(CloseReason::NotPlanned),
            _ => None,
        }
    }

    pub fn sort_direction(&self) -> SortDirection {
        if self.ascending {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    pub fn only_labels(&self) -> Vec<String> {
        parse_list(&self.only_labels)
    }

    pub fn any_of_labels(&self) -> Vec<String> {
        parse_list(&self.any_of_labels)
    }

    pub fn any_of_authors(&self) -> Vec<String> {
        parse_list(&self.any_of_authors)
    }

    pub fn labels_to_add_when_unstale(&self) -> Vec<String> {
        parse_list(&self.labels_to_add_when_unstale)
    }

    pub fn labels_to_remove_when_stale(&self) -> Vec<String> {
        parse_list(&self.labels_to_remove_when_stale)
    }

    pub fn labels_to_remove_when_unstale(&self) -> Vec<String> {
        parse_list(&self.labels_to_remove_when_unstale)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = StaleOptions::default();
        assert_eq!(options.days_before_stale, 60.0);
        assert_eq!(options.days_before_close, 7.0);
        assert_eq!(options.stale_issue_label, "Stale");
        assert_eq!(options.operations_per_run, 30);
        assert!(options.remove_stale_when_updated);
        assert!(options.stale_issue_message.is_empty());
        assert_eq!(options.close_reason(), Some(CloseReason::NotPlanned));
    }

    #[test]
    fn test_options_deserialize_partial() {
        let toml = r#"
            stale_issue_message = "This issue is stale"
            days_before_stale = 30
            days_before_pr_close = -1
            exempt_issue_labels = "pinned, security"
        "#;
        let options = StaleOptions::from_toml(toml).unwrap();
        assert_eq!(options.stale_issue_message, "This issue is stale");
        assert_eq!(options.days_before_stale, 30.0);
        assert_eq!(options.days_before_pr_close, Some(-1.0));
        // Untouched fields keep their defaults
        assert_eq!(options.stale_pr_label, "Stale");
        assert_eq!(options.operations_per_run, 30);
    }

    #[test]
    fn test_toml_matches_default() {
        let options = StaleOptions::from_toml("").unwrap();
        assert_eq!(options, StaleOptions::default());
    }

    #[test]
    fn test_invalid_close_reason_rejected() {
        let result = StaleOptions::from_toml(r#"close_issue_reason = "wontfix""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_list_trims_and_skips_empty() {
        assert_eq!(parse_list("Exempt, Cool"), parse_list("Exempt,Cool"));
        assert_eq!(parse_list(" a ,, b ,"), vec!["a", "b"]);
        assert!(parse_list("").is_empty());
        assert!(parse_list(" , ").is_empty());
    }

    #[test]
    fn test_kind_thresholds_fall_back_to_generic() {
        let options = StaleOptions {
            days_before_stale: 10.0,
            days_before_pr_stale: Some(2.0),
            days_before_close: 5.0,
            days_before_issue_close: Some(-1.0),
            ..Default::default()
        };

        let issue = options.kind_settings(ItemKind::Issue);
        assert_eq!(issue.days_before_stale, 10.0);
        assert_eq!(issue.days_before_close, -1.0);
        assert!(!issue.should_close_when_stale());

        let pr = options.kind_settings(ItemKind::PullRequest);
        assert_eq!(pr.days_before_stale, 2.0);
        assert_eq!(pr.days_before_close, 5.0);
        assert!(pr.should_mark_when_stale());
    }

    #[test]
    fn test_kind_milestone_override_replaces_generic() {
        let options = StaleOptions {
            exempt_milestones: "Milestone1, Milestone2".to_string(),
            exempt_issue_milestones: Some(String::new()),
            exempt_pr_milestones: Some("Milestone3".to_string()),
            ..Default::default()
        };

        assert!(options
            .kind_settings(ItemKind::Issue)
            .exempt_milestones
            .is_empty());
        assert_eq!(
            options.kind_settings(ItemKind::PullRequest).exempt_milestones,
            vec!["Milestone3"]
        );

        let generic_only = StaleOptions {
            exempt_milestones: "Milestone1".to_string(),
            ..Default::default()
        };
        assert_eq!(
            generic_only.kind_settings(ItemKind::Issue).exempt_milestones,
            vec!["Milestone1"]
        );
    }

    #[test]
    fn test_pull_requests_have_no_close_reason() {
        let options = StaleOptions::default();
        assert_eq!(
            options.kind_settings(ItemKind::Issue).close_reason,
            Some(CloseReason::NotPlanned)
        );
        assert_eq!(options.kind_settings(ItemKind::PullRequest).close_reason, None);
    }

    #[test]
    fn test_remove_stale_override() {
        let options = StaleOptions {
            remove_stale_when_updated: false,
            remove_pr_stale_when_updated: Some(true),
            ..Default::default()
        };
        assert!(!options.kind_settings(ItemKind::Issue).remove_stale_when_updated);
        assert!(options.kind_settings(ItemKind::PullRequest).remove_stale_when_updated);
    }

    #[test]
    fn test_empty_close_label_is_none() {
        let options = StaleOptions {
            close_pr_label: "closed-by-bot".to_string(),
            ..Default::default()
        };
        assert_eq!(options.kind_settings(ItemKind::Issue).close_label, None);
        assert_eq!(
            options.kind_settings(ItemKind::PullRequest).close_label.as_deref(),
            Some("closed-by-bot")
        );
    }
}
