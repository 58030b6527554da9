//! Exemption evaluators
//!
//! Each predicate answers "should this item be left alone this pass".
//! Empty exemption lists exempt nothing.

use crate::item::Item;
use crate::labels;
use gh_client::PullRequest;
use gh_stale_config::KindSettings;

/// Any exempt label (case and diacritic insensitive) is on the item
pub fn is_label_exempt(settings: &KindSettings, item: &Item) -> bool {
    settings
        .exempt_labels
        .iter()
        .any(|exempt| item.has_label(exempt))
}

/// The item's milestone title is exempt (exact match)
pub fn is_milestone_exempt(settings: &KindSettings, item: &Item) -> bool {
    match &item.milestone {
        Some(title) => settings.exempt_milestones.iter().any(|m| m == title),
        None => false,
    }
}

/// The item has an exempt assignee, or any assignee when all are exempt
pub fn is_assignee_exempt(settings: &KindSettings, item: &Item) -> bool {
    if item.assignees.is_empty() {
        return false;
    }
    if settings.exempt_all_assignees {
        return true;
    }
    settings.exempt_assignees.iter().any(|exempt| {
        item.assignees
            .iter()
            .any(|assignee| assignee.eq_ignore_ascii_case(exempt))
    })
}

/// With an author allow-list configured, items by anyone else are skipped
///
/// Items without an identifiable author are never skipped.
pub fn is_author_excluded(any_of_authors: &[String], item: &Item) -> bool {
    if any_of_authors.is_empty() {
        return false;
    }
    match &item.author {
        Some(author) => !any_of_authors.iter().any(|allowed| allowed == author),
        None => false,
    }
}

/// With `any_of_labels` configured, items carrying none of them are skipped
pub fn is_missing_any_of_labels(any_of_labels: &[String], item: &Item) -> bool {
    !any_of_labels.is_empty() && !any_of_labels.iter().any(|label| item.has_label(label))
}

/// Whether the draft exemption needs the full pull request detail
pub fn needs_draft_detail(exempt_draft_pr: bool, item: &Item) -> bool {
    exempt_draft_pr && item.is_pull_request()
}

/// Exempt when the fetched pull request detail reports a draft
pub fn is_draft_exempt(exempt_draft_pr: bool, item: &Item, detail: Option<&PullRequest>) -> bool {
    needs_draft_detail(exempt_draft_pr, item) && detail.is_some_and(|pr| pr.draft)
}

/// With `only_draft_pr`, pull requests not known to be drafts are skipped
pub fn is_skipped_by_only_draft(only_draft_pr: bool, item: &Item) -> bool {
    only_draft_pr && item.is_pull_request() && item.draft != Some(true)
}
