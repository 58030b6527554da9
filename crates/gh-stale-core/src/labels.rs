//! Label comparison
//!
//! Labels compare case-insensitively and ignore diacritics, so "déjà vu",
//! "deja vu" and "DEJA VU" are the same label.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercase and strip combining marks
pub fn clean_label(label: &str) -> String {
    label
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

pub fn labels_match(label: &str, other: &str) -> bool {
    clean_label(label) == clean_label(other)
}

/// Whether `label` is among `labels`
pub fn has_label<S: AsRef<str>>(labels: &[S], label: &str) -> bool {
    let wanted = clean_label(label);
    labels.iter().any(|l| clean_label(l.as_ref()) == wanted)
}
