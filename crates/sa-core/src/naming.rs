//! Result file naming.

use regex::Regex;
use std::sync::LazyLock;

use crate::constants::MAX_NAME_PART_LEN;
use crate::time::millis_to_iso8601;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[,/\\()?%#:*"|<>]"#).unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static TIMESTAMP_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[:.]").unwrap());

/// Make free text (participant initials) safe to embed in a file name.
///
/// Input that is blank after trimming maps to `unknown`, so a result file never
/// starts with a bare `_<timestamp>` prefix.
pub fn sanitize_file_name_part(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return "unknown".to_string();
    }
    let replaced = UNSAFE_CHARS.replace_all(trimmed, "_");
    let collapsed = WHITESPACE.replace_all(&replaced, "_");
    collapsed.chars().take(MAX_NAME_PART_LEN).collect()
}

/// ISO-8601 timestamp with `:` and `.` turned into `-`.
pub fn file_timestamp(unix_millis: u64) -> String {
    TIMESTAMP_SEPARATORS
        .replace_all(&millis_to_iso8601(unix_millis), "-")
        .into_owned()
}

/// `<initials>_<timestamp>.csv`
pub fn result_filename(initials: &str, unix_millis: u64) -> String {
    format!(
        "{}_{}.csv",
        sanitize_file_name_part(initials),
        file_timestamp(unix_millis)
    )
}

/// Name used when an upload arrives without one.
pub fn default_result_name(unix_millis: u64) -> String {
    format!("experiment_result_{}.csv", millis_to_iso8601(unix_millis))
}
