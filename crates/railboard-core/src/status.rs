//! Status and priority semantics.
//!
//! Label maps normally come from the API's status/priority endpoints; the
//! defaults here cover the built-in ids so a report can still be produced
//! when those endpoints fail or are forbidden.

use std::collections::HashMap;

/// Built-in id of the "Passed" status.
pub const PASSED_STATUS_ID: i64 = 1;
/// Built-in id of the "Untested" status, used when a test has no result.
pub const UNTESTED_STATUS_ID: i64 = 3;

/// The built-in status label set.
pub fn default_status_labels() -> HashMap<i64, String> {
    [
        (1, "Passed"),
        (2, "Blocked"),
        (3, "Untested"),
        (4, "Retest"),
        (5, "Failed"),
    ]
    .into_iter()
    .map(|(id, label)| (id, label.to_string()))
    .collect()
}

/// The built-in priority label set.
pub fn default_priority_labels() -> HashMap<u64, String> {
    [(1, "Low"), (2, "Medium"), (3, "High"), (4, "Critical")]
        .into_iter()
        .map(|(id, label)| (id, label.to_string()))
        .collect()
}

/// Resolve a status id to its label, rendering unmapped ids as their own
/// string form.
pub fn status_label(labels: &HashMap<i64, String>, status_id: i64) -> String {
    labels
        .get(&status_id)
        .cloned()
        .unwrap_or_else(|| status_id.to_string())
}

/// Fixed ordering rank so actionable rows surface first: Failed, Blocked,
/// Retest, Untested, Passed. Unknown custom statuses sort last.
pub fn status_rank(status_id: i64) -> u8 {
    match status_id {
        5 => 0, // Failed
        2 => 1, // Blocked
        4 => 2, // Retest
        3 => 3, // Untested
        1 => 4, // Passed
        _ => 5,
    }
}

/// Pass rate as a percentage rounded to two decimals; 0 when there is
/// nothing to count.
pub fn pass_rate(passed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = passed as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}
