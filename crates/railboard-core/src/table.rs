//! Result deduplication, the test/result join, and row ordering.
//!
//! The join is an explicit typed one: results are reduced to an index map
//! from test id to latest result, then tests are iterated once, each looking
//! up its match. Every test appears in exactly one row, even with no result.

use crate::chart;
use crate::model::{Chart, Row, Run, RunSummary, Test, TestResult};
use crate::status::{self, PASSED_STATUS_ID, UNTESTED_STATUS_ID};
use std::collections::{BTreeMap, HashMap};

/// Reduce a result list to one entry per test id, keeping the result with
/// the greatest `created_on` (ties broken by greatest `id`).
pub fn latest_results(mut results: Vec<TestResult>) -> HashMap<u64, TestResult> {
    results.sort_by(|a, b| {
        (a.test_id, a.created_on, a.id).cmp(&(b.test_id, b.created_on, b.id))
    });
    let mut latest = HashMap::new();
    for result in results {
        // Ascending sort, so the last write per test id wins.
        latest.insert(result.test_id, result);
    }
    latest
}

/// Merge tests with their latest results into ordered rows.
///
/// Status, assignee and priority ids are resolved through the supplied
/// lookup maps, falling back to the literal id string when unmapped. Rows
/// are ordered by the fixed status priority (failing and actionable items
/// first), with ascending test id as the stable tie-break.
pub fn build_rows(
    tests: &[Test],
    latest: &HashMap<u64, TestResult>,
    status_labels: &HashMap<i64, String>,
    priority_labels: &HashMap<u64, String>,
    assignee_names: &HashMap<u64, String>,
) -> Vec<Row> {
    let mut rows = Vec::with_capacity(tests.len());
    for test in tests {
        let result = latest.get(&test.id);
        let status_id = test
            .status_id
            .or_else(|| result.and_then(|r| r.status_id))
            .unwrap_or(UNTESTED_STATUS_ID);
        let assignee = result
            .and_then(|r| r.assignedto_id)
            .or(test.assignedto_id)
            .map(|id| {
                assignee_names
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| id.to_string())
            })
            .unwrap_or_default();
        let priority = test
            .priority_id
            .map(|id| {
                priority_labels
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| id.to_string())
            })
            .unwrap_or_default();

        rows.push(Row {
            test_id: test.id,
            title: test.title.clone(),
            status_id,
            status: status::status_label(status_labels, status_id),
            assignee,
            priority,
            comment: result.and_then(|r| r.comment.clone()),
            refs: test.refs.clone(),
            attachments: Vec::new(),
        });
    }

    rows.sort_by(|a, b| {
        status::status_rank(a.status_id)
            .cmp(&status::status_rank(b.status_id))
            .then(a.test_id.cmp(&b.test_id))
    });
    rows
}

/// Build the immutable per-run summary from its ordered rows.
pub fn summarize_run(run: &Run, rows: Vec<Row>) -> RunSummary {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut passed = 0u64;
    for row in &rows {
        *counts.entry(row.status.clone()).or_default() += 1;
        if row.status_id == PASSED_STATUS_ID {
            passed += 1;
        }
    }
    let total = rows.len() as u64;
    let pass_rate = status::pass_rate(passed, total);
    let segments = chart::segments(&counts);
    let chart = Chart {
        style: chart::conic_style(&segments),
        segments,
    };

    RunSummary {
        run_id: run.id,
        run_name: run.name.clone(),
        rows,
        counts,
        passed,
        total,
        pass_rate,
        chart,
    }
}
