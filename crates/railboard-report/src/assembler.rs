//! Cross-run aggregation and rendering-context construction.

use chrono::{DateTime, Utc};
use railboard_core::{chart, pass_rate, ReportContext, RunSummary, SummaryTotals};
use std::collections::BTreeMap;

/// Deterministic filename slug: lowercase, alphanumeric runs joined by
/// single dashes.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "report".to_string()
    } else {
        slug
    }
}

/// Merge per-run summaries into the final rendering context.
///
/// The title derives from the plan name when there is one; the output
/// filename derives from the plan or project name plus the generation date.
pub fn build_context(
    plan_name: Option<&str>,
    project_name: &str,
    summaries: Vec<RunSummary>,
    generated_at: DateTime<Utc>,
) -> ReportContext {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut passed = 0u64;
    let mut total = 0u64;
    for summary in &summaries {
        for (label, count) in &summary.counts {
            *counts.entry(label.clone()).or_default() += count;
        }
        passed += summary.passed;
        total += summary.total;
    }

    let overall_chart = chart::chart_for(&counts);
    let overall = SummaryTotals {
        counts,
        passed,
        total,
        pass_rate: pass_rate(passed, total),
    };

    let title = match plan_name {
        Some(name) => format!("{name} Test Report"),
        None => "Test Report".to_string(),
    };
    let name_seed = plan_name.unwrap_or(project_name);
    let file_name = format!("{}-{}", slugify(name_seed), generated_at.format("%Y-%m-%d"));

    ReportContext {
        title,
        generated_at: generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        overall,
        overall_chart,
        runs: summaries,
        file_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use railboard_core::Chart;

    fn summary(run_id: u64, passed: u64, failed: u64) -> RunSummary {
        let mut counts = BTreeMap::new();
        if passed > 0 {
            counts.insert("Passed".to_string(), passed);
        }
        if failed > 0 {
            counts.insert("Failed".to_string(), failed);
        }
        let total = passed + failed;
        RunSummary {
            run_id,
            run_name: format!("Run {run_id}"),
            rows: Vec::new(),
            counts,
            passed,
            total,
            pass_rate: pass_rate(passed, total),
            chart: Chart {
                style: String::new(),
                segments: Vec::new(),
            },
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 12, 30, 0).unwrap()
    }

    #[test]
    fn overall_counts_are_running_sums() {
        let context = build_context(
            Some("Release 2.4"),
            "Widgets",
            vec![summary(1, 3, 1), summary(2, 2, 2)],
            at(),
        );
        assert_eq!(context.overall.total, 8);
        assert_eq!(context.overall.passed, 5);
        assert_eq!(context.overall.counts["Passed"], 5);
        assert_eq!(context.overall.counts["Failed"], 3);
        assert_eq!(context.overall.pass_rate, 62.5);
        assert_eq!(context.runs.len(), 2);
    }

    #[test]
    fn title_and_filename_derive_from_plan_name() {
        let context = build_context(Some("Release 2.4 (RC)"), "Widgets", Vec::new(), at());
        assert_eq!(context.title, "Release 2.4 (RC) Test Report");
        assert_eq!(context.file_name, "release-2-4-rc-2024-03-09");
    }

    #[test]
    fn project_name_seeds_filename_without_a_plan() {
        let context = build_context(None, "Widgets QA", Vec::new(), at());
        assert_eq!(context.title, "Test Report");
        assert_eq!(context.file_name, "widgets-qa-2024-03-09");
        assert_eq!(context.overall.total, 0);
        assert_eq!(context.overall.pass_rate, 0.0);
        // Empty aggregate still renders a neutral full circle.
        assert_eq!(context.overall_chart.segments.len(), 1);
    }

    #[test]
    fn slugify_collapses_and_trims() {
        assert_eq!(slugify("  Sprint 42 -- Final  "), "sprint-42-final");
        assert_eq!(slugify("___"), "report");
        assert_eq!(slugify("Ünïcode Näme"), "n-code-n-me");
    }
}
