//! Chart-segment math for the status-distribution radial chart.
//!
//! Segments carry running start/end percentage boundaries so a renderer can
//! turn them into a conic gradient (or any other proportional ring) without
//! re-deriving the layout.

use crate::model::{Chart, ChartSegment};
use std::collections::BTreeMap;

/// Neutral color for unrecognized labels and the empty chart.
pub const NEUTRAL_COLOR: &str = "#90a4ae";

fn color_for(label: &str) -> &'static str {
    match label {
        "Passed" => "#2e7d32",
        "Failed" => "#c62828",
        "Blocked" => "#ef6c00",
        "Retest" => "#f9a825",
        "Untested" => "#78909c",
        _ => NEUTRAL_COLOR,
    }
}

/// Produce proportional segments for a status-count mapping.
///
/// Segments are sorted by descending count, then label, for determinism.
/// A zero total yields a single neutral full-circle segment.
pub fn segments(counts: &BTreeMap<String, u64>) -> Vec<ChartSegment> {
    let total: u64 = counts.values().sum();
    if total == 0 {
        return vec![ChartSegment {
            label: "No results".to_string(),
            count: 0,
            percent: 100.0,
            start: 0.0,
            end: 100.0,
            color: NEUTRAL_COLOR.to_string(),
        }];
    }

    let mut entries: Vec<(&String, u64)> = counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(label, count)| (label, *count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let mut out = Vec::with_capacity(entries.len());
    let mut start = 0.0f64;
    for (label, count) in entries {
        let percent = count as f64 / total as f64 * 100.0;
        let end = start + percent;
        out.push(ChartSegment {
            label: label.clone(),
            count,
            percent,
            start,
            end,
            color: color_for(label).to_string(),
        });
        start = end;
    }
    out
}

/// CSS conic-gradient descriptor for a segment list.
pub fn conic_style(segments: &[ChartSegment]) -> String {
    let stops: Vec<String> = segments
        .iter()
        .map(|s| format!("{} {:.2}% {:.2}%", s.color, s.start, s.end))
        .collect();
    format!("conic-gradient({})", stops.join(", "))
}

/// Convenience wrapper producing the full chart payload for a count map.
pub fn chart_for(counts: &BTreeMap<String, u64>) -> Chart {
    let segments = segments(counts);
    Chart {
        style: conic_style(&segments),
        segments,
    }
}
