//! Report rendering capability and the built-in HTML renderer.
//!
//! The pipeline is markup-agnostic: it builds a [`ReportContext`] and hands
//! it to whatever [`ReportRenderer`] the caller supplies. The built-in
//! renderer emits a single self-contained HTML document; attachment
//! payloads small enough to be inlined arrive in the context as data URIs,
//! larger ones as relative paths next to the document.

use railboard_core::{Chart, ProcessedAttachment, ReportContext, Row, RunSummary};
use std::fmt::Write as _;

/// Turns a rendering context into a finished document.
pub trait ReportRenderer {
    fn render(&self, context: &ReportContext) -> anyhow::Result<String>;
}

/// Escape text for HTML element and attribute positions.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = "\
body{font-family:-apple-system,'Segoe UI',Roboto,sans-serif;margin:0;background:#f4f6f8;color:#263238}\
main{max-width:1100px;margin:0 auto;padding:24px}\
h1{font-size:1.5rem;margin:0 0 4px}\
.meta{color:#607d8b;font-size:.85rem;margin-bottom:24px}\
section{background:#fff;border-radius:8px;padding:20px;margin-bottom:24px;box-shadow:0 1px 3px rgba(38,50,56,.12)}\
.summary{display:flex;gap:32px;align-items:center;flex-wrap:wrap}\
.donut{width:140px;height:140px;border-radius:50%}\
.legend{list-style:none;padding:0;margin:0}\
.legend li{margin:4px 0;font-size:.9rem}\
.swatch{display:inline-block;width:12px;height:12px;border-radius:2px;margin-right:8px;vertical-align:-1px}\
.stat{font-size:.95rem;color:#455a64}\
table{border-collapse:collapse;width:100%;font-size:.9rem}\
th,td{text-align:left;padding:8px 10px;border-bottom:1px solid #eceff1;vertical-align:top}\
th{color:#607d8b;font-weight:600}\
.status{display:inline-block;padding:2px 8px;border-radius:10px;color:#fff;font-size:.8rem}\
.attachment img,.attachment video{max-width:220px;max-height:160px;display:block;border-radius:4px;margin:4px 0}\
.skipped{color:#90a4ae;font-style:italic;font-size:.85rem}";

pub struct HtmlRenderer;

impl HtmlRenderer {
    fn push_chart(out: &mut String, chart: &Chart) {
        let _ = write!(
            out,
            "<div class=\"donut\" style=\"background:{}\"></div><ul class=\"legend\">",
            escape_html(&chart.style)
        );
        for segment in &chart.segments {
            let _ = write!(
                out,
                "<li><span class=\"swatch\" style=\"background:{}\"></span>{} {} ({:.1}%)</li>",
                escape_html(&segment.color),
                escape_html(&segment.label),
                segment.count,
                segment.percent
            );
        }
        out.push_str("</ul>");
    }

    fn push_attachment(out: &mut String, attachment: &ProcessedAttachment) {
        out.push_str("<div class=\"attachment\">");
        if attachment.skipped {
            let _ = write!(
                out,
                "<span class=\"skipped\">{} skipped ({} bytes)</span>",
                escape_html(&attachment.name),
                attachment.size
            );
        } else if let Some(data) = attachment.inline_data.as_deref() {
            if attachment.is_video {
                let _ = write!(out, "<video controls src=\"{}\"></video>", escape_html(data));
            } else if attachment.is_image {
                let _ = write!(
                    out,
                    "<img src=\"{}\" alt=\"{}\">",
                    escape_html(data),
                    escape_html(&attachment.name)
                );
            } else if let Some(path) = attachment.path.as_deref() {
                let _ = write!(
                    out,
                    "<a href=\"{}\">{}</a>",
                    escape_html(path),
                    escape_html(&attachment.name)
                );
            }
        } else if let Some(path) = attachment.path.as_deref() {
            if attachment.is_image {
                let _ = write!(
                    out,
                    "<a href=\"{0}\"><img src=\"{0}\" alt=\"{1}\"></a>",
                    escape_html(path),
                    escape_html(&attachment.name)
                );
            } else {
                let _ = write!(
                    out,
                    "<a href=\"{}\">{}</a>",
                    escape_html(path),
                    escape_html(&attachment.name)
                );
            }
        }
        out.push_str("</div>");
    }

    fn push_row(out: &mut String, row: &Row) {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td><span class=\"status\" style=\"background:{}\">{}</span></td><td>{}</td><td>{}</td><td>{}</td><td>",
            row.test_id,
            escape_html(&row.title),
            status_background(&row.status),
            escape_html(&row.status),
            escape_html(&row.assignee),
            escape_html(&row.priority),
            escape_html(row.comment.as_deref().unwrap_or("")),
        );
        for attachment in &row.attachments {
            Self::push_attachment(out, attachment);
        }
        out.push_str("</td></tr>");
    }

    fn push_run(out: &mut String, summary: &RunSummary) {
        let _ = write!(
            out,
            "<section><h2>{} <small>(run {})</small></h2><div class=\"summary\">",
            escape_html(&summary.run_name),
            summary.run_id
        );
        Self::push_chart(out, &summary.chart);
        let _ = write!(
            out,
            "<div class=\"stat\">{} tests, pass rate {:.2}%</div></div>",
            summary.total, summary.pass_rate
        );
        out.push_str(
            "<table><thead><tr><th>ID</th><th>Title</th><th>Status</th><th>Assignee</th>\
             <th>Priority</th><th>Comment</th><th>Evidence</th></tr></thead><tbody>",
        );
        for row in &summary.rows {
            Self::push_row(out, row);
        }
        out.push_str("</tbody></table></section>");
    }
}

fn status_background(status: &str) -> &'static str {
    match status {
        "Passed" => "#2e7d32",
        "Failed" => "#c62828",
        "Blocked" => "#ef6c00",
        "Retest" => "#f9a825",
        "Untested" => "#78909c",
        _ => "#90a4ae",
    }
}

impl ReportRenderer for HtmlRenderer {
    fn render(&self, context: &ReportContext) -> anyhow::Result<String> {
        let mut out = String::with_capacity(16 * 1024);
        let _ = write!(
            out,
            "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
             <title>{title}</title><style>{STYLE}</style></head><body><main>\
             <h1>{title}</h1><p class=\"meta\">Generated {generated}</p>",
            title = escape_html(&context.title),
            generated = escape_html(&context.generated_at)
        );

        let _ = write!(
            out,
            "<section><h2>Overall</h2><div class=\"summary\">"
        );
        Self::push_chart(&mut out, &context.overall_chart);
        let _ = write!(
            out,
            "<div class=\"stat\">{} tests across {} runs, pass rate {:.2}%</div></div></section>",
            context.overall.total,
            context.runs.len(),
            context.overall.pass_rate
        );

        for summary in &context.runs {
            Self::push_run(&mut out, summary);
        }

        out.push_str("</main></body></html>");
        Ok(out)
    }
}
