//! Standalone HTML report.

use std::fmt::Write;

use super::format_ms;
use crate::driver::{MetricValue, Summary};

const STYLE: &str = "body{font-family:sans-serif;margin:2em;color:#222}\
table{border-collapse:collapse;margin-bottom:2em;min-width:40em}\
th,td{border:1px solid #ccc;padding:.4em .8em;text-align:left}\
th{background:#f4f4f4}.pass{color:#1a7f37}.fail{color:#cf222e;font-weight:bold}";

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

fn status(passed: bool) -> &'static str {
    if passed {
        "<td class=\"pass\">pass</td>"
    } else {
        "<td class=\"fail\">fail</td>"
    }
}

/// Renders a summary as a self-contained HTML page.
#[must_use]
pub fn render_html(summary: &Summary) -> String {
    let mut out = String::new();
    let title = format!("{} report", escape(&summary.scenario));

    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<h1>{title}</h1>\n"
    );
    let verdict = if summary.passed() {
        "<p class=\"pass\">All checks and thresholds passed.</p>"
    } else {
        "<p class=\"fail\">Some checks or thresholds failed.</p>"
    };
    let _ = writeln!(out, "{verdict}");
    let _ = writeln!(
        out,
        "<p>Run <code>{}</code> started {} and took {}.</p>",
        summary.run_id,
        summary.started_at.to_rfc3339(),
        format_ms(summary.duration().as_secs_f64() * 1000.0)
    );
    if let Some(reason) = &summary.interrupted {
        let _ = writeln!(out, "<p class=\"fail\">Interrupted: {}</p>", escape(reason));
    }

    out.push_str("<h2>Thresholds</h2>\n<table>\n<tr><th>Metric</th><th>Threshold</th><th>Observed</th><th>Result</th></tr>\n");
    for t in &summary.thresholds {
        let observed = t.observed.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"));
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{observed}</td>{}</tr>",
            escape(&t.metric),
            escape(&t.expression),
            status(t.passed)
        );
    }
    out.push_str("</table>\n");

    out.push_str("<h2>Checks</h2>\n<table>\n<tr><th>Check</th><th>Passes</th><th>Fails</th><th>Result</th></tr>\n");
    for check in &summary.metrics.checks {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td>{}</tr>",
            escape(&check.name),
            check.passes,
            check.fails,
            status(check.all_passed())
        );
    }
    out.push_str("</table>\n");

    out.push_str("<h2>Trends</h2>\n<table>\n<tr><th>Metric</th><th>Count</th><th>Avg</th><th>Min</th><th>Med</th><th>Max</th><th>p(90)</th><th>p(95)</th><th>p(99)</th></tr>\n");
    for (name, value) in &summary.metrics.metrics {
        if let MetricValue::Trend(t) = value {
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(name),
                t.count,
                format_ms(t.avg),
                format_ms(t.min),
                format_ms(t.med),
                format_ms(t.max),
                format_ms(t.p90),
                format_ms(t.p95),
                format_ms(t.p99)
            );
        }
    }
    out.push_str("</table>\n");

    out.push_str("<h2>Rates and counters</h2>\n<table>\n<tr><th>Metric</th><th>Value</th></tr>\n");
    for (name, value) in &summary.metrics.metrics {
        let rendered = match value {
            MetricValue::Rate(r) => format!("{:.2}% ({} / {})", r.rate * 100.0, r.hits, r.total),
            MetricValue::Counter(c) => c.count.to_string(),
            MetricValue::Trend(_) => continue,
        };
        let _ = writeln!(out, "<tr><td>{}</td><td>{rendered}</td></tr>", escape(name));
    }
    out.push_str("</table>\n</body>\n</html>\n");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_summary;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_render_html_tables() {
        let html = render_html(&sample_summary());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>load report</title>"));
        assert!(html.contains("Some checks or thresholds failed."));
        assert!(html.contains("<td>http_req_failed</td><td>rate&lt;0.01</td>"));
        assert!(html.contains("<td>Orders response matches domain.Order</td><td>0</td><td>1</td><td class=\"fail\">fail</td>"));
        assert!(html.contains("<td>stock_out_count</td><td>2</td>"));
        assert!(html.ends_with("</html>\n"));
    }
}
