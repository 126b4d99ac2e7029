//! Terminal summary.

use std::fmt::Write;

use super::format_ms;
use crate::driver::{MetricValue, Summary};

/// Renders a summary as aligned plain text.
#[must_use]
pub fn render_text(summary: &Summary) -> String {
    let mut out = String::new();
    let verdict = if summary.passed() { "PASSED" } else { "FAILED" };

    let _ = writeln!(out, "scenario: {} ({verdict})", summary.scenario);
    let _ = writeln!(out, "run id:   {}", summary.run_id);
    let _ = writeln!(out, "started:  {}", summary.started_at.to_rfc3339());
    let _ = writeln!(out, "duration: {}", format_ms(summary.duration().as_secs_f64() * 1000.0));
    if let Some(reason) = &summary.interrupted {
        let _ = writeln!(out, "interrupted: {reason}");
    }

    if !summary.metrics.checks.is_empty() {
        out.push_str("\nchecks\n");
        for check in &summary.metrics.checks {
            let mark = if check.all_passed() { '✓' } else { '✗' };
            let _ = writeln!(
                out,
                "  {mark} {} ({} passed, {} failed)",
                check.name, check.passes, check.fails
            );
        }
    }

    if !summary.thresholds.is_empty() {
        out.push_str("\nthresholds\n");
        for t in &summary.thresholds {
            let mark = if t.passed { '✓' } else { '✗' };
            let observed = t
                .observed
                .map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"));
            let _ = writeln!(out, "  {mark} {} {} (observed {observed})", t.metric, t.expression);
        }
    }

    out.push_str("\nmetrics\n");
    let width = summary.metrics.metrics.keys().map(String::len).max().unwrap_or(0);
    for (name, value) in &summary.metrics.metrics {
        let line = match value {
            MetricValue::Trend(t) => format!(
                "avg={} min={} med={} max={} p(90)={} p(95)={}",
                format_ms(t.avg),
                format_ms(t.min),
                format_ms(t.med),
                format_ms(t.max),
                format_ms(t.p90),
                format_ms(t.p95),
            ),
            MetricValue::Rate(r) => format!("{:.2}% {} of {}", r.rate * 100.0, r.hits, r.total),
            MetricValue::Counter(c) => format!("{}", c.count),
        };
        let _ = writeln!(out, "  {name:.<width$}: {line}", width = width + 2);
    }

    out
}
