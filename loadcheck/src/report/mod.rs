//! Summary reports.
//!
//! This module provides:
//! - A plain-text summary for the terminal
//! - A standalone HTML report
//! - [`write_report`], which picks the format from the file extension

mod html;
mod text;

use std::fs;
use std::path::Path;

use crate::driver::Summary;
use crate::errors::LoadcheckError;

pub use html::render_html;
pub use text::render_text;

/// Output format of a report file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// `.html` / `.htm`
    Html,
    /// `.json`
    Json,
    /// Anything else.
    Text,
}

impl ReportFormat {
    /// Chooses a format from a path's extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("html" | "htm") => Self::Html,
            Some("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Renders a summary in the given format.
pub fn render(summary: &Summary, format: ReportFormat) -> Result<String, LoadcheckError> {
    Ok(match format {
        ReportFormat::Html => render_html(summary),
        ReportFormat::Json => serde_json::to_string_pretty(summary)?,
        ReportFormat::Text => render_text(summary),
    })
}

/// Writes a report to `path`, creating parent directories as needed.
pub fn write_report(summary: &Summary, path: impl AsRef<Path>) -> Result<(), LoadcheckError> {
    let path = path.as_ref();
    let format = ReportFormat::from_path(path);
    let rendered = render(summary, format)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, rendered)?;

    tracing::info!(path = %path.display(), ?format, "Report written");
    Ok(())
}

/// Formats milliseconds the way the reports show latencies.
pub(crate) fn format_ms(ms: f64) -> String {
    if ms >= 1000.0 {
        format!("{:.2}s", ms / 1000.0)
    } else {
        format!("{ms:.2}ms")
    }
}
