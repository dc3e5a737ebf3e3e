//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a finished
//! crawl session: run metadata, the page state breakdown, the pages where
//! the text was found and the pages that failed.

use crate::output::stats::RunStatistics;
use crate::state::PageState;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Error listings are cut off after this many entries
const MAX_LISTED_ERRORS: usize = 50;

/// Everything recorded about one finished session
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub start_uri: String,
    pub search_text: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// SHA-256 of the configuration file, if one was used
    pub config_hash: Option<String>,
    pub stats: RunStatistics,
}

impl RunSummary {
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Writes the markdown summary to `output_path`
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(std::io::Error)` - Failed to write summary
pub fn write_markdown_summary(summary: &RunSummary, output_path: &Path) -> std::io::Result<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run summary as markdown
pub fn format_markdown_summary(summary: &RunSummary) -> String {
    let stats = &summary.stats;
    let mut md = String::new();

    md.push_str("# Sumi-Seek Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Start URI**: {}\n", summary.start_uri));
    md.push_str(&format!("- **Search Text**: `{}`\n", summary.search_text));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Finished**: {}\n",
        summary.finished_at.to_rfc3339()
    ));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        summary.duration_seconds()
    ));
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // State breakdown
    md.push_str("## Page State Breakdown\n\n");
    md.push_str("| State | Count |\n");
    md.push_str("|-------|-------|\n");
    for state in PageState::all_states() {
        md.push_str(&format!("| {} | {} |\n", state, stats.count(state)));
    }
    md.push_str(&format!("| **Total** | {} |\n\n", stats.total_pages));

    md.push_str("## Found On\n\n");
    if stats.found.is_empty() {
        md.push_str("The text was not found on any page.\n\n");
    } else {
        for uri in &stats.found {
            md.push_str(&format!("- {}\n", uri));
        }
        md.push('\n');
    }

    if !stats.errors.is_empty() {
        md.push_str("## Errors\n\n");
        md.push_str("| URI | Error |\n");
        md.push_str("|-----|-------|\n");
        for (uri, error) in stats.errors.iter().take(MAX_LISTED_ERRORS) {
            md.push_str(&format!("| {} | {} |\n", table_cell(uri), table_cell(error)));
        }
        if stats.errors.len() > MAX_LISTED_ERRORS {
            md.push_str(&format!(
                "\n... and {} more\n",
                stats.errors.len() - MAX_LISTED_ERRORS
            ));
        }
        md.push('\n');
    }

    md
}

/// Makes free text safe inside a single table cell
fn table_cell(text: &str) -> String {
    text.replace('|', "\\|")
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}
