//! Output module for reporting finished crawl sessions
//!
//! This module handles:
//! - Summarizing page snapshots into run statistics
//! - Printing statistics to the terminal
//! - Writing markdown summaries of a run

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, write_markdown_summary, RunSummary};
pub use stats::{print_statistics, RunStatistics};
