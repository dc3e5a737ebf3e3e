//! Statistics of a finished crawl session
//!
//! This module summarizes the page snapshots left behind by a session and
//! prints them to stdout.

use crate::crawler::PageSnapshot;
use crate::state::PageState;
use std::collections::HashMap;

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct RunStatistics {
    /// Total number of pages known to the session
    pub total_pages: usize,

    /// Count of pages by state
    pub pages_by_state: HashMap<PageState, usize>,

    /// Pages containing the search text, in discovery order
    pub found: Vec<String>,

    /// Failed pages with their error messages
    pub errors: Vec<(String, String)>,
}

impl RunStatistics {
    /// Builds statistics from a session's page snapshots
    pub fn from_pages(pages: &[PageSnapshot]) -> Self {
        let mut stats = Self {
            total_pages: pages.len(),
            ..Self::default()
        };

        for page in pages {
            *stats.pages_by_state.entry(page.state).or_insert(0) += 1;

            match page.state {
                PageState::Found => stats.found.push(page.uri.clone()),
                PageState::Error => stats.errors.push((
                    page.uri.clone(),
                    page.error.clone().unwrap_or_default(),
                )),
                _ => {}
            }
        }

        stats
    }

    pub fn count(&self, state: PageState) -> usize {
        self.pages_by_state.get(&state).copied().unwrap_or(0)
    }

    /// Pages that reached a terminal state
    pub fn completed(&self) -> usize {
        PageState::all_states()
            .into_iter()
            .filter(PageState::is_terminal)
            .map(|state| self.count(state))
            .sum()
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RunStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Total pages: {}", stats.total_pages);
    println!("  Completed pages: {}", stats.completed());
    println!();

    println!("Pages by State:");
    for state in PageState::all_states() {
        let count = stats.count(state);
        if count == 0 {
            continue;
        }
        let percentage = if stats.total_pages > 0 {
            (count as f64 / stats.total_pages as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", state, count, percentage);
    }
    println!();

    if stats.found.is_empty() {
        println!("Text not found on any page");
    } else {
        println!("Found on ({}):", stats.found.len());
        for uri in &stats.found {
            println!("  - {}", uri);
        }
    }

    if !stats.errors.is_empty() {
        println!();
        println!("Errors ({}):", stats.errors.len());
        for (uri, error) in &stats.errors {
            println!("  - {}: {}", uri, error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(uri: &str, state: PageState, error: Option<&str>) -> PageSnapshot {
        PageSnapshot {
            uri: uri.to_string(),
            state,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_from_pages_counts_states() {
        let pages = vec![
            snapshot("http://a/", PageState::Found, None),
            snapshot("http://a/b", PageState::NotFound, None),
            snapshot("http://a/c", PageState::Error, Some("Http Error: 404 Not Found")),
            snapshot("http://a/d", PageState::Wait, None),
            snapshot("http://a/e", PageState::Found, None),
        ];

        let stats = RunStatistics::from_pages(&pages);

        assert_eq!(stats.total_pages, 5);
        assert_eq!(stats.count(PageState::Found), 2);
        assert_eq!(stats.count(PageState::NotFound), 1);
        assert_eq!(stats.count(PageState::Downloading), 0);
        assert_eq!(stats.completed(), 4);
        assert_eq!(stats.found, vec!["http://a/", "http://a/e"]);
        assert_eq!(
            stats.errors,
            vec![(
                "http://a/c".to_string(),
                "Http Error: 404 Not Found".to_string()
            )]
        );
    }

    #[test]
    fn test_empty_session() {
        let stats = RunStatistics::from_pages(&[]);
        assert_eq!(stats.total_pages, 0);
        assert_eq!(stats.completed(), 0);
        assert!(stats.found.is_empty());
    }
}
