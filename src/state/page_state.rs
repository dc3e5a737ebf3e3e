/// Page state definitions for tracking crawl progress
///
/// This module defines all possible states a page can be in during a crawl.
use serde::Serialize;
use std::fmt;

/// Represents the current state of a page in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PageState {
    // ===== Active States =====
    /// Page is stored in the frontier and has not been claimed by a worker
    Wait,

    /// Page has been claimed by a worker
    Process,

    /// Page content is being fetched
    Downloading,

    // ===== Terminal States =====
    /// Page content contains the search text
    Found,

    /// Page content does not contain the search text
    NotFound,

    /// Page could not be fetched or parsed
    Error,
}

impl PageState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Found | Self::NotFound | Self::Error)
    }

    /// Position of the state in the forward-only lifecycle.
    ///
    /// `Error` ranks above the search outcomes because a page whose markup
    /// cannot be parsed is demoted to `Error` after it was searched.
    fn rank(&self) -> u8 {
        match self {
            Self::Wait => 0,
            Self::Process => 1,
            Self::Downloading => 2,
            Self::Found | Self::NotFound => 3,
            Self::Error => 4,
        }
    }

    /// Returns true if a page may move from this state to `next`
    pub fn can_transition_to(&self, next: PageState) -> bool {
        next.rank() > self.rank()
    }

    /// Returns the lowercase label used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wait => "wait",
            Self::Process => "process",
            Self::Downloading => "downloading",
            Self::Found => "found",
            Self::NotFound => "not_found",
            Self::Error => "error",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> [Self; 6] {
        [
            Self::Wait,
            Self::Process,
            Self::Downloading,
            Self::Found,
            Self::NotFound,
            Self::Error,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
