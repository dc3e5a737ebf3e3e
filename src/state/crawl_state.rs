use serde::Serialize;
use std::fmt;

/// Lifecycle state of a crawl session
///
/// ```text
/// Ready ──start──▶ Starting ──ok──▶ Work ◀──resume── Paused
///                     │              │  ──pause──▶     │
///                     │ invalid      └──stop──▶ Stopping ◀──stop──┘
///                     ▼                             │
///                  Stopped ◀──── workers joined ────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CrawlState {
    Ready,
    Starting,
    Work,
    Paused,
    Stopping,
    Stopped,
}

impl CrawlState {
    /// Returns true while a session owns live workers
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Starting | Self::Work | Self::Paused)
    }

    /// Returns true if `stop` has something to do in this state
    pub fn can_stop(&self) -> bool {
        self.is_running()
    }

    /// Returns true if `start` may begin a new session from this state
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Ready | Self::Stopped)
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Ready => "Ready",
            Self::Starting => "Starting",
            Self::Work => "Work",
            Self::Paused => "Paused",
            Self::Stopping => "Stopping",
            Self::Stopped => "Stopped",
        };
        f.write_str(label)
    }
}
