use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sumi-Seek
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub finder: FinderConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Total page budget of a crawl session
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Number of concurrent workers (must not exceed `max_pages`)
    #[serde(rename = "max-workers")]
    pub max_workers: usize,

    /// Delay between fetching a page and processing it (milliseconds)
    #[serde(rename = "politeness-delay")]
    pub politeness_delay: u64,

    /// Period of the idle monitor that detects an exhausted frontier (milliseconds)
    #[serde(rename = "idle-check-interval")]
    pub idle_check_interval: u64,
}

impl FinderConfig {
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay)
    }

    pub fn idle_check_interval(&self) -> Duration {
        Duration::from_millis(self.idle_check_interval)
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            max_pages: 100,
            max_workers: 4,
            politeness_delay: 1000,
            idle_check_interval: 250,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version` or `CrawlerName/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SumiSeek".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout")]
    pub connect_timeout: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: 30,
            connect_timeout: 10,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the markdown summary written after a run
    #[serde(rename = "summary-path")]
    pub summary_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_with_contact() {
        let config = UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "2.0".to_string(),
            contact_url: Some("https://example.com/bot".to_string()),
        };
        assert_eq!(config.header_value(), "TestBot/2.0 (+https://example.com/bot)");
    }

    #[test]
    fn test_user_agent_without_contact() {
        let config = UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "2.0".to_string(),
            contact_url: None,
        };
        assert_eq!(config.header_value(), "TestBot/2.0");
    }

    #[test]
    fn test_finder_durations() {
        let config = FinderConfig::default();
        assert_eq!(config.politeness_delay(), Duration::from_secs(1));
        assert_eq!(config.idle_check_interval(), Duration::from_millis(250));
    }
}
