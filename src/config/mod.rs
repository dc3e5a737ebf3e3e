//! Configuration module for Sumi-Seek
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; missing values fall back to the defaults of the
//! corresponding type.
//!
//! # Example
//!
//! ```no_run
//! use sumi_seek::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("seek.toml")).unwrap();
//! println!("Crawl will use {} workers", config.finder.max_workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FinderConfig, HttpConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, load_config_with_hash};
pub use validation::validate;
pub(crate) use validation::validate_finder_config;
