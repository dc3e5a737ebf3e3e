//! URL handling module for Sumi-Seek
//!
//! This module provides page identity keys, start URL validation and
//! resolution of raw href values found in page markup.

mod normalize;
mod resolve;

// Re-export main functions
pub use normalize::{page_key, parse_start_uri};
pub use resolve::{authority, resolve_href};
