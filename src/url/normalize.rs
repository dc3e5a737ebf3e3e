use crate::{UrlError, UrlResult};
use url::Url;

/// Computes the identity key of a page
///
/// Two pages are the same entity when their absolute URIs are equal after
/// trimming surrounding slashes, compared case-insensitively. This key is
/// the only notion of identity the frontier uses for deduplication.
///
/// # Examples
///
/// ```
/// use sumi_seek::url::page_key;
/// use url::Url;
///
/// let a = Url::parse("http://Example.com/Docs/").unwrap();
/// let b = Url::parse("http://example.com/docs").unwrap();
/// assert_eq!(page_key(&a), page_key(&b));
/// ```
pub fn page_key(url: &Url) -> String {
    url.as_str().trim_matches('/').to_lowercase()
}

/// Parses and validates the seed URL of a crawl
///
/// The URL must be absolute, use the `http` or `https` scheme and carry a host.
///
/// # Arguments
///
/// * `url_str` - The URL string supplied by the caller
///
/// # Returns
///
/// * `Ok(Url)` - The parsed URL
/// * `Err(UrlError)` - The URL is malformed or not crawlable
pub fn parse_start_uri(url_str: &str) -> UrlResult<Url> {
    let trimmed = url_str.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Parse("URL cannot be empty".to_string()));
    }

    let url = Url::parse(trimmed).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}
