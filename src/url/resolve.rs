use url::Url;

const HTTP_PREFIX: &str = "http://";
const HTTPS_PREFIX: &str = "https://";

/// Returns the `host[:port]` part of a URL
///
/// The port is only present when it differs from the scheme default.
pub fn authority(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().trim_matches('/');
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Resolves a raw href value found on `base` into an absolute URL
///
/// Hrefs that already start with `http://` or `https://` are parsed as-is.
/// Anything else is joined onto the scheme and authority of `base` as
/// `scheme://authority/trimmed-href`, where the href loses its surrounding
/// slashes. The base path is never taken into account.
///
/// # Returns
///
/// * `Some(Url)` - The href resolved to an absolute URL
/// * `None` - The result does not parse as an absolute URL
///
/// # Examples
///
/// ```
/// use sumi_seek::url::resolve_href;
/// use url::Url;
///
/// let base = Url::parse("http://example.com/a/").unwrap();
/// assert_eq!(resolve_href(&base, "b").unwrap().as_str(), "http://example.com/b");
/// assert_eq!(resolve_href(&base, "/c").unwrap().as_str(), "http://example.com/c");
/// ```
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let absolute = if href.starts_with(HTTP_PREFIX) || href.starts_with(HTTPS_PREFIX) {
        href.to_string()
    } else {
        format!(
            "{}://{}/{}",
            base.scheme(),
            authority(base),
            href.trim_matches('/')
        )
    };

    Url::parse(&absolute).ok().filter(|url| url.has_host())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://example.com/a/").unwrap()
    }

    #[test]
    fn test_relative_path_joins_onto_host() {
        let url = resolve_href(&base(), "b").unwrap();
        assert_eq!(url.as_str(), "http://example.com/b");
    }

    #[test]
    fn test_root_relative_link() {
        let url = resolve_href(&base(), "/c").unwrap();
        assert_eq!(url.as_str(), "http://example.com/c");
    }

    #[test]
    fn test_absolute_link_kept() {
        let url = resolve_href(&base(), "https://other.com/d").unwrap();
        assert_eq!(url.as_str(), "https://other.com/d");
    }

    #[test]
    fn test_surrounding_slashes_trimmed() {
        let url = resolve_href(&base(), "//nested/path//").unwrap();
        assert_eq!(url.as_str(), "http://example.com/nested/path");
    }

    #[test]
    fn test_port_is_preserved() {
        let base = Url::parse("http://127.0.0.1:8080/index").unwrap();
        let url = resolve_href(&base, "/next").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/next");
    }

    #[test]
    fn test_scheme_follows_base() {
        let base = Url::parse("https://secure.example.com/").unwrap();
        let url = resolve_href(&base, "login").unwrap();
        assert_eq!(url.as_str(), "https://secure.example.com/login");
    }

    #[test]
    fn test_invalid_absolute_link_skipped() {
        assert!(resolve_href(&base(), "http://").is_none());
        assert!(resolve_href(&base(), "http://exa mple.com/").is_none());
    }

    #[test]
    fn test_authority_default_port_omitted() {
        let url = Url::parse("https://example.com:443/").unwrap();
        assert_eq!(authority(&url), "example.com");
    }
}
