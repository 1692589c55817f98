use url::Url;

/// Extracts the domain from a URL
///
/// Retrieves the host portion of a URL, lowercased. Returns None if the
/// URL has no host (which shouldn't happen for valid HTTP(S) URLs).
///
/// # Examples
///
/// ```
/// use url::Url;
/// use webmap::url::extract_domain;
///
/// let url = Url::parse("https://example.com/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether two hosts name the same domain
///
/// `example.com`, `www.example.com` and `EXAMPLE.com` are all considered
/// the same domain.
///
/// # Examples
///
/// ```
/// use webmap::url::same_host;
///
/// assert!(same_host("example.com", "www.example.com"));
/// assert!(same_host("EXAMPLE.com", "example.com"));
/// assert!(!same_host("example.com", "sub.example.com"));
/// ```
pub fn same_host(h1: &str, h2: &str) -> bool {
    strip_www(h1) == strip_www(h2)
}

fn strip_www(host: &str) -> String {
    let lower = host.to_ascii_lowercase();
    match lower.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}
