use url::{ParseError, Url};

use super::domain::same_host;

/// Decides whether an href found on `parent` is an internal link
///
/// # Decision Steps
///
/// 1. An href beginning with `/` substitutes its path into the parent
/// 2. Anything else is parsed as an absolute URL; a schemeless candidate
///    (like `example.com/page`) inherits the parent's scheme
/// 3. The scheme must be `http` or `https` (`mailto:`, `javascript:`,
///    `ftp:` and friends are rejected here)
/// 4. The host must match the parent host, case-insensitively and with a
///    leading `www.` ignored on both sides
/// 5. The port must equal the parent port (absent matches only absent)
/// 6. A candidate that resolves to the parent's own path is a self-link
///    and is not internal
///
/// Invalid hrefs are silent non-matches, never errors.
///
/// # Arguments
///
/// * `parent` - Absolute URL of the page the href was found on
/// * `href` - The raw href attribute value
///
/// # Returns
///
/// * `Some(String)` - The canonical URL (trailing slash stripped, fragment
///   cleared, query preserved)
/// * `None` - Not an internal link
///
/// # Examples
///
/// ```
/// use url::Url;
/// use webmap::url::resolve_internal;
///
/// let parent = Url::parse("http://example.com/path").unwrap();
/// assert_eq!(
///     resolve_internal(&parent, "/about/"),
///     Some("http://example.com/about".to_string())
/// );
/// assert_eq!(resolve_internal(&parent, "mailto:hi@example.com"), None);
/// assert_eq!(resolve_internal(&parent, "http://other.org/x"), None);
/// ```
pub fn resolve_internal(parent: &Url, href: &str) -> Option<String> {
    let candidate = parse_candidate(parent, href)?;

    if candidate.scheme() != "http" && candidate.scheme() != "https" {
        return None;
    }

    let host = candidate.host_str()?;
    let parent_host = parent.host_str()?;
    if !same_host(host, parent_host) {
        return None;
    }

    // Absent matches only absent. Note the url crate drops default ports,
    // so an explicit :80 on http compares as absent here.
    if candidate.port() != parent.port() {
        return None;
    }

    // A link that resolves back to the page it was found on would only
    // produce trivial cycles.
    if strip_trailing_slash(candidate.path()) == strip_trailing_slash(parent.path()) {
        return None;
    }

    Some(canonical_string(&candidate))
}

/// Serializes a URL in its canonical form
///
/// The canonical form strips one trailing `/` from the path (so the root
/// page has an empty path), clears the fragment, and keeps the query.
/// This is a `String` rather than a `Url` because `url::Url` always
/// serializes http(s) URLs with at least a `/` path.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use webmap::url::canonical_string;
///
/// let url = Url::parse("https://example.com/docs/#intro").unwrap();
/// assert_eq!(canonical_string(&url), "https://example.com/docs");
///
/// let root = Url::parse("http://example.com/").unwrap();
/// assert_eq!(canonical_string(&root), "http://example.com");
/// ```
pub fn canonical_string(url: &Url) -> String {
    let mut out = format!("{}://", url.scheme());
    if let Some(host) = url.host_str() {
        out.push_str(host);
    }
    if let Some(port) = url.port() {
        out.push(':');
        out.push_str(&port.to_string());
    }
    out.push_str(strip_trailing_slash(url.path()));
    if let Some(query) = url.query() {
        out.push('?');
        out.push_str(query);
    }
    out
}

/// Turns a raw href into an absolute URL candidate, or None if it cannot
/// be parsed as one
fn parse_candidate(parent: &Url, href: &str) -> Option<Url> {
    if href.starts_with('/') {
        return parent.join(href).ok();
    }
    match Url::parse(href) {
        Ok(url) => Some(url),
        // Schemeless host-style hrefs like "example.com/page" inherit the
        // parent scheme. A bare relative path ends up parsed as a host and
        // fails the host check.
        Err(ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("{}://{}", parent.scheme(), href)).ok()
        }
        Err(_) => None,
    }
}

fn strip_trailing_slash(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parent(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    fn assert_internal(parent_url: &str, href: &str, expected: &str) {
        let result = resolve_internal(&parent(parent_url), href);
        assert_eq!(
            result.as_deref(),
            Some(expected),
            "href {:?} on parent {:?}",
            href,
            parent_url
        );
    }

    fn assert_external(parent_url: &str, href: &str) {
        let result = resolve_internal(&parent(parent_url), href);
        assert_eq!(
            result, None,
            "href {:?} on parent {:?} should not be internal",
            href, parent_url
        );
    }

    #[test]
    fn test_absolute_same_host() {
        assert_internal(
            "http://en.wikipedia.com/path",
            "http://en.wikipedia.com",
            "http://en.wikipedia.com",
        );
        assert_internal(
            "http://en.wikipedia.com/path",
            "http://en.wikipedia.com/",
            "http://en.wikipedia.com",
        );
        assert_internal(
            "http://en.wikipedia.com/path",
            "https://en.wikipedia.com/newpath",
            "https://en.wikipedia.com/newpath",
        );
    }

    #[test]
    fn test_schemeless_host_inherits_parent_scheme() {
        assert_internal(
            "http://en.wikipedia.com/path",
            "en.wikipedia.com",
            "http://en.wikipedia.com",
        );
        assert_internal(
            "http://en.wikipedia.com/path",
            "en.wikipedia.com/",
            "http://en.wikipedia.com",
        );
        assert_internal(
            "http://en.wikipedia.com/path",
            "en.wikipedia.com/path/2",
            "http://en.wikipedia.com/path/2",
        );
        assert_internal(
            "http://en.wikipedia.com/path",
            "en.wikipedia.com/path/2/",
            "http://en.wikipedia.com/path/2",
        );
    }

    #[test]
    fn test_query_is_preserved() {
        assert_internal(
            "http://en.wikipedia.com/path",
            "https://en.wikipedia.com/newpath?ABC",
            "https://en.wikipedia.com/newpath?ABC",
        );
    }

    #[test]
    fn test_fragment_is_cleared() {
        assert_internal(
            "http://en.wikipedia.com/path",
            "http://en.wikipedia.com/other#section",
            "http://en.wikipedia.com/other",
        );
    }

    #[test]
    fn test_unsupported_schemes() {
        assert_external("http://en.wikipedia.com/path", "ftp://en.wikipedia.com/doc");
        assert_external("http://en.wikipedia.com/path", "mailto:someone@wikipedia.com");
        assert_external("http://en.wikipedia.com/path", "javascript:void(0)");
    }

    #[test]
    fn test_different_host() {
        assert_external("http://en.wikipedia.com/path", "http://other.org/x");
        assert_external(
            "http://en.wikipedia.com/path",
            "http://www.wikimediafoundation.org",
        );
        assert_external("http://en.wikipedia.com/path", "wikimediafoundation.org");
        assert_external("http://en.wikipedia.com/path", "wikimediafoundation.org/path");
    }

    #[test]
    fn test_self_link_is_not_internal() {
        assert_external("http://en.wikipedia.com/path", "en.wikipedia.com/path");
        assert_external("http://en.wikipedia.com/path", "http://en.wikipedia.com/path");
        assert_external("http://en.wikipedia.com/path", "/path");
        // Trailing slash still resolves to the parent path
        assert_external("http://en.wikipedia.com/path", "/path/");
    }

    #[test]
    fn test_port_must_match() {
        assert_external("https://example.com/a", "https://example.com:8080");
        assert_external(
            "http://en.wikipedia.com:8080/path",
            "http://en.wikipedia.com/path2",
        );
        assert_internal(
            "http://en.wikipedia.com:8080/path",
            "http://en.wikipedia.com:8080/path2",
            "http://en.wikipedia.com:8080/path2",
        );
    }

    #[test]
    fn test_host_equivalence() {
        assert_internal(
            "http://example.com/a",
            "http://www.example.com/b",
            "http://www.example.com/b",
        );
        assert_internal(
            "http://www.example.com/a",
            "http://example.com/b",
            "http://example.com/b",
        );
        // The url crate lowercases hosts while parsing
        assert_internal(
            "http://example.com/a",
            "http://EXAMPLE.COM/b",
            "http://example.com/b",
        );
    }

    #[test]
    fn test_path_substitution() {
        assert_internal(
            "https://example.com/deep/nested/page",
            "/top",
            "https://example.com/top",
        );
    }

    #[test]
    fn test_invalid_href_is_silent() {
        assert_external("http://example.com/a", "");
        assert_external("http://example.com/a", "#fragment-only");
        assert_external("http://example.com/a", "http://");
    }

    #[test]
    fn test_bare_relative_path_is_treated_as_host() {
        // "page.html" parses as a host once the scheme is inherited, so it
        // fails the host check rather than resolving against the parent
        assert_external("http://example.com/a", "page.html");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let p = parent("http://en.wikipedia.com/path");
        let hrefs = [
            "http://en.wikipedia.com",
            "en.wikipedia.com/path/2/",
            "https://en.wikipedia.com/newpath?ABC",
            "/other/page/",
        ];
        for href in hrefs {
            let first = resolve_internal(&p, href).expect("first pass internal");
            let second = resolve_internal(&p, &first).expect("second pass internal");
            assert_eq!(first, second, "canonical form not stable for {:?}", href);
        }
    }

    #[test]
    fn test_canonical_string_root() {
        let url = Url::parse("http://example.com").unwrap();
        assert_eq!(canonical_string(&url), "http://example.com");
        let url = Url::parse("http://example.com/").unwrap();
        assert_eq!(canonical_string(&url), "http://example.com");
    }

    #[test]
    fn test_canonical_string_keeps_port_and_query() {
        let url = Url::parse("http://example.com:8080/a/?x=1#frag").unwrap();
        assert_eq!(canonical_string(&url), "http://example.com:8080/a?x=1");
    }

    #[test]
    fn test_canonical_string_drops_default_port() {
        let url = Url::parse("http://example.com:80/a").unwrap();
        assert_eq!(canonical_string(&url), "http://example.com/a");
    }
}
