//! Site map graph of crawled pages
//!
//! The site map is a graph in which nodes are pages and edges are
//! hyperlinks. Cycles are very common (a link from a child back up to the
//! site's root page, for example), so all link information is captured
//! while crawling and upward-facing links are filtered out at render time
//! by the traversal in [`traverse`].
//!
//! Pages live in a map keyed by canonical URL for fast lookup, and the
//! edges live in the pages themselves as a set of canonical URLs. No
//! locking is done on this structure: the crawl engine mutates it from a
//! single ingestion task, and traversal only runs after the crawl has
//! terminated.

mod traverse;

pub use traverse::MapNode;

use std::collections::{HashMap, HashSet};

use url::Url;

use crate::url::{canonical_string, extract_domain};
use crate::{Result, WebmapError};

/// A single page in the website
///
/// Only internal links and the page title are stored, though this could
/// easily be extended with any other information worth capturing (external
/// links, page size, and so on).
#[derive(Debug, Clone)]
pub struct Page {
    /// Canonical absolute URL for this page
    pub url: String,

    /// HTML title of this page, empty if absent
    pub title: String,

    /// Set of canonical URLs this page links to on the same domain
    pub internal_links: HashSet<String>,
}

impl Page {
    /// Creates a new page with no links
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            internal_links: HashSet::new(),
        }
    }
}

/// Graph of all pages discovered on a domain
pub struct SiteMap {
    /// Host of the seed URL
    domain: String,

    /// Canonical URL of the top of the website
    root_url: String,

    /// All pages keyed by canonical URL
    pages: HashMap<String, Page>,
}

impl SiteMap {
    /// Creates a new, empty site map rooted at the seed URL
    pub fn new(seed: &Url) -> Self {
        Self {
            domain: extract_domain(seed).unwrap_or_default(),
            root_url: canonical_string(seed),
            pages: HashMap::new(),
        }
    }

    /// Adds a page to the site map
    ///
    /// The page URL is canonicalized before keying, so `…/a` and `…/a/`
    /// are the same page.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The page was inserted
    /// * `Ok(false)` - A page with this canonical URL already exists; the
    ///   map is unchanged
    /// * `Err(_)` - The page has an empty URL
    pub fn add_page(&mut self, mut page: Page) -> Result<bool> {
        if page.url.is_empty() {
            return Err(WebmapError::EmptyPageUrl);
        }
        let key = canonical_key(&page.url);
        if self.pages.contains_key(&key) {
            return Ok(false);
        }
        page.url = key.clone();
        self.pages.insert(key, page);
        Ok(true)
    }

    /// Returns the host of the seed URL
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Returns the canonical URL of the site root
    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    /// Looks up a page by URL (canonicalized before lookup)
    pub fn page(&self, url: &str) -> Option<&Page> {
        self.pages.get(&canonical_key(url))
    }

    /// Returns the number of pages in the map
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Returns true if no pages have been added
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Canonicalizes a URL string for use as a graph key
///
/// Falls back to a plain trailing-slash strip for strings the url crate
/// cannot parse, so keying stays total.
fn canonical_key(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => canonical_string(&parsed),
        Err(_) => url.strip_suffix('/').unwrap_or(url).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_site_map() {
        let seed = Url::parse("https://bbc.co.uk").unwrap();
        let site = SiteMap::new(&seed);

        assert_eq!(site.domain(), "bbc.co.uk");
        assert_eq!(site.root_url(), "https://bbc.co.uk");
        assert!(site.is_empty());
    }

    #[test]
    fn test_add_page() {
        let seed = Url::parse("https://test.com").unwrap();
        let mut site = SiteMap::new(&seed);

        let added = site.add_page(Page::new("https://test.com/1", "one")).unwrap();
        assert!(added);
        assert_eq!(site.len(), 1);
        assert!(site.page("https://test.com/1").is_some());
    }

    #[test]
    fn test_add_duplicate_page_is_not_an_error() {
        let seed = Url::parse("https://test.com").unwrap();
        let mut site = SiteMap::new(&seed);

        assert!(site.add_page(Page::new("https://test.com/1", "one")).unwrap());
        assert!(!site.add_page(Page::new("https://test.com/1", "dup")).unwrap());
        assert_eq!(site.len(), 1);
        // The first insert wins
        assert_eq!(site.page("https://test.com/1").unwrap().title, "one");
    }

    #[test]
    fn test_add_page_canonicalizes_key() {
        let seed = Url::parse("https://test.com").unwrap();
        let mut site = SiteMap::new(&seed);

        assert!(site.add_page(Page::new("https://test.com/1/2", "page")).unwrap());
        assert!(!site.add_page(Page::new("https://test.com/1/2/", "dup")).unwrap());
        assert_eq!(site.len(), 1);
    }

    #[test]
    fn test_add_page_empty_url_is_error() {
        let seed = Url::parse("https://test.com").unwrap();
        let mut site = SiteMap::new(&seed);

        let result = site.add_page(Page::new("", "empty"));
        assert!(matches!(result, Err(WebmapError::EmptyPageUrl)));
    }
}
