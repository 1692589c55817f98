//! HTML extraction of page titles and internal links

use scraper::{Html, Selector};
use url::Url;

use crate::sitemap::Page;
use crate::url::{canonical_string, resolve_internal};

/// Extracts a [`Page`] from an HTML document
///
/// Walks every `<a>` element and keeps the hrefs the normalizer accepts as
/// internal links of `page_url`. The title is taken from the first
/// `<title>` element whose first child is text: trimmed, then cut at the
/// first newline. All other tags and attributes are ignored.
///
/// Malformed hrefs are silently skipped, and the underlying parser is
/// error-tolerant, so extraction itself cannot fail.
pub fn extract_page(page_url: &Url, html: &str) -> Page {
    let document = Html::parse_document(html);

    let mut page = Page::new(
        canonical_string(page_url),
        extract_title(&document).unwrap_or_default(),
    );

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(canonical) = resolve_internal(page_url, href) {
                    page.internal_links.insert(canonical);
                }
            }
        }
    }

    page
}

/// Extracts the document title
///
/// Only a `<title>` whose first child is a text node counts; the first
/// such element wins and any later ones are ignored.
fn extract_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;

    for element in document.select(&selector) {
        let Some(first_child) = element.first_child() else {
            continue;
        };
        let Some(text) = first_child.value().as_text() else {
            continue;
        };
        // Trim the whole text, then keep only the first line
        let trimmed = text.trim();
        let title = trimmed.split('\n').next().unwrap_or(trimmed);
        return Some(title.to_string());
    }

    None
}
