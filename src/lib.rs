//! webmap: a single-domain site mapper
//!
//! This crate implements a concurrent web crawler that discovers every page
//! on a domain reachable through `<a href>` links and renders the resulting
//! link graph as an indented, hierarchical site map.

pub mod crawler;
pub mod output;
pub mod sitemap;
pub mod url;

use thiserror::Error;

/// Main error type for webmap operations
///
/// These are fatal errors: bad configuration at startup, a client that
/// cannot be constructed, or an output destination that cannot be written.
/// Per-URL failures during the crawl are [`LoadError`]s and never abort
/// the crawl.
#[derive(Debug, Error)]
pub enum WebmapError {
    #[error("invalid seed URL: {0}")]
    Seed(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("attempt to add a page with an empty URL to the site map")]
    EmptyPageUrl,

    #[error("crawl stage failed: {0}")]
    StageFailed(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-URL load errors
///
/// The crawl engine treats every variant the same way: log at trace level,
/// decrement the pending counter, move on. A URL that fails to load is
/// terminal: its outbound links never enter the crawl.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("request failed for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("unsupported content type {content_type:?} for URL ({url})")]
    UnsupportedType { url: String, content_type: String },

    #[error("bad status code {status} for URL ({url})")]
    BadStatus { url: String, status: u16 },

    #[error("failed to parse contents for URL {url}: {message}")]
    Parse { url: String, message: String },
}

/// Result type alias for webmap operations
pub type Result<T> = std::result::Result<T, WebmapError>;

/// Result type alias for per-URL load operations
pub type LoadResult<T> = std::result::Result<T, LoadError>;

// Re-export commonly used types
pub use crate::crawler::{crawl, CrawlConfig, DocumentLoader, HttpLoader};
pub use crate::sitemap::{Page, SiteMap};
pub use crate::url::{canonical_string, resolve_internal, same_host};
