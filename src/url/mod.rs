//! URL handling module for webmap
//!
//! This module decides whether an href belongs to the crawl domain and
//! produces the canonical form used as the site-map graph key.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, same_host};
pub use normalize::{canonical_string, resolve_internal};
