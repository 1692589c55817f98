//! Crawler module for web page loading and crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - Document loading over HTTP
//! - HTML extraction of titles and internal links
//! - The hyperlink queue feeding the loader pool
//! - The pipeline engine with its termination detection

mod engine;
mod extract;
mod loader;
mod queue;

pub use engine::{crawl, CrawlConfig};
pub use extract::extract_page;
pub use loader::{DocumentLoader, HttpLoader};
pub use queue::{Hyperlink, HyperlinkQueue};
