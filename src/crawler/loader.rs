//! Document loading over HTTP
//!
//! The [`DocumentLoader`] trait is the seam between the crawl engine and
//! the network: the engine only ever asks for a URL and gets back a parsed
//! [`Page`] or a per-URL error. [`HttpLoader`] is the production
//! implementation; tests substitute in-memory loaders.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use url::Url;

use super::extract::extract_page;
use crate::sitemap::Page;
use crate::{LoadError, LoadResult};

/// Loads a URL and parses the document stored there into a [`Page`]
///
/// Only HTML documents are processed; all other content types are
/// rejected with an error.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load(&self, url: &str) -> LoadResult<Page>;
}

/// [`DocumentLoader`] implementation that fetches documents over HTTP
///
/// Does no retrying and no concurrency control (parallelism and throttling
/// belong to the crawl engine); redirects follow the HTTP client's default
/// policy.
pub struct HttpLoader {
    client: Client,
}

impl HttpLoader {
    /// Builds a loader with its own HTTP client
    pub fn new() -> crate::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentLoader for HttpLoader {
    /// Fetches `url` and hands the body to the HTML extractor
    ///
    /// The response must carry a `Content-Type` starting with `text/html`
    /// and a status of exactly 200; anything else is a per-URL error.
    async fn load(&self, url: &str) -> LoadResult<Page> {
        let start = Instant::now();

        let page_url = Url::parse(url).map_err(|e| LoadError::Parse {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| LoadError::Transport {
                url: url.to_string(),
                source,
            })?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if !content_type.starts_with("text/html") {
            return Err(LoadError::UnsupportedType {
                url: url.to_string(),
                content_type: content_type.to_string(),
            });
        }

        if response.status() != StatusCode::OK {
            return Err(LoadError::BadStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| LoadError::Transport {
                url: url.to_string(),
                source,
            })?;

        let page = extract_page(&page_url, &body);
        tracing::debug!(
            "loaded and parsed {} in {:.3} secs",
            url,
            start.elapsed().as_secs_f64()
        );
        Ok(page)
    }
}
