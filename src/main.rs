//! webmap main entry point
//!
//! Crawls a website starting at the supplied URL or domain name and writes
//! a hierarchical site map of all the internal links to a file or the
//! console.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use url::Url;
use webmap::crawler::{crawl, CrawlConfig, HttpLoader};
use webmap::output::render_site_map;

/// webmap: generate a hierarchical site map for a single web domain
///
/// Crawls the seed's domain by following `<a href>` links, then renders
/// the discovered pages as an indented tree. Pages are shown at the
/// shortest link distance from the root, upward links are hidden, and each
/// page's children are expanded only once.
#[derive(Parser, Debug)]
#[command(name = "webmap")]
#[command(version)]
#[command(about = "Crawls a web domain and prints a hierarchical site map", long_about = None)]
struct Cli {
    /// Site to crawl
    #[arg(short = 's', long = "site", default_value = "en.wikipedia.org")]
    site: String,

    /// Site map destination file; writes to the console when omitted
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Minimum separation (in ms) between initiating loads from the server
    #[arg(long, default_value_t = 100)]
    delay: u64,

    /// Maximum number of concurrent loads from the server
    #[arg(short = 't', long = "threads", default_value_t = 10)]
    threads: usize,

    /// Maximum number of pages to load, 0 means no limit
    #[arg(short, long, default_value_t = 0)]
    pages: usize,

    /// Maximum depth to crawl to, 0 means no limit
    #[arg(long, default_value_t = 0)]
    depth: usize,

    /// Show extra logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let seed = parse_seed(&cli.site)?;

    let loader = Arc::new(HttpLoader::new()?);
    let config = CrawlConfig {
        min_load_delay: cli.delay,
        num_loaders: cli.threads,
        max_pages_to_load: cli.pages,
        max_crawl_depth: cli.depth,
    };

    // Crawl the website; this blocks until crawling is complete
    let start = Instant::now();
    let site_map = crawl(&seed, loader, config).await?;
    tracing::info!(
        "crawled {} pages from {} in {:.2} seconds",
        site_map.len(),
        site_map.domain(),
        start.elapsed().as_secs_f64()
    );

    // Write the site map to the requested destination
    let site_map = Arc::new(site_map);
    match &cli.out {
        Some(path) => {
            tracing::info!("writing site map to {}", path.display());
            let mut out = BufWriter::new(File::create(path)?);
            render_site_map(&mut out, site_map.root_url(), Arc::clone(&site_map)).await?;
            out.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            render_site_map(&mut out, site_map.root_url(), Arc::clone(&site_map)).await?;
        }
    }

    Ok(())
}

/// Parses the seed, defaulting the scheme to http when none is given
fn parse_seed(site: &str) -> webmap::Result<Url> {
    match Url::parse(site) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Ok(Url::parse(&format!("http://{}", site))?)
        }
        Err(e) => Err(e.into()),
    }
}

/// Sets up the tracing subscriber
///
/// Logs go to stderr so the site map on stdout stays clean.
fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("webmap=trace")
    } else {
        EnvFilter::new("webmap=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
