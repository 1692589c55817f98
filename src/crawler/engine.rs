//! Crawl engine: the concurrent pipeline that drives a crawl
//!
//! The pipeline forms a loop. Loaders fetch queued URLs and push extracted
//! links back around; the deduper filters what has already been seen and
//! feeds the queue; the dispatcher moves queued links to the loaders; the
//! ingestor stores finished pages in the site map:
//!
//! ```text
//!   +--> load channel --> loaders ---+--> pages channel --> ingestor
//!   |                                +--> links channel --+
//!   |                                                     |
//!   +-- dispatcher <-- queue <-- deduper <----------------+
//! ```
//!
//! Because the channels form a loop, no stage can detect running out of
//! work in isolation. A monitor task sums a +1/-1 delta posted for every
//! unit of work entering or leaving the loop; when the sum reaches zero
//! the crawl is complete and the monitor signals shutdown. Teardown then
//! cascades through channel closure: the dispatcher stops and drops the
//! load channel sender, the loaders drain and drop the links and pages
//! senders, and the deduper and ingestor run out of input.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use url::Url;

use super::loader::DocumentLoader;
use super::queue::{Hyperlink, HyperlinkQueue};
use crate::sitemap::{Page, SiteMap};
use crate::Result;

/// Buffer size for the load and pages channels
const CHANNEL_BUFFER: usize = 20;

/// How long the dispatcher sleeps when the queue is empty
const DISPATCH_IDLE_POLL: Duration = Duration::from_millis(100);

/// Crawl limits and tuning knobs
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Minimum interval in milliseconds between starting loads, shared
    /// across all loaders; 0 disables throttling
    pub min_load_delay: u64,

    /// Number of loader tasks, which is also the maximum number of
    /// concurrent requests; values below 1 are treated as 1
    pub num_loaders: usize,

    /// Upper bound on the number of distinct URLs admitted to the queue;
    /// 0 means no limit
    pub max_pages_to_load: usize,

    /// Links deeper than this are rejected; 0 means no limit
    pub max_crawl_depth: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            min_load_delay: 100,
            num_loaders: 10,
            max_pages_to_load: 0,
            max_crawl_depth: 0,
        }
    }
}

/// Crawls the domain of `seed` and returns the populated site map
///
/// Spawns the pipeline stages, seeds the loop with the canonical seed URL
/// at depth 1, and blocks until the monitor declares the crawl complete.
/// The seed travels through the deduper like any other link, so it ends up
/// in the seen set with no special casing.
///
/// Per-URL failures are logged and skipped; this only fails if a pipeline
/// stage itself dies.
pub async fn crawl(
    seed: &Url,
    loader: Arc<dyn DocumentLoader>,
    config: CrawlConfig,
) -> Result<SiteMap> {
    let site_map = SiteMap::new(seed);
    let root_url = site_map.root_url().to_string();

    let (load_tx, load_rx) = mpsc::channel::<Hyperlink>(CHANNEL_BUFFER);
    let (pages_tx, pages_rx) = mpsc::channel::<Page>(CHANNEL_BUFFER);
    let (links_tx, links_rx) = mpsc::channel::<Hyperlink>(1);
    let (pending_tx, pending_rx) = mpsc::channel::<i64>(1);
    let (finished_tx, finished_rx) = watch::channel(false);

    let queue = Arc::new(HyperlinkQueue::new());
    let load_rx = Arc::new(Mutex::new(load_rx));
    let throttle = build_throttle(config.min_load_delay);

    let mut loaders = Vec::new();
    for _ in 0..config.num_loaders.max(1) {
        loaders.push(tokio::spawn(load_pages(
            Arc::clone(&loader),
            Arc::clone(&load_rx),
            links_tx.clone(),
            pages_tx.clone(),
            pending_tx.clone(),
            throttle.clone(),
        )));
    }
    let ingestor = tokio::spawn(ingest_pages(pages_rx, pending_tx.clone(), site_map));
    let deduper = tokio::spawn(dedup_links(
        links_rx,
        Arc::clone(&queue),
        pending_tx.clone(),
        config.clone(),
    ));
    let dispatcher = tokio::spawn(dispatch_queue(queue, load_tx, finished_rx));
    let monitor = tokio::spawn(monitor_progress(pending_rx, finished_tx));

    tracing::info!("starting crawl of {}", root_url);
    let _ = pending_tx.send(1).await;
    let _ = links_tx.send(Hyperlink::new(root_url, 1)).await;
    // Drop the local senders so channel closure can cascade once the
    // loaders are done.
    drop(links_tx);
    drop(pages_tx);
    drop(pending_tx);

    for handle in loaders {
        handle.await?;
    }
    deduper.await?;
    dispatcher.await?;
    monitor.await?;
    let site_map = ingestor.await?;
    Ok(site_map)
}

/// Builds the shared throttle ticker, if throttling is enabled
///
/// A single ticker shared by every loader caps the rate at which loads are
/// started across the whole pool, independent of how many loaders there
/// are. Missed ticks are skipped, so a stalled crawl does not earn a burst
/// of banked starts.
fn build_throttle(min_load_delay: u64) -> Option<Arc<Mutex<Interval>>> {
    if min_load_delay == 0 {
        return None;
    }
    let period = Duration::from_millis(min_load_delay);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    Some(Arc::new(Mutex::new(ticker)))
}

/// Loader stage: fetches hyperlinks from the load channel and feeds the
/// results back into the loop
///
/// Runs once per configured loader. A successful load posts +1 for every
/// extracted link before sending it on, then forwards the page for
/// ingestion (the page's own +1 was posted by whoever enqueued it). A
/// failed load is terminal for its URL and posts a single -1.
async fn load_pages(
    loader: Arc<dyn DocumentLoader>,
    load_rx: Arc<Mutex<mpsc::Receiver<Hyperlink>>>,
    links_tx: mpsc::Sender<Hyperlink>,
    pages_tx: mpsc::Sender<Page>,
    pending_tx: mpsc::Sender<i64>,
    throttle: Option<Arc<Mutex<Interval>>>,
) {
    loop {
        // One loader at a time waits on the shared receiver; the lock is
        // released as soon as an item (or closure) is observed.
        let next = { load_rx.lock().await.recv().await };
        let Some(link) = next else {
            break;
        };

        match loader.load(&link.url).await {
            Ok(page) => {
                for target in &page.internal_links {
                    let _ = pending_tx.send(1).await;
                    let _ = links_tx
                        .send(Hyperlink::new(target.clone(), link.depth + 1))
                        .await;
                }
                let _ = pages_tx.send(page).await;
            }
            Err(err) => {
                tracing::trace!("ignoring URL: {}", err);
                let _ = pending_tx.send(-1).await;
            }
        }

        // Wait for the shared ticker before starting the next load
        if let Some(ticker) = &throttle {
            ticker.lock().await.tick().await;
        }
    }
}

/// Deduper stage: admits each canonical URL to the queue at most once
///
/// Owns the seen set and the admission counter. Discarded links (already
/// seen, over the page limit, past the depth limit) post -1. Admitted
/// links post nothing: their +1 stays live until a loader fails them or
/// the ingestor stores their page.
async fn dedup_links(
    mut links_rx: mpsc::Receiver<Hyperlink>,
    queue: Arc<HyperlinkQueue>,
    pending_tx: mpsc::Sender<i64>,
    config: CrawlConfig,
) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut admitted: usize = 0;

    while let Some(link) = links_rx.recv().await {
        if seen.contains(&link.url) {
            let _ = pending_tx.send(-1).await;
        } else if config.max_pages_to_load > 0 && admitted >= config.max_pages_to_load {
            seen.insert(link.url);
            let _ = pending_tx.send(-1).await;
        } else if config.max_crawl_depth > 0 && link.depth > config.max_crawl_depth {
            seen.insert(link.url);
            let _ = pending_tx.send(-1).await;
        } else {
            tracing::trace!("queuing up URL {}", link.url);
            seen.insert(link.url.clone());
            admitted += 1;
            queue.push(link);
        }
    }
}

/// Ingestor stage: the single writer of the site map
///
/// Owns the map for the duration of the crawl and hands it back when the
/// pages channel closes.
async fn ingest_pages(
    mut pages_rx: mpsc::Receiver<Page>,
    pending_tx: mpsc::Sender<i64>,
    mut site_map: SiteMap,
) -> SiteMap {
    while let Some(page) = pages_rx.recv().await {
        let url = page.url.clone();
        match site_map.add_page(page) {
            Ok(true) => {}
            Ok(false) => tracing::debug!("page already present in site map: {}", url),
            Err(err) => tracing::warn!("{}", err),
        }
        let _ = pending_tx.send(-1).await;
    }
    site_map
}

/// Dispatcher stage: moves queued hyperlinks onto the load channel
///
/// Blocks while a link is being handed to a loader. When the queue is
/// empty it checks the finished signal without blocking, then sleeps
/// briefly and polls again.
async fn dispatch_queue(
    queue: Arc<HyperlinkQueue>,
    load_tx: mpsc::Sender<Hyperlink>,
    finished_rx: watch::Receiver<bool>,
) {
    loop {
        if let Some(link) = queue.pop() {
            if load_tx.send(link).await.is_err() {
                // all loaders are gone
                return;
            }
        } else {
            if *finished_rx.borrow() {
                return;
            }
            tokio::time::sleep(DISPATCH_IDLE_POLL).await;
        }
    }
}

/// Monitor stage: sums work deltas and declares termination at zero
///
/// Every unit of work enters the loop with exactly one +1 and leaves with
/// exactly one -1, so the running sum equals the number of links and pages
/// in flight across all channels and the queue. Dropping the receiver on
/// exit makes any straggling delta send a no-op.
async fn monitor_progress(mut pending_rx: mpsc::Receiver<i64>, finished_tx: watch::Sender<bool>) {
    let mut in_flight: i64 = 0;
    while let Some(delta) = pending_rx.recv().await {
        in_flight += delta;
        if in_flight <= 0 {
            tracing::debug!("no work left in flight, stopping the pipeline");
            let _ = finished_tx.send(true);
            return;
        }
    }
}
