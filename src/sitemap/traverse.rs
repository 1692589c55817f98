//! Hierarchical traversal of the site map
//!
//! Renders the cyclic link graph as a tree: a breadth-first pass assigns
//! every reachable page its minimum height (the number of links from the
//! root along the shortest path), then a depth-first pass emits pages in
//! display order. A page is shown only where its traversal depth equals its
//! minimum height, so links back up to an ancestor are never shown, and a
//! page's children are expanded at most once, at the first place the page
//! appears.

use std::collections::{HashMap, HashSet, VecDeque};

use tokio::sync::mpsc;

use super::{Page, SiteMap};

/// One entry of the traversal stream
#[derive(Debug, Clone)]
pub struct MapNode {
    /// The page details
    pub page: Page,

    /// The depth of the page at this point of the traversal
    pub depth: usize,
}

impl SiteMap {
    /// Streams the site map into `sink` in depth-first order
    ///
    /// All qualifying links are emitted, so a page can appear multiple
    /// times, but its children are only expanded at the first appearance.
    /// Children are visited in lexicographic URL order to keep the output
    /// reproducible despite the unordered link sets. Links to pages that
    /// were never loaded are skipped silently.
    ///
    /// The sink is closed on completion.
    pub async fn traverse(&self, sink: mpsc::Sender<MapNode>) {
        let heights = self.minimum_heights();
        let mut expanded: HashSet<&str> = HashSet::new();
        let mut stack: Vec<(&str, usize)> = vec![(self.root_url.as_str(), 0)];

        while let Some((url, depth)) = stack.pop() {
            let Some(page) = self.pages.get(url) else {
                continue;
            };
            // Only show a page at its minimum height; a smaller recorded
            // height here means this is a link back up to an ancestor.
            if heights.get(url) != Some(&depth) {
                continue;
            }
            if sink
                .send(MapNode {
                    page: page.clone(),
                    depth,
                })
                .await
                .is_err()
            {
                // receiver gone, nothing left to render
                return;
            }
            if expanded.insert(url) {
                let mut children: Vec<&str> = page
                    .internal_links
                    .iter()
                    .map(String::as_str)
                    .filter(|child| *child != url)
                    .collect();
                children.sort_unstable();
                // Reverse push so the stack pops children in sorted order
                for child in children.into_iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }
    }

    /// Maps every reachable URL to the minimum height at which it appears
    ///
    /// Breadth-first from the root, recording each URL the first time it is
    /// discovered. URLs without a page record still get a height (they are
    /// link targets that were never loaded, which happens whenever only
    /// part of the site was crawled) but are not expanded.
    fn minimum_heights(&self) -> HashMap<&str, usize> {
        let mut heights = HashMap::new();
        if self.root_url.is_empty() {
            return heights;
        }

        let mut queue = VecDeque::new();
        heights.insert(self.root_url.as_str(), 0);
        queue.push_back(self.root_url.as_str());

        while let Some(url) = queue.pop_front() {
            let Some(page) = self.pages.get(url) else {
                continue;
            };
            let child_height = heights[url] + 1;
            for child in &page.internal_links {
                if !heights.contains_key(child.as_str()) {
                    heights.insert(child.as_str(), child_height);
                    queue.push_back(child.as_str());
                }
            }
        }

        heights
    }
}
