//! In-memory queue of hyperlinks waiting to be loaded

use std::collections::VecDeque;
use std::sync::Mutex;

/// A page hyperlink queued for crawling, with its metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperlink {
    /// Canonical URL to load
    pub url: String,

    /// Breadth-first depth from the seed; the seed itself is depth 1
    pub depth: usize,
}

impl Hyperlink {
    /// Creates a new hyperlink descriptor
    pub fn new(url: impl Into<String>, depth: usize) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// An in-memory, thread-safe FIFO queue of hyperlinks
///
/// Every operation takes the internal mutex, so concurrent pushes and pops
/// behave as if serialized and pops observe the global push order. The
/// queue is unbounded and never blocks.
#[derive(Debug, Default)]
pub struct HyperlinkQueue {
    queue: Mutex<VecDeque<Hyperlink>>,
}

impl HyperlinkQueue {
    /// Creates an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a new item onto the end of the queue
    pub fn push(&self, item: Hyperlink) {
        self.queue.lock().unwrap().push_back(item);
    }

    /// Removes and returns the item at the head of the queue, if any
    pub fn pop(&self) -> Option<Hyperlink> {
        self.queue.lock().unwrap().pop_front()
    }

    /// Returns the number of items in the queue
    pub fn len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    /// Returns true if the queue holds no items
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
