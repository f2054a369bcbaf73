//! Bounded memo of response bodies, keyed by request URL

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Raw body of a successful response
pub type Body = Arc<[u8]>;

/// Response bodies of idempotent GETs.
///
/// Holds at most `capacity` entries; inserting beyond that evicts the
/// oldest insertion. A capacity of 0 stores nothing.
#[derive(Debug)]
pub struct ResponseCache {
    capacity: usize,
    inner: Mutex<CacheInner>,
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<String, Body>,
    order: VecDeque<String>,
}

impl ResponseCache {
    pub fn new(capacity: usize) -> Self {
        ResponseCache {
            capacity,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    pub fn get(&self, url: &str) -> Option<Body> {
        self.inner.lock().entries.get(url).cloned()
    }

    pub fn insert(&self, url: String, body: Body) {
        if self.capacity == 0 {
            return;
        }

        let mut inner = self.inner.lock();
        if inner.entries.insert(url.clone(), body).is_some() {
            return;
        }
        inner.order.push_back(url);

        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
            }
        }
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
