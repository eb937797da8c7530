//! Rendered page cache
//!
//! Pages are re-rendered at most once per revalidation window. Entries older
//! than the window are treated as missing and dropped on the next insert. The
//! entry count is capped, and the file watcher clears everything when content
//! changes on disk.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::page::RenderedPage;

/// Default upper bound on cached pages
pub const MAX_ENTRIES: usize = 512;

/// A rendered page and when it was produced
#[derive(Debug, Clone)]
struct CachedPage {
    page: RenderedPage,
    rendered_at: Instant,
}

/// Process-wide cache of rendered pages, keyed by request path
#[derive(Debug)]
pub struct PageCache {
    ttl: Duration,
    capacity: usize,
    entries: RwLock<HashMap<String, CachedPage>>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, MAX_ENTRIES)
    }

    pub fn with_capacity(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// A page rendered less than `ttl` ago
    pub fn get(&self, key: &str) -> Option<RenderedPage> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .filter(|cached| cached.rendered_at.elapsed() < self.ttl)
            .map(|cached| cached.page.clone())
    }

    /// Store a page, dropping expired entries and evicting the oldest at capacity
    pub fn insert(&self, key: impl Into<String>, page: RenderedPage) {
        let key = key.into();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let ttl = self.ttl;
        entries.retain(|_, cached| cached.rendered_at.elapsed() < ttl);

        while entries.len() >= self.capacity && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, cached)| cached.rendered_at)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(oldest) => {
                    entries.remove(&oldest);
                }
                None => break,
            }
        }

        entries.insert(
            key,
            CachedPage {
                page,
                rendered_at: Instant::now(),
            },
        );
    }

    pub fn invalidate_all(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let count = entries.len();
        entries.clear();
        tracing::debug!("Invalidated {} cached pages", count);
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
