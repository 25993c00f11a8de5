//! In-process read cache with tag-based invalidation.
//!
//! Public JSON reads are cached by request path. Each entry is registered
//! under one or more tags (`posts`, `post:<slug>`, `pages`, `page:<slug>`),
//! and admin writes invalidate by tag. Entries leave the tag index when
//! moka evicts or expires them, so the index never outgrows the cache.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use moka::future::Cache;
use moka::notification::RemovalCause;
use tracing::debug;

/// Default TTL for cached entries (60 seconds).
const TTL_SECS: u64 = 60;

/// Maximum number of cached entries.
const MAX_CAPACITY: u64 = 10_000;

/// Tag covering every post listing and post detail.
pub const POSTS_TAG: &str = "posts";

/// Tag covering every site page.
pub const PAGES_TAG: &str = "pages";

/// Tag covering the category list.
pub const CATEGORIES_TAG: &str = "categories";

/// Tag for a single post.
pub fn post_tag(slug: &str) -> String {
    format!("post:{slug}")
}

/// Read cache shared across handlers.
#[derive(Clone)]
pub struct CacheLayer {
    inner: Arc<CacheLayerInner>,
}

struct CacheLayerInner {
    entries: Cache<String, CachedEntry>,

    /// Tag to the keys registered under it.
    tags: Arc<TagIndex>,
}

type TagIndex = DashMap<String, HashSet<String>>;

#[derive(Clone)]
struct CachedEntry {
    body: String,
    tags: Arc<[String]>,
}

impl CacheLayer {
    /// Create a cache with the default TTL and capacity.
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(TTL_SECS))
    }

    /// Create a cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        let tags = Arc::new(TagIndex::new());
        let index = Arc::clone(&tags);
        let entries = Cache::builder()
            .max_capacity(MAX_CAPACITY)
            .time_to_live(ttl)
            .eviction_listener(move |key: Arc<String>, entry: CachedEntry, cause| {
                // A replaced key is re-registered by the `set` that replaced it.
                if cause != RemovalCause::Replaced {
                    unregister(&index, &key, &entry.tags);
                }
            })
            .build();

        Self {
            inner: Arc::new(CacheLayerInner { entries, tags }),
        }
    }

    /// Get a cached value.
    pub async fn get(&self, key: &str) -> Option<String> {
        let entry = self.inner.entries.get(key).await?;
        debug!(key = %key, "cache hit");
        Some(entry.body)
    }

    /// Store a value and register it under `tags`.
    pub async fn set(&self, key: &str, value: String, tags: &[&str]) {
        let entry = CachedEntry {
            body: value,
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
        };
        self.inner.entries.insert(key.to_string(), entry).await;

        for tag in tags {
            self.inner
                .tags
                .entry((*tag).to_string())
                .or_default()
                .insert(key.to_string());
        }

        debug!(key = %key, tags = ?tags, "cache set");
    }

    /// Invalidate every key registered under `tag`.
    pub async fn invalidate_tag(&self, tag: &str) {
        let Some((_, keys)) = self.inner.tags.remove(tag) else {
            return;
        };

        for key in &keys {
            self.inner.entries.invalidate(key).await;
        }

        debug!(tag = %tag, keys_invalidated = %keys.len(), "tag invalidated");
    }

    /// Invalidate several tags.
    pub async fn invalidate_tags(&self, tags: &[&str]) {
        for tag in tags {
            self.invalidate_tag(tag).await;
        }
    }

    /// Number of live entries (approximate, for tests and diagnostics).
    pub async fn entry_count(&self) -> u64 {
        self.inner.entries.run_pending_tasks().await;
        self.inner.entries.entry_count()
    }
}

/// Drop `key` from each of `tags`, removing tags left without keys.
fn unregister(index: &TagIndex, key: &str, tags: &[String]) {
    for tag in tags {
        let Some(mut keys) = index.get_mut(tag) else {
            continue;
        };
        keys.remove(key);
        let emptied = keys.is_empty();
        drop(keys);
        if emptied {
            index.remove_if(tag, |_, keys| keys.is_empty());
        }
    }
}

impl Default for CacheLayer {
    fn default() -> Self {
        Self::new()
    }
}
