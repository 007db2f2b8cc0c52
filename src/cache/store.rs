//! Keyed store of feed cache entries.

use moka::ops::compute::Op;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use serde::Deserialize;
use tracing::debug;

use super::CacheEntry;
use crate::telemetry;
use crate::types::{CacheKey, ImageRecord, Visibility};

/// Default maximum number of views kept in the cache.
const DEFAULT_MAX_KEYS: u64 = 256;

/// Configuration for the feed cache.
///
/// ```rust
/// # use vitrine::CacheConfig;
/// let config = CacheConfig::new().max_keys(32);
/// assert_eq!(config.max_keys, 32);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of (filter, tags) views held at once. Least recently
    /// used views are evicted whole. Default: 256.
    #[serde(default = "default_max_keys")]
    pub max_keys: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_keys: DEFAULT_MAX_KEYS,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached views.
    pub fn max_keys(mut self, n: u64) -> Self {
        self.max_keys = n;
        self
    }
}

fn default_max_keys() -> u64 {
    DEFAULT_MAX_KEYS
}

/// In-memory store mapping a view's [`CacheKey`] to its [`CacheEntry`].
///
/// Backed by a bounded moka cache, so it is safe to share between views and
/// tasks. Updates to a single key go through moka's per-key compute, which
/// serializes concurrent writers to the same entry.
pub struct CacheStore {
    entries: Cache<CacheKey, CacheEntry>,
}

impl CacheStore {
    /// Entries are evicted least recently used first, so the view just
    /// written is never the one dropped.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(config.max_keys)
                .eviction_policy(EvictionPolicy::lru())
                .build(),
        }
    }

    /// Look up the entry for `key`. Emits cache hit/miss metrics.
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let entry = self.entries.get(key);
        if entry.is_some() {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
        } else {
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
        }
        entry
    }

    /// Replace the entry for `key` wholesale.
    pub fn put(&self, key: CacheKey, entry: CacheEntry) {
        self.entries.insert(key, entry);
    }

    /// Merge `images` into the entry for `key`, skipping ids already present.
    ///
    /// Returns the records that were genuinely new. Appending to a key with
    /// no entry does nothing.
    pub fn append(&self, key: &CacheKey, images: Vec<ImageRecord>) -> Vec<ImageRecord> {
        let mut added = Vec::new();
        self.entries.entry_by_ref(key).and_compute_with(|current| match current {
            Some(current) => {
                let mut entry = current.into_value();
                added = entry.merge(images);
                Op::Put(entry)
            }
            None => Op::Nop,
        });
        if added.is_empty() {
            debug!(%key, "append added no new images");
        }
        added
    }

    /// Record the pagination state for `key`.
    ///
    /// Returns `false` if there is no entry for `key`.
    pub fn set_pagination(&self, key: &CacheKey, next_page: u32, has_more: bool) -> bool {
        self.update(key, |entry| {
            entry.next_page = next_page;
            entry.has_more = has_more;
            true
        })
    }

    /// Put `image` at the front of the entry for `key`.
    ///
    /// Pagination state is untouched. Returns `false` if there is no entry
    /// or the id is already present.
    pub fn prepend(&self, key: &CacheKey, image: ImageRecord) -> bool {
        self.update(key, |entry| entry.prepend(image))
    }

    /// Remove the image with `id` from every cached view.
    ///
    /// Returns the number of views that held it.
    pub fn remove_image(&self, id: &str) -> usize {
        let holders: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.contains(id))
            .map(|(key, _)| CacheKey::clone(&key))
            .collect();
        holders
            .iter()
            .filter(|key| self.update(key, |entry| entry.remove(id)))
            .count()
    }

    /// Drop the entry for one view.
    pub fn invalidate(&self, key: &CacheKey) {
        self.entries.invalidate(key);
    }

    /// Drop every view with the given visibility filter.
    pub fn invalidate_visibility(&self, visibility: Visibility) {
        let keys: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(key, _)| key.visibility == visibility)
            .map(|(key, _)| CacheKey::clone(&key))
            .collect();
        for key in &keys {
            self.entries.invalidate(key);
        }
    }

    /// Drop every entry; the next view of any filter refetches.
    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
        debug!("feed cache invalidated");
    }

    /// Number of views currently cached.
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply `f` to the entry for `key`, writing it back only if `f` reports
    /// a change.
    fn update<F>(&self, key: &CacheKey, f: F) -> bool
    where
        F: FnOnce(&mut CacheEntry) -> bool,
    {
        let mut changed = false;
        self.entries.entry_by_ref(key).and_compute_with(|current| {
            let Some(current) = current else {
                return Op::Nop;
            };
            let mut entry = current.into_value();
            changed = f(&mut entry);
            if changed { Op::Put(entry) } else { Op::Nop }
        });
        changed
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TagSet;

    fn image(id: &str) -> ImageRecord {
        ImageRecord::new(id, format!("https://cdn.test/{id}.png"))
    }

    fn key(tags: &[&str]) -> CacheKey {
        CacheKey::new(Visibility::Public, TagSet::new(tags))
    }

    #[test]
    fn get_on_empty_store_misses() {
        let store = CacheStore::default();
        assert!(store.get(&key(&[])).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn put_then_get_with_reordered_tags() {
        let store = CacheStore::default();
        store.put(key(&["a", "b"]), CacheEntry::first_page(vec![image("1")], true));
        let entry = store.get(&key(&["b", "a"])).unwrap();
        assert_eq!(entry.len(), 1);
    }

    #[test]
    fn append_only_counts_new_ids() {
        let store = CacheStore::default();
        let k = key(&[]);
        store.put(k.clone(), CacheEntry::first_page(vec![image("1"), image("2")], true));

        let added = store.append(&k, vec![image("2"), image("3")]);
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].id, "3");
        assert_eq!(store.get(&k).unwrap().len(), 3);
    }

    #[test]
    fn append_to_missing_key_is_noop() {
        let store = CacheStore::default();
        assert!(store.append(&key(&[]), vec![image("1")]).is_empty());
        assert!(store.get(&key(&[])).is_none());
    }

    #[test]
    fn set_pagination_updates_cursor() {
        let store = CacheStore::default();
        let k = key(&[]);
        assert!(!store.set_pagination(&k, 2, false));

        store.put(k.clone(), CacheEntry::first_page(vec![image("1")], true));
        assert!(store.set_pagination(&k, 2, false));
        let entry = store.get(&k).unwrap();
        assert_eq!(entry.next_page, 2);
        assert!(!entry.has_more);
    }

    #[test]
    fn newest_entry_survives_eviction() {
        let store = CacheStore::new(&CacheConfig::new().max_keys(2));
        let (a, b, c) = (key(&["a"]), key(&["b"]), key(&["c"]));
        store.put(a.clone(), CacheEntry::first_page(vec![image("1")], true));
        store.put(b.clone(), CacheEntry::first_page(vec![image("2")], true));
        for _ in 0..8 {
            store.get(&a);
            store.get(&b);
        }

        store.put(c.clone(), CacheEntry::first_page(vec![image("3")], true));
        assert_eq!(store.len(), 2);
        assert!(store.get(&c).is_some());
        assert!(store.set_pagination(&c, 2, true));
    }

    #[test]
    fn prepend_keeps_pagination() {
        let store = CacheStore::default();
        let k = key(&[]);
        store.put(k.clone(), CacheEntry::first_page(vec![image("1")], true));
        assert!(store.prepend(&k, image("0")));

        let entry = store.get(&k).unwrap();
        assert_eq!(entry.images[0].id, "0");
        assert_eq!(entry.next_page, 1);
        assert!(entry.has_more);
    }

    #[test]
    fn remove_image_touches_every_view() {
        let store = CacheStore::default();
        store.put(key(&["a"]), CacheEntry::first_page(vec![image("1"), image("2")], true));
        store.put(key(&["b"]), CacheEntry::first_page(vec![image("1")], true));
        store.put(key(&["c"]), CacheEntry::first_page(vec![image("3")], true));

        assert_eq!(store.remove_image("1"), 2);
        assert!(!store.get(&key(&["a"])).unwrap().contains("1"));
        assert!(store.get(&key(&["b"])).unwrap().is_empty());
        assert_eq!(store.get(&key(&["c"])).unwrap().len(), 1);
    }

    #[test]
    fn invalidate_visibility_keeps_other_scope() {
        let store = CacheStore::default();
        let private = CacheKey::untagged(Visibility::Private);
        store.put(key(&[]), CacheEntry::first_page(vec![image("1")], true));
        store.put(private.clone(), CacheEntry::first_page(vec![image("2")], true));

        store.invalidate_visibility(Visibility::Private);
        assert!(store.get(&private).is_none());
        assert!(store.get(&key(&[])).is_some());
    }

    #[test]
    fn invalidate_all_drops_everything() {
        let store = CacheStore::default();
        store.put(key(&["a"]), CacheEntry::first_page(vec![image("1")], true));
        store.put(key(&["b"]), CacheEntry::first_page(vec![image("2")], true));
        store.invalidate_all();
        assert!(store.get(&key(&["a"])).is_none());
        assert!(store.get(&key(&["b"])).is_none());
        assert!(store.is_empty());
    }
}
