//! Weakly-held values shared between documents with identical content.

use std::hash::{BuildHasher as _, Hash};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;

/// Content fingerprint used as a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Checksum(u64);

impl Checksum {
    pub fn of<T: Hash + ?Sized>(content: &T) -> Self {
        Self(FxBuildHasher.hash_one(content))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

const DEFAULT_CLEANUP_THRESHOLD: usize = 1024;

/// A thread-safe map from checksums to weakly held values.
///
/// Entries never keep their values alive. Every `cleanup_threshold`
/// insertions the map is swept and entries whose value is gone are removed.
pub struct WeakCache<V> {
    entries: DashMap<Checksum, Weak<V>, FxBuildHasher>,
    insertions: AtomicUsize,
    cleanup_threshold: usize,
}

impl<V> Default for WeakCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CLEANUP_THRESHOLD)
    }
}

impl<V> WeakCache<V> {
    #[track_caller]
    pub fn new(cleanup_threshold: usize) -> Self {
        assert!(cleanup_threshold > 0, "cleanup threshold must be positive");
        Self {
            entries: DashMap::with_hasher(FxBuildHasher),
            insertions: AtomicUsize::new(0),
            cleanup_threshold,
        }
    }

    pub fn get(&self, checksum: Checksum) -> Option<Arc<V>> {
        self.entries.get(&checksum)?.upgrade()
    }

    /// Returns the live value for `checksum` that satisfies `is_match`,
    /// creating it with `make` if there is none.
    ///
    /// `make` runs without holding any lock, so two racing callers may both
    /// run it; the first value stored wins. A live entry that fails
    /// `is_match` is a checksum collision: it stays cached and the fresh
    /// value is returned unshared.
    pub fn get_or_insert_with(
        &self,
        checksum: Checksum,
        is_match: impl Fn(&V) -> bool,
        make: impl FnOnce() -> V,
    ) -> Arc<V> {
        if let Some(value) = self.get(checksum)
            && is_match(&value)
        {
            return value;
        }

        let value = Arc::new(make());
        let value = {
            let mut entry = self.entries.entry(checksum).or_default();
            match entry.upgrade() {
                Some(existing) if is_match(&existing) => existing,
                Some(_) => {
                    tracing::debug!(checksum = checksum.value(), "checksum collision");
                    return value;
                }
                None => {
                    *entry = Arc::downgrade(&value);
                    value
                }
            }
        };

        let insertions = self.insertions.fetch_add(1, Ordering::Relaxed) + 1;
        if insertions % self.cleanup_threshold == 0 {
            self.cleanup();
        }
        value
    }

    /// Drops entries whose values are gone.
    pub fn cleanup(&self) {
        let before = self.entries.len();
        self.entries.retain(|_, value| value.strong_count() > 0);
        tracing::debug!(before, after = self.entries.len(), "swept weak cache");
    }

    /// Number of entries, live or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_live_values() {
        let cache = WeakCache::default();
        let checksum = Checksum::of("<p>@x</p>");

        let first = cache.get_or_insert_with(checksum, |_| true, || String::from("first"));
        let second = cache.get_or_insert_with(checksum, |_| true, || String::from("second"));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*second, "first");
    }

    #[test]
    fn does_not_keep_values_alive() {
        let cache = WeakCache::default();
        let checksum = Checksum::of(&1_u32);

        drop(cache.get_or_insert_with(checksum, |_| true, || 1_u32));
        assert!(cache.get(checksum).is_none());

        let fresh = cache.get_or_insert_with(checksum, |_| true, || 2_u32);
        assert_eq!(*fresh, 2);
    }

    #[test]
    fn threshold_triggers_cleanup() {
        let cache = WeakCache::new(4);
        for key in 1..4_u32 {
            drop(cache.get_or_insert_with(Checksum::of(&key), |_| true, || key));
        }
        assert_eq!(cache.len(), 3);

        // The fourth insertion sweeps the three dead entries.
        let kept = cache.get_or_insert_with(Checksum::of(&0_u32), |_| true, || 0_u32);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(Checksum::of(&0_u32)), Some(kept));
    }

    #[test]
    fn colliding_values_are_not_shared() {
        let cache = WeakCache::default();
        let checksum = Checksum::of("shared");
        let is = |expected: &'static str| move |value: &String| value == expected;

        let first = cache.get_or_insert_with(checksum, is("a"), || String::from("a"));
        let second = cache.get_or_insert_with(checksum, is("b"), || String::from("b"));

        assert_eq!(*second, "b");
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(cache.get(checksum), Some(Arc::clone(&first)));
        assert_eq!(cache.len(), 1);

        drop(first);
        let third = cache.get_or_insert_with(checksum, is("b"), || String::from("b"));
        assert_eq!(cache.get(checksum), Some(third));
    }

    #[test]
    fn checksum_depends_on_content() {
        assert_eq!(Checksum::of("a"), Checksum::of("a"));
        assert_ne!(Checksum::of("a"), Checksum::of("b"));
    }
}
