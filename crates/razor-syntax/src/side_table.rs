//! Out-of-line storage for rarely present per-node data.
//!
//! Entries are keyed by the address of the owning green node. A node only
//! ever inserts under its own address, and [`GreenNode`]'s drop glue removes
//! the entry before the allocation is released, so the tables never keep a
//! node alive and never serve a stale entry to a node that reuses the address.
//!
//! [`GreenNode`]: crate::GreenNode

use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use razor_errors::RazorDiagnostic;
use rustc_hash::FxBuildHasher;

use crate::SyntaxAnnotation;

pub(crate) static ANNOTATIONS: LazyLock<SideTable<SyntaxAnnotation>> =
    LazyLock::new(SideTable::new);

pub(crate) static DIAGNOSTICS: LazyLock<SideTable<RazorDiagnostic>> =
    LazyLock::new(SideTable::new);

pub(crate) struct SideTable<T> {
    entries: DashMap<usize, Arc<[T]>, FxBuildHasher>,
}

impl<T> SideTable<T> {
    fn new() -> Self {
        Self { entries: DashMap::with_hasher(FxBuildHasher) }
    }

    pub(crate) fn insert(&self, key: usize, values: Arc<[T]>) {
        let previous = self.entries.insert(key, values);
        debug_assert!(previous.is_none(), "side-table entry for {key:#x} was not cleaned up");
    }

    pub(crate) fn get(&self, key: usize) -> Option<Arc<[T]>> {
        self.entries.get(&key).map(|entry| Arc::clone(entry.value()))
    }

    pub(crate) fn remove(&self, key: usize) {
        // The removed values are dropped after the shard lock is released.
        let _removed = self.entries.remove(&key);
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, key: usize) -> bool {
        self.entries.contains_key(&key)
    }

    #[cfg(test)]
    pub(crate) fn any(&self, predicate: impl Fn(&T) -> bool) -> bool {
        self.entries.iter().any(|entry| entry.value().iter().any(&predicate))
    }
}
