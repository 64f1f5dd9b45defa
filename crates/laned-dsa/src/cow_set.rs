use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;

/// A copy-on-write set: lock-free reads via an [`ArcSwap`] snapshot, locked
/// writes that rebuild and publish a new `Vec`.
///
/// Grounded in the same read-mostly hot-swap shape used for routing tables
/// elsewhere in the wider ecosystem (an `ArcSwap`-backed table published in
/// one atomic `store`, read by any number of concurrent readers without
/// taking a lock). Writes take an internal mutex only to serialize the
/// read-modify-publish sequence against other writers; readers never
/// contend with it.
pub struct CowSet<T> {
    inner: ArcSwap<Vec<T>>,
    write_lock: Mutex<()>,
}

impl<T: Clone + PartialEq> Default for CowSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq> CowSet<T> {
    pub fn new() -> Self {
        Self {
            inner: ArcSwap::from_pointee(Vec::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Inserts `item` unconditionally (the set does not deduplicate by
    /// equality; callers insert freshly-created handles).
    pub fn insert(&self, item: T) {
        let _write = self.write_lock.lock().expect("CowSet write lock poisoned");
        let mut next = (**self.inner.load()).clone();
        next.push(item);
        self.inner.store(Arc::new(next));
    }

    /// Removes the first element equal to `item`. Returns whether an element
    /// was actually removed (idempotent: a second call for the same item is
    /// a no-op that returns `false`).
    pub fn remove(&self, item: &T) -> bool {
        let _write = self.write_lock.lock().expect("CowSet write lock poisoned");
        let current = self.inner.load();
        if !current.iter().any(|existing| existing == item) {
            return false;
        }
        let next: Vec<T> = current.iter().filter(|existing| *existing != item).cloned().collect();
        self.inner.store(Arc::new(next));
        true
    }

    /// Lock-free read of the current size.
    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A point-in-time snapshot safe to iterate without holding any lock;
    /// concurrent `insert`/`remove` calls during iteration never observe a
    /// torn read and never double-visit or skip an element relative to this
    /// snapshot.
    pub fn snapshot(&self) -> Arc<Vec<T>> {
        self.inner.load_full()
    }

    /// Atomically empties the set and returns the snapshot that was in
    /// effect immediately before clearing, so the caller can close each
    /// member exactly once.
    pub fn clear(&self) -> Arc<Vec<T>> {
        let _write = self.write_lock.lock().expect("CowSet write lock poisoned");
        self.inner.swap(Arc::new(Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_remove() {
        let set: CowSet<u32> = CowSet::new();
        set.insert(1);
        set.insert(2);
        assert_eq!(set.len(), 2);
        assert!(set.remove(&1));
        assert_eq!(set.len(), 1);
        // idempotent: removing again is a no-op, not an error
        assert!(!set.remove(&1));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn clear_empties_and_returns_prior_snapshot() {
        let set: CowSet<u32> = CowSet::new();
        set.insert(1);
        set.insert(2);
        let drained = set.clear();
        assert_eq!(drained.len(), 2);
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn snapshot_is_stable_during_concurrent_mutation() {
        let set: CowSet<u32> = CowSet::new();
        set.insert(1);
        let snap = set.snapshot();
        set.insert(2);
        set.remove(&1);
        // the earlier snapshot is untouched by later mutation
        assert_eq!(*snap, vec![1]);
        assert_eq!(set.len(), 1);
    }
}
