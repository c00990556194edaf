//! Per-hash readers-writer lock registry.
//!
//! One lock per distinct hash, created lazily on first request and never
//! evicted during the process lifetime (the working set is bounded by the
//! number of distinct in-flight hashes). Mirrors the `DATASTORE_MAP`
//! lazily-populated map pattern used by `pbs-datastore::datastore` for
//! caching per-name datastore state.
//!
//! Read locks are held while a chunk is being written and the
//! [`IntervalSet`](crate::interval_set::IntervalSet) updated, so unlimited
//! chunks of one artifact progress concurrently. The write lock is held
//! only while validating the checksum and promoting the file, which
//! excludes new chunk writes for that hash (and only that hash — lock
//! acquisition never spans two hashes, so cross-hash deadlock is
//! structurally impossible).

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{ArcRwLockReadGuard, ArcRwLockWriteGuard, Mutex, RawRwLock, RwLock};

#[derive(Default)]
pub struct ArtifactLockRegistry {
    locks: Mutex<HashMap<String, Arc<RwLock<()>>>>,
}

pub type ArtifactReadGuard = ArcRwLockReadGuard<RawRwLock, ()>;
pub type ArtifactWriteGuard = ArcRwLockWriteGuard<RawRwLock, ()>;

impl ArtifactLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_or_create(&self, hash: &str) -> Arc<RwLock<()>> {
        let mut locks = self.locks.lock();
        locks
            .entry(hash.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    /// Acquire the read (shared) lock for `hash`. Hold the returned guard
    /// for the duration of the chunk write.
    pub fn read(&self, hash: &str) -> ArtifactReadGuard {
        self.get_or_create(hash).read_arc()
    }

    /// Acquire the write (exclusive) lock for `hash`. Hold the returned
    /// guard for the duration of checksum validation and promotion.
    pub fn write(&self, hash: &str) -> ArtifactWriteGuard {
        self.get_or_create(hash).write_arc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc as StdArc;

    #[test]
    fn independent_hashes_dont_serialize() {
        let registry = StdArc::new(ArtifactLockRegistry::new());
        let counter = StdArc::new(AtomicUsize::new(0));

        std::thread::scope(|scope| {
            for i in 0..8 {
                let registry = registry.clone();
                let counter = counter.clone();
                scope.spawn(move || {
                    let _guard = registry.read(&format!("hash-{i}"));
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            }
        });

        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn write_lock_excludes_read_lock_on_same_hash() {
        let registry = ArtifactLockRegistry::new();
        let _write_guard = registry.write("same-hash");
        assert!(registry.get_or_create("same-hash").try_read().is_none());
    }

    #[test]
    fn same_hash_reuses_same_lock() {
        let registry = ArtifactLockRegistry::new();
        let a = registry.get_or_create("x");
        let b = registry.get_or_create("x");
        assert!(Arc::ptr_eq(&a, &b));
    }
}
