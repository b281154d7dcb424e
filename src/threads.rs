use crate::model::ThreadContext;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

pub const DEFAULT_THREAD_CAPACITY: usize = 1000;

/// Follow-up contexts keyed by thread id. Bounded by an LRU; contexts are never
/// persisted and have no expiry beyond eviction.
#[derive(Clone)]
pub struct ThreadContextStore {
    cache: Arc<Mutex<LruCache<u64, ThreadContext>>>,
}

impl ThreadContextStore {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(cap))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<u64, ThreadContext>> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn insert(&self, context: ThreadContext) {
        self.lock().put(context.key, context);
    }

    pub fn get(&self, key: u64) -> Option<ThreadContext> {
        self.lock().get(&key).cloned()
    }

    pub fn remove(&self, key: u64) -> Option<ThreadContext> {
        self.lock().pop(&key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ThreadContextStore {
    fn default() -> Self {
        Self::new(DEFAULT_THREAD_CAPACITY)
    }
}
