//! Message corpus: the bounded, append-mostly collection every search scans.

use crate::model::{LinkMetadata, Message};
use std::collections::HashSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

pub mod file;

pub use file::{CorpusFile, CorpusFileError};

pub const DEFAULT_MAX_MESSAGES: usize = 10_000;
pub const DEFAULT_EVICTION_CHUNK: usize = 1_000;

/// Storage seam for the corpus. Scans work on snapshots, so a scan never
/// observes an append or an eviction that happens while it runs.
pub trait CorpusRepository: Send + Sync {
    fn get(&self, id: u64) -> Option<Arc<Message>>;
    /// Returns false if a message with the same id is already stored.
    fn append(&self, message: Message) -> bool;
    fn scan_all(&self) -> Vec<Arc<Message>>;
    /// Removes up to `n` of the oldest entries and returns how many went.
    fn evict_oldest(&self, n: usize) -> usize;
    fn clear(&self) -> usize;
    fn len(&self) -> usize;
    /// Replaces the link metadata of a stored message.
    fn update_links(&self, id: u64, links: Vec<LinkMetadata>) -> bool;
    /// Orders entries by their timestamp string, oldest first.
    fn sort_by_timestamp(&self);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, id: u64) -> bool {
        self.get(id).is_some()
    }
}

#[derive(Default)]
struct Entries {
    messages: Vec<Arc<Message>>,
    ids: HashSet<u64>,
}

pub struct InMemoryCorpus {
    entries: RwLock<Entries>,
}

impl Default for InMemoryCorpus {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCorpus {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
        }
    }

    /// Builds a corpus from persisted messages, dropping duplicate ids.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        let corpus = Self::new();
        for message in messages {
            corpus.append(message);
        }
        corpus
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl CorpusRepository for InMemoryCorpus {
    fn get(&self, id: u64) -> Option<Arc<Message>> {
        self.read().messages.iter().find(|m| m.id == id).cloned()
    }

    fn contains(&self, id: u64) -> bool {
        self.read().ids.contains(&id)
    }

    fn append(&self, message: Message) -> bool {
        let mut entries = self.write();
        if !entries.ids.insert(message.id) {
            return false;
        }
        entries.messages.push(Arc::new(message));
        true
    }

    fn scan_all(&self) -> Vec<Arc<Message>> {
        self.read().messages.clone()
    }

    fn evict_oldest(&self, n: usize) -> usize {
        let mut entries = self.write();
        let n = n.min(entries.messages.len());
        let evicted: Vec<Arc<Message>> = entries.messages.drain(..n).collect();
        for message in &evicted {
            entries.ids.remove(&message.id);
        }
        n
    }

    fn clear(&self) -> usize {
        let mut entries = self.write();
        let count = entries.messages.len();
        entries.messages.clear();
        entries.ids.clear();
        count
    }

    fn len(&self) -> usize {
        self.read().messages.len()
    }

    fn update_links(&self, id: u64, links: Vec<LinkMetadata>) -> bool {
        let mut entries = self.write();
        let Some(slot) = entries.messages.iter_mut().find(|m| m.id == id) else {
            return false;
        };
        let mut updated = (**slot).clone();
        updated.links = links;
        *slot = Arc::new(updated);
        true
    }

    fn sort_by_timestamp(&self) {
        self.write()
            .messages
            .sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    }
}

/// Evicts the oldest `chunk` entries whenever the corpus exceeds `max`.
/// Returns the number of evicted messages.
pub fn enforce_capacity(corpus: &dyn CorpusRepository, max: usize, chunk: usize) -> usize {
    let len = corpus.len();
    if len <= max {
        return 0;
    }
    let evicted = corpus.evict_oldest(chunk.max(len - max));
    info!(
        "Corpus limit reached, evicted {} oldest messages ({} remain)",
        evicted,
        corpus.len()
    );
    evicted
}

/// Keeps only the newest `max` entries.
pub fn retain_newest(corpus: &dyn CorpusRepository, max: usize) -> usize {
    let len = corpus.len();
    if len <= max {
        return 0;
    }
    corpus.evict_oldest(len - max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{link, message};

    fn filled(n: u64) -> InMemoryCorpus {
        let corpus = InMemoryCorpus::new();
        for i in 0..n {
            corpus.append(message(i, "general", "hallo", "2024-01-01 00:00:00"));
        }
        corpus
    }

    #[test]
    fn test_append_rejects_duplicate_ids() {
        let corpus = InMemoryCorpus::new();
        assert!(corpus.append(message(1, "a", "x", "2024-01-01 00:00:00")));
        assert!(!corpus.append(message(1, "b", "y", "2024-01-01 00:00:00")));
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.get(1).unwrap().channel, "a");
    }

    #[test]
    fn test_contains_tracks_ids() {
        let corpus = filled(3);
        assert!(corpus.contains(2));
        assert!(!corpus.contains(3));
        corpus.clear();
        assert!(!corpus.contains(2));
        assert!(corpus.append(message(2, "general", "neu", "2024-01-02 00:00:00")));
        assert!(corpus.contains(2));
    }

    #[test]
    fn test_eviction_removes_oldest_and_frees_ids() {
        let corpus = filled(5);
        assert_eq!(corpus.evict_oldest(2), 2);
        let ids: Vec<u64> = corpus.scan_all().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        assert!(!corpus.contains(0));
        assert!(corpus.append(message(0, "general", "wieder da", "2024-01-02 00:00:00")));
        assert_eq!(corpus.evict_oldest(100), 4);
        assert!(corpus.is_empty());
    }

    #[test]
    fn test_snapshot_unaffected_by_later_eviction() {
        let corpus = filled(3);
        let snapshot = corpus.scan_all();
        corpus.evict_oldest(3);
        assert_eq!(snapshot.len(), 3);
        assert_eq!(corpus.len(), 0);
    }

    #[test]
    fn test_enforce_capacity_evicts_a_chunk() {
        let corpus = filled(11);
        assert_eq!(enforce_capacity(&corpus, 10, 4), 4);
        assert_eq!(corpus.len(), 7);
        assert_eq!(corpus.scan_all()[0].id, 4);
        assert_eq!(enforce_capacity(&corpus, 10, 4), 0);
    }

    #[test]
    fn test_retain_newest() {
        let corpus = filled(6);
        assert_eq!(retain_newest(&corpus, 4), 2);
        assert_eq!(corpus.scan_all()[0].id, 2);
    }

    #[test]
    fn test_update_links_replaces_entry() {
        let corpus = filled(2);
        let before = corpus.scan_all();
        assert!(corpus.update_links(1, vec![link("https://a.io", "A", "d", "a.io")]));
        assert!(!corpus.update_links(99, Vec::new()));
        assert_eq!(corpus.get(1).unwrap().links.len(), 1);
        assert!(before[1].links.is_empty());
    }

    #[test]
    fn test_sort_by_timestamp_and_clear() {
        let corpus = InMemoryCorpus::new();
        corpus.append(message(1, "a", "x", "2024-03-01 00:00:00"));
        corpus.append(message(2, "a", "x", "2024-01-01 00:00:00"));
        corpus.sort_by_timestamp();
        let ids: Vec<u64> = corpus.scan_all().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(corpus.clear(), 2);
        assert!(corpus.is_empty());
    }
}
