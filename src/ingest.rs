//! Getting chat messages into the corpus and onto disk.

use crate::corpus::{
    enforce_capacity, retain_newest, CorpusFile, CorpusRepository, DEFAULT_EVICTION_CHUNK,
    DEFAULT_MAX_MESSAGES,
};
use crate::fetch::{find_urls, LinkFetcher};
use crate::model::Message;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Held shared by ingestion and exclusively by maintenance passes such as the
/// link backfill.
pub type MaintenanceLock = Arc<RwLock<()>>;

/// A chat message as delivered by the platform, before link extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageDraft {
    pub id: u64,
    pub author: String,
    pub author_id: Option<u64>,
    pub channel: String,
    pub channel_id: Option<u64>,
    pub guild: String,
    pub guild_id: Option<u64>,
    pub content: String,
    /// `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
    pub attachments: Vec<String>,
    pub jump_url: Option<String>,
}

impl MessageDraft {
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty() && self.attachments.is_empty()
    }

    fn into_message(self) -> Message {
        Message {
            id: self.id,
            author: self.author,
            author_id: self.author_id,
            channel: self.channel,
            channel_id: self.channel_id,
            guild: self.guild,
            guild_id: self.guild_id,
            content: self.content,
            timestamp: self.timestamp,
            attachments: self.attachments,
            jump_url: self.jump_url,
            links: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Stored { links: usize, evicted: usize },
    Empty,
    Duplicate,
}

#[derive(Clone)]
pub struct Ingestor {
    corpus: Arc<dyn CorpusRepository>,
    fetcher: Arc<dyn LinkFetcher>,
    store: Option<CorpusFile>,
    maintenance: MaintenanceLock,
    max_messages: usize,
    eviction_chunk: usize,
}

impl Ingestor {
    pub fn new(
        corpus: Arc<dyn CorpusRepository>,
        fetcher: Arc<dyn LinkFetcher>,
        maintenance: MaintenanceLock,
    ) -> Self {
        Self {
            corpus,
            fetcher,
            store: None,
            maintenance,
            max_messages: DEFAULT_MAX_MESSAGES,
            eviction_chunk: DEFAULT_EVICTION_CHUNK,
        }
    }

    pub fn with_store(mut self, store: CorpusFile) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_capacity(mut self, max_messages: usize, eviction_chunk: usize) -> Self {
        self.max_messages = max_messages;
        self.eviction_chunk = eviction_chunk;
        self
    }

    pub fn corpus(&self) -> &Arc<dyn CorpusRepository> {
        &self.corpus
    }

    /// Stores one live message with metadata for every URL it contains.
    pub async fn ingest(&self, draft: MessageDraft) -> anyhow::Result<IngestOutcome> {
        if draft.is_empty() {
            return Ok(IngestOutcome::Empty);
        }
        if self.corpus.contains(draft.id) {
            debug!("Message {} already stored", draft.id);
            return Ok(IngestOutcome::Duplicate);
        }

        let _guard = self.maintenance.read().await;

        let mut links = Vec::new();
        for url in find_urls(&draft.content) {
            links.push(self.fetcher.fetch(&url).await);
        }
        if !links.is_empty() {
            let titles: Vec<&str> = links.iter().map(|l| l.title.as_str()).collect();
            debug!("Links in message {} from {}: {:?}", draft.id, draft.author, titles);
        }
        let link_count = links.len();

        let mut message = draft.into_message();
        message.links = links;
        if !self.corpus.append(message) {
            return Ok(IngestOutcome::Duplicate);
        }

        let evicted = enforce_capacity(self.corpus.as_ref(), self.max_messages, self.eviction_chunk);
        self.persist().await?;

        let total = self.corpus.len();
        if total % 100 == 0 {
            info!("{} messages collected", total);
        }

        Ok(IngestOutcome::Stored {
            links: link_count,
            evicted,
        })
    }

    /// Bulk import of historical messages. Links are not fetched here; the
    /// backfill pass fills them in later. The corpus is re-sorted
    /// chronologically and trimmed to its newest `max_messages` entries.
    pub async fn import(&self, drafts: Vec<MessageDraft>) -> anyhow::Result<usize> {
        let _guard = self.maintenance.write().await;

        let mut added = 0;
        for draft in drafts {
            if draft.is_empty() {
                continue;
            }
            if self.corpus.append(draft.into_message()) {
                added += 1;
            }
        }

        self.corpus.sort_by_timestamp();
        let dropped = retain_newest(self.corpus.as_ref(), self.max_messages);
        if dropped > 0 {
            info!("Dropped {} old messages after history import", dropped);
        }
        self.persist().await?;

        info!("Imported {} historical messages ({} total)", added, self.corpus.len());
        Ok(added)
    }

    pub async fn clear(&self) -> anyhow::Result<usize> {
        let _guard = self.maintenance.write().await;
        let removed = self.corpus.clear();
        self.persist().await?;
        info!("Cleared {} stored messages", removed);
        Ok(removed)
    }

    /// Writes the current corpus to the backing file, if one is configured.
    pub async fn persist(&self) -> anyhow::Result<()> {
        persist_corpus(self.corpus.as_ref(), self.store.as_ref()).await
    }
}

pub(crate) async fn persist_corpus(
    corpus: &dyn CorpusRepository,
    store: Option<&CorpusFile>,
) -> anyhow::Result<()> {
    match store {
        Some(store) => store.persist(corpus).await,
        None => Ok(()),
    }
}
