use crate::corpus::{CorpusFile, CorpusRepository};
use crate::fetch::{find_urls, LinkFetcher};
use crate::ingest::{persist_corpus, MaintenanceLock};
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_FETCH_PAUSE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    /// Messages that gained at least one link.
    pub migrated: usize,
    pub extracted: usize,
}

/// One-off pass that fetches link metadata for stored messages whose URLs
/// have none yet, e.g. after a history import. Runs exclusively: ingestion
/// waits until it is done.
pub struct LinkBackfill {
    corpus: Arc<dyn CorpusRepository>,
    fetcher: Arc<dyn LinkFetcher>,
    maintenance: MaintenanceLock,
    store: Option<CorpusFile>,
    pause: Duration,
}

impl LinkBackfill {
    pub fn new(
        corpus: Arc<dyn CorpusRepository>,
        fetcher: Arc<dyn LinkFetcher>,
        maintenance: MaintenanceLock,
    ) -> Self {
        Self {
            corpus,
            fetcher,
            maintenance,
            store: None,
            pause: DEFAULT_FETCH_PAUSE,
        }
    }

    pub fn with_store(mut self, store: CorpusFile) -> Self {
        self.store = Some(store);
        self
    }

    /// Delay between two fetches.
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub async fn run(&self) -> anyhow::Result<BackfillReport> {
        let _guard = self.maintenance.write().await;
        info!("Starting link backfill over {} messages", self.corpus.len());

        let mut report = BackfillReport::default();
        for message in self.corpus.scan_all() {
            let missing: Vec<String> = find_urls(&message.content)
                .into_iter()
                .filter(|url| !message.links.iter().any(|l| &l.url == url))
                .collect();
            if missing.is_empty() {
                continue;
            }

            debug!(
                "Fetching {} link(s) for message {} from {}",
                missing.len(),
                message.id,
                message.author
            );
            let mut links = message.links.clone();
            for url in missing {
                let metadata = self.fetcher.fetch(&url).await;
                debug!("Backfilled {} ({})", metadata.title, metadata.domain);
                links.push(metadata);
                report.extracted += 1;
                tokio::time::sleep(self.pause).await;
            }

            if self.corpus.update_links(message.id, links) {
                report.migrated += 1;
            }
        }

        persist_corpus(self.corpus.as_ref(), self.store.as_ref()).await?;
        info!(
            "Link backfill done: {} messages migrated, {} links extracted",
            report.migrated, report.extracted
        );
        Ok(report)
    }
}
