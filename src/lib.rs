pub mod classify;
pub mod commands;
pub mod config;
pub mod corpus;
pub mod events;
pub mod fetch;
pub mod fuzzy;
pub mod history;
pub mod indexer;
pub mod ingest;
pub mod links;
pub mod llm;
pub mod model;
pub mod profiles;
pub mod ranker;
pub mod render;
pub mod resolver;
pub mod search;
pub mod stats;
pub mod suggest;
pub mod summarize;
pub mod threads;
pub mod tokenizer;

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Custom data passed to all commands
pub struct Data {
    pub config: config::Config,
    pub corpus: Arc<dyn corpus::CorpusRepository>,
    pub profiles: Arc<profiles::ProfileTable>,
    pub engine: search::SearchEngine,
    pub classifier: classify::ContentClassifier,
    pub resolver: resolver::ChannelResolver,
    pub fetcher: Arc<dyn fetch::LinkFetcher>,
    pub ingestor: ingest::Ingestor,
    pub backfill: indexer::LinkBackfill,
    pub threads: threads::ThreadContextStore,
    pub summarizer_enabled: bool,
}

impl Data {
    /// Loads the stored corpus and the category table and wires up every
    /// component from `config`.
    pub fn from_config(config: config::Config) -> anyhow::Result<Self> {
        let store = corpus::CorpusFile::new(&config.corpus_path);
        let corpus: Arc<dyn corpus::CorpusRepository> =
            Arc::new(corpus::InMemoryCorpus::from_messages(store.load_or_empty()));
        info!("{} stored messages loaded", corpus.len());

        let profiles = Arc::new(profiles::ProfileTable::load(config.profiles_path.as_deref())?);
        info!(
            "{} categories, {} topic mappings",
            profiles.categories().len(),
            profiles.topics().len()
        );

        let summarizer = match &config.llm_api_key {
            Some(key) => summarize::LlmSummarizer::new(
                llm::LlmClient::new(&config.llm_url, key, &config.llm_model),
                config.summarizer_min_interval,
            ),
            None => {
                warn!("LLM_API_KEY not set, AI answers are disabled");
                summarize::LlmSummarizer::disabled()
            }
        };
        let summarizer_enabled = summarizer.is_enabled();

        let fetcher: Arc<dyn fetch::LinkFetcher> =
            Arc::new(fetch::HttpLinkFetcher::new(config.fetch_timeout())?);
        let maintenance: ingest::MaintenanceLock = Arc::new(RwLock::new(()));

        let ingestor = ingest::Ingestor::new(corpus.clone(), fetcher.clone(), maintenance.clone())
            .with_store(store.clone())
            .with_capacity(config.max_messages, config.eviction_chunk);
        let backfill = indexer::LinkBackfill::new(corpus.clone(), fetcher.clone(), maintenance)
            .with_store(store);

        Ok(Self {
            engine: search::SearchEngine::new(corpus.clone(), profiles.clone(), Arc::new(summarizer)),
            classifier: classify::ContentClassifier::new(profiles.clone()),
            resolver: resolver::ChannelResolver::with_cutoff(config.fuzzy_match_cutoff),
            threads: threads::ThreadContextStore::new(config.thread_context_capacity),
            corpus,
            profiles,
            fetcher,
            ingestor,
            backfill,
            summarizer_enabled,
            config,
        })
    }
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
