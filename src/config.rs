use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub llm_url: String,
    pub llm_model: String,
    pub llm_api_key: Option<String>,
    pub summarizer_min_interval: Duration,

    // Corpus storage
    pub corpus_path: PathBuf,
    pub max_messages: usize,
    pub eviction_chunk: usize,
    pub profiles_path: Option<PathBuf>,

    // Retrieval
    pub fuzzy_match_cutoff: f64,
    pub fetch_timeout_secs: u64,

    // Channel suggestions
    pub suggestion_channels: Vec<String>,

    // Follow-up threads
    pub enable_threads: bool,
    pub thread_auto_archive_minutes: u16,
    pub thread_slowmode: u16,
    pub thread_context_capacity: usize,

    // History sync
    pub guild_id: Option<u64>,
    pub channel_id: Option<u64>,
    pub history_limit: usize,
}

const DEFAULT_LLM_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const DEFAULT_LLM_MODEL: &str = "gemini-2.5-flash-lite";
const AUTO_ARCHIVE_CHOICES: [u16; 4] = [60, 1440, 4320, 10080];

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        Ok(Config {
            discord_token: env::var("DISCORD_TOKEN")
                .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN must be set"))?,
            llm_url: env::var("LLM_URL").unwrap_or_else(|_| DEFAULT_LLM_URL.to_string()),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
            llm_api_key: env::var("LLM_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            summarizer_min_interval: env::var("SUMMARIZER_MIN_INTERVAL")
                .ok()
                .and_then(|v| humantime::parse_duration(&v).ok())
                .unwrap_or(Duration::from_secs(3)),
            corpus_path: env::var("CORPUS_PATH")
                .unwrap_or_else(|_| "data/messages.json".to_string())
                .into(),
            max_messages: env::var("MAX_MESSAGES")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .unwrap_or(10000),
            eviction_chunk: env::var("EVICTION_CHUNK")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap_or(1000),
            profiles_path: env::var("PROFILES_PATH").ok().map(PathBuf::from),
            fuzzy_match_cutoff: env::var("FUZZY_MATCH_CUTOFF")
                .unwrap_or_else(|_| "0.6".to_string())
                .parse()
                .unwrap_or(0.6),
            fetch_timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            suggestion_channels: env::var("SUGGESTION_CHANNELS")
                .unwrap_or_else(|_| "general,sachen".to_string())
                .split(',')
                .map(|c| c.trim().trim_start_matches('#').to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            enable_threads: env::var("ENABLE_THREADS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            thread_auto_archive_minutes: env::var("THREAD_AUTO_ARCHIVE_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|m| AUTO_ARCHIVE_CHOICES.contains(m))
                .unwrap_or(1440),
            thread_slowmode: env::var("THREAD_SLOWMODE")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .unwrap_or(0),
            thread_context_capacity: env::var("THREAD_CONTEXT_CAPACITY")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap_or(1000),
            guild_id: env::var("DISCORD_GUILD_ID").ok().and_then(|id| id.parse().ok()),
            channel_id: env::var("DISCORD_CHANNEL_ID").ok().and_then(|id| id.parse().ok()),
            history_limit: env::var("HISTORY_LIMIT")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .unwrap_or(500),
        })
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("llm_url", &self.llm_url)
            .field("llm_model", &self.llm_model)
            .field("llm_api_key", &self.llm_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("summarizer_min_interval", &self.summarizer_min_interval)
            .field("corpus_path", &self.corpus_path)
            .field("max_messages", &self.max_messages)
            .field("eviction_chunk", &self.eviction_chunk)
            .field("profiles_path", &self.profiles_path)
            .field("fuzzy_match_cutoff", &self.fuzzy_match_cutoff)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("suggestion_channels", &self.suggestion_channels)
            .field("enable_threads", &self.enable_threads)
            .field("thread_auto_archive_minutes", &self.thread_auto_archive_minutes)
            .field("thread_slowmode", &self.thread_slowmode)
            .field("thread_context_capacity", &self.thread_context_capacity)
            .field("guild_id", &self.guild_id)
            .field("channel_id", &self.channel_id)
            .field("history_limit", &self.history_limit)
            .finish()
    }
}
