//! Hierarchical and channel-scoped retrieval over the corpus.
//!
//! Both entry points share one scoring core ([`score_message`]) and one
//! ordering rule (score, then recency). Retrieval is synchronous over a corpus
//! snapshot; only the final summarizer call suspends.

use crate::corpus::CorpusRepository;
use crate::model::Message;
use crate::profiles::ProfileTable;
use crate::ranker::rank_channels;
use crate::summarize::{build_context, Summarizer};
use crate::tokenizer::extract_keywords;
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{debug, info};

pub const MAX_CANDIDATE_CHANNELS: usize = 5;
pub const MAX_HITS_PER_CHANNEL: usize = 5;
pub const MAX_CONTEXT_MESSAGES: usize = 10;

/// Answer of a channel-scoped search plus the channels that actually matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub answer: String,
    pub matched_channels: Vec<String>,
}

pub fn no_results_text(query: &str) -> String {
    format!("🔍 Keine Ergebnisse für '{}' gefunden.", query)
}

pub fn insufficient_text(channels: &[String]) -> String {
    let names = channels
        .iter()
        .map(|c| format!("#{}", c))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Keine ausreichend relevanten Informationen gefunden in {}.", names)
}

/// Number of tokens found in the content, plus one if any token appears in
/// any link's title, description or domain. Links contribute at most one
/// point per message; `links::rank_links` deliberately credits every link.
pub fn score_message(message: &Message, tokens: &[String]) -> usize {
    let content = message.content.to_lowercase();
    let content_hits = tokens.iter().filter(|t| content.contains(t.as_str())).count();

    let link_hit = message.links.iter().any(|link| {
        let [title, description, domain] = link.searchable_fields();
        tokens.iter().any(|t| {
            title.contains(t.as_str()) || description.contains(t.as_str()) || domain.contains(t.as_str())
        })
    });

    content_hits + usize::from(link_hit)
}

/// Messages with a positive score, best first, newest first among equals.
pub fn ranked_hits<'a, I>(messages: I, tokens: &[String]) -> Vec<Arc<Message>>
where
    I: IntoIterator<Item = &'a Arc<Message>>,
{
    let mut scored: Vec<(usize, Arc<Message>)> = messages
        .into_iter()
        .filter_map(|m| {
            let score = score_message(m, tokens);
            (score > 0).then(|| (score, Arc::clone(m)))
        })
        .collect();
    scored.sort_by_key(|(score, m)| Reverse((*score, m.seen_at())));
    scored.into_iter().map(|(_, m)| m).collect()
}

fn hits_per_channel(
    snapshot: &[Arc<Message>],
    channels: &[String],
    tokens: &[String],
) -> Vec<(String, Vec<Arc<Message>>)> {
    channels
        .iter()
        .filter_map(|channel| {
            let hits = ranked_hits(snapshot.iter().filter(|m| &m.channel == channel), tokens);
            (!hits.is_empty()).then(|| (channel.clone(), hits))
        })
        .collect()
}

fn consolidate(per_channel: &[(String, Vec<Arc<Message>>)]) -> Vec<Arc<Message>> {
    per_channel
        .iter()
        .flat_map(|(_, hits)| hits.iter().take(MAX_HITS_PER_CHANNEL).cloned())
        .take(MAX_CONTEXT_MESSAGES)
        .collect()
}

pub struct SearchEngine {
    corpus: Arc<dyn CorpusRepository>,
    profiles: Arc<ProfileTable>,
    summarizer: Arc<dyn Summarizer>,
}

impl SearchEngine {
    pub fn new(
        corpus: Arc<dyn CorpusRepository>,
        profiles: Arc<ProfileTable>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            corpus,
            profiles,
            summarizer,
        }
    }

    /// The channels `hierarchical_search` will look at first.
    pub fn candidate_channels(&self, query: &str) -> Vec<String> {
        let snapshot = self.corpus.scan_all();
        let mut channels = rank_channels(query, &snapshot, self.profiles.topics());
        channels.truncate(MAX_CANDIDATE_CHANNELS);
        channels
    }

    /// Messages that would be handed to the summarizer for `query`, or an
    /// empty list when nothing matches anywhere.
    pub fn hierarchical_context(&self, query: &str) -> Vec<Arc<Message>> {
        let snapshot = self.corpus.scan_all();
        let tokens = extract_keywords(query);

        let mut candidates = rank_channels(query, &snapshot, self.profiles.topics());
        candidates.truncate(MAX_CANDIDATE_CHANNELS);
        debug!("Candidate channels for '{}': {:?}", query, candidates);

        let per_channel = hits_per_channel(&snapshot, &candidates, &tokens);
        if !per_channel.is_empty() {
            return consolidate(&per_channel);
        }

        debug!("No channel hits for '{}', scanning the whole corpus", query);
        let mut global = ranked_hits(&snapshot, &tokens);
        global.truncate(MAX_CONTEXT_MESSAGES);
        global
    }

    pub async fn hierarchical_search(&self, query: &str) -> String {
        let hits = self.hierarchical_context(query);
        if hits.is_empty() {
            info!("No results for '{}'", query);
            return no_results_text(query);
        }
        self.summarize(query, &hits).await
    }

    pub async fn channel_filtered_search(
        &self,
        query: &str,
        channels: &[String],
        strict: bool,
    ) -> SearchOutcome {
        if channels.is_empty() {
            return SearchOutcome {
                answer: self.hierarchical_search(query).await,
                matched_channels: Vec::new(),
            };
        }

        let per_channel = {
            let snapshot = self.corpus.scan_all();
            let tokens = extract_keywords(query);
            hits_per_channel(&snapshot, channels, &tokens)
        };

        if per_channel.is_empty() {
            if strict {
                info!("No hits for '{}' in {:?}, strict mode", query, channels);
                return SearchOutcome {
                    answer: insufficient_text(channels),
                    matched_channels: Vec::new(),
                };
            }
            debug!("No hits for '{}' in {:?}, falling back", query, channels);
            return SearchOutcome {
                answer: self.hierarchical_search(query).await,
                matched_channels: Vec::new(),
            };
        }

        let matched_channels = per_channel.iter().map(|(c, _)| c.clone()).collect();
        let hits = consolidate(&per_channel);
        SearchOutcome {
            answer: self.summarize(query, &hits).await,
            matched_channels,
        }
    }

    async fn summarize(&self, query: &str, hits: &[Arc<Message>]) -> String {
        let context = build_context(hits);
        self.summarizer.summarize(query, &context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::InMemoryCorpus;
    use crate::model::fixtures::{link, message};
    use crate::summarize::ContextItem;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every call and answers with the channels it was shown.
    #[derive(Default)]
    struct RecordingSummarizer {
        calls: Mutex<Vec<(String, Vec<ContextItem>)>>,
    }

    #[async_trait]
    impl Summarizer for RecordingSummarizer {
        async fn summarize(&self, query: &str, context: &[ContextItem]) -> String {
            self.calls
                .lock()
                .unwrap()
                .push((query.to_string(), context.to_vec()));
            let channels: Vec<&str> = context.iter().map(|c| c.channel.as_str()).collect();
            format!("answer[{}]", channels.join(","))
        }
    }

    fn engine(messages: Vec<Message>) -> (SearchEngine, Arc<RecordingSummarizer>) {
        let summarizer = Arc::new(RecordingSummarizer::default());
        let engine = SearchEngine::new(
            Arc::new(InMemoryCorpus::from_messages(messages)),
            Arc::new(ProfileTable::builtin().unwrap()),
            summarizer.clone(),
        );
        (engine, summarizer)
    }

    #[test]
    fn test_link_contribution_capped_at_one() {
        let mut m = message(1, "webseiten", "coole font", "2024-01-01 00:00:00");
        m.links = vec![
            link("https://a.io", "Font A", "font", "font.io"),
            link("https://b.io", "Font B", "font", "font.io"),
        ];
        let tokens = extract_keywords("font");
        assert_eq!(score_message(&m, &tokens), 2);
    }

    #[test]
    fn test_ordering_score_then_recency() {
        let a = Arc::new(message(1, "x", "font", "2024-01-01 00:00:00"));
        let b = Arc::new(message(2, "x", "font", "2024-03-01 00:00:00"));
        let c = Arc::new(message(3, "x", "font design", "2023-01-01 00:00:00"));
        let bad = Arc::new(message(4, "x", "font", "gestern"));
        let none = Arc::new(message(5, "x", "hallo", "2024-05-01 00:00:00"));
        let corpus = vec![a, bad, b, c, none];
        let ids: Vec<u64> = ranked_hits(&corpus, &extract_keywords("font design"))
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![3, 2, 1, 4]);
    }

    #[tokio::test]
    async fn test_end_to_end_travel() {
        let mut travel = message(1, "travel", "Portugal Reise Tipps", "2024-05-01 10:00:00");
        travel.links.push(link(
            "https://www.visitportugal.com/de",
            "Visit Portugal",
            "Offizielle Tourismusseite",
            "visitportugal.com",
        ));
        let other = message(2, "general", "Hallo zusammen", "2024-05-02 10:00:00");
        let (engine, summarizer) = engine(vec![travel, other]);

        assert!(engine.candidate_channels("reise").contains(&"travel".to_string()));

        let answer = engine.hierarchical_search("reise").await;
        assert_eq!(answer, "answer[travel]");

        let calls = summarizer.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (query, context) = &calls[0];
        assert_eq!(query, "reise");
        assert_eq!(context.len(), 1);
        assert_eq!(context[0].content, "Portugal Reise Tipps");
        assert_eq!(context[0].links[0].domain, "visitportugal.com");
    }

    #[tokio::test]
    async fn test_candidates_without_hits_are_skipped() {
        let messages = vec![
            message(1, "webseiten", "neue seite online", "2024-01-01 00:00:00"),
            message(2, "mockups", "tolle font gefunden", "2024-01-02 00:00:00"),
        ];
        let (engine, summarizer) = engine(messages);
        assert_eq!(engine.candidate_channels("font"), vec!["webseiten", "mockups"]);

        let answer = engine.hierarchical_search("font").await;
        assert_eq!(answer, "answer[mockups]");
        assert_eq!(summarizer.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_global_scan_outside_top_five() {
        // six channels named in the query outrank "archiv", which holds the hit
        let mut messages: Vec<Message> = ["aa1", "aa2", "aa3", "aa4", "aa5", "aa6"]
            .iter()
            .enumerate()
            .map(|(i, c)| message(i as u64, c, "nichts", "2024-01-01 00:00:00"))
            .collect();
        messages.push(message(99, "archiv", "kamera objektiv", "2024-01-01 00:00:00"));
        let (engine, _) = engine(messages);

        let query = "aa1 aa2 aa3 aa4 aa5 aa6 kamera";
        assert!(!engine.candidate_channels(query).contains(&"archiv".to_string()));
        let context = engine.hierarchical_context(query);
        assert_eq!(context.len(), 1);
        assert_eq!(context[0].id, 99);
    }

    #[tokio::test]
    async fn test_no_results() {
        let (engine, summarizer) = engine(vec![message(1, "general", "hallo", "2024-01-01 00:00:00")]);
        let answer = engine.hierarchical_search("quantenphysik").await;
        assert_eq!(answer, "🔍 Keine Ergebnisse für 'quantenphysik' gefunden.");
        assert!(summarizer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stopword_query_has_nothing_to_match() {
        let (engine, _) = engine(vec![message(1, "general", "was ist das", "2024-01-01 00:00:00")]);
        assert_eq!(
            engine.hierarchical_search("was ist das").await,
            no_results_text("was ist das")
        );
    }

    #[tokio::test]
    async fn test_context_caps() {
        let mut messages = Vec::new();
        for (c, channel) in ["travel", "portugal", "indonesien"].iter().enumerate() {
            for i in 0..7 {
                let id = (c * 10 + i) as u64;
                messages.push(message(id, channel, "reise", &format!("2024-01-0{} 00:00:00", i + 1)));
            }
        }
        let (engine, _) = engine(messages);
        let context = engine.hierarchical_context("reise");
        assert_eq!(context.len(), MAX_CONTEXT_MESSAGES);
        // five from the first channel, five from the second, newest first
        assert!(context[..5].iter().all(|m| m.channel == context[0].channel));
        assert_eq!(context[0].timestamp, "2024-01-07 00:00:00");
        assert!(context[5..].iter().all(|m| m.channel != context[0].channel));
    }

    #[tokio::test]
    async fn test_empty_channel_list_is_hierarchical() {
        let messages = vec![message(1, "travel", "Portugal Reise", "2024-01-01 00:00:00")];
        let (engine, _) = engine(messages);
        let outcome = engine.channel_filtered_search("reise", &[], false).await;
        assert_eq!(outcome.answer, engine.hierarchical_search("reise").await);
        assert!(outcome.matched_channels.is_empty());
    }

    #[tokio::test]
    async fn test_strict_never_falls_back() {
        let messages = vec![
            message(1, "travel", "Portugal Reise", "2024-01-01 00:00:00"),
            message(2, "general", "hallo", "2024-01-01 00:00:00"),
        ];
        let (engine, summarizer) = engine(messages);
        let outcome = engine
            .channel_filtered_search("reise", &["general".to_string()], true)
            .await;
        assert_eq!(
            outcome.answer,
            "Keine ausreichend relevanten Informationen gefunden in #general."
        );
        assert!(outcome.matched_channels.is_empty());
        assert!(summarizer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_strict_falls_back() {
        let messages = vec![
            message(1, "travel", "Portugal Reise", "2024-01-01 00:00:00"),
            message(2, "general", "hallo", "2024-01-01 00:00:00"),
        ];
        let (engine, _) = engine(messages);
        let outcome = engine
            .channel_filtered_search("reise", &["general".to_string()], false)
            .await;
        assert_eq!(outcome.answer, "answer[travel]");
        assert!(outcome.matched_channels.is_empty());
    }

    #[tokio::test]
    async fn test_matched_channels_are_the_hitting_ones() {
        let messages = vec![
            message(1, "travel", "Portugal Reise", "2024-01-01 00:00:00"),
            message(2, "general", "Reise nach Rom", "2024-01-02 00:00:00"),
            message(3, "mathe", "Integrale", "2024-01-03 00:00:00"),
        ];
        let (engine, _) = engine(messages);
        let requested = vec!["mathe".to_string(), "general".to_string(), "travel".to_string()];
        let outcome = engine.channel_filtered_search("reise", &requested, true).await;
        assert_eq!(outcome.matched_channels, vec!["general", "travel"]);
        assert_eq!(outcome.answer, "answer[general,travel]");
    }
}
