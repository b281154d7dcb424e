use crate::fuzzy::{closest_match, SequenceRatio, StringSimilarity};
use regex::Regex;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

pub const DEFAULT_FUZZY_CUTOFF: f64 = 0.6;

fn phrase_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(nur\s+)?(?:im|in)\s+(?:channel|kanal)\s+#?([a-z0-9_\-äöüß]+)")
            .expect("static pattern")
    })
}

fn hashtag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"#([a-z0-9_\-äöüß]+)").expect("static pattern"))
}

/// Channels explicitly named in a question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplicitChannels {
    pub channels: Vec<String>,
    /// Set by "nur ..." phrasing or by any hashtag. Strict searches never fall
    /// back to a global scan.
    pub strict: bool,
}

/// Finds channel mentions ("im kanal xyz", "nur in channel #xyz", "#xyz") and
/// maps them onto known channel labels, tolerating typos.
#[derive(Clone)]
pub struct ChannelResolver {
    similarity: Arc<dyn StringSimilarity>,
    cutoff: f64,
}

impl Default for ChannelResolver {
    fn default() -> Self {
        Self::new(Arc::new(SequenceRatio), DEFAULT_FUZZY_CUTOFF)
    }
}

impl ChannelResolver {
    pub fn new(similarity: Arc<dyn StringSimilarity>, cutoff: f64) -> Self {
        Self { similarity, cutoff }
    }

    pub fn with_cutoff(cutoff: f64) -> Self {
        Self::new(Arc::new(SequenceRatio), cutoff)
    }

    pub fn resolve(&self, text: &str, known: &[String]) -> ExplicitChannels {
        let text = text.to_lowercase();
        let known_lower: Vec<String> = known.iter().map(|k| k.to_lowercase()).collect();

        let mut requested = Vec::new();
        let mut strict = false;

        for caps in phrase_pattern().captures_iter(&text) {
            if caps.get(1).is_some() {
                strict = true;
            }
            if let Some(name) = caps.get(2) {
                requested.push(self.map_name(name.as_str(), known, &known_lower));
            }
        }

        for caps in hashtag_pattern().captures_iter(&text) {
            if let Some(name) = caps.get(1) {
                requested.push(self.map_name(name.as_str(), known, &known_lower));
            }
            strict = true;
        }

        let mut seen = HashSet::new();
        requested.retain(|c| seen.insert(c.clone()));

        ExplicitChannels {
            channels: requested,
            strict,
        }
    }

    // Unknown names are kept verbatim; the caller decides what to do with them.
    fn map_name(&self, name: &str, known: &[String], known_lower: &[String]) -> String {
        match closest_match(self.similarity.as_ref(), name, known_lower, self.cutoff) {
            Some(idx) => known[idx].clone(),
            None => name.to_string(),
        }
    }
}
