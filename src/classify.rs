//! Content classification: which channel a message most likely belongs in.

use crate::fetch::{find_urls, LinkFetcher};
use crate::model::LinkMetadata;
use crate::profiles::{CategoryProfile, ProfileTable};
use std::sync::Arc;
use tracing::debug;

const TEXT_KEYWORD_SCORE: u32 = 10;
const LINK_KEYWORD_SCORE: u32 = 15;
/// Suggestions below this score are noise.
pub const MIN_SUGGESTION_CONFIDENCE: u32 = 15;
const MAX_ALTERNATIVES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSuggestion {
    pub channel: String,
    pub confidence: u32,
    pub alternatives: Vec<(String, u32)>,
    pub reason: String,
}

#[derive(Clone)]
pub struct ContentClassifier {
    profiles: Arc<ProfileTable>,
}

impl ContentClassifier {
    pub fn new(profiles: Arc<ProfileTable>) -> Self {
        Self { profiles }
    }

    /// Scores `text` and its links against every category profile. Only
    /// categories with a positive score are returned, best first.
    pub fn classify(&self, text: &str, links: &[LinkMetadata]) -> Vec<(String, u32)> {
        let text_lower = text.to_lowercase();
        let link_fields: Vec<[String; 3]> = links.iter().map(|l| l.searchable_fields()).collect();

        let mut scores: Vec<(String, u32)> = self
            .profiles
            .categories()
            .iter()
            .map(|profile| (profile.label.clone(), score_profile(profile, &text_lower, &link_fields)))
            .filter(|(_, score)| *score > 0)
            .collect();

        scores.sort_by(|a, b| b.1.cmp(&a.1));
        scores
    }

    /// Suggests a channel for a message, fetching metadata for every URL it
    /// contains. Returns `None` when nothing clears the confidence gate.
    pub async fn suggest_channel(
        &self,
        text: &str,
        fetcher: &dyn LinkFetcher,
    ) -> Option<ChannelSuggestion> {
        let mut links = Vec::new();
        for url in find_urls(text) {
            links.push(fetcher.fetch(&url).await);
        }
        self.suggest_from_links(text, &links)
    }

    pub fn suggest_from_links(&self, text: &str, links: &[LinkMetadata]) -> Option<ChannelSuggestion> {
        let mut ranking = self.classify(text, links).into_iter();
        let (channel, confidence) = ranking.next()?;

        if confidence < MIN_SUGGESTION_CONFIDENCE {
            debug!(
                "Best category {} scored {} (< {}), no suggestion",
                channel, confidence, MIN_SUGGESTION_CONFIDENCE
            );
            return None;
        }

        Some(ChannelSuggestion {
            reason: format!(
                "Erkannt basierend auf Inhalt und URLs (Confidence: {})",
                confidence
            ),
            channel,
            confidence,
            alternatives: ranking.take(MAX_ALTERNATIVES).collect(),
        })
    }
}

fn score_profile(profile: &CategoryProfile, text_lower: &str, links: &[[String; 3]]) -> u32 {
    let keyword_hits = profile
        .keywords
        .iter()
        .filter(|k| text_lower.contains(k.as_str()))
        .count() as u32;
    let mut score = TEXT_KEYWORD_SCORE * keyword_hits;

    for [title, description, domain] in links {
        let indicated = profile.url_indicators.iter().any(|indicator| {
            title.contains(indicator.as_str())
                || description.contains(indicator.as_str())
                || domain.contains(indicator.as_str())
        });
        if indicated {
            score += profile.confidence_boost;
        }

        let meta_hits = profile
            .keywords
            .iter()
            .filter(|k| title.contains(k.as_str()) || description.contains(k.as_str()))
            .count() as u32;
        score += LINK_KEYWORD_SCORE * meta_hits;
    }

    score
}
