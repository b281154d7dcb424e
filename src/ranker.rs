use crate::model::Message;
use crate::profiles::TopicMapping;
use std::collections::HashSet;
use std::sync::Arc;

const NAME_MATCH_SCORE: u32 = 100;
const TOPIC_MATCH_SCORE: u32 = 50;

/// Distinct channel labels in first-seen order.
pub fn known_channels(corpus: &[Arc<Message>]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut channels = Vec::new();
    for message in corpus {
        if seen.insert(message.channel.as_str()) {
            channels.push(message.channel.clone());
        }
    }
    channels
}

pub fn channel_score(query_lower: &str, channel: &str, topics: &[TopicMapping]) -> u32 {
    let channel_lower = channel.to_lowercase();
    let mut score = 0;

    if query_lower.contains(&channel_lower) {
        score += NAME_MATCH_SCORE;
    }

    for mapping in topics {
        if !query_lower.contains(&mapping.topic) {
            continue;
        }
        for fragment in &mapping.channels {
            if channel_lower.contains(fragment.as_str()) {
                score += TOPIC_MATCH_SCORE;
            }
        }
    }

    score
}

/// Orders the corpus's channels by relevance to `query`.
///
/// Channels that score nothing are dropped; if no channel scores at all, every
/// known channel is returned in first-seen order.
pub fn rank_channels(query: &str, corpus: &[Arc<Message>], topics: &[TopicMapping]) -> Vec<String> {
    let query_lower = query.to_lowercase();
    let channels = known_channels(corpus);

    let mut scored: Vec<(String, u32)> = channels
        .iter()
        .map(|c| (c.clone(), channel_score(&query_lower, c, topics)))
        .filter(|(_, score)| *score > 0)
        .collect();

    if scored.is_empty() {
        return channels;
    }

    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().map(|(channel, _)| channel).collect()
}
