//! Corpus analytics shown by `/stats` and the quality line of `/frage`.

use crate::model::Message;
use crate::tokenizer::extract_keywords;
use std::collections::HashMap;
use std::sync::Arc;

const TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusStats {
    pub total: usize,
    pub top_authors: Vec<(String, usize)>,
    pub top_channels: Vec<(String, usize)>,
    /// Timestamps of the first and last stored entries.
    pub first_seen: Option<String>,
    pub last_seen: Option<String>,
}

impl CorpusStats {
    pub fn collect(corpus: &[Arc<Message>]) -> Self {
        let mut authors: Vec<(String, usize)> = Vec::new();
        let mut channels: Vec<(String, usize)> = Vec::new();
        let mut author_idx: HashMap<&str, usize> = HashMap::new();
        let mut channel_idx: HashMap<&str, usize> = HashMap::new();

        for message in corpus {
            bump(&mut authors, &mut author_idx, &message.author);
            bump(&mut channels, &mut channel_idx, &message.channel);
        }

        Self {
            total: corpus.len(),
            top_authors: top(authors),
            top_channels: top(channels),
            first_seen: corpus.first().map(|m| m.timestamp.clone()),
            last_seen: corpus.last().map(|m| m.timestamp.clone()),
        }
    }
}

fn bump<'a>(counts: &mut Vec<(String, usize)>, idx: &mut HashMap<&'a str, usize>, key: &'a str) {
    match idx.get(key) {
        Some(&i) => counts[i].1 += 1,
        None => {
            idx.insert(key, counts.len());
            counts.push((key.to_string(), 1));
        }
    }
}

// stable: equal counts keep first-seen order
fn top(mut counts: Vec<(String, usize)>) -> Vec<(String, usize)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(TOP_N);
    counts
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitRatio {
    pub matched: usize,
    pub scanned: usize,
}

impl HitRatio {
    /// Rounded percentage, 0 when nothing was scanned.
    pub fn percent(&self) -> u32 {
        if self.scanned == 0 {
            return 0;
        }
        (self.matched as f64 / self.scanned as f64 * 100.0).round() as u32
    }
}

/// Share of messages in `channels` that contain at least one query token in
/// their content or link metadata.
pub fn hit_ratio(corpus: &[Arc<Message>], query: &str, channels: &[String]) -> HitRatio {
    let tokens = extract_keywords(query);
    let mut ratio = HitRatio { matched: 0, scanned: 0 };

    for message in corpus.iter().filter(|m| channels.contains(&m.channel)) {
        ratio.scanned += 1;
        let content = message.content.to_lowercase();
        let hit = tokens.iter().any(|t| content.contains(t.as_str()))
            || message.links.iter().any(|link| {
                link.searchable_fields()
                    .iter()
                    .any(|field| tokens.iter().any(|t| field.contains(t.as_str())))
            });
        if hit {
            ratio.matched += 1;
        }
    }

    ratio
}
