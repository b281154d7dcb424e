//! Link aggregation: which URLs, shared across matching messages, best answer
//! a query.
//!
//! Unlike message ranking (see `search`), every link of a message is scored on
//! its own and scores accumulate per URL across all occurrences.

use crate::model::{Message, UNKNOWN_DOMAIN, UNKNOWN_TITLE};
use crate::tokenizer::extract_keywords;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopLink {
    pub url: String,
    pub title: String,
    pub domain: String,
}

/// Accumulated relevance of one distinct URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkStats {
    pub link: TopLink,
    pub score: usize,
    pub count: usize,
    pub last_seen: NaiveDateTime,
}

/// Distinct URLs ranked by `(score, count, last_seen)` descending.
pub fn rank_links(
    corpus: &[Arc<Message>],
    query: &str,
    channels: Option<&[String]>,
) -> Vec<LinkStats> {
    let tokens = extract_keywords(query);
    let channels = channels.filter(|c| !c.is_empty());

    let mut order: Vec<String> = Vec::new();
    let mut stats: HashMap<String, LinkStats> = HashMap::new();

    for message in corpus {
        if let Some(channels) = channels {
            if !channels.contains(&message.channel) {
                continue;
            }
        }

        let content = message.content.to_lowercase();
        let content_score = tokens.iter().filter(|t| content.contains(t.as_str())).count();

        for link in &message.links {
            let [title, description, domain] = link.searchable_fields();
            let meta_score = tokens
                .iter()
                .filter(|t| {
                    title.contains(t.as_str())
                        || description.contains(t.as_str())
                        || domain.contains(t.as_str())
                })
                .count();
            let total = content_score + meta_score;
            if total == 0 {
                continue;
            }

            let url = if link.url.is_empty() {
                format!("https://{}", link.domain)
            } else {
                link.url.clone()
            };
            let seen = message.seen_at();

            match stats.get_mut(&url) {
                Some(entry) => {
                    entry.count += 1;
                    entry.score += total;
                    entry.last_seen = entry.last_seen.max(seen);
                }
                None => {
                    order.push(url.clone());
                    stats.insert(
                        url.clone(),
                        LinkStats {
                            link: TopLink {
                                url,
                                title: non_empty_or(&link.title, UNKNOWN_TITLE),
                                domain: non_empty_or(&link.domain, UNKNOWN_DOMAIN),
                            },
                            score: total,
                            count: 1,
                            last_seen: seen,
                        },
                    );
                }
            }
        }
    }

    let mut ranked: Vec<LinkStats> = order
        .into_iter()
        .filter_map(|url| stats.remove(&url))
        .collect();
    ranked.sort_by(|a, b| {
        (b.score, b.count, b.last_seen).cmp(&(a.score, a.count, a.last_seen))
    });
    ranked
}

/// The `limit` most relevant links for `query`, optionally restricted to
/// `channels` (an empty list means every channel).
pub fn top_links(
    corpus: &[Arc<Message>],
    query: &str,
    channels: Option<&[String]>,
    limit: usize,
) -> Vec<TopLink> {
    rank_links(corpus, query, channels)
        .into_iter()
        .take(limit)
        .map(|s| s.link)
        .collect()
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
