use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format of `Message::timestamp`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const UNKNOWN_TITLE: &str = "Unbekannter Titel";
pub const NO_DESCRIPTION: &str = "Keine Beschreibung verfügbar";
pub const UNKNOWN_DOMAIN: &str = "Unbekannte Domain";

/// Metadata scraped from a URL found in a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMetadata {
    pub url: String,
    pub title: String,
    pub description: String,
    pub domain: String,
}

impl LinkMetadata {
    /// Lower-cased title, description and domain, in that order.
    pub fn searchable_fields(&self) -> [String; 3] {
        [
            self.title.to_lowercase(),
            self.description.to_lowercase(),
            self.domain.to_lowercase(),
        ]
    }
}

/// One ingested chat record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub author: String,
    #[serde(default)]
    pub author_id: Option<u64>,
    pub channel: String,
    #[serde(default)]
    pub channel_id: Option<u64>,
    pub guild: String,
    #[serde(default)]
    pub guild_id: Option<u64>,
    #[serde(default)]
    pub content: String,
    pub timestamp: String,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub jump_url: Option<String>,
    #[serde(default)]
    pub links: Vec<LinkMetadata>,
}

impl Message {
    /// Parsed timestamp. Malformed values sort as the oldest possible instant.
    pub fn seen_at(&self) -> NaiveDateTime {
        parse_timestamp(&self.timestamp)
    }
}

pub fn parse_timestamp(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).unwrap_or(NaiveDateTime::MIN)
}

/// Continuation state for follow-up questions asked inside a thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadContext {
    pub key: u64,
    pub base_query: String,
    pub channels: Vec<String>,
    pub strict: bool,
    pub created_by: u64,
    pub created_at: String,
}
