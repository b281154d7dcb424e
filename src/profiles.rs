//! Static classification table: category profiles for the content classifier
//! and topic associations for the channel relevance ranker.
//!
//! The table ships embedded in the binary and can be replaced at startup by a
//! TOML file with the same layout (`PROFILES_PATH`).

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

const BUILTIN_PROFILES: &str = include_str!("../assets/profiles.toml");

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read profile table {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid profile table: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("category '{label}' is invalid: {reason}")]
    Invalid { label: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryProfile {
    pub label: String,
    pub keywords: Vec<String>,
    pub url_indicators: Vec<String>,
    pub confidence_boost: u32,
}

/// A topic phrase and the channel-label fragments it points at.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopicMapping {
    pub topic: String,
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileTable {
    #[serde(default)]
    categories: Vec<CategoryProfile>,
    #[serde(default)]
    topics: Vec<TopicMapping>,
}

impl ProfileTable {
    pub fn builtin() -> Result<Self, ProfileError> {
        Self::from_toml_str(BUILTIN_PROFILES)
    }

    /// Loads the table from `path`, or the embedded table when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ProfileError> {
        let Some(path) = path else {
            return Self::builtin();
        };
        let content = fs::read_to_string(path).map_err(|source| ProfileError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_toml_str(&content)?;
        info!(
            "Loaded {} categories and {} topics from {}",
            table.categories.len(),
            table.topics.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ProfileError> {
        let mut table: ProfileTable = toml::from_str(content)?;
        table.normalize()?;
        Ok(table)
    }

    pub fn categories(&self) -> &[CategoryProfile] {
        &self.categories
    }

    pub fn topics(&self) -> &[TopicMapping] {
        &self.topics
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.categories.iter().any(|c| c.label == label)
    }

    // Signals are matched against lower-cased text, so store them lower-cased.
    fn normalize(&mut self) -> Result<(), ProfileError> {
        for category in &mut self.categories {
            if category.label.trim().is_empty() {
                return Err(ProfileError::Invalid {
                    label: category.label.clone(),
                    reason: "empty label".to_string(),
                });
            }
            if category.confidence_boost == 0 {
                return Err(ProfileError::Invalid {
                    label: category.label.clone(),
                    reason: "confidence_boost must be positive".to_string(),
                });
            }
            lowercase_all(&mut category.keywords);
            lowercase_all(&mut category.url_indicators);
        }
        for topic in &mut self.topics {
            topic.topic = topic.topic.to_lowercase();
            lowercase_all(&mut topic.channels);
        }
        Ok(())
    }
}

fn lowercase_all(values: &mut Vec<String>) {
    for value in values.iter_mut() {
        *value = value.to_lowercase();
    }
    values.retain(|v| !v.is_empty());
}
