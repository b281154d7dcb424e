//! URL discovery and link metadata scraping.

use crate::model::{LinkMetadata, NO_DESCRIPTION, UNKNOWN_TITLE};
use async_trait::async_trait;
use regex::Regex;
use reqwest::StatusCode;
use scraper::{Html, Selector};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const FETCH_FAILED_DESCRIPTION: &str = "Metadaten konnten nicht geladen werden";

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"https?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*\(\),]|(?:%[0-9a-fA-F][0-9a-fA-F]))+")
            .expect("static pattern")
    })
}

/// All http(s) URLs in `text`, in order of appearance.
pub fn find_urls(text: &str) -> Vec<String> {
    url_pattern()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Host part of a URL, or the first path segment for scheme-less input.
pub fn domain_of(url: &str) -> String {
    let segment = if url.contains("://") {
        url.split('/').nth(2)
    } else {
        url.split('/').next()
    };
    segment.unwrap_or_default().to_string()
}

/// Record used whenever a page cannot be fetched.
pub fn fallback_metadata(url: &str) -> LinkMetadata {
    let domain = domain_of(url);
    LinkMetadata {
        url: url.to_string(),
        title: format!("Link zu {}", domain),
        description: FETCH_FAILED_DESCRIPTION.to_string(),
        domain,
    }
}

/// Resolves URLs to link metadata. Implementations never fail: an unreachable
/// page yields `fallback_metadata`.
#[async_trait]
pub trait LinkFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> LinkMetadata;
}

pub struct HttpLinkFetcher {
    client: reqwest::Client,
}

impl HttpLinkFetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    async fn try_fetch(&self, url: &str) -> anyhow::Result<Option<LinkMetadata>> {
        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            debug!("Link fetch for {} returned {}", url, response.status());
            return Ok(None);
        }
        let html = response.text().await?;
        Ok(Some(parse_metadata(url, &html)))
    }
}

#[async_trait]
impl LinkFetcher for HttpLinkFetcher {
    async fn fetch(&self, url: &str) -> LinkMetadata {
        match self.try_fetch(url).await {
            Ok(Some(metadata)) => metadata,
            Ok(None) => fallback_metadata(url),
            Err(e) => {
                warn!("Failed to fetch link metadata for {}: {}", url, e);
                fallback_metadata(url)
            }
        }
    }
}

/// Extracts title and description from an HTML document, preferring
/// `<title>` / `meta[name=description]` over their Open Graph variants.
pub fn parse_metadata(url: &str, html: &str) -> LinkMetadata {
    let doc = Html::parse_document(html);

    let title = first_text(&doc, "title")
        .or_else(|| first_attr(&doc, "meta[property=\"og:title\"]", "content"));
    let description = first_attr(&doc, "meta[name=\"description\"]", "content")
        .or_else(|| first_attr(&doc, "meta[property=\"og:description\"]", "content"));

    LinkMetadata {
        url: url.to_string(),
        title: title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        description: description.unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        domain: domain_of(url),
    }
}

fn first_text(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let el = doc.select(&sel).next()?;
    let text = el.text().collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn first_attr(doc: &Html, selector: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let el = doc.select(&sel).next()?;
    let value = el.value().attr(attr)?.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_urls() {
        let text = "schau mal https://www.figma.com/community/plugin/123 und http://example.org/a?b=1, danke";
        assert_eq!(
            find_urls(text),
            vec![
                "https://www.figma.com/community/plugin/123",
                "http://example.org/a?b=1,"
            ]
        );
        assert!(find_urls("kein link hier").is_empty());
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(domain_of("https://www.visitportugal.com/de/reise"), "www.visitportugal.com");
        assert_eq!(domain_of("example.org/path"), "example.org");
        assert_eq!(domain_of("https://"), "");
    }

    #[test]
    fn test_fallback_metadata() {
        let meta = fallback_metadata("https://fonts.google.com/specimen/Inter");
        assert_eq!(meta.title, "Link zu fonts.google.com");
        assert_eq!(meta.description, FETCH_FAILED_DESCRIPTION);
        assert_eq!(meta.domain, "fonts.google.com");
    }

    #[test]
    fn test_parse_metadata_prefers_title_and_meta_description() {
        let html = r#"<html><head>
            <title> Inter - Google Fonts </title>
            <meta name="description" content="A typeface for screens">
            <meta property="og:title" content="OG Title">
            <meta property="og:description" content="OG description">
        </head></html>"#;
        let meta = parse_metadata("https://fonts.google.com/specimen/Inter", html);
        assert_eq!(meta.title, "Inter - Google Fonts");
        assert_eq!(meta.description, "A typeface for screens");
        assert_eq!(meta.domain, "fonts.google.com");
    }

    #[test]
    fn test_parse_metadata_open_graph_and_sentinels() {
        let html = r#"<html><head><meta property="og:title" content="Only OG"></head></html>"#;
        let meta = parse_metadata("https://x.io/", html);
        assert_eq!(meta.title, "Only OG");
        assert_eq!(meta.description, NO_DESCRIPTION);

        let bare = parse_metadata("https://x.io/", "<html><body>nothing</body></html>");
        assert_eq!(bare.title, UNKNOWN_TITLE);
        assert_eq!(bare.description, NO_DESCRIPTION);
    }
}
