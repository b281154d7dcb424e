//! Turning ranked messages into a natural-language answer.
//!
//! The engine builds a compact context from its ranked hits and hands it to a
//! [`Summarizer`]. [`LlmSummarizer`] is the production implementation; it never
//! fails, every problem is reported back as user-facing text.

use crate::llm::LlmClient;
use crate::model::{Message, NO_DESCRIPTION};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub const MAX_CONTEXT_ITEMS: usize = 8;
pub const MAX_CONTENT_CHARS: usize = 220;
pub const MAX_LINKS_PER_ITEM: usize = 3;
pub const MAX_DESCRIPTION_CHARS: usize = 120;

pub const DISABLED_MESSAGE: &str =
    "🔑 Kein API-Schlüssel gesetzt. KI-Funktionen sind derzeit deaktiviert.";
pub const INSUFFICIENT_CONTEXT: &str = "Keine ausreichend relevanten Informationen gefunden.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSnippet {
    pub title: String,
    pub domain: String,
    /// `None` when the page had no usable description.
    pub description: Option<String>,
}

/// One ranked message as the summarizer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextItem {
    pub channel: String,
    pub author: String,
    pub timestamp: String,
    pub content: String,
    pub links: Vec<LinkSnippet>,
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, query: &str, context: &[ContextItem]) -> String;
}

/// Truncates to `max` characters, appending `...` when something was cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

pub fn build_context(messages: &[Arc<Message>]) -> Vec<ContextItem> {
    messages
        .iter()
        .take(MAX_CONTEXT_ITEMS)
        .map(|m| ContextItem {
            channel: m.channel.clone(),
            author: m.author.clone(),
            timestamp: m.timestamp.clone(),
            content: truncate_chars(m.content.trim(), MAX_CONTENT_CHARS),
            links: m
                .links
                .iter()
                .take(MAX_LINKS_PER_ITEM)
                .map(|l| {
                    let description = l.description.trim();
                    let usable = !description.is_empty()
                        && description.to_lowercase() != NO_DESCRIPTION.to_lowercase();
                    LinkSnippet {
                        title: l.title.trim().to_string(),
                        domain: l.domain.trim().to_string(),
                        description: usable
                            .then(|| truncate_chars(description, MAX_DESCRIPTION_CHARS)),
                    }
                })
                .collect(),
        })
        .collect()
}

fn render_context(context: &[ContextItem]) -> String {
    let mut blocks = Vec::with_capacity(context.len());
    for item in context {
        let mut lines = vec![
            format!("- Kanal #{} · {} · {}:", item.channel, item.timestamp, item.author),
            format!("  {}", item.content),
        ];
        if !item.links.is_empty() {
            lines.push("  📎 Links:".to_string());
            for link in &item.links {
                match &link.description {
                    Some(d) => lines.push(format!("    • {} · {}: {}", link.title, link.domain, d)),
                    None => lines.push(format!("    • {} · {}", link.title, link.domain)),
                }
            }
        }
        blocks.push(lines.join("\n"));
    }
    blocks.join("\n")
}

pub fn build_prompt(query: &str, context: &[ContextItem]) -> String {
    format!(
        "Du bist ein hilfreicher Assistent für eine persönliche Wissensdatenbank.\n\
         Beantworte die Suchanfrage basierend AUSSCHLIESSLICH auf den folgenden \
         Discord-Nachrichten und Link-Metadaten.\n\n\
         Suchanfrage: \"{query}\"\n\n\
         Kontextnachrichten:\n{context}\n\n\
         Richtlinien:\n\
         - Analysiere Nachrichtentexte und Link-Metadaten (Titel, Beschreibungen, Domains).\n\
         - Bevorzuge neuere und mehrfach erwähnte Inhalte, wenn mehrere Optionen vorhanden sind.\n\
         - Nutze verwandte Begriffe (z. B. \"Font\" und \"Schriftart\"), aber erfinde keine Fakten.\n\
         - Wenn keine relevanten Informationen vorhanden sind, sage das ehrlich.\n\n\
         Ausgabeformat:\n\
         1) Antwort: Hauptantwort in 1-2 Sätzen (max. 900 Zeichen), klar und direkt.\n\
         2) Belege: Bis zu 4 Bulletpoints mit kurzen Zitaten oder Paraphrasen (max. 140 Zeichen je Punkt).\n\
         3) Links: Wenn hilfreich, bis zu 3 Einträge als \"Titel (Domain): kurzer Hinweis\".\n\n\
         WICHTIG:\n\
         - Keine Vermutungen außerhalb des Kontexts.\n\
         - Wenn der Kontext unzureichend ist, schreibe: \"{insufficient}\" und nenne ggf. \
         welche Begriffe im Kontext vorkamen.\n",
        query = query,
        context = render_context(context),
        insufficient = INSUFFICIENT_CONTEXT,
    )
}

/// Maps a failed completion onto the text shown to the user.
pub fn describe_failure(error: &str) -> String {
    let lower = error.to_lowercase();
    if lower.contains("quota") || lower.contains("rate") || lower.contains("limit") {
        "⏳ **API-Limit erreicht** - Bitte warte einen Moment und versuche es erneut.".to_string()
    } else if lower.contains("api_key") || lower.contains("api key") {
        "🔑 **API-Schlüssel Fehler** - Bitte überprüfe LLM_API_KEY in der .env Datei.".to_string()
    } else {
        format!("❌ **KI-Fehler:** {}", error)
    }
}

/// Summarizer backed by an OpenAI-compatible chat endpoint.
///
/// Calls are serialized and spaced at least `min_interval` apart. Without a
/// client (no API key configured) every call returns [`DISABLED_MESSAGE`].
pub struct LlmSummarizer {
    client: Option<LlmClient>,
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl LlmSummarizer {
    pub fn new(client: LlmClient, min_interval: Duration) -> Self {
        Self {
            client: Some(client),
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn disabled() -> Self {
        Self {
            client: None,
            min_interval: Duration::ZERO,
            last_call: Mutex::new(None),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, query: &str, context: &[ContextItem]) -> String {
        let Some(client) = &self.client else {
            return DISABLED_MESSAGE.to_string();
        };

        let prompt = build_prompt(query, context);

        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!("Rate limiting summarizer, waiting {:?}", wait);
                tokio::time::sleep(wait).await;
            }
        }

        info!(
            "Summarizing {} context items for query '{}' with {}",
            context.len(),
            query,
            client.model()
        );
        let result = client.completion(&prompt).await;
        *last_call = Some(Instant::now());

        match result {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Summarizer call failed: {:#}", e);
                describe_failure(&e.to_string())
            }
        }
    }
}
