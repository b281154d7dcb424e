//! Embed text helpers shared by commands and event handlers.

use crate::classify::ChannelSuggestion;
use crate::links::TopLink;
use poise::serenity_prelude::{CreateEmbed, CreateEmbedFooter};

pub const EMBED_TITLE_LIMIT: usize = 256;
pub const EMBED_DESCRIPTION_LIMIT: usize = 4096;
pub const EMBED_FIELD_LIMIT: usize = 1024;

pub const COLOR_INFO: u32 = 0x0099ff;
pub const COLOR_SUCCESS: u32 = 0x00ff00;
pub const COLOR_WARNING: u32 = 0xffa500;
pub const COLOR_ERROR: u32 = 0xff0000;

/// Shortens `text` to at most `max` characters, ending in `…` when cut.
pub fn clamp_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut clamped: String = text.chars().take(max.saturating_sub(1)).collect();
    clamped.push('…');
    clamped
}

pub fn title(text: &str) -> String {
    clamp_text(text, EMBED_TITLE_LIMIT)
}

pub fn description(text: &str) -> String {
    clamp_text(text, EMBED_DESCRIPTION_LIMIT)
}

pub fn field(text: &str) -> String {
    clamp_text(text, EMBED_FIELD_LIMIT)
}

/// `#a, #b, #c`
pub fn channel_list(channels: &[String]) -> String {
    channels
        .iter()
        .map(|c| format!("#{}", c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One markdown line per link: `[title](url) · domain`.
pub fn links_text(links: &[TopLink]) -> String {
    links
        .iter()
        .map(|l| format!("[{}]({}) · {}", l.title, l.url, l.domain))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Message preview used in suggestion embeds.
pub fn preview(text: &str) -> String {
    if text.chars().count() > 200 {
        let head: String = text.chars().take(200).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

pub fn suggestion_embed(suggestion: &ChannelSuggestion, analysed: &str) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(title("🎯 Kanalvorschlag"))
        .description(description(&format!(
            "Diese Nachricht würde gut in **#{}** passen!",
            suggestion.channel
        )))
        .field("Analysierte Nachricht", field(&preview(analysed)), false)
        .field("Grund", field(&suggestion.reason), false)
        .color(COLOR_SUCCESS);

    if !suggestion.alternatives.is_empty() {
        let alternatives = suggestion
            .alternatives
            .iter()
            .map(|(channel, score)| format!("#{} ({} Punkte)", channel, score))
            .collect::<Vec<_>>()
            .join(", ");
        embed = embed.field("Alternative Kanäle", field(&alternatives), false);
    }
    embed
}

pub fn notice_embed(heading: &str, text: &str, color: u32) -> CreateEmbed {
    CreateEmbed::new()
        .title(title(heading))
        .description(description(text))
        .color(color)
}

pub fn footer(text: impl Into<String>) -> CreateEmbedFooter {
    CreateEmbedFooter::new(text)
}
