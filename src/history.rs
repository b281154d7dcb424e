//! Loading past channel history from Discord into the corpus.

use crate::ingest::{Ingestor, MessageDraft};
use crate::model::TIMESTAMP_FORMAT;
use poise::serenity_prelude as serenity;
use std::time::Duration;
use tracing::{debug, info, warn};

const PAGE_SIZE: usize = 100;
const CHANNEL_PAUSE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryFilter {
    pub guild_id: Option<u64>,
    pub channel_id: Option<u64>,
    /// Messages to read per channel.
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub before: usize,
    pub after: usize,
    pub added: usize,
}

/// `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn format_timestamp(unix_seconds: i64) -> String {
    chrono::DateTime::from_timestamp(unix_seconds, 0)
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

pub fn to_draft(message: &serenity::Message, channel: &str, guild: &str) -> MessageDraft {
    MessageDraft {
        id: message.id.get(),
        author: message.author.name.clone(),
        author_id: Some(message.author.id.get()),
        channel: channel.to_string(),
        channel_id: Some(message.channel_id.get()),
        guild: guild.to_string(),
        guild_id: message.guild_id.map(|g| g.get()),
        content: message.content.clone(),
        timestamp: format_timestamp(message.timestamp.unix_timestamp()),
        attachments: message.attachments.iter().map(|a| a.url.clone()).collect(),
        jump_url: Some(message.link()),
    }
}

/// Reads up to `limit` messages from a channel, newest first.
async fn read_channel(
    http: &serenity::Http,
    channel_id: serenity::ChannelId,
    limit: usize,
) -> serenity::Result<Vec<serenity::Message>> {
    let mut messages = Vec::new();
    let mut before: Option<serenity::MessageId> = None;

    while messages.len() < limit {
        let page = (limit - messages.len()).min(PAGE_SIZE);
        let mut request = serenity::GetMessages::new().limit(page as u8);
        if let Some(id) = before {
            request = request.before(id);
        }
        let batch = channel_id.messages(http, request).await?;
        let received = batch.len();
        before = batch.last().map(|m| m.id);
        messages.extend(batch);
        if received < page {
            break;
        }
    }

    Ok(messages)
}

/// Imports the history of every readable text channel the bot can see.
/// Bot and empty messages are skipped; links are left for the backfill.
pub async fn sync_history(
    ctx: &serenity::Context,
    ingestor: &Ingestor,
    filter: HistoryFilter,
) -> anyhow::Result<SyncReport> {
    let before = ingestor.corpus().len();
    let mut drafts = Vec::new();

    for guild_id in ctx.cache.guilds() {
        if filter.guild_id.is_some_and(|id| id != guild_id.get()) {
            continue;
        }
        let guild_name = guild_id
            .name(&ctx.cache)
            .unwrap_or_else(|| guild_id.to_string());
        info!("Loading history from server {}", guild_name);

        let channels = match guild_id.channels(&ctx.http).await {
            Ok(channels) => channels,
            Err(e) => {
                warn!("Cannot list channels of {}: {}", guild_name, e);
                continue;
            }
        };

        for channel in channels.values() {
            if channel.kind != serenity::ChannelType::Text {
                continue;
            }
            if filter.channel_id.is_some_and(|id| id != channel.id.get()) {
                continue;
            }

            let messages = match read_channel(&ctx.http, channel.id, filter.limit).await {
                Ok(messages) => messages,
                Err(e) => {
                    warn!("Skipping #{}: {}", channel.name, e);
                    continue;
                }
            };

            let mut loaded = 0;
            for message in messages.iter().filter(|m| !m.author.bot) {
                let draft = to_draft(message, &channel.name, &guild_name);
                if draft.is_empty() || ingestor.corpus().contains(draft.id) {
                    continue;
                }
                drafts.push(draft);
                loaded += 1;
            }
            if loaded > 0 {
                debug!("{} messages from #{}", loaded, channel.name);
            }

            tokio::time::sleep(CHANNEL_PAUSE).await;
        }
    }

    let added = ingestor.import(drafts).await?;
    let after = ingestor.corpus().len();
    info!(
        "History sync finished: {} new messages, {} total",
        added, after
    );
    Ok(SyncReport {
        before,
        after,
        added,
    })
}
