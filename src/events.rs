//! Gateway message handling: thread follow-ups, ingestion and channel
//! suggestions.

use crate::history::to_draft;
use crate::ingest::IngestOutcome;
use crate::links::top_links;
use crate::model::ThreadContext;
use crate::render::{self, COLOR_INFO};
use crate::suggest::{offer_suggestion, SuggestionPrompt, SUGGESTION_TIMEOUT};
use crate::Data;
use poise::serenity_prelude as serenity;
use serenity::{CreateEmbed, CreateMessage, Timestamp};
use tracing::{debug, error, info, warn};

const DM: &str = "DM";

pub async fn handle_message(ctx: &serenity::Context, msg: &serenity::Message, data: &Data) {
    if msg.author.bot {
        return;
    }
    if msg.content.trim().is_empty() && msg.attachments.is_empty() {
        return;
    }

    if let Some(context) = data.threads.get(msg.channel_id.get()) {
        if let Err(e) = answer_follow_up(ctx, msg, data, &context).await {
            warn!("Thread follow-up in {} failed: {}", msg.channel_id, e);
        }
    }

    let (channel, guild) = match msg.guild_id {
        Some(guild_id) => {
            let channel = msg
                .channel_id
                .name(ctx)
                .await
                .unwrap_or_else(|_| msg.channel_id.to_string());
            let guild = guild_id
                .name(&ctx.cache)
                .unwrap_or_else(|| guild_id.to_string());
            (channel, guild)
        }
        None => (DM.to_string(), DM.to_string()),
    };

    match data.ingestor.ingest(to_draft(msg, &channel, &guild)).await {
        Ok(IngestOutcome::Stored { links, evicted }) => {
            if links > 0 {
                debug!("Message {} stored with {} links", msg.id, links);
            }
            if evicted > 0 {
                info!("Corpus limit reached, {} oldest messages evicted", evicted);
            }
        }
        Ok(IngestOutcome::Duplicate) | Ok(IngestOutcome::Empty) => {}
        Err(e) => error!("Failed to store message {}: {:#}", msg.id, e),
    }

    if msg.guild_id.is_some() && data.config.suggestion_channels.contains(&channel) {
        offer_channel_suggestion(ctx, msg, data, channel).await;
    }
}

/// Drops the follow-up context of a deleted thread.
pub fn forget_thread(thread_id: u64, data: &Data) {
    if data.threads.remove(thread_id).is_some() {
        debug!("Thread {} deleted, follow-up context dropped", thread_id);
    }
}

async fn answer_follow_up(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
    context: &ThreadContext,
) -> serenity::Result<()> {
    let query = if msg.content.trim().is_empty() {
        context.base_query.as_str()
    } else {
        msg.content.as_str()
    };

    let outcome = data
        .engine
        .channel_filtered_search(query, &context.channels, context.strict)
        .await;

    let mut embed = CreateEmbed::new()
        .title(render::title("🧵 Thread-Antwort"))
        .description(render::description(&outcome.answer))
        .field(
            "🧭 Kontext",
            render::field(&format!(
                "Basisfrage: {}\nKanäle: {}",
                context.base_query,
                render::channel_list(&context.channels)
            )),
            false,
        )
        .timestamp(Timestamp::now())
        .color(COLOR_INFO);

    let snapshot = data.corpus.scan_all();
    let links = top_links(&snapshot, query, Some(context.channels.as_slice()), 5);
    if !links.is_empty() {
        embed = embed.field("🔗 Top Links", render::field(&render::links_text(&links)), false);
    }

    msg.channel_id
        .send_message(&ctx.http, CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

async fn offer_channel_suggestion(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
    channel: String,
) {
    let Some(suggestion) = data
        .classifier
        .suggest_channel(&msg.content, data.fetcher.as_ref())
        .await
    else {
        return;
    };
    if suggestion.channel == channel {
        return;
    }

    debug!(
        "Suggesting #{} for message {} in #{}",
        suggestion.channel, msg.id, channel
    );
    let ctx = ctx.clone();
    let original = msg.clone();
    tokio::spawn(async move {
        let prompt = SuggestionPrompt {
            serenity_ctx: &ctx,
            original: &original,
            channel_name: &channel,
            timeout: SUGGESTION_TIMEOUT,
        };
        if let Err(e) = offer_suggestion(&prompt, &suggestion).await {
            warn!("Channel suggestion failed: {:#}", e);
        }
    });
}
