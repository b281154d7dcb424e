use crate::links::top_links;
use crate::model::{ThreadContext, TIMESTAMP_FORMAT};
use crate::ranker::{known_channels, rank_channels};
use crate::render::{self, COLOR_INFO, COLOR_WARNING};
use crate::stats::hit_ratio;
use crate::{Context, Data, Error};
use poise::serenity_prelude as serenity;
use serenity::{CreateEmbed, Timestamp};
use tracing::{info, warn};

const THREAD_NAME_CHARS: usize = 80;

/// Stellt der KI eine Frage zu deinen gesammelten Nachrichten
#[poise::command(slash_command)]
pub async fn frage(
    ctx: Context<'_>,
    #[description = "Deine Frage, z.B. 'Was wurde in #reisen über Portugal gesagt?'"] frage: String,
) -> Result<(), Error> {
    ctx.defer().await?;
    let data = ctx.data();

    if data.corpus.is_empty() {
        let embed = render::notice_embed(
            "📭 Noch keine Nachrichten gesammelt",
            "Der Bot muss erst Nachrichten sammeln, bevor ich Fragen beantworten kann.",
            COLOR_WARNING,
        );
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        return Ok(());
    }

    info!("Question from {}: '{}'", ctx.author().name, frage);

    let snapshot = data.corpus.scan_all();
    let explicit = data.resolver.resolve(&frage, &known_channels(&snapshot));
    let relevant = if explicit.channels.is_empty() {
        rank_channels(&frage, &snapshot, data.profiles.topics())
    } else {
        explicit.channels.clone()
    };

    let outcome = data
        .engine
        .channel_filtered_search(&frage, &relevant, explicit.strict)
        .await;

    let scan_channels = if outcome.matched_channels.is_empty() {
        &relevant
    } else {
        &outcome.matched_channels
    };

    let mut embed = CreateEmbed::new()
        .title(render::title("🤖 KI-Antwort"))
        .description(render::description(&outcome.answer))
        .field("📝 Deine Frage", render::field(&frage), false)
        .timestamp(Timestamp::now())
        .color(COLOR_INFO);

    if !outcome.matched_channels.is_empty() {
        let shown: Vec<String> = outcome.matched_channels.iter().take(10).cloned().collect();
        embed = embed.field(
            "📂 Gefunden in",
            render::field(&render::channel_list(&shown)),
            false,
        );
    }

    let links = top_links(&snapshot, &frage, Some(scan_channels.as_slice()), 5);
    if !links.is_empty() {
        embed = embed.field("🔗 Top Links", render::field(&render::links_text(&links)), false);
    }

    let ratio = hit_ratio(&snapshot, &frage, scan_channels);
    embed = embed
        .field(
            "📊 Qualitätsmetriken",
            render::field(&format!(
                "Trefferquote: {}% ({}/{}) • Antwortlänge: {} Zeichen",
                ratio.percent(),
                ratio.matched,
                ratio.scanned,
                outcome.answer.chars().count()
            )),
            false,
        )
        .footer(render::footer(format!(
            "Basierend auf {} Nachrichten",
            snapshot.len()
        )));

    let handle = ctx.send(poise::CreateReply::default().embed(embed)).await?;

    if data.config.enable_threads && ctx.guild_id().is_some() {
        let answer = handle.message().await?;
        let context = ThreadContext {
            key: 0,
            base_query: frage.clone(),
            channels: outcome.matched_channels,
            strict: explicit.strict,
            created_by: ctx.author().id.get(),
            created_at: chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string(),
        };
        if let Err(e) = open_follow_up_thread(ctx, data, &answer, context).await {
            warn!("Failed to create follow-up thread: {}", e);
        }
    }

    Ok(())
}

pub fn auto_archive_duration(minutes: u16) -> serenity::AutoArchiveDuration {
    match minutes {
        60 => serenity::AutoArchiveDuration::OneHour,
        4320 => serenity::AutoArchiveDuration::ThreeDays,
        10080 => serenity::AutoArchiveDuration::OneWeek,
        _ => serenity::AutoArchiveDuration::OneDay,
    }
}

pub fn thread_name(question: &str) -> String {
    let head: String = question.chars().take(THREAD_NAME_CHARS).collect();
    format!("Frage: {}", head)
}

/// Opens a public thread on the posted answer and remembers what it was
/// about, so later messages in the thread can be answered with the same
/// channel scope.
async fn open_follow_up_thread(
    ctx: Context<'_>,
    data: &Data,
    answer: &serenity::Message,
    mut context: ThreadContext,
) -> Result<(), Error> {
    let mut builder = serenity::CreateThread::new(thread_name(&context.base_query))
        .auto_archive_duration(auto_archive_duration(data.config.thread_auto_archive_minutes));
    if data.config.thread_slowmode > 0 {
        builder = builder.rate_limit_per_user(data.config.thread_slowmode);
    }

    let thread = answer
        .channel_id
        .create_thread_from_message(ctx.http(), answer.id, builder)
        .await?;

    context.key = thread.id.get();
    data.threads.insert(context);

    thread
        .id
        .say(
            ctx.http(),
            format!(
                "Thread für die Frage von <@{}>. Weitere Rückfragen bitte hier posten.",
                ctx.author().id
            ),
        )
        .await?;

    info!("Follow-up thread {} opened", thread.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_archive_duration() {
        assert_eq!(auto_archive_duration(60), serenity::AutoArchiveDuration::OneHour);
        assert_eq!(auto_archive_duration(1440), serenity::AutoArchiveDuration::OneDay);
        assert_eq!(auto_archive_duration(4320), serenity::AutoArchiveDuration::ThreeDays);
        assert_eq!(auto_archive_duration(10080), serenity::AutoArchiveDuration::OneWeek);
    }

    #[test]
    fn test_thread_name() {
        assert_eq!(thread_name("Reise?"), "Frage: Reise?");
        let long = "ä".repeat(120);
        assert_eq!(thread_name(&long).chars().count(), "Frage: ".len() + 80);
    }
}
