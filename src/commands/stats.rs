use crate::render::{self, COLOR_SUCCESS, COLOR_WARNING};
use crate::stats::CorpusStats;
use crate::{Context, Error};
use poise::serenity_prelude::{CreateEmbed, Timestamp};

/// Zeigt Statistiken über die gesammelten Nachrichten
#[poise::command(slash_command)]
pub async fn stats(ctx: Context<'_>) -> Result<(), Error> {
    let snapshot = ctx.data().corpus.scan_all();

    if snapshot.is_empty() {
        let embed = render::notice_embed(
            "📊 Statistiken",
            "📭 Noch keine Nachrichten gesammelt!",
            COLOR_WARNING,
        );
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        return Ok(());
    }

    let stats = CorpusStats::collect(&snapshot);
    let authors = stats
        .top_authors
        .iter()
        .map(|(author, count)| format!("**{}**: {} Nachrichten", author, count))
        .collect::<Vec<_>>()
        .join("\n");
    let channels = stats
        .top_channels
        .iter()
        .map(|(channel, count)| format!("**#{}**: {} Nachrichten", channel, count))
        .collect::<Vec<_>>()
        .join("\n");
    let unknown = "Unbekannt".to_string();

    let embed = CreateEmbed::new()
        .title("📊 Nachrichten-Statistiken")
        .field(
            "📈 Gesamt",
            format!("**{}** Nachrichten gesammelt", stats.total),
            false,
        )
        .field("👥 Top Autoren", render::field(&authors), true)
        .field("📺 Top Channels", render::field(&channels), true)
        .field(
            "⏰ Zeitraum",
            format!(
                "**Von:** {}\n**Bis:** {}",
                stats.first_seen.as_ref().unwrap_or(&unknown),
                stats.last_seen.as_ref().unwrap_or(&unknown)
            ),
            false,
        )
        .footer(render::footer("Statistiken werden live aktualisiert"))
        .timestamp(Timestamp::now())
        .color(COLOR_SUCCESS);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
