use crate::links::top_links;
use crate::render::{self, COLOR_SUCCESS, COLOR_WARNING};
use crate::{Context, Error};
use poise::serenity_prelude::{CreateEmbed, Timestamp};
use tracing::info;

/// Durchsucht deine gesammelten Nachrichten nach einem Begriff
#[poise::command(slash_command)]
pub async fn suche(
    ctx: Context<'_>,
    #[description = "Wonach soll gesucht werden?"] suchbegriff: String,
) -> Result<(), Error> {
    ctx.defer().await?;
    let data = ctx.data();

    if data.corpus.is_empty() {
        let embed = render::notice_embed(
            "📭 Noch keine Nachrichten gesammelt",
            "Ich kann erst suchen, nachdem Nachrichten gesammelt wurden.",
            COLOR_WARNING,
        );
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        return Ok(());
    }

    info!("Search command received: '{}'", suchbegriff);
    let answer = data.engine.hierarchical_search(&suchbegriff).await;
    let channels = data.engine.candidate_channels(&suchbegriff);
    let snapshot = data.corpus.scan_all();
    let links = top_links(&snapshot, &suchbegriff, Some(channels.as_slice()), 5);

    let mut embed = CreateEmbed::new()
        .title(render::title(&format!("🔍 Suchergebnisse für: {}", suchbegriff)))
        .description(render::description(&answer))
        .field(
            "📂 Durchsuchte Kanäle",
            render::field(&render::channel_list(&channels)),
            false,
        )
        .footer(render::footer(format!("Durchsucht: {} Nachrichten", snapshot.len())))
        .timestamp(Timestamp::now())
        .color(COLOR_SUCCESS);

    if !links.is_empty() {
        embed = embed.field("🔗 Top Links", render::field(&render::links_text(&links)), false);
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
