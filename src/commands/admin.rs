use crate::history::{sync_history, HistoryFilter};
use crate::render::{self, COLOR_ERROR, COLOR_SUCCESS, COLOR_WARNING};
use crate::{Context, Error};
use poise::serenity_prelude::{CreateEmbed, Timestamp};
use tracing::{error, info};

/// Löscht alle gesammelten Nachrichten (nur für Admins)
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn clear(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    let data = ctx.data();

    if data.corpus.is_empty() {
        let embed = render::notice_embed(
            "📭 Bereits leer",
            "Es sind keine Nachrichten zum Löschen vorhanden.",
            COLOR_WARNING,
        );
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        return Ok(());
    }

    let removed = data.ingestor.clear().await?;
    info!(
        "Corpus cleared by {} ({}): {} messages",
        ctx.author().name,
        ctx.author().id,
        removed
    );

    let embed = CreateEmbed::new()
        .title("🗑️ Datenbank geleert")
        .description(format!(
            "**{}** Nachrichten wurden erfolgreich gelöscht.",
            removed
        ))
        .field("👤 Gelöscht von", format!("<@{}>", ctx.author().id), true)
        .footer(render::footer("Die Nachrichtensammlung beginnt von neuem"))
        .timestamp(Timestamp::now())
        .color(COLOR_SUCCESS);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Extrahiert URL-Metadaten für bestehende Nachrichten (nur für Admins)
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn migrate(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;

    let report = ctx.data().backfill.run().await?;

    let embed = CreateEmbed::new()
        .title("🔄 Migration abgeschlossen")
        .field("📊 Migrierte Nachrichten", report.migrated.to_string(), true)
        .field("🔗 Extrahierte URLs", report.extracted.to_string(), true)
        .field("✅ Status", "Erfolgreich abgeschlossen", false)
        .timestamp(Timestamp::now())
        .color(COLOR_SUCCESS);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Lädt historische Nachrichten aus allen Kanälen (nur für Admins)
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn sync(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    let data = ctx.data();
    let filter = HistoryFilter {
        guild_id: data.config.guild_id,
        channel_id: data.config.channel_id,
        limit: data.config.history_limit,
    };

    let embed = match sync_history(ctx.serenity_context(), &data.ingestor, filter).await {
        Ok(report) => {
            let (status_name, status) = if report.added > 0 {
                ("✅ Status", "Historische Nachrichten erfolgreich geladen!")
            } else {
                ("ℹ️ Status", "Keine neuen Nachrichten gefunden.")
            };
            CreateEmbed::new()
                .title("📚 Nachrichtensynchronisation abgeschlossen")
                .field(
                    "📊 Statistiken",
                    format!(
                        "**Vorher:** {} Nachrichten\n**Nachher:** {} Nachrichten\n**Neu geladen:** {} Nachrichten",
                        report.before, report.after, report.added
                    ),
                    false,
                )
                .field(status_name, status, false)
                .timestamp(Timestamp::now())
                .color(COLOR_SUCCESS)
        }
        Err(e) => {
            error!("History sync failed: {:#}", e);
            render::notice_embed(
                "❌ Fehler beim Synchronisieren",
                &format!("Ein Fehler ist aufgetreten: {}", e),
                COLOR_ERROR,
            )
        }
    };

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
