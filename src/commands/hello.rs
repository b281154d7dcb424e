use crate::render::{self, COLOR_INFO};
use crate::{Context, Error};
use poise::serenity_prelude::CreateEmbed;

/// Der Bot grüßt dich!
#[poise::command(slash_command)]
pub async fn hallo(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();

    let ai_status = if data.summarizer_enabled {
        format!("Aktiv ({})", data.config.llm_model)
    } else {
        "Deaktiviert (kein API-Schlüssel)".to_string()
    };

    let embed = CreateEmbed::new()
        .title("👋 Hallo!")
        .description(format!(
            "Hallo <@{}>! Ich sammle Nachrichten und beantworte Fragen dazu.",
            ctx.author().id
        ))
        .field(
            "🤖 Verfügbare Befehle",
            "• `/suche` - Durchsuche gesammelte Nachrichten\n\
             • `/frage` - Stelle KI-Fragen zu den Nachrichten\n\
             • `/kanalvorschlag` - Finde den passenden Kanal\n\
             • `/stats` - Zeige Statistiken\n\
             • `/clear`, `/migrate`, `/sync` - Verwaltung (Admin)",
            false,
        )
        .field(
            "📊 Status",
            format!("**{}** Nachrichten gesammelt", data.corpus.len()),
            true,
        )
        .field("🧠 KI", ai_status, true)
        .footer(render::footer(format!("Modell: {}", data.config.llm_model)))
        .color(COLOR_INFO);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
