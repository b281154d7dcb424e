use crate::render::{self, COLOR_WARNING};
use crate::{Context, Error};

/// Analysiert eine Nachricht und schlägt einen passenden Kanal vor
#[poise::command(slash_command, ephemeral)]
pub async fn kanalvorschlag(
    ctx: Context<'_>,
    #[description = "Die Nachricht, die eingeordnet werden soll"] nachricht: String,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;
    let data = ctx.data();

    let suggestion = data
        .classifier
        .suggest_channel(&nachricht, data.fetcher.as_ref())
        .await;

    let embed = match suggestion {
        Some(suggestion) => render::suggestion_embed(&suggestion, &nachricht),
        None => render::notice_embed(
            "🤔 Kein Kanalvorschlag",
            "Ich konnte keinen passenden Kanal für diese Nachricht finden.",
            COLOR_WARNING,
        ),
    };

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}
