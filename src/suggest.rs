use crate::classify::ChannelSuggestion;
use crate::render;
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::time::Duration;
use tracing::{debug, info};

pub const SUGGESTION_TIMEOUT: Duration = Duration::from_secs(300);

const MOVE_ID: &str = "suggest_move";
const REJECT_ID: &str = "suggest_reject";
const IGNORE_ID: &str = "suggest_ignore";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionAction {
    Move,
    Reject,
    Ignore,
}

impl SuggestionAction {
    pub fn from_custom_id(id: &str) -> Option<Self> {
        match id {
            MOVE_ID => Some(Self::Move),
            REJECT_ID => Some(Self::Reject),
            IGNORE_ID => Some(Self::Ignore),
            _ => None,
        }
    }
}

pub struct SuggestionPrompt<'a> {
    pub serenity_ctx: &'a serenity::Context,
    pub original: &'a serenity::Message,
    pub channel_name: &'a str,
    pub timeout: Duration,
}

/// Replies to `original` with the suggestion and Move / Reject / Ignore
/// buttons, then handles clicks from the message author until one of them
/// resolves the prompt or it times out.
pub async fn offer_suggestion(
    prompt: &SuggestionPrompt<'_>,
    suggestion: &ChannelSuggestion,
) -> anyhow::Result<Option<SuggestionAction>> {
    use serenity::{
        ButtonStyle, CreateActionRow, CreateButton, CreateInteractionResponse,
        CreateInteractionResponseMessage, CreateMessage, EditMessage,
    };

    let http = &prompt.serenity_ctx.http;
    let embed = render::suggestion_embed(suggestion, &prompt.original.content);
    let row = CreateActionRow::Buttons(vec![
        CreateButton::new(MOVE_ID)
            .label("Verschieben")
            .style(ButtonStyle::Secondary),
        CreateButton::new(REJECT_ID)
            .label("❌ Ablehnen")
            .style(ButtonStyle::Danger),
        CreateButton::new(IGNORE_ID)
            .label("Ignorieren")
            .style(ButtonStyle::Secondary),
    ]);

    let mut message = prompt
        .original
        .channel_id
        .send_message(
            http,
            CreateMessage::new()
                .embed(embed)
                .components(vec![row])
                .reference_message(prompt.original),
        )
        .await
        .context("Failed to send channel suggestion")?;

    loop {
        let Some(interaction) = message
            .await_component_interaction(prompt.serenity_ctx)
            .timeout(prompt.timeout)
            .await
        else {
            debug!("Channel suggestion for message {} timed out", prompt.original.id);
            let _ = message
                .edit(http, EditMessage::new().components(Vec::new()))
                .await;
            return Ok(None);
        };

        if interaction.user.id != prompt.original.author.id {
            let _ = interaction
                .create_response(
                    http,
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new()
                            .content(format!(
                                "Nur <@{}> kann über diesen Vorschlag entscheiden.",
                                prompt.original.author.id
                            ))
                            .ephemeral(true),
                    ),
                )
                .await;
            continue;
        }

        let Some(action) = SuggestionAction::from_custom_id(&interaction.data.custom_id) else {
            continue;
        };

        match action {
            SuggestionAction::Move => {
                let reply = match move_message(prompt, &suggestion.channel, &interaction.user).await {
                    Ok(true) => format!(
                        "✅ Nachricht erfolgreich nach #{} verschoben!",
                        suggestion.channel
                    ),
                    Ok(false) => {
                        let _ = interaction
                            .create_response(
                                http,
                                CreateInteractionResponse::Message(
                                    CreateInteractionResponseMessage::new()
                                        .content(format!(
                                            "Kanal #{} nicht gefunden!",
                                            suggestion.channel
                                        ))
                                        .ephemeral(true),
                                ),
                            )
                            .await;
                        continue;
                    }
                    Err(e) => format!("Fehler beim Verschieben: {}", e),
                };
                let _ = interaction
                    .create_response(
                        http,
                        CreateInteractionResponse::Message(
                            CreateInteractionResponseMessage::new()
                                .content(reply)
                                .ephemeral(true),
                        ),
                    )
                    .await;
                let _ = message
                    .edit(http, EditMessage::new().components(Vec::new()))
                    .await;
            }
            SuggestionAction::Reject => {
                let _ = interaction
                    .create_response(
                        http,
                        CreateInteractionResponse::Message(
                            CreateInteractionResponseMessage::new()
                                .content("👍 Vorschlag abgelehnt. Die Nachricht bleibt hier.")
                                .ephemeral(true),
                        ),
                    )
                    .await;
                let _ = message
                    .edit(http, EditMessage::new().components(Vec::new()))
                    .await;
            }
            SuggestionAction::Ignore => {
                let _ = interaction
                    .create_response(http, CreateInteractionResponse::Acknowledge)
                    .await;
                let _ = message.delete(http).await;
            }
        }

        info!(
            "Suggestion #{} for message {} resolved with {:?}",
            suggestion.channel, prompt.original.id, action
        );
        return Ok(Some(action));
    }
}

/// Reposts the original message into the channel named `target`. Returns
/// `Ok(false)` when the guild has no such channel.
async fn move_message(
    prompt: &SuggestionPrompt<'_>,
    target: &str,
    moved_by: &serenity::User,
) -> anyhow::Result<bool> {
    use serenity::{CreateEmbed, CreateEmbedAuthor, CreateMessage};

    let http = &prompt.serenity_ctx.http;
    let Some(guild_id) = prompt.original.guild_id else {
        return Ok(false);
    };
    let channels = guild_id.channels(http).await?;
    let Some(target_channel) = channels.values().find(|c| c.name == target) else {
        return Ok(false);
    };

    let author = &prompt.original.author;
    let embed = CreateEmbed::new()
        .title("Verschobene Nachricht")
        .description(render::description(&prompt.original.content))
        .author(CreateEmbedAuthor::new(author.name.clone()).icon_url(author.face()))
        .field(
            "Ursprünglicher Kanal",
            format!("#{}", prompt.channel_name),
            true,
        )
        .field("Verschoben von", moved_by.name.clone(), true)
        .timestamp(prompt.original.timestamp)
        .color(0x3498db);

    target_channel
        .id
        .send_message(http, CreateMessage::new().embed(embed))
        .await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_ids() {
        assert_eq!(SuggestionAction::from_custom_id("suggest_move"), Some(SuggestionAction::Move));
        assert_eq!(SuggestionAction::from_custom_id("suggest_reject"), Some(SuggestionAction::Reject));
        assert_eq!(SuggestionAction::from_custom_id("suggest_ignore"), Some(SuggestionAction::Ignore));
        assert_eq!(SuggestionAction::from_custom_id("confirm_tool"), None);
    }
}
