use channelmind::history::{sync_history, HistoryFilter};
use channelmind::{commands, config::Config, events, Data};
use poise::serenity_prelude as serenity;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    info!("{:?}", config);
    let discord_token = config.discord_token.clone();
    let data = Data::from_config(config)?;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            event_handler: |ctx, event, _framework, data| {
                Box::pin(async move {
                    match event {
                        serenity::FullEvent::Message { new_message } => {
                            events::handle_message(ctx, new_message, data).await;
                        }
                        serenity::FullEvent::ThreadDelete { thread, .. } => {
                            events::forget_thread(thread.id.get(), data);
                        }
                        _ => {}
                    }
                    Ok(())
                })
            },
            on_error: |error| {
                Box::pin(async move {
                    if let Err(e) = poise::builtins::on_error(error).await {
                        error!("Error while handling error: {}", e);
                    }
                })
            },
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("{} slash commands registered", framework.options().commands.len());

                let ingestor = data.ingestor.clone();
                let filter = HistoryFilter {
                    guild_id: data.config.guild_id,
                    channel_id: data.config.channel_id,
                    limit: data.config.history_limit,
                };
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    if let Err(e) = sync_history(&ctx, &ingestor, filter).await {
                        error!("Initial history sync failed: {:#}", e);
                    }
                });

                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MESSAGES;

    let mut client = serenity::ClientBuilder::new(&discord_token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    Ok(())
}
