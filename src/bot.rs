//! Discord bot core logic and event handling.

use std::sync::Arc;

use log::{debug, error, info, warn};
use poise::{
    Framework, FrameworkError, FrameworkOptions, builtins,
    serenity_prelude::{ClientBuilder, Context, FullEvent, GatewayIntents, Mentionable},
};
use tokio::sync::watch;

use crate::commands::{describe_resolution, lookup_commands};
use crate::config::Config;
use crate::error::{BotError, Result};
use crate::lookup::MonsterLookup;
use crate::resolver::ResolveOptions;

type EventResult = Result<()>;

pub struct Data {
    pub lookup: Arc<MonsterLookup>,
}

/// Run the Discord bot.
pub async fn run() -> Result<()> {
    info!("Initializing bot");
    let config = Config::from_env()?;

    let lookup = Arc::new(MonsterLookup::new(config.lookup)?);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresh_task = tokio::spawn(Arc::clone(&lookup).run_refresh_loop(shutdown_rx));

    debug!("Setting up gateway intents");
    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

    debug!("Building framework");
    let framework = Framework::builder()
        .options(FrameworkOptions {
            commands: lookup_commands(),
            event_handler: |ctx, event, _framework, data| Box::pin(event_handler(ctx, event, data)),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                info!("Bot is ready and connected to Discord");
                debug!("Registering commands globally");
                builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Commands registered successfully");
                Ok(Data { lookup })
            })
        })
        .build();

    debug!("Creating Discord client");
    let mut client = ClientBuilder::new(config.discord_token, intents)
        .framework(framework)
        .await?;

    info!("Starting Discord client");

    let outcome = tokio::select! {
        result = client.start() => result.map_err(BotError::from),
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down...");
            Ok(())
        }
    };

    shutdown_tx.send_replace(true);
    if let Err(e) = refresh_task.await {
        warn!("Refresh task ended abnormally: {e}");
    }

    outcome
}

async fn on_error(error: FrameworkError<'_, Data, BotError>) {
    match error {
        FrameworkError::Command { error, ctx, .. } => {
            error!("Command /{} failed: {error}", ctx.command().name);
            if let Err(e) = ctx.say(error.user_message()).await {
                warn!("Failed to report command error: {e}");
            }
        }
        other => {
            if let Err(e) = builtins::on_error(other).await {
                warn!("Failed to handle framework error: {e}");
            }
        }
    }
}

/// Strip the bot mention from a message, leaving the query text.
fn mention_query(content: &str, mention: &str, nick_mention: &str) -> String {
    content
        .replace(nick_mention, " ")
        .replace(mention, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

async fn event_handler(ctx: &Context, event: &FullEvent, data: &Data) -> EventResult {
    let bot_user_id = ctx.cache.current_user().id;
    if let FullEvent::Message { new_message } = event
        && new_message.mentions_user_id(bot_user_id)
        && new_message.author.id != bot_user_id
    {
        let mention = bot_user_id.mention().to_string();
        let nick_mention = format!("<@!{bot_user_id}>");
        let query = mention_query(&new_message.content, &mention, &nick_mention);
        info!(
            "Received lookup from {} in channel {}: {query}",
            new_message.author.tag(),
            new_message.channel_id,
        );
        if query.is_empty() {
            return Ok(());
        }

        let reply = match data.lookup.resolve(&query, ResolveOptions::default()).await {
            Ok(resolved) => describe_resolution(&query, &resolved),
            Err(e) => {
                error!(
                    "Error processing message from {}: {e}",
                    new_message.author.tag()
                );
                e.user_message()
            }
        };
        new_message.reply(&ctx.http, reply).await?;
    }
    Ok(())
}
