//! Discord bot core logic and event handling.

use std::future::Future;
use std::sync::Arc;

use log::{debug, error, info};
use poise::{
    Framework, FrameworkOptions, builtins,
    serenity_prelude::{ClientBuilder, Context, FullEvent, GatewayIntents},
};
use tokio_util::sync::CancellationToken;

use crate::chatbot::{
    CompletionInvoker, DEFAULT_CHUNK_LEN, DiscordReply, HistoryStore, InboundMessage,
    MessageRouter,
};
use crate::commands::bot_commands;
use crate::config::{Config, SamplingParams};
use crate::error::{BotError, Result};
use crate::groq::{CompletionBackend, GroqClient};
use crate::types::ConversationTurn;

pub struct Data {
    router: MessageRouter,
}

impl Data {
    pub fn router(&self) -> &MessageRouter {
        &self.router
    }
}

/// Run the Discord bot until the gateway closes or Ctrl-C is received.
///
/// # Errors
///
/// Returns an error if configuration is missing or the Discord client fails.
pub async fn run() -> Result<()> {
    info!("Initializing bot");
    let config = Config::from_env()?;

    debug!("Initializing Groq client");
    let backend: Arc<dyn CompletionBackend> = Arc::new(GroqClient::new(
        config.groq_api_key.clone(),
        config.groq_api_url.clone(),
        config.groq_model.clone(),
        config.sampling,
    ));

    let connection_check: Arc<dyn CompletionBackend> = Arc::new(GroqClient::new(
        config.groq_api_key.clone(),
        config.groq_api_url.clone(),
        config.groq_model.clone(),
        SamplingParams::connection_check(),
    ));

    let shutdown = CancellationToken::new();
    let router = MessageRouter::new(
        Arc::new(HistoryStore::new(config.max_history_pairs)),
        CompletionInvoker::new(backend, shutdown.clone()),
        config.system_prompt.clone(),
        DEFAULT_CHUNK_LEN,
    );

    debug!("Setting up gateway intents");
    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

    debug!("Building framework");
    let framework = Framework::builder()
        .options(FrameworkOptions {
            commands: bot_commands(),
            event_handler: |ctx, event, _framework, data| Box::pin(event_handler(ctx, event, data)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot is ready and logged in as {}", ready.user.name);
                debug!("Registering commands globally");
                builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Commands registered successfully");
                tokio::spawn(probe_completion(connection_check));
                Ok(Data { router })
            })
        })
        .build();

    debug!("Creating Discord client");
    let mut client = ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;
    let shard_manager = Arc::clone(&client.shard_manager);

    info!("Starting Discord client");

    let result = serve_until_shutdown(
        async { client.start().await.map_err(BotError::from) },
        async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
        },
        &shutdown,
    )
    .await;

    shard_manager.shutdown_all().await;
    result
}

/// Drive the gateway until it stops or the signal fires, then cancel in-flight work.
///
/// The token is cancelled on every exit path, including a gateway error.
async fn serve_until_shutdown(
    gateway: impl Future<Output = Result<()>>,
    signal: impl Future<Output = ()>,
    shutdown: &CancellationToken,
) -> Result<()> {
    let result = tokio::select! {
        result = gateway => {
            if let Err(e) = &result {
                error!("Discord client stopped with an error: {e}");
            }
            result
        }
        () = signal => {
            info!("Shutdown signal received, shutting down...");
            Ok(())
        }
    };

    shutdown.cancel();
    result
}

/// Issue one tiny completion so a bad key or model shows up in the logs at startup.
async fn probe_completion(backend: Arc<dyn CompletionBackend>) {
    let turns = vec![
        ConversationTurn::system("You are a helpful assistant."),
        ConversationTurn::user("Say hello"),
    ];
    match backend.complete(turns).await {
        Ok(reply) => {
            let preview: String = reply.chars().take(50).collect();
            info!("Completion API connection successful: {preview}");
        }
        Err(e) => error!("Completion API connection failed: {e}"),
    }
}

async fn event_handler(ctx: &Context, event: &FullEvent, data: &Data) -> Result<()> {
    if let FullEvent::Message { new_message } = event {
        let bot_user_id = ctx.cache.current_user().id;
        let inbound = InboundMessage::from_serenity(new_message, bot_user_id);

        let _typing = (inbound.addressed && !inbound.from_self && !inbound.mentions_everyone)
            .then(|| new_message.channel_id.start_typing(&ctx.http));

        let reply = DiscordReply::new(ctx, new_message);
        let outcome = data.router.handle(&inbound, &reply).await;
        debug!("Message {} routed: {outcome:?}", new_message.id);
    }
    Ok(())
}
