use anyhow::Result;
use dotenvy::dotenv;
use log::{debug, error, info, warn};
use serenity::async_trait;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use persona_relay::commands::context::error_reply;
use persona_relay::commands::{
    register_global_commands, register_guild_commands, CommandContext, CommandRegistry,
};
use persona_relay::core::Config;
use persona_relay::features::generation::GeminiClient;
use persona_relay::features::personas::{JsonFileBackend, PersonaStore};

struct Handler {
    registry: CommandRegistry,
    ctx: Arc<CommandContext>,
    guild_id: Option<GuildId>,
}

impl Handler {
    async fn dispatch(
        &self,
        ctx: &Context,
        command: &ApplicationCommandInteraction,
        request_id: Uuid,
    ) -> Result<()> {
        let name = command.data.name.as_str();
        info!(
            "[{request_id}] Slash command received | Command: {name} | User: {} | Channel: {} | Guild: {}",
            command.user.id,
            command.channel_id,
            command
                .guild_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "DM".to_string())
        );

        match self.registry.get(name) {
            Some(handler) => {
                handler
                    .handle(Arc::clone(&self.ctx), ctx, command, request_id)
                    .await
            }
            None => {
                warn!("[{request_id}] No handler registered for /{name}");
                command
                    .create_interaction_response(&ctx.http, |response| {
                        response
                            .kind(InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|message| {
                                message
                                    .content(error_reply(format!("unknown command /{name}")))
                                    .ephemeral(true)
                            })
                    })
                    .await?;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("✅ Logged in as {} (ID: {})", ready.user.name, ready.user.id);
        info!("📡 Connected to {} guilds", ready.guilds.len());

        // Guild commands update instantly; global ones can take an hour to propagate
        if let Some(guild_id) = self.guild_id {
            info!("🔧 Development mode: Registering commands for guild {guild_id}");
            if let Err(e) = register_guild_commands(&ctx, guild_id).await {
                error!("❌ Failed to register guild slash commands: {e}");
            }
        } else {
            info!("🌍 Production mode: Registering commands globally");
            if let Err(e) = register_global_commands(&ctx).await {
                error!("❌ Failed to register global slash commands: {e}");
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::ApplicationCommand(command) = interaction else {
            debug!("Ignoring non-command interaction");
            return;
        };

        let request_id = Uuid::new_v4();
        if let Err(e) = self.dispatch(&ctx, &command, request_id).await {
            error!(
                "[{request_id}] Error handling slash command '{}': {e}",
                command.data.name
            );

            let error_message =
                error_reply("something went wrong processing your command. Please try again.");

            // Deferred commands need an edit; anything else gets a fresh response
            if command
                .edit_original_interaction_response(&ctx.http, |response| {
                    response.content(&error_message)
                })
                .await
                .is_err()
            {
                let _ = command
                    .create_interaction_response(&ctx.http, |response| {
                        response
                            .kind(InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|message| {
                                message.content(&error_message).ephemeral(true)
                            })
                    })
                    .await;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Persona Relay Discord Bot...");

    let backend = Arc::new(JsonFileBackend::new(&config.persona_store_path));
    let persona_store = PersonaStore::load(backend, &config.gemini_model).map_err(|e| {
        error!("Failed to load persona store: {e}");
        anyhow::anyhow!("Persona store unavailable: {e}")
    })?;
    info!(
        "🎭 Persona store ready at {} ({} channel overrides, default model {})",
        config.persona_store_path.display(),
        persona_store.channel_count(),
        config.gemini_model
    );

    let mut gemini = GeminiClient::new(config.gemini_api_key.clone(), config.generation_timeout);
    if let Some(base_url) = &config.gemini_api_base {
        info!("Using Gemini endpoint {base_url}");
        gemini = gemini.with_base_url(base_url.clone());
    }
    let generator = Arc::new(gemini);
    let command_context = Arc::new(CommandContext::new(
        persona_store,
        generator,
        config.generation_timeout,
    ));

    let handler = Handler {
        registry: CommandRegistry::with_default_handlers(),
        ctx: command_context,
        guild_id: config.discord_guild_id.map(GuildId),
    };

    let intents = GatewayIntents::GUILDS;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Bot configured successfully. Connecting to Discord gateway...");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
