//! Persona command handlers
//!
//! Handles: persona_set, persona_show
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::sync::Arc;
use uuid::Uuid;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::commands::slash::{get_number_option, get_string_option};
use crate::core::chunk_for_message;
use crate::features::personas::DEFAULT_TEMPERATURE;

/// Handler for channel persona configuration
pub struct PersonaHandler;

#[derive(Debug, PartialEq)]
enum PersonaCommand {
    Set,
    Show,
}

impl PersonaCommand {
    fn parse(name: &str) -> Result<Self> {
        match name {
            "persona_set" => Ok(Self::Set),
            "persona_show" => Ok(Self::Show),
            other => Err(anyhow::anyhow!("PersonaHandler cannot handle /{other}")),
        }
    }
}

#[async_trait]
impl SlashCommandHandler for PersonaHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["persona_set", "persona_show"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
        request_id: Uuid,
    ) -> Result<()> {
        match PersonaCommand::parse(&command.data.name)? {
            PersonaCommand::Set => {
                self.handle_persona_set(&ctx, serenity_ctx, command, request_id)
                    .await
            }
            PersonaCommand::Show => {
                self.handle_persona_show(&ctx, serenity_ctx, command, request_id)
                    .await
            }
        }
    }
}

impl PersonaHandler {
    /// Handle /persona_set
    async fn handle_persona_set(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
        request_id: Uuid,
    ) -> Result<()> {
        let options = &command.data.options;
        let name = get_string_option(options, "name")
            .ok_or_else(|| anyhow::anyhow!("Missing name argument"))?;
        let system_instruction = get_string_option(options, "system_instruction")
            .ok_or_else(|| anyhow::anyhow!("Missing system_instruction argument"))?;
        let temperature = get_number_option(options, "temperature")
            .map(|t| t as f32)
            .unwrap_or(DEFAULT_TEMPERATURE);
        let channel_id = command.channel_id.to_string();

        info!(
            "[{request_id}] /persona_set | User: {} | Channel: {channel_id} | Name: {name} | Temperature: {temperature}",
            command.user.id
        );

        let reply = ctx.persona_set(&channel_id, &name, &system_instruction, temperature);
        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| message.content(reply))
            })
            .await?;
        Ok(())
    }

    /// Handle /persona_show
    async fn handle_persona_show(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
        request_id: Uuid,
    ) -> Result<()> {
        let channel_id = command.channel_id.to_string();
        info!("[{request_id}] /persona_show | Channel: {channel_id}");

        // Long system instructions can push the description past one message
        let mut chunks = chunk_for_message(&ctx.persona_show(&channel_id)).into_iter();

        let first = chunks.next().unwrap_or_default();
        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| message.content(first))
            })
            .await?;
        for chunk in chunks {
            command
                .create_followup_message(&serenity_ctx.http, |m| m.content(chunk))
                .await?;
        }
        Ok(())
    }
}
