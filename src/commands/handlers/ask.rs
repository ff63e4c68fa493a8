//! Ask command handler
//!
//! Handles: ask
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use async_trait::async_trait;
use log::{error, info};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use std::sync::Arc;
use uuid::Uuid;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::commands::slash::get_string_option;

/// Handler for /ask - prompt the model with this channel's persona
pub struct AskHandler;

#[async_trait]
impl SlashCommandHandler for AskHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["ask"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
        request_id: Uuid,
    ) -> Result<()> {
        let prompt = get_string_option(&command.data.options, "prompt")
            .ok_or_else(|| anyhow::anyhow!("Missing prompt argument"))?;
        let channel_id = command.channel_id.to_string();

        info!(
            "[{request_id}] /ask command | User: {} | Channel: {channel_id} | Prompt length: {}",
            command.user.id,
            prompt.len()
        );

        // Generation can outlast Discord's 3 second acknowledgement window
        command
            .create_interaction_response(&serenity_ctx.http, |r| {
                r.kind(InteractionResponseType::DeferredChannelMessageWithSource)
            })
            .await
            .map_err(|e| {
                error!("[{request_id}] Failed to defer interaction: {e}");
                anyhow::anyhow!("Failed to defer interaction: {e}")
            })?;

        let messages = ctx.ask(&channel_id, &prompt, request_id).await;
        let mut messages = messages.into_iter();

        if let Some(first) = messages.next() {
            command
                .edit_original_interaction_response(&serenity_ctx.http, |r| r.content(first))
                .await?;
        }
        for chunk in messages {
            command
                .create_followup_message(&serenity_ctx.http, |m| m.content(chunk))
                .await?;
        }

        info!("[{request_id}] /ask response sent successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_handler_commands() {
        let names = AskHandler.command_names();
        assert!(names.contains(&"ask"));
        assert_eq!(names.len(), 1);
    }
}
