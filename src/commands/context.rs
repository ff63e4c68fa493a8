//! Shared context for command handlers
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::core::{chunk_for_message, MESSAGE_LIMIT};
use crate::features::generation::{generate_with_timeout, GenerationRequest, TextGenerator};
use crate::features::personas::PersonaStore;

/// Prefix of every user-visible failure reply
pub const ERROR_MARKER: &str = "⚠️ Error:";
/// Reply to `/ping`
pub const PING_REPLY: &str = "Pong! 🏓";
/// Sent when the model answers with nothing
pub const EMPTY_REPLY: &str = "(no reply)";

/// Shared context for all command handlers
///
/// Built once at startup and shared behind an `Arc`:
/// - PersonaStore for channel persona lookup and updates
/// - TextGenerator for the upstream model call
/// - Generation timeout
/// - Bot start time for uptime logging
#[derive(Clone)]
pub struct CommandContext {
    pub persona_store: PersonaStore,
    pub generator: Arc<dyn TextGenerator>,
    pub generation_timeout: Duration,
    pub start_time: Instant,
}

/// Format a failure reply, cut to fit in one message
pub fn error_reply(reason: impl std::fmt::Display) -> String {
    let reply = format!("{ERROR_MARKER} {reason}");
    if reply.chars().count() <= MESSAGE_LIMIT {
        return reply;
    }
    let mut cut: String = reply.chars().take(MESSAGE_LIMIT - 3).collect();
    cut.push_str("...");
    cut
}

impl CommandContext {
    pub fn new(
        persona_store: PersonaStore,
        generator: Arc<dyn TextGenerator>,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            persona_store,
            generator,
            generation_timeout,
            start_time: Instant::now(),
        }
    }

    pub fn ping(&self) -> &'static str {
        PING_REPLY
    }

    /// Answer a prompt with the channel's persona.
    ///
    /// Always yields at least one message of at most 2000 characters. Upstream
    /// failures come back as a single message starting with [`ERROR_MARKER`].
    pub async fn ask(&self, channel_id: &str, prompt: &str, request_id: Uuid) -> Vec<String> {
        if prompt.trim().is_empty() {
            return vec![error_reply("prompt must not be empty")];
        }

        let persona = self.persona_store.resolve(channel_id);
        debug!(
            "[{request_id}] Resolved persona '{}' for channel {channel_id} | Model: {} | Temperature: {}",
            persona.name, persona.model, persona.temperature
        );

        let request = GenerationRequest::for_persona(prompt, &persona);
        let started = Instant::now();
        let reply = match generate_with_timeout(
            self.generator.as_ref(),
            &request,
            self.generation_timeout,
        )
        .await
        {
            Ok(text) if text.trim().is_empty() => {
                warn!("[{request_id}] Model returned an empty reply");
                EMPTY_REPLY.to_string()
            }
            Ok(text) => {
                info!(
                    "[{request_id}] Response received | Time: {:?} | Length: {}",
                    started.elapsed(),
                    text.len()
                );
                text
            }
            Err(e) => {
                error!("[{request_id}] Generation failed: {e}");
                return vec![error_reply(e)];
            }
        };

        let chunks = chunk_for_message(&reply);
        if chunks.len() > 1 {
            debug!("[{request_id}] Response split into {} chunks", chunks.len());
        }
        chunks
    }

    /// Store a persona override for a channel and acknowledge it
    pub fn persona_set(
        &self,
        channel_id: &str,
        name: &str,
        system_instruction: &str,
        temperature: f32,
    ) -> String {
        match self
            .persona_store
            .set(channel_id, name, system_instruction, temperature)
        {
            Ok(persona) => {
                info!(
                    "Persona '{}' set for channel {channel_id} (temperature {})",
                    persona.name, persona.temperature
                );
                format!(
                    "✅ Persona **{}** set for this channel (temperature {}).",
                    persona.name, persona.temperature
                )
            }
            Err(e) => {
                error!("Failed to set persona for channel {channel_id}: {e}");
                error_reply(e)
            }
        }
    }

    /// Describe the persona in effect for a channel
    pub fn persona_show(&self, channel_id: &str) -> String {
        let resolved = self.persona_store.lookup(channel_id);
        let persona = resolved.persona;
        format!(
            "**Persona for this channel** ({})\n**Name:** {}\n**Temperature:** {}\n**Model:** {}\n**System instruction:**\n{}",
            resolved.source.label(),
            persona.name,
            persona.temperature,
            persona.model,
            persona.system_instruction
        )
    }
}
