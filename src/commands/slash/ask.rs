//! # Ask Command
//!
//! Send a prompt to the model using this channel's persona.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_ask_command()]
}

fn create_ask_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("ask")
        .description("Ask the AI a question using this channel's persona")
        .create_option(|option| {
            option
                .name("prompt")
                .description("Your question or prompt")
                .kind(CommandOptionType::String)
                .required(true)
                .min_length(1)
                .max_length(2000)
        });
    command
}
