//! Persona slash commands: /persona_set, /persona_show

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

/// Creates persona commands
pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_persona_set_command(), create_persona_show_command()]
}

/// Creates the persona_set command
fn create_persona_set_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("persona_set")
        .description("Set the AI persona for this channel")
        .create_option(|option| {
            option
                .name("name")
                .description("Display name for the persona")
                .kind(CommandOptionType::String)
                .required(true)
                .min_length(1)
                .max_length(100)
        })
        .create_option(|option| {
            option
                .name("system_instruction")
                .description("How the persona should behave")
                .kind(CommandOptionType::String)
                .required(true)
                .min_length(1)
                .max_length(2000)
        })
        .create_option(|option| {
            option
                .name("temperature")
                .description("Randomness between 0 and 1 (default 0.7)")
                .kind(CommandOptionType::Number)
                .required(false)
                .min_number_value(0.0)
                .max_number_value(1.0)
        })
        .to_owned()
}

/// Creates the persona_show command
fn create_persona_show_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("persona_show")
        .description("Show the AI persona active in this channel")
        .to_owned()
}
