//! Application commands: `/ping`, `/weather` and `/search`.

use anyhow::Result;
use chrono::Utc;
use serenity::builder::{
    CreateCommand, CreateCommandOption, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage, EditInteractionResponse,
};
use serenity::model::application::{Command, CommandDataOption, CommandInteraction, CommandOptionType};
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::time::Instant;
use tracing::{error, info};

use super::{edit_reply, search, weather};
use crate::bot::{BotState, ShardManagerContainer};

pub fn register_ping() -> CreateCommand {
    CreateCommand::new("ping").description("Check the bot's latency")
}

pub fn register_weather() -> CreateCommand {
    CreateCommand::new("weather")
        .description("Current weather or forecast for a location")
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "location", "City name, optionally with country code")
                .required(true),
        )
        .add_option(CreateCommandOption::new(
            CommandOptionType::Boolean,
            "forecast",
            "Show the forecast for the coming days",
        ))
}

pub fn register_search() -> CreateCommand {
    CreateCommand::new("search")
        .description("Search the web")
        .add_option(CreateCommandOption::new(CommandOptionType::String, "query", "What to search for").required(true))
        .add_option(
            CreateCommandOption::new(CommandOptionType::Integer, "count", "Number of results")
                .min_int_value(1)
                .max_int_value(10),
        )
}

pub fn commands() -> Vec<CreateCommand> {
    vec![register_ping(), register_weather(), register_search()]
}

/// Registers the commands on the configured guild, or globally without one.
pub async fn register(ctx: &Context, guild_id: Option<GuildId>) -> Result<()> {
    match guild_id {
        Some(guild_id) => {
            guild_id.set_commands(&ctx.http, commands()).await?;
            info!("Registered application commands for guild {}", guild_id);
        }
        None => {
            Command::set_global_commands(&ctx.http, commands()).await?;
            info!("Registered global application commands");
        }
    }

    Ok(())
}

fn option<'a>(options: &'a [CommandDataOption], name: &str) -> Option<&'a CommandDataOption> {
    options.iter().find(|o| o.name == name)
}

fn string_option(options: &[CommandDataOption], name: &str) -> Option<String> {
    option(options, name).and_then(|o| o.value.as_str()).map(str::to_string)
}

fn bool_option(options: &[CommandDataOption], name: &str) -> Option<bool> {
    option(options, name).and_then(|o| o.value.as_bool())
}

fn int_option(options: &[CommandDataOption], name: &str) -> Option<i64> {
    option(options, name).and_then(|o| o.value.as_i64())
}

pub async fn dispatch(ctx: &Context, state: &BotState, command: &CommandInteraction) -> Result<()> {
    info!("Slash command /{} executed by {}", command.data.name, command.user.tag());

    let result = match command.data.name.as_str() {
        "ping" => ping(ctx, command).await,
        "weather" => weather_command(ctx, state, command).await,
        "search" => search_command(ctx, state, command).await,
        other => Err(anyhow::anyhow!("Unknown command: {other}")),
    };

    if let Err(e) = &result {
        error!("Error handling command {}: {:#}", command.data.name, e);
        report_failure(ctx, command).await;
    }

    result
}

/// Tells the invoking user that the command failed, whether or not it was
/// already acknowledged.
async fn report_failure(ctx: &Context, command: &CommandInteraction) {
    const FAILURE: &str = "An error occurred while processing the command.";

    let response = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new().content(FAILURE).ephemeral(true),
    );
    if command.create_response(&ctx.http, response).await.is_ok() {
        return;
    }

    let followup = CreateInteractionResponseFollowup::new().content(FAILURE).ephemeral(true);
    if let Err(e) = command.create_followup(&ctx.http, followup).await {
        error!("Could not report failure of /{}: {}", command.data.name, e);
    }
}

async fn ping(ctx: &Context, command: &CommandInteraction) -> Result<()> {
    let start = Instant::now();
    command.defer(&ctx.http).await?;
    let api_latency = start.elapsed().as_millis();

    let ws_latency = {
        let data = ctx.data.read().await;
        match data.get::<ShardManagerContainer>() {
            Some(manager) => manager
                .runners
                .lock()
                .await
                .get(&ctx.shard_id)
                .and_then(|runner| runner.latency)
                .map(|latency| latency.as_millis().to_string() + "ms"),
            None => None,
        }
    };
    let ws_latency = ws_latency.unwrap_or_else(|| "n/a".to_string());

    info!("Ping results - API: {}ms, WebSocket: {}", api_latency, ws_latency);

    let embed = CreateEmbed::new()
        .title("🏓 Pong!")
        .color(0x57F287)
        .field("Latency", format!("{}ms", api_latency), true)
        .field("WebSocket", ws_latency, true)
        .timestamp(Utc::now());

    command
        .edit_response(&ctx.http, EditInteractionResponse::new().embed(embed))
        .await?;

    Ok(())
}

async fn weather_command(ctx: &Context, state: &BotState, command: &CommandInteraction) -> Result<()> {
    command.defer(&ctx.http).await?;

    let options = &command.data.options;
    let location = string_option(options, "location").unwrap_or_default();
    let forecast = bool_option(options, "forecast").unwrap_or(false);

    let reply = weather::lookup(&state.weather, forecast, &location).await;
    edit_reply(ctx, command, reply).await
}

async fn search_command(ctx: &Context, state: &BotState, command: &CommandInteraction) -> Result<()> {
    command.defer(&ctx.http).await?;

    let options = &command.data.options;
    let query = string_option(options, "query").unwrap_or_default();
    let count = int_option(options, "count").and_then(|n| u32::try_from(n).ok());

    let reply = search::lookup(&state.search, &query, count, None).await;
    edit_reply(ctx, command, reply).await
}
