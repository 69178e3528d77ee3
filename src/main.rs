mod ai;
mod bot;
mod commands;
mod config;
mod error;
mod events;
mod search;
mod storage;
mod util;
mod weather;

use anyhow::Result;
use bot::{BotState, Handler, ShardManagerContainer};
use config::Config;
use serenity::prelude::*;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ai::conversation::ChatService;
use ai::OpenAiClient;
use search::SearchService;
use storage::Database;
use weather::WeatherService;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    info!("Configuration loaded successfully");

    let database = Database::new(&config.database_url).await?;
    info!("Database ready at {}", config.database_url);

    let http = reqwest::Client::new();
    let openai = OpenAiClient::new(http.clone(), config.openai.clone());
    let max_hops = openai.max_hops();
    let chat = ChatService::new(Arc::new(openai), max_hops);

    let state = Arc::new(BotState {
        weather: WeatherService::new(http.clone(), config.weather.clone()),
        search: SearchService::new(http, config.search.clone()),
        database,
        chat,
        config: config.clone(),
    });

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_SCHEDULED_EVENTS
        | GatewayIntents::GUILD_INVITES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(Handler::new(state))
        .await?;

    {
        let mut data = client.data.write().await;
        data.insert::<ShardManagerContainer>(client.shard_manager.clone());
    }

    info!("Starting Herald bot...");

    if let Err(e) = client.start().await {
        error!("Client error: {:?}", e);
    }

    Ok(())
}
