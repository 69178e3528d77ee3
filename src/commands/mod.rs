pub mod database;
pub mod mention;
pub mod messages;
pub mod search;
pub mod slash;
pub mod text;
pub mod weather;

use anyhow::Result;
use serenity::builder::{
    CreateEmbed, CreateInteractionResponseFollowup, CreateMessage, EditInteractionResponse,
};
use serenity::model::application::CommandInteraction;
use serenity::model::channel::Message;
use serenity::prelude::*;
use tracing::{info, warn};

use crate::bot::BotState;
use crate::util::split_into_chunks;
use text::TextCommand;

/// Discord's message content limit.
pub const MESSAGE_LIMIT: usize = 2000;

/// What a command answers with, independent of how it was invoked.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Embeds(Vec<CreateEmbed>),
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Reply::Text(content.into())
    }
}

/// Replies to a text command. Long text is split across several messages.
pub async fn send_reply(ctx: &Context, msg: &Message, reply: Reply) -> Result<()> {
    match reply {
        Reply::Text(content) => {
            for chunk in split_into_chunks(&content, MESSAGE_LIMIT) {
                msg.channel_id
                    .send_message(&ctx.http, CreateMessage::new().content(chunk).reference_message(msg))
                    .await?;
            }
        }
        Reply::Embeds(embeds) => {
            msg.channel_id
                .send_message(&ctx.http, CreateMessage::new().embeds(embeds).reference_message(msg))
                .await?;
        }
    }

    Ok(())
}

/// Fills in a deferred slash command response. Text past the first message
/// is sent as follow-ups.
pub async fn edit_reply(ctx: &Context, command: &CommandInteraction, reply: Reply) -> Result<()> {
    match reply {
        Reply::Text(content) => {
            let (first, rest) = split_response(&content);
            command
                .edit_response(&ctx.http, EditInteractionResponse::new().content(first))
                .await?;

            for chunk in rest {
                command
                    .create_followup(&ctx.http, CreateInteractionResponseFollowup::new().content(chunk))
                    .await?;
            }
        }
        Reply::Embeds(embeds) => {
            command
                .edit_response(&ctx.http, EditInteractionResponse::new().embeds(embeds))
                .await?;
        }
    }

    Ok(())
}

fn split_response(content: &str) -> (String, Vec<String>) {
    let mut chunks = split_into_chunks(content, MESSAGE_LIMIT).into_iter();
    let first = chunks.next().unwrap_or_default();
    (first, chunks.collect())
}

/// Runs the text command following the prefix of a guild message.
pub async fn run_text_command(ctx: &Context, state: &BotState, msg: &Message, input: &str) -> Result<()> {
    let Some(command) = text::parse(input) else {
        warn!("Unknown text command from {}: {}", msg.author.name, input);
        return Ok(());
    };
    info!("Text command {:?} executed by {}", command, msg.author.name);

    let reply = match command {
        TextCommand::Weather { forecast, location } => weather::lookup(&state.weather, forecast, &location).await,
        TextCommand::Search { count, country, query } => {
            search::lookup(&state.search, &query, Some(count), country).await
        }
        TextCommand::Messages { action, args } => messages::run(ctx, &state.database, msg, &action, &args).await?,
        TextCommand::Database { args } => database::run(&state.database, &args).await?,
    };

    send_reply(ctx, msg, reply).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_responses_keep_every_chunk() {
        let content = "a".repeat(MESSAGE_LIMIT * 2 + 500);
        let (first, rest) = split_response(&content);

        assert_eq!(first.len(), MESSAGE_LIMIT);
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[1].len(), 500);
        assert_eq!(first.len() + rest.iter().map(String::len).sum::<usize>(), content.len());
    }

    #[test]
    fn short_responses_have_no_follow_ups() {
        let (first, rest) = split_response("pong");
        assert_eq!(first, "pong");
        assert!(rest.is_empty());
    }
}
