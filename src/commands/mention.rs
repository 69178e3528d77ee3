use anyhow::Result;
use chrono::Utc;
use serenity::builder::CreateMessage;
use serenity::model::channel::Message;
use serenity::prelude::*;
use tracing::{error, info};

use crate::ai::conversation::{reply_embeds, system_prompt, ChatReply, PromptContext};
use crate::ai::moderation::{GuildModerator, SerenityModerator};
use crate::ai::tools::Toolbox;
use crate::bot::BotState;
use crate::events::guild::{channel_name, guild_name};
use crate::util::strip_bot_mention;

pub const APOLOGY: &str = "Sorry, I couldn't process your request at the moment.";

/// Answers a message that starts with a mention of the bot.
pub async fn reply(ctx: &Context, state: &BotState, msg: &Message) -> Result<()> {
    let bot_id = ctx.cache.current_user().id;
    let Some(prompt) = strip_bot_mention(&msg.content, bot_id) else {
        return Ok(());
    };

    let typing = msg.channel_id.start_typing(&ctx.http);
    let answer = ask(ctx, state, msg, &prompt).await;
    typing.stop();

    match answer {
        Ok(answer) => send_answer(ctx, msg, &answer).await,
        Err(e) => {
            error!("Failed to answer {}: {:#}", msg.author.name, e);
            msg.reply(&ctx.http, APOLOGY).await?;
            Ok(())
        }
    }
}

async fn ask(ctx: &Context, state: &BotState, msg: &Message, prompt: &str) -> Result<ChatReply> {
    let moderator = msg.guild_id.map(|guild_id| SerenityModerator {
        ctx,
        config: &state.config,
        guild_id,
        author_id: msg.author.id,
    });

    let is_admin = match &moderator {
        Some(moderator) => moderator.author_is_admin().await,
        None => state.config.is_admin(msg.author.id),
    };

    let user_name = match msg.author_nick(ctx).await {
        Some(nick) => nick,
        None => msg.author.global_name.clone().unwrap_or_else(|| msg.author.name.clone()),
    };

    let guild = match msg.guild_id {
        Some(guild_id) => guild_name(ctx, guild_id).await,
        None => None,
    };

    let context = PromptContext {
        user_name: user_name.clone(),
        user_id: msg.author.id.get(),
        channel_name: channel_name(ctx, msg.channel_id).await,
        guild_name: guild,
        is_admin,
        now: Utc::now(),
    };

    let toolbox = Toolbox {
        weather: &state.weather,
        search: &state.search,
        database: &state.database,
        moderator: moderator.as_ref().map(|m| m as &dyn GuildModerator),
    };

    info!("Answering {} in {}", user_name, msg.channel_id);
    let reply = state
        .chat
        .run(&system_prompt(&context), Some(user_name.as_str()), prompt, &toolbox.definitions(), &toolbox)
        .await?;

    Ok(reply)
}

/// First embed as a reply to the question, the rest as follow-up messages.
async fn send_answer(ctx: &Context, msg: &Message, answer: &ChatReply) -> Result<()> {
    for (index, embed) in reply_embeds(answer).into_iter().enumerate() {
        let message = CreateMessage::new().embed(embed);
        let message = if index == 0 {
            message.reference_message(msg)
        } else {
            message
        };

        msg.channel_id.send_message(&ctx.http, message).await?;
    }

    Ok(())
}
