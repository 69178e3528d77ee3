use anyhow::Result;
use serenity::model::channel::Message;
use serenity::model::event::InviteCreateEvent;
use serenity::model::guild::ScheduledEvent;
use serenity::model::id::{ChannelId, GuildId};
use serenity::model::Timestamp;
use serenity::prelude::*;
use tracing::{debug, info};

use super::{route_guild_content, GuildRoute};
use crate::bot::BotState;
use crate::commands;
use crate::storage::entities::{ChannelRecord, GuildRecord, MessageRecord, UserRecord};

pub async fn guild_name(ctx: &Context, guild_id: GuildId) -> Option<String> {
    let cached = ctx.cache.guild(guild_id).map(|guild| guild.name.clone());
    match cached {
        Some(name) => Some(name),
        None => guild_id.to_partial_guild(&ctx.http).await.ok().map(|guild| guild.name),
    }
}

pub async fn channel_name(ctx: &Context, channel_id: ChannelId) -> Option<String> {
    channel_id
        .to_channel(ctx)
        .await
        .ok()
        .and_then(|channel| channel.guild())
        .map(|channel| channel.name)
}

/// `(guild) #channel <user> content`, with mentions rendered as names.
pub async fn log_message(ctx: &Context, msg: &Message) {
    let guild = match msg.guild_id {
        Some(guild_id) => guild_name(ctx, guild_id).await,
        None => None,
    };
    let channel = channel_name(ctx, msg.channel_id).await;

    info!(
        "({}) #{} <{}> {}",
        guild.as_deref().unwrap_or("unknown"),
        channel.as_deref().unwrap_or("unknown"),
        msg.author.name,
        msg.content_safe(&ctx.cache)
    );
}

pub async fn persist_message(ctx: &Context, state: &BotState, msg: &Message) -> Result<()> {
    let Some(guild_id) = msg.guild_id else {
        return Ok(());
    };

    let guild = GuildRecord {
        id: guild_id.get(),
        name: guild_name(ctx, guild_id).await.unwrap_or_default(),
    };
    let channel = ChannelRecord {
        id: msg.channel_id.get(),
        name: channel_name(ctx, msg.channel_id).await.unwrap_or_default(),
        guild_id: guild_id.get(),
    };

    state
        .database
        .add_with_dependencies(&guild, &channel, &UserRecord::from(&msg.author), &MessageRecord::from(msg))
        .await?;
    debug!("Stored message {}", msg.id);

    Ok(())
}

/// Prefixed messages run a text command, messages starting with a mention of
/// the bot go to the assistant.
pub async fn route_message(ctx: &Context, state: &BotState, msg: &Message) -> Result<()> {
    let bot_id = ctx.cache.current_user().id;

    match route_guild_content(&msg.content, &state.config.text_command_prefix, bot_id) {
        GuildRoute::TextCommand(input) => commands::run_text_command(ctx, state, msg, &input).await,
        GuildRoute::Mention => commands::mention::reply(ctx, state, msg).await,
        GuildRoute::Ignore => Ok(()),
    }
}

pub async fn log_scheduled_event(ctx: &Context, event: &ScheduledEvent) {
    let guild = guild_name(ctx, event.guild_id).await;
    let creator = event.creator.as_ref().map(|user| user.name.as_str());
    info!(
        "{}",
        scheduled_event_line(guild.as_deref(), &event.name, &event.start_time, creator)
    );
}

pub async fn log_invite(ctx: &Context, invite: &InviteCreateEvent) {
    let guild = match invite.guild_id {
        Some(guild_id) => guild_name(ctx, guild_id).await,
        None => None,
    };
    let channel = channel_name(ctx, invite.channel_id).await;
    let inviter = invite.inviter.as_ref().map(|user| user.name.as_str());
    info!(
        "{}",
        invite_line(guild.as_deref(), channel.as_deref(), &invite.code, inviter)
    );
}

pub fn scheduled_event_line(guild: Option<&str>, name: &str, start: &Timestamp, creator: Option<&str>) -> String {
    format!(
        "({}) <{}> scheduled \"{}\" for {}",
        guild.unwrap_or("unknown"),
        creator.unwrap_or("unknown"),
        name,
        start.format("%Y-%m-%d %H:%M UTC")
    )
}

pub fn invite_line(guild: Option<&str>, channel: Option<&str>, code: &str, inviter: Option<&str>) -> String {
    format!(
        "({}) #{} <{}> created invite {}",
        guild.unwrap_or("unknown"),
        channel.unwrap_or("unknown"),
        inviter.unwrap_or("unknown"),
        code
    )
}
