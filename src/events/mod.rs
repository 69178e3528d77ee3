//! Gateway events become [`Notification`]s which the [`Mediator`] hands to an
//! ordered list of handlers. Handlers may publish follow-up notifications.

pub mod direct;
pub mod guild;

use anyhow::Result;
use serenity::async_trait;
use serenity::model::application::Interaction;
use serenity::model::channel::{Message, MessageType};
use serenity::model::event::InviteCreateEvent;
use serenity::model::gateway::Ready;
use serenity::model::guild::ScheduledEvent;
use serenity::model::id::UserId;
use serenity::prelude::*;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{error, info};

use crate::bot::BotState;
use crate::commands;
use crate::util::starts_with_mention;

pub enum Notification {
    Ready(Ready),
    MessageReceived(Message),
    GuildMessageReceived(Message),
    DirectMessageReceived(Message),
    GuildUserMessageReceived(Message),
    GuildSystemMessageReceived(Message),
    DirectUserMessageReceived(Message),
    DirectSystemMessageReceived(Message),
    InteractionCreated(Interaction),
    GuildScheduledEventCreated(ScheduledEvent),
    GuildInviteCreated(InviteCreateEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Ready,
    MessageReceived,
    GuildMessageReceived,
    DirectMessageReceived,
    GuildUserMessageReceived,
    GuildSystemMessageReceived,
    DirectUserMessageReceived,
    DirectSystemMessageReceived,
    InteractionCreated,
    GuildScheduledEventCreated,
    GuildInviteCreated,
}

impl Notification {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::Ready(_) => NotificationKind::Ready,
            Notification::MessageReceived(_) => NotificationKind::MessageReceived,
            Notification::GuildMessageReceived(_) => NotificationKind::GuildMessageReceived,
            Notification::DirectMessageReceived(_) => NotificationKind::DirectMessageReceived,
            Notification::GuildUserMessageReceived(_) => NotificationKind::GuildUserMessageReceived,
            Notification::GuildSystemMessageReceived(_) => NotificationKind::GuildSystemMessageReceived,
            Notification::DirectUserMessageReceived(_) => NotificationKind::DirectUserMessageReceived,
            Notification::DirectSystemMessageReceived(_) => NotificationKind::DirectSystemMessageReceived,
            Notification::InteractionCreated(_) => NotificationKind::InteractionCreated,
            Notification::GuildScheduledEventCreated(_) => NotificationKind::GuildScheduledEventCreated,
            Notification::GuildInviteCreated(_) => NotificationKind::GuildInviteCreated,
        }
    }

    fn message(&self) -> Option<&Message> {
        match self {
            Notification::MessageReceived(msg)
            | Notification::GuildMessageReceived(msg)
            | Notification::DirectMessageReceived(msg)
            | Notification::GuildUserMessageReceived(msg)
            | Notification::GuildSystemMessageReceived(msg)
            | Notification::DirectUserMessageReceived(msg)
            | Notification::DirectSystemMessageReceived(msg) => Some(msg),
            Notification::Ready(_)
            | Notification::InteractionCreated(_)
            | Notification::GuildScheduledEventCreated(_)
            | Notification::GuildInviteCreated(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    LogReady,
    RegisterCommands,
    SplitByOrigin,
    SplitByKind,
    LogGuildMessage,
    PersistGuildMessage,
    RouteGuildMessage,
    LogDirectMessage,
    LogSystemMessage,
    DispatchInteraction,
    LogScheduledEvent,
    LogInvite,
}

/// Handlers for each notification, in the order they run.
pub fn handlers(kind: NotificationKind) -> &'static [Step] {
    match kind {
        NotificationKind::Ready => &[Step::LogReady, Step::RegisterCommands],
        NotificationKind::MessageReceived => &[Step::SplitByOrigin],
        NotificationKind::GuildMessageReceived | NotificationKind::DirectMessageReceived => {
            &[Step::SplitByKind]
        }
        NotificationKind::GuildUserMessageReceived => &[
            Step::LogGuildMessage,
            Step::PersistGuildMessage,
            Step::RouteGuildMessage,
        ],
        NotificationKind::DirectUserMessageReceived => &[Step::LogDirectMessage],
        NotificationKind::GuildSystemMessageReceived | NotificationKind::DirectSystemMessageReceived => {
            &[Step::LogSystemMessage]
        }
        NotificationKind::InteractionCreated => &[Step::DispatchInteraction],
        NotificationKind::GuildScheduledEventCreated => &[Step::LogScheduledEvent],
        NotificationKind::GuildInviteCreated => &[Step::LogInvite],
    }
}

/// Bot messages are dropped, the rest split into guild and direct messages.
pub fn split_by_origin(msg: &Message) -> Option<Notification> {
    if msg.author.bot {
        return None;
    }

    Some(match msg.guild_id {
        Some(_) => Notification::GuildMessageReceived(msg.clone()),
        None => Notification::DirectMessageReceived(msg.clone()),
    })
}

pub fn is_user_message(kind: MessageType) -> bool {
    matches!(kind, MessageType::Regular | MessageType::InlineReply)
}

fn split_by_kind(notification: &Notification) -> Option<Notification> {
    let msg = notification.message()?.clone();
    let user = is_user_message(msg.kind);

    match (notification.kind(), user) {
        (NotificationKind::GuildMessageReceived, true) => Some(Notification::GuildUserMessageReceived(msg)),
        (NotificationKind::GuildMessageReceived, false) => Some(Notification::GuildSystemMessageReceived(msg)),
        (NotificationKind::DirectMessageReceived, true) => Some(Notification::DirectUserMessageReceived(msg)),
        (NotificationKind::DirectMessageReceived, false) => Some(Notification::DirectSystemMessageReceived(msg)),
        _ => None,
    }
}

/// What a guild user message asks of the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuildRoute {
    TextCommand(String),
    Mention,
    Ignore,
}

pub fn route_guild_content(content: &str, prefix: &str, bot_id: UserId) -> GuildRoute {
    if !prefix.is_empty() {
        if let Some(command) = content.strip_prefix(prefix) {
            return GuildRoute::TextCommand(command.to_string());
        }
    }

    if starts_with_mention(content, bot_id) {
        GuildRoute::Mention
    } else {
        GuildRoute::Ignore
    }
}

/// Runs a single handler step and returns the notifications it publishes.
#[async_trait]
pub trait StepRunner: Send + Sync {
    async fn run(&self, step: Step, notification: &Notification) -> Result<Vec<Notification>>;
}

/// Runs every handler for `notification` and for all notifications they
/// publish in turn, first in first out. A failing handler is logged and does
/// not stop the ones after it.
pub async fn drain(runner: &dyn StepRunner, notification: Notification) {
    let mut queue = VecDeque::from([notification]);

    while let Some(notification) = queue.pop_front() {
        let kind = notification.kind();

        for step in handlers(kind) {
            match runner.run(*step, &notification).await {
                Ok(follow_ups) => queue.extend(follow_ups),
                Err(e) => error!("{:?} failed while handling {:?}: {:#}", step, kind, e),
            }
        }
    }
}

pub struct Mediator {
    state: Arc<BotState>,
}

impl Mediator {
    pub fn new(state: Arc<BotState>) -> Self {
        Self { state }
    }

    pub async fn publish(&self, ctx: &Context, notification: Notification) {
        let runner = GatewayRunner {
            ctx,
            state: &self.state,
        };
        drain(&runner, notification).await;
    }
}

/// Handler steps backed by the live gateway context.
struct GatewayRunner<'a> {
    ctx: &'a Context,
    state: &'a BotState,
}

#[async_trait]
impl<'a> StepRunner for GatewayRunner<'a> {
    async fn run(&self, step: Step, notification: &Notification) -> Result<Vec<Notification>> {
        let (ctx, state) = (self.ctx, self.state);

        match (step, notification) {
            (Step::LogReady, Notification::Ready(ready)) => {
                info!("{} is connected and ready!", ready.user.name);
            }
            (Step::RegisterCommands, Notification::Ready(_)) => {
                commands::slash::register(ctx, state.config.guild_id).await?;
            }
            (Step::SplitByOrigin, Notification::MessageReceived(msg)) => {
                return Ok(split_by_origin(msg).into_iter().collect());
            }
            (Step::SplitByKind, _) => {
                return Ok(split_by_kind(notification).into_iter().collect());
            }
            (Step::LogGuildMessage, Notification::GuildUserMessageReceived(msg)) => {
                guild::log_message(ctx, msg).await;
            }
            (Step::PersistGuildMessage, Notification::GuildUserMessageReceived(msg)) => {
                guild::persist_message(ctx, state, msg).await?;
            }
            (Step::RouteGuildMessage, Notification::GuildUserMessageReceived(msg)) => {
                guild::route_message(ctx, state, msg).await?;
            }
            (Step::LogDirectMessage, Notification::DirectUserMessageReceived(msg)) => {
                direct::log_message(ctx, msg);
            }
            (Step::LogSystemMessage, _) => {
                if let Some(msg) = notification.message() {
                    direct::log_system_message(msg);
                }
            }
            (Step::DispatchInteraction, Notification::InteractionCreated(interaction)) => {
                if let Interaction::Command(command) = interaction {
                    commands::slash::dispatch(ctx, state, command).await?;
                }
            }
            (Step::LogScheduledEvent, Notification::GuildScheduledEventCreated(event)) => {
                guild::log_scheduled_event(ctx, event).await;
            }
            (Step::LogInvite, Notification::GuildInviteCreated(invite)) => {
                guild::log_invite(ctx, invite).await;
            }
            (step, _) => anyhow::bail!("{:?} cannot handle {:?}", step, notification.kind()),
        }

        Ok(Vec::new())
    }
}
