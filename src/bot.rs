use serenity::async_trait;
use serenity::client::{Context, EventHandler};
use serenity::gateway::ShardManager;
use serenity::model::application::Interaction;
use serenity::model::channel::Message;
use serenity::model::event::InviteCreateEvent;
use serenity::model::gateway::Ready;
use serenity::model::guild::ScheduledEvent;
use serenity::prelude::*;
use std::sync::Arc;

use crate::ai::conversation::ChatService;
use crate::config::Config;
use crate::events::{Mediator, Notification};
use crate::search::SearchService;
use crate::storage::Database;
use crate::weather::WeatherService;

pub struct ShardManagerContainer;

impl TypeMapKey for ShardManagerContainer {
    type Value = Arc<ShardManager>;
}

/// Services shared by every handler.
pub struct BotState {
    pub config: Config,
    pub weather: WeatherService,
    pub search: SearchService,
    pub database: Database,
    pub chat: ChatService,
}

pub struct Handler {
    mediator: Mediator,
}

impl Handler {
    pub fn new(state: Arc<BotState>) -> Self {
        Self {
            mediator: Mediator::new(state),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        self.mediator.publish(&ctx, Notification::Ready(ready)).await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        self.mediator.publish(&ctx, Notification::MessageReceived(msg)).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        self.mediator
            .publish(&ctx, Notification::InteractionCreated(interaction))
            .await;
    }

    async fn guild_scheduled_event_create(&self, ctx: Context, event: ScheduledEvent) {
        self.mediator
            .publish(&ctx, Notification::GuildScheduledEventCreated(event))
            .await;
    }

    async fn invite_create(&self, ctx: Context, data: InviteCreateEvent) {
        self.mediator.publish(&ctx, Notification::GuildInviteCreated(data)).await;
    }
}
