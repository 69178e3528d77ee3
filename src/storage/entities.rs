use chrono::{DateTime, Utc};
use serde::Serialize;
use serenity::model::channel::Message;
use serenity::model::user::User;

use crate::util::from_unix;

#[derive(Debug, Clone, PartialEq)]
pub struct GuildRecord {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRecord {
    pub id: u64,
    pub name: String,
    pub guild_id: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: u64,
    pub username: String,
    pub discriminator: Option<u16>,
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.get(),
            username: user.name.clone(),
            discriminator: user.discriminator.map(|d| d.get()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageRecord {
    pub id: u64,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub edited_timestamp: Option<DateTime<Utc>>,
    pub author_id: u64,
    pub channel_id: u64,
    pub referenced_message_id: Option<u64>,
}

impl MessageRecord {
    pub fn is_edited(&self) -> bool {
        self.edited_timestamp.is_some()
    }
}

impl From<&Message> for MessageRecord {
    fn from(msg: &Message) -> Self {
        Self {
            id: msg.id.get(),
            content: msg.content.clone(),
            timestamp: from_unix(msg.timestamp.unix_timestamp()),
            edited_timestamp: msg.edited_timestamp.map(|t| from_unix(t.unix_timestamp())),
            author_id: msg.author.id.get(),
            channel_id: msg.channel_id.get(),
            referenced_message_id: msg
                .message_reference
                .as_ref()
                .and_then(|reference| reference.message_id)
                .map(|id| id.get()),
        }
    }
}

/// A persisted message joined with its author's username.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMessage {
    pub id: u64,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub author_id: u64,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    pub primary_key: bool,
}
