//! Timeout and rename actions the assistant may take on behalf of a user.
//!
//! The model refers to users by id, with a few reserved values: `0` when the
//! prompt named nobody, `1` for the author of the request and `2` for the bot.

use serde_json::{json, Value};
use serenity::async_trait;
use serenity::builder::EditMember;
use serenity::client::Context;
use serenity::model::id::{GuildId, RoleId, UserId};
use serenity::model::Timestamp;
use tracing::warn;

use crate::config::Config;

pub const NO_USER: u64 = 0;
pub const AUTHOR: u64 = 1;
pub const BOT: u64 = 2;

/// Discord rejects timeouts longer than 28 days.
pub const MAX_TIMEOUT_SECS: u64 = 28 * 24 * 60 * 60;

/// The guild-side operations moderation needs.
#[async_trait]
pub trait GuildModerator: Send + Sync {
    fn author_id(&self) -> UserId;
    fn bot_id(&self) -> UserId;
    async fn is_role(&self, id: u64) -> bool;
    async fn is_member(&self, user: UserId) -> bool;
    async fn author_is_admin(&self) -> bool;
    async fn timeout(&self, user: UserId, seconds: u64, reason: Option<&str>) -> Result<(), String>;
    /// Returns the nickname now in effect.
    async fn rename(&self, user: UserId, nickname: &str, reason: Option<&str>) -> Result<Option<String>, String>;
}

fn failure(error: impl AsRef<str>) -> Value {
    json!({"success": false, "error": error.as_ref()})
}

fn mention(user: UserId) -> String {
    format!("<@{user}>")
}

pub async fn timeout_user(
    guild: &dyn GuildModerator,
    requested: u64,
    seconds: u64,
    reason: Option<&str>,
    instructed: bool,
) -> Value {
    if requested == NO_USER {
        return failure("No valid Discord user found in the prompt.");
    }
    if guild.is_role(requested).await {
        return failure("Cannot timeout a Discord role.");
    }

    let target = match requested {
        AUTHOR => guild.author_id(),
        BOT => return failure("Cannot time yourself out."),
        id => UserId::new(id),
    };

    if !guild.is_member(target).await {
        return failure("Cannot time out a user that is not in the Discord server.");
    }
    if !guild.author_is_admin().await {
        return failure(format!("User {} is not an Administrator.", mention(guild.author_id())));
    }

    if !instructed || requested == AUTHOR {
        warn!("Declined to time out {} without explicit instruction", target);
        return json!({"success": true, "user": mention(target), "error": "Only a warning for now."});
    }

    let seconds = seconds.clamp(1, MAX_TIMEOUT_SECS);
    match guild.timeout(target, seconds, reason).await {
        Ok(()) => json!({"success": true, "user": mention(target), "duration": seconds}),
        Err(e) => {
            warn!("Failed to time out {}: {}", target, e);
            failure(e)
        }
    }
}

pub async fn rename_user(
    guild: &dyn GuildModerator,
    requested: u64,
    nickname: &str,
    reason: Option<&str>,
) -> Value {
    if requested == NO_USER {
        return failure("No valid Discord user found in the prompt.");
    }
    if guild.is_role(requested).await {
        return failure("Cannot rename a Discord role.");
    }
    if requested > AUTHOR && !guild.author_is_admin().await {
        return failure(format!("User {} is not an Administrator.", mention(guild.author_id())));
    }

    let target = match requested {
        AUTHOR => guild.author_id(),
        BOT => guild.bot_id(),
        id => UserId::new(id),
    };

    if !guild.is_member(target).await {
        return failure("Cannot change the nickname of a user that is not in the Discord server.");
    }

    match guild.rename(target, nickname, reason).await {
        Ok(nick) => json!({"success": true, "user": mention(target), "newNickname": nick}),
        Err(e) => {
            warn!("Failed to rename {}: {}", target, e);
            failure(e)
        }
    }
}

/// [`GuildModerator`] backed by the gateway context of the message being answered.
pub struct SerenityModerator<'a> {
    pub ctx: &'a Context,
    pub config: &'a Config,
    pub guild_id: GuildId,
    pub author_id: UserId,
}

#[async_trait]
impl GuildModerator for SerenityModerator<'_> {
    fn author_id(&self) -> UserId {
        self.author_id
    }

    fn bot_id(&self) -> UserId {
        self.ctx.cache.current_user().id
    }

    async fn is_role(&self, id: u64) -> bool {
        if id == NO_USER {
            return false;
        }
        let role = RoleId::new(id);

        let cached = self
            .ctx
            .cache
            .guild(self.guild_id)
            .map(|guild| guild.roles.contains_key(&role));

        match cached {
            Some(found) => found,
            None => self
                .guild_id
                .roles(&self.ctx.http)
                .await
                .map(|roles| roles.contains_key(&role))
                .unwrap_or(false),
        }
    }

    async fn is_member(&self, user: UserId) -> bool {
        self.guild_id.member(self.ctx, user).await.is_ok()
    }

    async fn author_is_admin(&self) -> bool {
        if self.config.is_admin(self.author_id) {
            return true;
        }

        let Ok(member) = self.guild_id.member(self.ctx, self.author_id).await else {
            return false;
        };

        self.ctx
            .cache
            .guild(self.guild_id)
            .map(|guild| guild.member_permissions(&member).administrator())
            .unwrap_or(false)
    }

    async fn timeout(&self, user: UserId, seconds: u64, reason: Option<&str>) -> Result<(), String> {
        let until = Timestamp::now().unix_timestamp() + seconds as i64;
        let until = Timestamp::from_unix_timestamp(until).map_err(|e| e.to_string())?;

        let mut edit = EditMember::new().disable_communication_until_datetime(until);
        if let Some(reason) = reason {
            edit = edit.audit_log_reason(reason);
        }

        self.guild_id
            .edit_member(&self.ctx.http, user, edit)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn rename(&self, user: UserId, nickname: &str, reason: Option<&str>) -> Result<Option<String>, String> {
        let mut edit = EditMember::new().nickname(nickname);
        if let Some(reason) = reason {
            edit = edit.audit_log_reason(reason);
        }

        self.guild_id
            .edit_member(&self.ctx.http, user, edit)
            .await
            .map(|member| member.nick)
            .map_err(|e| e.to_string())
    }
}
