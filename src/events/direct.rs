use serenity::model::channel::{Message, MessageType};
use serenity::prelude::*;
use tracing::info;

pub fn log_message(ctx: &Context, msg: &Message) {
    info!("{}", direct_log_line(&msg.author.name, &msg.content_safe(&ctx.cache)));
}

pub fn direct_log_line(author: &str, content: &str) -> String {
    format!("[Direct Message] <{author}> {content}")
}

/// Short label for a non-user message such as a pin or a member join.
pub fn system_label(kind: MessageType) -> String {
    match kind {
        MessageType::GroupRecipientAddition => "recipient added".to_string(),
        MessageType::GroupRecipientRemoval => "recipient removed".to_string(),
        MessageType::GroupCallCreation => "call".to_string(),
        MessageType::GroupNameUpdate => "channel name changed".to_string(),
        MessageType::GroupIconUpdate => "channel icon changed".to_string(),
        MessageType::PinsAdd => "message pinned".to_string(),
        MessageType::MemberJoin => "member joined".to_string(),
        MessageType::NitroBoost => "server boosted".to_string(),
        MessageType::ThreadCreated => "thread created".to_string(),
        other => format!("{other:?}"),
    }
}

pub fn log_system_message(msg: &Message) {
    let origin = if msg.guild_id.is_some() { "guild" } else { "direct" };
    info!("({} system) [{}] <{}> {}", origin, system_label(msg.kind), msg.author.name, msg.content);
}
