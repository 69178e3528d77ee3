use anyhow::Result;
use chrono::{DateTime, Utc};
use serenity::model::channel::Message;
use serenity::model::id::UserId;
use serenity::prelude::*;
use std::collections::HashMap;

use super::Reply;
use crate::storage::entities::StoredMessage;
use crate::storage::Database;

/// Upper bound for `first` and `last` so one command cannot dump the whole table.
const MAX_COUNT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageQuery {
    First(u32),
    Last(u32),
    Find(String),
}

fn count(arg: Option<&String>) -> u32 {
    arg.and_then(|n| n.parse::<u32>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_COUNT)
}

/// Arguments of `msg get`. Anything unrecognised asks for the last message.
pub fn parse_query(args: &[String]) -> MessageQuery {
    match args.first().map(|a| a.to_lowercase()).as_deref() {
        Some("first") => MessageQuery::First(count(args.get(1))),
        Some("find") => MessageQuery::Find(args[1..].join(" ")),
        Some("last") => MessageQuery::Last(count(args.get(1))),
        _ => MessageQuery::Last(1),
    }
}

pub fn format_line(timestamp: DateTime<Utc>, name: &str, content: &str) -> String {
    format!("{} **{}** {}", timestamp.format("%-m/%d/%Y %-I:%M %p"), name, content)
}

/// Renders stored messages one per line, preferring `names` over the stored username.
pub fn format_messages(messages: &[StoredMessage], names: &HashMap<u64, String>) -> String {
    messages
        .iter()
        .map(|m| {
            let name = names.get(&m.author_id).unwrap_or(&m.username);
            format_line(m.timestamp, name, &m.content)
        })
        .collect::<Vec<String>>()
        .join("\n")
}

fn display_names(ctx: &Context, msg: &Message, messages: &[StoredMessage]) -> HashMap<u64, String> {
    let Some(guild) = msg.guild_id.and_then(|id| ctx.cache.guild(id)) else {
        return HashMap::new();
    };

    messages
        .iter()
        .filter_map(|m| {
            guild
                .members
                .get(&UserId::new(m.author_id))
                .map(|member| (m.author_id, member.display_name().to_string()))
        })
        .collect()
}

pub async fn run(ctx: &Context, database: &Database, msg: &Message, action: &str, args: &[String]) -> Result<Reply> {
    if action != "get" && action != "g" {
        return Ok(Reply::text(format!("Unknown subcommand: {action}")));
    }

    let messages = match parse_query(args) {
        MessageQuery::First(n) => database.first_messages(n).await?,
        MessageQuery::Last(n) => database.last_messages(n).await?,
        MessageQuery::Find(needle) if needle.trim().is_empty() => {
            return Ok(Reply::text("No search query given."));
        }
        MessageQuery::Find(needle) => database.matching_messages(&needle).await?,
    };

    if messages.is_empty() {
        return Ok(Reply::text("No messages found."));
    }

    let names = display_names(ctx, msg, &messages);
    Ok(Reply::Text(format_messages(&messages, &names)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::from_unix;

    fn args(raw: &str) -> Vec<String> {
        raw.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn parses_get_arguments() {
        assert_eq!(parse_query(&args("last 5")), MessageQuery::Last(5));
        assert_eq!(parse_query(&args("first")), MessageQuery::First(1));
        assert_eq!(parse_query(&args("first many")), MessageQuery::First(1));
        assert_eq!(parse_query(&args("last 5000")), MessageQuery::Last(100));
        assert_eq!(parse_query(&args("find hello world")), MessageQuery::Find("hello world".into()));
        assert_eq!(parse_query(&args("find")), MessageQuery::Find(String::new()));
        assert_eq!(parse_query(&args("")), MessageQuery::Last(1));
        assert_eq!(parse_query(&args("whatever")), MessageQuery::Last(1));
    }

    #[test]
    fn lines_prefer_display_names() {
        let messages = vec![
            StoredMessage {
                id: 1,
                content: "hello".into(),
                // 2023-11-14 22:13:20 UTC
                timestamp: from_unix(1_700_000_000),
                author_id: 7,
                username: "ferris".into(),
            },
            StoredMessage {
                id: 2,
                content: "hi".into(),
                timestamp: from_unix(1_700_000_060),
                author_id: 8,
                username: "corro".into(),
            },
        ];
        let names = HashMap::from([(7, "Ferris the Crab".to_string())]);

        assert_eq!(
            format_messages(&messages, &names),
            "11/14/2023 10:13 PM **Ferris the Crab** hello\n11/14/2023 10:14 PM **corro** hi"
        );
    }
}
