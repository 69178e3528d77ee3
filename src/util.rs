use chrono::{DateTime, Utc};
use serenity::model::id::UserId;

/// Unix seconds to UTC, with out-of-range values clamped to the epoch.
pub fn from_unix(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

/// Splits `text` into pieces of at most `max` characters, preferring to break
/// at the last space that fits.
pub fn split_into_chunks(text: &str, max: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.chars().count() > max {
        // byte offset just past the first `max` characters
        let limit = rest
            .char_indices()
            .nth(max)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());

        let split = match rest[..limit].rfind(' ') {
            Some(0) | None => limit,
            Some(idx) => idx,
        };

        chunks.push(rest[..split].to_string());
        rest = rest[split..].trim_start();
    }

    if !rest.is_empty() {
        chunks.push(rest.to_string());
    }

    chunks
}

fn mention_forms(bot_id: UserId) -> [String; 2] {
    [format!("<@{bot_id}>"), format!("<@!{bot_id}>")]
}

pub fn starts_with_mention(content: &str, bot_id: UserId) -> bool {
    mention_forms(bot_id)
        .iter()
        .any(|mention| content.starts_with(mention.as_str()))
}

/// Returns the prompt following a leading bot mention, or `None` when the
/// message does not start with one or nothing is left after it.
pub fn strip_bot_mention(content: &str, bot_id: UserId) -> Option<String> {
    let rest = mention_forms(bot_id)
        .iter()
        .find_map(|mention| content.strip_prefix(mention.as_str()))?
        .trim();

    (!rest.is_empty()).then(|| rest.to_string())
}

/// Chat completion APIs only accept `[a-zA-Z0-9_-]{1,64}` as participant name.
pub fn participant_name(name: &str) -> Option<String> {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .take(64)
        .collect();

    (!cleaned.trim_matches('_').is_empty()).then_some(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        assert_eq!(split_into_chunks("hello world", 20), vec!["hello world"]);
        assert!(split_into_chunks("", 20).is_empty());
    }

    #[test]
    fn splits_at_last_space() {
        let chunks = split_into_chunks("aaaa bbbb cccc", 10);
        assert_eq!(chunks, vec!["aaaa bbbb", "cccc"]);
    }

    #[test]
    fn hard_splits_words_longer_than_max() {
        let chunks = split_into_chunks("abcdefghij", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let text = "ééééé ééééé";
        let chunks = split_into_chunks(text, 6);
        assert_eq!(chunks, vec!["ééééé", "ééééé"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 6));
    }

    #[test]
    fn strips_both_mention_forms() {
        let bot = UserId::new(42);
        assert_eq!(strip_bot_mention("<@42> what's up", bot).as_deref(), Some("what's up"));
        assert_eq!(strip_bot_mention("<@!42>   hi", bot).as_deref(), Some("hi"));
        assert_eq!(strip_bot_mention("<@42>", bot), None);
        assert_eq!(strip_bot_mention("hey <@42>", bot), None);
        assert_eq!(strip_bot_mention("<@420> hi", bot), None);
        assert!(!starts_with_mention("<@420> hi", bot));
    }

    #[test]
    fn mention_must_lead() {
        let bot = UserId::new(7);
        assert!(starts_with_mention("<@7> hi", bot));
        assert!(starts_with_mention("<@!7> hi", bot));
        assert!(!starts_with_mention("hi <@7>", bot));
        assert!(!starts_with_mention("<@70> hi", bot));
    }

    #[test]
    fn sanitizes_participant_names() {
        assert_eq!(participant_name("some user.name").as_deref(), Some("some_user_name"));
        assert_eq!(participant_name("日本"), None);
        assert_eq!(participant_name("ok-name_1").as_deref(), Some("ok-name_1"));
    }
}
