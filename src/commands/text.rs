use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WEATHER: Regex =
        Regex::new(r"(?is)^(?P<cmd>weather|w)(?P<subcmd>forecast|f)?\s+(?P<arg>.*)").unwrap();
    static ref SEARCH: Regex =
        Regex::new(r"(?is)^(?P<cmd>search|s)(?P<count>\d)?(?P<cr>[a-z]{2})?\s+(?P<arg>.*)").unwrap();
    static ref MESSAGE: Regex =
        Regex::new(r"(?is)^(?P<cmd>msg|m)\s+(?P<action>\w+)\s*(?P<args>.*)").unwrap();
    static ref DATABASE: Regex =
        Regex::new(r"(?is)^(?P<cmd>database|db)\s+(?P<action>get|g)\s+(?P<args>.*)").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextCommand {
    Weather {
        forecast: bool,
        location: String,
    },
    Search {
        count: u32,
        country: Option<String>,
        query: String,
    },
    Messages {
        action: String,
        args: Vec<String>,
    },
    Database {
        args: Vec<String>,
    },
}

fn words(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// Parses the text following the command prefix. `None` for anything that is
/// not a known command.
pub fn parse(input: &str) -> Option<TextCommand> {
    let input = input.trim_start();

    if let Some(caps) = WEATHER.captures(input) {
        return Some(TextCommand::Weather {
            forecast: caps.name("subcmd").is_some(),
            location: caps["arg"].trim().to_string(),
        });
    }

    if let Some(caps) = SEARCH.captures(input) {
        let count = caps
            .name("count")
            .and_then(|c| c.as_str().parse::<u32>().ok())
            .unwrap_or(1)
            .clamp(1, 9);

        return Some(TextCommand::Search {
            count,
            country: caps.name("cr").map(|c| c.as_str().to_lowercase()),
            query: caps["arg"].trim().to_string(),
        });
    }

    if let Some(caps) = MESSAGE.captures(input) {
        return Some(TextCommand::Messages {
            action: caps["action"].to_lowercase(),
            args: words(&caps["args"]),
        });
    }

    if let Some(caps) = DATABASE.captures(input) {
        return Some(TextCommand::Database {
            args: words(&caps["args"]),
        });
    }

    None
}
