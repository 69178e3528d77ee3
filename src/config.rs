use anyhow::{Context, Result};
use serenity::model::id::{GuildId, UserId};
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub text_command_prefix: String,
    pub admin_ids: Vec<UserId>,
    pub guild_id: Option<GuildId>,
    pub database_url: String,
    pub openai: OpenAiConfig,
    pub weather: WeatherConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_hops: usize,
}

#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub api_key: String,
    pub base_url: String,
    pub cache_duration: Duration,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_key: String,
    pub search_engine_id: String,
    pub base_url: String,
    pub default_result_count: u32,
    pub max_result_count: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .with_context(|| format!("{key} environment variable not set"))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let admin_ids = match lookup("ADMIN_IDS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(|id| parse_nonzero(id).map(UserId::new))
                .collect::<Result<Vec<_>>>()
                .context("ADMIN_IDS must be a comma separated list of user ids")?,
            None => Vec::new(),
        };

        let guild_id = match lookup("GUILD_ID") {
            Some(raw) if !raw.trim().is_empty() => Some(GuildId::new(
                parse_nonzero(raw.trim()).context("GUILD_ID must be a non-zero integer")?,
            )),
            _ => None,
        };

        Ok(Config {
            discord_token: required("DISCORD_TOKEN")?,
            text_command_prefix: or_default("TEXT_COMMAND_PREFIX", ">"),
            admin_ids,
            guild_id,
            database_url: or_default("DATABASE_URL", "sqlite:herald.db?mode=rwc"),
            openai: OpenAiConfig {
                api_key: required("OPENAI_API_KEY")?,
                model: or_default("OPENAI_MODEL", "gpt-4o"),
                base_url: trim_slash(or_default("OPENAI_BASE_URL", "https://api.openai.com/v1")),
                max_hops: parse_or(&lookup, "CHAT_MAX_HOPS", 10)?,
            },
            weather: WeatherConfig {
                api_key: required("OPENWEATHERMAP_API_KEY")?,
                base_url: trim_slash(or_default(
                    "OPENWEATHERMAP_BASE_URL",
                    "https://api.openweathermap.org/data/2.5",
                )),
                cache_duration: Duration::from_secs(parse_or(&lookup, "WEATHER_CACHE_SECONDS", 600)?),
            },
            search: SearchConfig {
                api_key: required("GOOGLE_API_KEY")?,
                search_engine_id: required("GOOGLE_SEARCH_ENGINE_ID")?,
                base_url: or_default(
                    "GOOGLE_SEARCH_BASE_URL",
                    "https://www.googleapis.com/customsearch/v1",
                ),
                default_result_count: parse_or(&lookup, "SEARCH_DEFAULT_RESULT_COUNT", 5)?,
                max_result_count: parse_or(&lookup, "SEARCH_MAX_RESULT_COUNT", 10)?,
            },
        })
    }

    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.admin_ids.contains(&user_id)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}

fn parse_nonzero(raw: &str) -> Result<u64> {
    match raw.parse::<u64>()? {
        0 => anyhow::bail!("id must not be zero"),
        id => Ok(id),
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DISCORD_TOKEN", "token"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENWEATHERMAP_API_KEY", "owm"),
            ("GOOGLE_API_KEY", "google"),
            ("GOOGLE_SEARCH_ENGINE_ID", "cx"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<Config> {
        Config::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn applies_defaults() {
        let config = load(&base_env()).unwrap();

        assert_eq!(config.text_command_prefix, ">");
        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.openai.max_hops, 10);
        assert_eq!(config.weather.cache_duration, Duration::from_secs(600));
        assert_eq!(config.search.default_result_count, 5);
        assert_eq!(config.search.max_result_count, 10);
        assert!(config.admin_ids.is_empty());
        assert!(config.guild_id.is_none());
    }

    #[test]
    fn missing_required_key_is_an_error() {
        let mut env = base_env();
        env.remove("OPENAI_API_KEY");

        let err = load(&env).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn parses_admin_ids_and_guild() {
        let mut env = base_env();
        env.insert("ADMIN_IDS", "123, 456,");
        env.insert("GUILD_ID", "789");
        env.insert("OPENAI_BASE_URL", "http://localhost:8080/v1/");

        let config = load(&env).unwrap();
        assert_eq!(config.admin_ids, vec![UserId::new(123), UserId::new(456)]);
        assert_eq!(config.guild_id, Some(GuildId::new(789)));
        assert_eq!(config.openai.base_url, "http://localhost:8080/v1");
        assert!(config.is_admin(UserId::new(456)));
        assert!(!config.is_admin(UserId::new(1)));
    }

    #[test]
    fn rejects_bad_numbers() {
        let mut env = base_env();
        env.insert("CHAT_MAX_HOPS", "lots");
        assert!(load(&env).is_err());

        let mut env = base_env();
        env.insert("ADMIN_IDS", "0");
        assert!(load(&env).is_err());
    }
}
