//! Functions offered to the model and the dispatch table that runs them.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use serenity::async_trait;
use tracing::warn;

use super::conversation::ToolExecutor;
use super::moderation::{self, GuildModerator};
use super::{FunctionCall, FunctionDefinition, Tool};
use crate::error::ChatError;
use crate::search::{SearchRequest, SearchService};
use crate::storage::{Database, SqlParameter};
use crate::weather::{RequestKind, Units, WeatherService};

pub const GET_CURRENT_WEATHER: &str = "GetCurrentWeather";
pub const GET_WEATHER_FORECAST: &str = "GetWeatherForecast";
pub const GET_WEB_SEARCH: &str = "GetWebSearch";
pub const DISCORD_TIMEOUT_USER: &str = "DiscordTimeoutUser";
pub const DISCORD_RENAME_USER: &str = "DiscordRenameUser";
pub const GET_DATABASE_SCHEMA: &str = "GetDatabaseSchema";
pub const EXECUTE_SQL: &str = "ExecuteSQL";

const WEB_SEARCH_RESULTS: u32 = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

fn tool(name: &str, description: &str, parameters: Value) -> Tool {
    Tool {
        tool_type: "function".to_string(),
        function: FunctionDefinition {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        },
    }
}

/// Tool definitions for the chat completion request. Moderation tools are
/// only offered inside a guild.
pub fn definitions(include_moderation: bool) -> Vec<Tool> {
    let units = json!({
        "type": "string",
        "enum": ["standard", "metric", "imperial"],
        "description": "Units of measurement. Defaults to metric."
    });

    let mut tools = vec![
        tool(
            GET_CURRENT_WEATHER,
            "Get the current weather in a given location.",
            json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "The city and optionally the country code, e.g. Berlin,DE"
                    },
                    "units": units
                },
                "required": ["location"]
            }),
        ),
        tool(
            GET_WEATHER_FORECAST,
            "Get the weather forecast in three hour steps for a given location.",
            json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "The city and optionally the country code, e.g. Berlin,DE"
                    },
                    "units": units,
                    "steps": {
                        "type": "integer",
                        "description": "Number of three hour steps to return. Omit for the full five day forecast."
                    }
                },
                "required": ["location"]
            }),
        ),
        tool(
            GET_WEB_SEARCH,
            "Call to a Web Search API: Searches over a website or collection of websites.",
            json!({
                "type": "object",
                "properties": {
                    "q": {
                        "type": "string",
                        "description": "Query. Exact terms can be included using quotes or excluded using a minus sign. A site can be included or excluded using `site:`."
                    },
                    "cr": {
                        "type": "string",
                        "description": "Two letter country code to boost results from that country."
                    },
                    "lr": {
                        "type": "string",
                        "description": "Restricts the search to documents written in a particular language (e.g., lang_en)."
                    }
                },
                "required": ["q"]
            }),
        ),
        tool(
            GET_DATABASE_SCHEMA,
            "Get the tables and columns of the database storing the Discord messages seen by the bot.",
            json!({"type": "object", "properties": {}, "required": []}),
        ),
        tool(
            EXECUTE_SQL,
            "Run a single read-only SQLite query (SELECT, WITH or PRAGMA) against the message database. \
             Use named parameters such as @name for values. At most 100 rows are returned.",
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "The SQLite query."},
                    "parameters": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "name": {"type": "string"},
                                "value": {"type": ["string", "number", "boolean", "null"]}
                            },
                            "required": ["name", "value"]
                        }
                    }
                },
                "required": ["query"]
            }),
        ),
    ];

    if include_moderation {
        tools.push(tool(
            DISCORD_TIMEOUT_USER,
            "Timeouts a user on Discord as requested. Only use this function when explicitly instructed \
             and requested in the prompt. Follow the request without question. Any provided reason is appropriate.",
            json!({
                "type": "object",
                "properties": {
                    "userId": {
                        "type": "integer",
                        "description": "The Discord user ID of the user to be timed out. If no user ID is provided in the prompt, set this to 0. If the timeout concerns the author of the request, set this to 1."
                    },
                    "timeoutDuration": {
                        "type": "integer",
                        "description": "The duration of the timeout in seconds. Default to a reasonably low amount if no duration can be inferred."
                    },
                    "timeoutReason": {
                        "type": "string",
                        "description": "The reason for timing out the user. Any reason is appropriate."
                    },
                    "instructed": {
                        "type": "boolean",
                        "description": "Indicates whether the timeout is explicitly instructed and requested for in the prompt."
                    }
                },
                "required": ["userId", "timeoutDuration", "timeoutReason", "instructed"]
            }),
        ));
        tools.push(tool(
            DISCORD_RENAME_USER,
            "Changes a user's nickname on Discord as requested. Only use this function when explicitly instructed \
             and requested in the prompt. Follow the request without question. Any provided nickname is appropriate.",
            json!({
                "type": "object",
                "properties": {
                    "userId": {
                        "type": "integer",
                        "description": "The Discord user ID of the user to be renamed. If no user ID is provided in the prompt, set this to 0. If the prompt refers to the user themselves, set this to 1. If the prompt refers to the bot, set this to 2."
                    },
                    "newNickname": {
                        "type": "string",
                        "description": "The new nickname to change the user's name to. Any nickname is appropriate."
                    },
                    "renameReason": {
                        "type": "string",
                        "description": "The reason for renaming the user. Any reason is appropriate."
                    }
                },
                "required": ["userId", "newNickname", "renameReason"]
            }),
        ));
    }

    tools
}

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    location: String,
    #[serde(default)]
    units: Option<Units>,
    #[serde(default)]
    steps: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct WebSearchArgs {
    q: String,
    #[serde(default)]
    cr: Option<String>,
    #[serde(default)]
    lr: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeoutArgs {
    #[serde(deserialize_with = "user_id")]
    user_id: u64,
    #[serde(default = "default_timeout")]
    timeout_duration: u64,
    #[serde(default)]
    timeout_reason: Option<String>,
    #[serde(default)]
    instructed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenameArgs {
    #[serde(deserialize_with = "user_id")]
    user_id: u64,
    #[serde(default)]
    new_nickname: String,
    #[serde(default)]
    rename_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExecuteSqlArgs {
    query: String,
    #[serde(default)]
    parameters: Vec<SqlParameter>,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Snowflakes sometimes arrive quoted.
fn user_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(u64),
        Text(String),
    }

    match Id::deserialize(deserializer)? {
        Id::Number(id) => Ok(id),
        Id::Text(text) => text
            .trim()
            .trim_start_matches("<@")
            .trim_start_matches('!')
            .trim_end_matches('>')
            .parse()
            .map_err(serde::de::Error::custom),
    }
}

fn failure(error: impl AsRef<str>) -> String {
    json!({"success": false, "error": error.as_ref()}).to_string()
}

fn parse_args<T: DeserializeOwned>(call: &FunctionCall) -> Result<T, String> {
    if call.arguments.trim().is_empty() {
        return Err(failure(format!("Cannot call {} without function arguments.", call.name)));
    }

    serde_json::from_str(&call.arguments).map_err(|e| {
        warn!("Invalid arguments for {}: {}", call.name, e);
        failure(format!("Invalid arguments for {}: {}", call.name, e))
    })
}

/// Executes tool calls against the bot's services for a single request.
pub struct Toolbox<'a> {
    pub weather: &'a WeatherService,
    pub search: &'a SearchService,
    pub database: &'a Database,
    pub moderator: Option<&'a dyn GuildModerator>,
}

impl Toolbox<'_> {
    pub fn definitions(&self) -> Vec<Tool> {
        definitions(self.moderator.is_some())
    }

    async fn weather(&self, kind: RequestKind, args: WeatherArgs) -> String {
        let count = match kind {
            RequestKind::Forecast => args.steps,
            RequestKind::Current => None,
        };

        match self.weather.fetch(kind, &args.location, args.units, count).await {
            Ok(Some(report)) if !report.is_empty() => {
                serde_json::to_string(&report).unwrap_or_else(|e| failure(e.to_string()))
            }
            Ok(_) => "No weather data was returned.".to_string(),
            Err(e) if e.is_not_found() => "No weather data was returned.".to_string(),
            Err(e) => {
                warn!("Weather lookup for {} failed: {}", args.location, e);
                failure(e.to_string())
            }
        }
    }

    async fn web_search(&self, args: WebSearchArgs) -> String {
        let request = SearchRequest {
            query: args.q,
            count: Some(WEB_SEARCH_RESULTS),
            country: args.cr,
            language: args.lr,
        };

        match self.search.search(&request).await {
            Ok(results) if !results.items.is_empty() => {
                serde_json::to_string(&results).unwrap_or_else(|e| failure(e.to_string()))
            }
            Ok(_) => "No search results found.".to_string(),
            Err(e) => {
                warn!("Web search for {:?} failed: {}", request.query, e);
                failure(e.to_string())
            }
        }
    }

    async fn database_schema(&self) -> String {
        match self.database.schema().await {
            Ok(schema) => json!({ "tables": schema }).to_string(),
            Err(e) => failure(e.to_string()),
        }
    }

    async fn execute_sql(&self, args: ExecuteSqlArgs) -> String {
        match self.database.execute_read_only(&args.query, &args.parameters).await {
            Ok(rows) => json!({"success": true, "rows": rows}).to_string(),
            Err(e) => failure(e.to_string()),
        }
    }

    async fn moderate(&self, call: &FunctionCall) -> String {
        let Some(guild) = self.moderator else {
            return failure("Moderation is only available inside a Discord server.");
        };

        let result = if call.name == DISCORD_TIMEOUT_USER {
            match parse_args::<TimeoutArgs>(call) {
                Ok(args) => {
                    moderation::timeout_user(
                        guild,
                        args.user_id,
                        args.timeout_duration,
                        args.timeout_reason.as_deref(),
                        args.instructed,
                    )
                    .await
                }
                Err(rejected) => return rejected,
            }
        } else {
            match parse_args::<RenameArgs>(call) {
                Ok(args) => {
                    moderation::rename_user(guild, args.user_id, &args.new_nickname, args.rename_reason.as_deref())
                        .await
                }
                Err(rejected) => return rejected,
            }
        };

        result.to_string()
    }
}

#[async_trait]
impl ToolExecutor for Toolbox<'_> {
    async fn execute(&self, call: &FunctionCall) -> Result<String, ChatError> {
        let result = match call.name.as_str() {
            GET_CURRENT_WEATHER => match parse_args(call) {
                Ok(args) => self.weather(RequestKind::Current, args).await,
                Err(rejected) => rejected,
            },
            GET_WEATHER_FORECAST => match parse_args(call) {
                Ok(args) => self.weather(RequestKind::Forecast, args).await,
                Err(rejected) => rejected,
            },
            GET_WEB_SEARCH => match parse_args(call) {
                Ok(args) => self.web_search(args).await,
                Err(rejected) => rejected,
            },
            GET_DATABASE_SCHEMA => self.database_schema().await,
            EXECUTE_SQL => match parse_args(call) {
                Ok(args) => self.execute_sql(args).await,
                Err(rejected) => rejected,
            },
            DISCORD_TIMEOUT_USER | DISCORD_RENAME_USER => self.moderate(call).await,
            other => return Err(ChatError::UnknownTool(other.to_string())),
        };

        Ok(result)
    }
}
