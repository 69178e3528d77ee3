pub mod conversation;
pub mod moderation;
pub mod tools;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serenity::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::config::OpenAiConfig;
use crate::error::ServiceError;

const SERVICE: &str = "OpenAI";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    System {
        content: String,
    },
    User {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Assistant {
        #[serde(default)]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>, name: Option<String>) -> Self {
        ChatMessage::User {
            content: content.into(),
            name,
        }
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        ChatMessage::Tool {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON encoded arguments, exactly as produced by the model.
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

fn no_tools(tools: &&[Tool]) -> bool {
    tools.is_empty()
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    ToolCalls,
    Length,
    ContentFilter,
    #[serde(other)]
    Other,
}

impl FinishReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinishReason::Stop => "stop",
            FinishReason::ToolCalls => "tool_calls",
            FinishReason::Length => "length",
            FinishReason::ContentFilter => "content_filter",
            FinishReason::Other => "other",
        }
    }
}

/// One choice of a chat completion, with the assistant turn it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: FinishReason,
}

impl Completion {
    pub fn to_message(&self) -> ChatMessage {
        ChatMessage::Assistant {
            content: self.content.clone(),
            tool_calls: self.tool_calls.clone(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [Tool],
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<FinishReason>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCall>>,
}

impl ChatResponse {
    fn into_completion(self) -> Option<Completion> {
        let choice = self.choices.into_iter().next()?;
        let tool_calls = choice.message.tool_calls.unwrap_or_default();

        // some backends omit the finish reason when they call tools
        let finish_reason = match choice.finish_reason {
            Some(reason) => reason,
            None if !tool_calls.is_empty() => FinishReason::ToolCalls,
            None => FinishReason::Stop,
        };

        Some(Completion {
            content: choice.message.content,
            tool_calls,
            finish_reason,
        })
    }
}

/// Anything that can answer a chat completion request.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage], tools: &[Tool]) -> Result<Completion, ServiceError>;
}

pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(client: Client, config: OpenAiConfig) -> Self {
        Self { client, config }
    }

    pub fn max_hops(&self) -> usize {
        self.config.max_hops
    }
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage], tools: &[Tool]) -> Result<Completion, ServiceError> {
        let payload = ChatRequest {
            model: &self.config.model,
            messages,
            tools,
            tool_choice: (!tools.is_empty()).then_some("auto"),
        };

        debug!("Requesting completion with {} messages", messages.len());

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(ServiceError::http(SERVICE))?;

        let status = response.status();
        let body = response.text().await.map_err(ServiceError::http(SERVICE))?;
        if !status.is_success() {
            return Err(ServiceError::Status {
                service: SERVICE,
                status,
                body,
            });
        }

        parse_completion(&body)
    }
}

fn parse_completion(body: &str) -> Result<Completion, ServiceError> {
    let response: ChatResponse = serde_json::from_str(body).map_err(ServiceError::decode(SERVICE))?;

    // an empty choice list is treated like an empty answer
    Ok(response.into_completion().unwrap_or(Completion {
        content: None,
        tool_calls: Vec::new(),
        finish_reason: FinishReason::Stop,
    }))
}
