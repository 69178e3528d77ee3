use chrono::{DateTime, Utc};
use serenity::async_trait;
use serenity::builder::{CreateEmbed, CreateEmbedFooter};
use std::sync::Arc;
use tracing::{debug, info};

use super::{ChatCompletion, ChatMessage, FinishReason, FunctionCall, Tool};
use crate::error::ChatError;
use crate::util::{participant_name, split_into_chunks};

pub const EMBED_DESCRIPTION_LIMIT: usize = 4096;
const PLAIN_COLOR: u32 = 0x3498DB;
const TOOL_COLOR: u32 = 0x2ECC71;

/// Runs one named tool with the model's JSON arguments and returns the JSON
/// result handed back to the model.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, call: &FunctionCall) -> Result<String, ChatError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub text: String,
    /// Distinct tool names in order of first use.
    pub tools_used: Vec<String>,
}

/// Who is asking and where, rendered into the system prompt.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub user_name: String,
    pub user_id: u64,
    pub channel_name: Option<String>,
    pub guild_name: Option<String>,
    pub is_admin: bool,
    pub now: DateTime<Utc>,
}

pub fn system_prompt(ctx: &PromptContext) -> String {
    let mut prompt = format!(
        "The user you're talking to is a Discord user named \"{}\" (id {}).\n\
         Keep your answers brief and to the point. The current datetime is {}.\n\
         You will be replying into a Discord Embed. Use Discord text formatting to improve readability \
         and make sure your Discord Markdown is perfectly formatted.\n\
         Lists should not be put in any form of markdown such as asterisks, underscores or italics. \
         Do not put numbered list markers inside bold or italic markdown.\n\
         Do not use functions unless necessary. Do not use code blocks unless really necessary.",
        ctx.user_name,
        ctx.user_id,
        ctx.now.to_rfc3339(),
    );

    if let Some(guild) = &ctx.guild_name {
        prompt.push_str(&format!("\nThe conversation takes place in the Discord server \"{guild}\""));
        if let Some(channel) = &ctx.channel_name {
            prompt.push_str(&format!(" in the channel #{channel}"));
        }
        prompt.push('.');
    }

    if ctx.is_admin {
        prompt.push_str("\nThe user is an administrator of this server.");
    }

    prompt
}

pub struct ChatService {
    backend: Arc<dyn ChatCompletion>,
    max_hops: usize,
}

impl ChatService {
    pub fn new(backend: Arc<dyn ChatCompletion>, max_hops: usize) -> Self {
        Self { backend, max_hops }
    }

    /// Asks the model until it stops on its own, executing every tool call it
    /// makes along the way. At most `max_hops` completions are requested.
    pub async fn run(
        &self,
        system_prompt: &str,
        user_name: Option<&str>,
        prompt: &str,
        tools: &[Tool],
        executor: &dyn ToolExecutor,
    ) -> Result<ChatReply, ChatError> {
        let mut messages = vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(prompt, user_name.and_then(participant_name)),
        ];
        let mut tools_used: Vec<String> = Vec::new();

        for hop in 1..=self.max_hops {
            let completion = self.backend.complete(&messages, tools).await?;
            debug!("Completion {} finished with {}", hop, completion.finish_reason.as_str());

            match completion.finish_reason {
                FinishReason::Stop => {
                    let text = completion
                        .content
                        .map(|content| content.trim().to_string())
                        .filter(|content| !content.is_empty())
                        .ok_or(ChatError::EmptyResponse)?;

                    return Ok(ChatReply { text, tools_used });
                }
                FinishReason::ToolCalls => {
                    messages.push(completion.to_message());

                    for call in &completion.tool_calls {
                        info!(
                            "Calling tool {} with arguments {}",
                            call.function.name, call.function.arguments
                        );

                        let result = executor.execute(&call.function).await?;
                        debug!("Tool {} returned {}", call.function.name, result);

                        if !tools_used.contains(&call.function.name) {
                            tools_used.push(call.function.name.clone());
                        }
                        messages.push(ChatMessage::tool(call.id.clone(), result));
                    }
                }
                other => return Err(ChatError::UnexpectedFinish(other.as_str().to_string())),
            }
        }

        Err(ChatError::HopLimit(self.max_hops))
    }
}

pub fn tools_footer(tools_used: &[String]) -> Option<String> {
    match tools_used {
        [] => None,
        [tool] => Some(format!("Function {tool} was used.")),
        tools => Some(format!("Functions {} were used.", tools.join(", "))),
    }
}

/// One embed per chunk of the answer. Green when tools were involved, with
/// the tool footer on the last embed.
pub fn reply_embeds(reply: &ChatReply) -> Vec<CreateEmbed> {
    let color = if reply.tools_used.is_empty() {
        PLAIN_COLOR
    } else {
        TOOL_COLOR
    };

    let chunks = split_into_chunks(&reply.text, EMBED_DESCRIPTION_LIMIT);
    let last = chunks.len().saturating_sub(1);
    let footer = tools_footer(&reply.tools_used);

    chunks
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| {
            let embed = CreateEmbed::new().description(chunk).color(color);
            match (&footer, index == last) {
                (Some(footer), true) => embed.footer(CreateEmbedFooter::new(footer)),
                _ => embed,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{Completion, ToolCall};
    use crate::error::ServiceError;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedBackend {
        script: Mutex<VecDeque<Completion>>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Completion>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatCompletion for ScriptedBackend {
        async fn complete(&self, messages: &[ChatMessage], _tools: &[Tool]) -> Result<Completion, ServiceError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            Ok(self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .expect("backend called more often than scripted"))
        }
    }

    #[derive(Default)]
    struct RecordingExecutor {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ToolExecutor for RecordingExecutor {
        async fn execute(&self, call: &FunctionCall) -> Result<String, ChatError> {
            self.calls.lock().unwrap().push(call.name.clone());
            match call.name.as_str() {
                "GetCurrentWeather" => Ok(r#"{"temp": 21}"#.to_string()),
                "GetWebSearch" => Ok("No search results found.".to_string()),
                other => Err(ChatError::UnknownTool(other.to_string())),
            }
        }
    }

    fn answer(text: &str) -> Completion {
        Completion {
            content: Some(text.to_string()),
            tool_calls: Vec::new(),
            finish_reason: FinishReason::Stop,
        }
    }

    fn calls(names: &[&str]) -> Completion {
        Completion {
            content: None,
            tool_calls: names
                .iter()
                .enumerate()
                .map(|(i, name)| ToolCall {
                    id: format!("call_{i}"),
                    call_type: "function".into(),
                    function: FunctionCall {
                        name: name.to_string(),
                        arguments: "{}".into(),
                    },
                })
                .collect(),
            finish_reason: FinishReason::ToolCalls,
        }
    }

    #[tokio::test]
    async fn plain_answer_needs_one_completion() {
        let backend = ScriptedBackend::new(vec![answer("  Hello!  ")]);
        let service = ChatService::new(backend.clone(), 10);

        let reply = service
            .run("system", Some("alice"), "hi", &[], &RecordingExecutor::default())
            .await
            .unwrap();

        assert_eq!(reply.text, "Hello!");
        assert!(reply.tools_used.is_empty());

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0][1], ChatMessage::user("hi", Some("alice".into())));
    }

    #[tokio::test]
    async fn tool_results_are_fed_back_in_order() {
        let backend = ScriptedBackend::new(vec![
            calls(&["GetCurrentWeather", "GetWebSearch"]),
            calls(&["GetCurrentWeather"]),
            answer("It is sunny."),
        ]);
        let executor = RecordingExecutor::default();
        let service = ChatService::new(backend.clone(), 10);

        let reply = service.run("system", None, "weather?", &[], &executor).await.unwrap();

        assert_eq!(reply.text, "It is sunny.");
        assert_eq!(reply.tools_used, vec!["GetCurrentWeather", "GetWebSearch"]);
        assert_eq!(
            *executor.calls.lock().unwrap(),
            vec!["GetCurrentWeather", "GetWebSearch", "GetCurrentWeather"]
        );

        let seen = backend.seen.lock().unwrap();
        let second = &seen[1];
        assert_eq!(second.len(), 5);
        assert!(matches!(&second[2], ChatMessage::Assistant { tool_calls, .. } if tool_calls.len() == 2));
        assert_eq!(second[3], ChatMessage::tool("call_0", r#"{"temp": 21}"#));
        assert_eq!(second[4], ChatMessage::tool("call_1", "No search results found."));
        assert_eq!(seen[2].len(), 7);
    }

    #[tokio::test]
    async fn stops_after_hop_limit() {
        let backend = ScriptedBackend::new(vec![calls(&["GetWebSearch"]), calls(&["GetWebSearch"])]);
        let service = ChatService::new(backend, 2);

        let err = service
            .run("system", None, "loop", &[], &RecordingExecutor::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::HopLimit(2)));
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error() {
        let backend = ScriptedBackend::new(vec![calls(&["LaunchRockets"])]);
        let service = ChatService::new(backend, 10);

        let err = service
            .run("system", None, "go", &[], &RecordingExecutor::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::UnknownTool(name) if name == "LaunchRockets"));
    }

    #[tokio::test]
    async fn empty_and_truncated_answers_fail() {
        let service = ChatService::new(ScriptedBackend::new(vec![answer("   ")]), 10);
        let err = service
            .run("system", None, "?", &[], &RecordingExecutor::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::EmptyResponse));

        let mut truncated = answer("partial");
        truncated.finish_reason = FinishReason::Length;
        let service = ChatService::new(ScriptedBackend::new(vec![truncated]), 10);
        let err = service
            .run("system", None, "?", &[], &RecordingExecutor::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::UnexpectedFinish(reason) if reason == "length"));
    }

    #[test]
    fn footer_lists_tools() {
        assert_eq!(tools_footer(&[]), None);
        assert_eq!(
            tools_footer(&["GetWebSearch".into()]).as_deref(),
            Some("Function GetWebSearch was used.")
        );
        assert_eq!(
            tools_footer(&["A".into(), "B".into()]).as_deref(),
            Some("Functions A, B were used.")
        );
    }

    #[test]
    fn embeds_are_colored_by_tool_use() {
        let text = "word ".repeat(1000);
        let reply = ChatReply {
            text: text.trim().to_string(),
            tools_used: vec!["GetWebSearch".into()],
        };

        let embeds: Vec<_> = reply_embeds(&reply)
            .iter()
            .map(|e| serde_json::to_value(e).unwrap())
            .collect();

        assert_eq!(embeds.len(), 2);
        assert_eq!(embeds[0]["color"], TOOL_COLOR);
        assert!(embeds[0].get("footer").is_none());
        assert_eq!(embeds[1]["footer"]["text"], "Function GetWebSearch was used.");

        let plain = reply_embeds(&ChatReply {
            text: "hi".into(),
            tools_used: Vec::new(),
        });
        let plain = serde_json::to_value(&plain[0]).unwrap();
        assert_eq!(plain["color"], PLAIN_COLOR);
        assert_eq!(plain["description"], "hi");
    }

    #[test]
    fn system_prompt_mentions_context() {
        let prompt = system_prompt(&PromptContext {
            user_name: "alice".into(),
            user_id: 5,
            channel_name: Some("general".into()),
            guild_name: Some("Rustaceans".into()),
            is_admin: true,
            now: DateTime::from_timestamp(0, 0).unwrap(),
        });

        assert!(prompt.starts_with("The user you're talking to is a Discord user named \"alice\""));
        assert!(prompt.contains("1970-01-01T00:00:00+00:00"));
        assert!(prompt.contains("\"Rustaceans\" in the channel #general."));
        assert!(prompt.contains("administrator"));
    }
}
