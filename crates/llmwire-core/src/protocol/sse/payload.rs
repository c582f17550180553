//! JSON request bodies and response extraction

use crate::error::{ClientError, ClientResult};
use crate::task::{Task, TaskKind};
use serde::Serialize;
use serde_json::Value;

/// One chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// Body of a streaming chat-completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest<'a> {
    pub stream: bool,
    pub messages: Vec<ChatMessage<'a>>,
}

impl<'a> ChatRequest<'a> {
    /// The system message is included only when non-empty
    pub fn from_task(task: &'a Task) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = task.system_prompt().filter(|s| !s.is_empty()) {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: task.prompt_text().unwrap_or_default(),
        });
        Self {
            stream: true,
            messages,
        }
    }
}

/// Body of a streaming infill request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfillRequest<'a> {
    pub input_prefix: &'a str,
    pub input_suffix: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<&'a str>,
    pub stream: bool,
}

impl<'a> InfillRequest<'a> {
    pub fn from_task(task: &'a Task) -> ClientResult<Self> {
        task.validate()?;
        Ok(Self {
            input_prefix: task.fim_prefix().unwrap_or_default(),
            input_suffix: task.fim_suffix().unwrap_or_default(),
            prompt: task.prompt_text().filter(|p| !p.is_empty()),
            stream: true,
        })
    }
}

/// Serialize the request body for a task
pub fn request_body(task: &Task) -> ClientResult<Vec<u8>> {
    let body = match task.kind() {
        TaskKind::Prompt => serde_json::to_vec(&ChatRequest::from_task(task))?,
        TaskKind::FillInMiddle => serde_json::to_vec(&InfillRequest::from_task(task)?)?,
    };
    Ok(body)
}

/// Outcome of one chat-completion message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatDelta {
    /// Generated text, possibly empty
    Content(String),
    /// Well-formed message without content, e.g. a role-only delta
    Empty,
    /// Malformed message, skipped with the given reason
    Skip(String),
}

/// Extract `choices[0].delta.content`
pub fn extract_chat_delta(value: &Value) -> ChatDelta {
    let Some(choice) = value
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
    else {
        return ChatDelta::Skip("response without choices".to_string());
    };

    match choice.get("delta").and_then(|delta| delta.get("content")) {
        Some(Value::String(content)) => ChatDelta::Content(content.clone()),
        None | Some(Value::Null) => ChatDelta::Empty,
        Some(other) => ChatDelta::Skip(format!("content is not a string: {}", other)),
    }
}

/// Outcome of one infill message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfillDelta {
    Content(String),
    /// End of generation; the message's own text is not emitted
    Stop,
    Skip(String),
}

/// Extract `content`, `tokens` and `stop` from an infill message.
///
/// A message with empty content whose first token id is one of
/// `stop_token_ids` ends the stream. Some models emit a start-of-turn
/// token instead of setting `stop`.
pub fn extract_infill(value: &Value, stop_token_ids: &[i64]) -> InfillDelta {
    let content = match value.get("content") {
        Some(Value::String(content)) => Some(content.as_str()),
        None | Some(Value::Null) => None,
        Some(other) => return InfillDelta::Skip(format!("content is not a string: {}", other)),
    };

    let first_token = value
        .get("tokens")
        .and_then(Value::as_array)
        .and_then(|tokens| tokens.first())
        .and_then(Value::as_i64);
    if content.is_none_or(str::is_empty)
        && first_token.is_some_and(|id| stop_token_ids.contains(&id))
    {
        return InfillDelta::Stop;
    }

    if value.get("stop").and_then(Value::as_bool).unwrap_or(false) {
        return InfillDelta::Stop;
    }

    match content {
        Some(content) => InfillDelta::Content(content.to_string()),
        None => InfillDelta::Skip("infill message without content".to_string()),
    }
}

/// Parse the JSON object of a `data:` message
pub fn parse_object(json: &str) -> ClientResult<Value> {
    let value: Value = serde_json::from_str(json)?;
    if !value.is_object() {
        return Err(ClientError::protocol(format!(
            "expected a JSON object, got: {}",
            json
        )));
    }
    Ok(value)
}
