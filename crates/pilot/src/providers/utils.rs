use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::base::Usage;
use crate::errors::BackendError;
use crate::models::message::{generate_call_id, Message, ToolCallRequest};
use crate::tools::registry::ToolSchema;

lazy_static! {
    static ref INVALID_NAME_CHARS: Regex = Regex::new(r"[^a-zA-Z0-9_-]").unwrap();
}

/// Convert internal Message format to the openai chat message specification
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| {
            let mut converted = Map::new();
            converted.insert("role".to_string(), json!(message.role));
            converted.insert("content".to_string(), json!(message.content));

            if message.has_tool_calls() {
                let tool_calls: Vec<Value> = message
                    .tool_calls
                    .iter()
                    .map(|call| {
                        json!({
                            "id": call.id,
                            "type": "function",
                            "function": {
                                "name": sanitize_function_name(&call.tool_name),
                                "arguments": call.raw_arguments,
                            }
                        })
                    })
                    .collect();
                converted.insert("tool_calls".to_string(), json!(tool_calls));
            }

            if let Some(id) = &message.tool_call_id {
                converted.insert("tool_call_id".to_string(), json!(id));
            }

            Value::Object(converted)
        })
        .collect()
}

/// Convert registry schemas to the openai `tools` request field
pub fn tools_to_openai_spec(tools: &[ToolSchema]) -> Vec<Value> {
    tools.iter().map(|tool| json!(tool)).collect()
}

/// Pull the first choice's message out of a chat completion body
pub fn response_message(response: &Value) -> Option<&Value> {
    response
        .get("choices")?
        .get(0)?
        .get("message")
        .filter(|message| message.is_object())
}

pub fn message_content(message: &Value) -> Option<String> {
    message
        .get("content")
        .and_then(Value::as_str)
        .map(String::from)
}

/// Map structured tool-call entries to requests, preserving their order
pub fn parse_tool_calls(message: &Value) -> Vec<ToolCallRequest> {
    let Some(tool_calls) = message.get("tool_calls").and_then(Value::as_array) else {
        return Vec::new();
    };

    tool_calls
        .iter()
        .map(|tool_call| {
            let id = tool_call["id"]
                .as_str()
                .filter(|id| !id.is_empty())
                .map(String::from)
                .unwrap_or_else(generate_call_id);
            let name = tool_call["function"]["name"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            let arguments = match &tool_call["function"]["arguments"] {
                Value::String(raw) => raw.clone(),
                Value::Null => "{}".to_string(),
                other => other.to_string(),
            };
            ToolCallRequest::new(id, name, arguments)
        })
        .collect()
}

pub fn get_usage(data: &Value) -> Usage {
    let Some(usage) = data.get("usage") else {
        return Usage::default();
    };

    let input_tokens = usage
        .get("prompt_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);

    let output_tokens = usage
        .get("completion_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);

    let total_tokens = usage
        .get("total_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32)
        .or_else(|| match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        });

    Usage::new(input_tokens, output_tokens, total_tokens)
}

/// POST a chat completion payload and return the decoded body.
///
/// Non-success statuses, undecodable bodies and a top-level `error` field all
/// become a [`BackendError`], keeping the vendor's error payload when present.
pub async fn post_chat_completion(
    client: &Client,
    provider: &str,
    url: &str,
    api_key: Option<&str>,
    payload: &Value,
) -> Result<Value, BackendError> {
    debug!(provider, url, "sending chat completion request");

    let mut request = client.post(url).json(payload);
    if let Some(key) = api_key {
        request = request.header("Authorization", format!("Bearer {}", key));
    }
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    let parsed = serde_json::from_str::<Value>(&body);

    if let Ok(Value::Object(ref object)) = parsed {
        if let Some(error) = object.get("error").filter(|e| !e.is_null()) {
            return Err(BackendError::Api {
                provider: provider.to_string(),
                payload: error.clone(),
            });
        }
    }

    if !status.is_success() {
        return Err(BackendError::Status {
            provider: provider.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    parsed.map_err(|e| BackendError::InvalidResponse {
        provider: provider.to_string(),
        message: e.to_string(),
    })
}

/// Set an optional field on a request payload
pub fn insert_option<T: serde::Serialize>(payload: &mut Value, key: &str, value: Option<T>) {
    if let (Some(value), Some(object)) = (value, payload.as_object_mut()) {
        object.insert(key.to_string(), json!(value));
    }
}

fn sanitize_function_name(name: &str) -> String {
    INVALID_NAME_CHARS.replace_all(name, "_").to_string()
}
