//! Turn every backend reply shape into one [`AgentTurnResult`].
//!
//! Structured tool calls map across directly. Free-text replies are searched
//! for tool-call JSON, or for an `Action: <tool>: <input>` line, depending on
//! which shape the adapter reported.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::message::{generate_call_id, ToolCallRequest};
use crate::models::turn::AgentTurnResult;
use crate::providers::base::RawBackendResponse;

lazy_static! {
    static ref ACTION_LINE: Regex = Regex::new(r"^Action: (\w+): (.*)$").unwrap();
}

/// `None` means the backend produced nothing usable
pub fn normalize(response: &RawBackendResponse) -> Option<AgentTurnResult> {
    match response {
        RawBackendResponse::ToolCalling {
            content,
            tool_calls,
        } => {
            if !tool_calls.is_empty() {
                Some(AgentTurnResult::ToolInvocations(tool_calls.clone()))
            } else {
                content.clone().map(AgentTurnResult::FinalAnswer)
            }
        }
        RawBackendResponse::JsonText(text) => Some(parse_json_fallback(text)),
        RawBackendResponse::ActionText(text) => Some(parse_action_line(text)),
        RawBackendResponse::Empty => None,
    }
}

/// Recover tool calls a model wrote into its message text as JSON.
///
/// A body that is itself a JSON object is judged on its own: either it is a
/// call, or the whole text is the answer. Anything else is scanned for every
/// balanced `{...}` that decodes to a call, left to right.
pub fn parse_json_fallback(text: &str) -> AgentTurnResult {
    if let Ok(body) = serde_json::from_str::<Value>(text.trim()) {
        return match body.as_object().and_then(tool_call_from_object) {
            Some(call) => AgentTurnResult::ToolInvocations(vec![call]),
            None => AgentTurnResult::FinalAnswer(text.to_string()),
        };
    }

    let calls = scan_tool_calls(text);
    if calls.is_empty() {
        AgentTurnResult::FinalAnswer(text.to_string())
    } else {
        debug!(count = calls.len(), "recovered tool calls from message text");
        AgentTurnResult::ToolInvocations(calls)
    }
}

/// Honour only the first `Action:` line; everything else is commentary
pub fn parse_action_line(text: &str) -> AgentTurnResult {
    let action = text
        .lines()
        .find_map(|line| ACTION_LINE.captures(line))
        .map(|caps| ToolCallRequest::with_generated_id(&caps[1], &caps[2]));

    match action {
        Some(call) => AgentTurnResult::ToolInvocations(vec![call]),
        None => AgentTurnResult::FinalAnswer(text.to_string()),
    }
}

fn tool_call_from_object(object: &Map<String, Value>) -> Option<ToolCallRequest> {
    let name = object
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())?;
    let arguments = match object.get("arguments")? {
        Value::Null => return None,
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    };
    let id = object
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .unwrap_or_else(generate_call_id);

    Some(ToolCallRequest::new(id, name, arguments))
}

fn scan_tool_calls(text: &str) -> Vec<ToolCallRequest> {
    let mut calls = Vec::new();
    let mut cursor = 0;

    // Candidates come in order of their opening brace. A malformed or
    // non-call candidate falls through to the next brace, which may open a
    // call nested inside it.
    for (start, end) in matching_braces(text) {
        if start < cursor {
            continue;
        }
        let call = serde_json::from_str::<Value>(&text[start..end])
            .ok()
            .and_then(|value| value.as_object().and_then(tool_call_from_object));
        if let Some(call) = call {
            calls.push(call);
            cursor = end;
        }
    }
    calls
}

/// Byte span of every balanced `{...}`, keyed by the opening brace.
///
/// One pass with a stack of open braces. Quotes delimit strings only while a
/// brace is open, so prose around the JSON cannot unbalance it. Braces left
/// unclosed produce no span.
fn matching_braces(text: &str) -> BTreeMap<usize, usize> {
    let mut spans = BTreeMap::new();
    let mut open = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (index, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' if !open.is_empty() => in_string = true,
            '{' => open.push(index),
            '}' => {
                if let Some(start) = open.pop() {
                    spans.insert(start, index + 1);
                }
            }
            _ => {}
        }
    }
    spans
}
