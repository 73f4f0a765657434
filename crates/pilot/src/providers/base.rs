use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::errors::BackendError;
use crate::models::message::{Message, ToolCallRequest};
use crate::tools::registry::ToolSchema;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// How a backend expresses tool-call intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ToolProtocol {
    /// Structured `tool_calls` in the response message
    Native,
    /// Tool-call JSON written into the message content
    JsonFallback,
    /// `Action: <tool>: <input>` lines in a Thought/Action/PAUSE transcript
    ActionLine,
}

impl ToolProtocol {
    /// Whether tool schemas are advertised in the request body
    pub fn advertises_tools(&self) -> bool {
        !matches!(self, ToolProtocol::ActionLine)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ToolChoice {
    Auto,
    None,
}

/// One backend reply, tagged by the shape it arrived in.
///
/// Adapters pick the variant; [`crate::normalize`] turns every variant into an
/// [`AgentTurnResult`](crate::models::turn::AgentTurnResult).
#[derive(Debug, Clone, PartialEq)]
pub enum RawBackendResponse {
    ToolCalling {
        content: Option<String>,
        tool_calls: Vec<ToolCallRequest>,
    },
    JsonText(String),
    ActionText(String),
    /// The backend answered without any usable message
    Empty,
}

/// Base trait for LLM backends (OpenAI, DeepSeek, etc)
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human readable provider name used in errors and logs
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    fn protocol(&self) -> ToolProtocol;

    /// Some backends always run with a fixed system prompt
    fn system_prompt_override(&self) -> Option<&str> {
        None
    }

    /// Perform exactly one request/response round trip with the full history
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        tool_choice: ToolChoice,
    ) -> Result<(RawBackendResponse, Usage), BackendError>;
}
