use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A request from the model to run one tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub tool_name: String,
    /// The argument payload exactly as the model sent it, usually JSON-encoded
    pub raw_arguments: String,
}

impl ToolCallRequest {
    pub fn new<I, N, A>(id: I, tool_name: N, raw_arguments: A) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        A: Into<String>,
    {
        Self {
            id: id.into(),
            tool_name: tool_name.into(),
            raw_arguments: raw_arguments.into(),
        }
    }

    /// Create a request for a provider that did not supply an id
    pub fn with_generated_id<N: Into<String>, A: Into<String>>(tool_name: N, raw_arguments: A) -> Self {
        Self::new(generate_call_id(), tool_name, raw_arguments)
    }
}

/// Ids are random so they stay unique within a turn and across the session.
pub fn generate_call_id() -> String {
    format!("call_{}", Uuid::new_v4().simple())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A message to or from an LLM
pub struct Message {
    pub role: Role,
    pub created: i64,
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn with_role(role: Role) -> Self {
        Message {
            role,
            created: Utc::now().timestamp(),
            content: None,
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system() -> Self {
        Self::with_role(Role::System)
    }

    pub fn user() -> Self {
        Self::with_role(Role::User)
    }

    pub fn assistant() -> Self {
        Self::with_role(Role::Assistant)
    }

    /// Create a tool observation correlated to the request that produced it
    pub fn tool<I: Into<String>, S: Into<String>>(tool_call_id: I, observation: S) -> Self {
        Message {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::with_role(Role::Tool)
        }
        .with_text(observation)
    }

    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.content = Some(text.into());
        self
    }

    pub fn with_tool_call(mut self, request: ToolCallRequest) -> Self {
        self.tool_calls.push(request);
        self
    }

    pub fn with_tool_calls<I: IntoIterator<Item = ToolCallRequest>>(mut self, requests: I) -> Self {
        self.tool_calls.extend(requests);
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    pub fn text(&self) -> Option<&str> {
        self.content.as_deref()
    }
}
