use serde_json::Value;
use thiserror::Error;

/// Failures talking to an LLM vendor endpoint. Always fatal for the current query.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("{provider} API error: {payload}")]
    Api { provider: String, payload: Value },

    #[error("{provider} request failed with status {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("{provider} returned an invalid response: {message}")]
    InvalidResponse { provider: String, message: String },

    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),
}

impl BackendError {
    /// The vendor's error payload, when the endpoint sent one
    pub fn payload(&self) -> Option<&Value> {
        match self {
            BackendError::Api { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Duplicate tool name: {0}")]
    DuplicateToolName(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("The tool name '{0}' had invalid characters, it must match this regex [a-zA-Z0-9_-]+")]
    InvalidToolName(String),
}

/// Failure modes a tool can hit while running. These never leave the tool:
/// they are rendered into the observation string handed back to the model.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Error parsing input: {0}")]
    InvalidInput(String),

    #[error("Error: {0}")]
    InvalidParameters(String),

    #[error("{0}")]
    ExecutionError(String),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Failed to render prompt: {0}")]
    Prompt(#[from] tera::Error),
}

pub type AgentResult<T> = Result<T, AgentError>;
pub type ToolResult<T> = Result<T, ToolError>;
