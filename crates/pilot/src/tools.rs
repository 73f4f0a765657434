//! The tool contract and the built-in tool set.
//!
//! A tool takes one string and returns one string. Anticipated failures are
//! rendered into that string so the model can read them and try again.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::warn;

use crate::errors::{ToolError, ToolResult};

pub mod blog_search;
pub mod calculate;
pub mod directory_list;
pub mod file_edit;
pub mod file_read;
pub mod file_write;
pub mod google_search;
pub mod registry;
pub mod wikipedia;

pub use registry::{ToolRegistry, ToolSchema};

#[async_trait]
pub trait Tool: Send + Sync {
    /// Name used by the model to address the tool
    fn name(&self) -> &str;

    /// What the tool does, and the JSON shape of its input when it needs one
    fn description(&self) -> &str;

    /// Run the tool. Never fails: errors come back as the observation text.
    async fn call(&self, input: &str) -> String;
}

/// Every tool shipped with the library, in registration order
pub fn builtin_tools() -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(calculate::CalculateTool::new()),
        Box::new(wikipedia::WikipediaTool::new()),
        Box::new(google_search::GoogleSearchTool::from_env()),
        Box::new(blog_search::SimonBlogSearchTool::new()),
        Box::new(file_read::FileReadTool::new()),
        Box::new(file_write::FileWriteTool::new()),
        Box::new(file_edit::FileEditTool::new()),
        Box::new(directory_list::DirectoryListTool::new()),
    ]
}

/// Upper bound on each request a network tool makes
pub const TOOL_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn http_client(timeout: Duration) -> Client {
    Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
        warn!(error = %e, "could not configure tool HTTP client, using defaults");
        Client::new()
    })
}

/// Collapse a tool's internal result into the observation handed to the model
pub(crate) fn into_observation(result: ToolResult<String>) -> String {
    result.unwrap_or_else(|e| e.to_string())
}

/// Parse a structured tool input, appending `usage` to the parse error
pub(crate) fn parse_object(input: &str, usage: &str) -> ToolResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(input) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ToolError::InvalidInput(format!(
            "expected a JSON object. {}",
            usage
        ))),
        Err(e) => Err(ToolError::InvalidInput(format!("{}. {}", e, usage))),
    }
}

pub(crate) fn string_param<'a>(params: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}
