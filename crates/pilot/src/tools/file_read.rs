use async_trait::async_trait;
use std::io::ErrorKind;

use super::{into_observation, parse_object, string_param, Tool};
use crate::errors::{ToolError, ToolResult};

const USAGE: &str = r#"Input must be JSON with 'path' field. Example: {"path": "file.txt"}"#;

pub struct FileReadTool;

impl FileReadTool {
    pub fn new() -> Self {
        Self
    }

    async fn read(&self, input: &str) -> ToolResult<String> {
        let params = parse_object(input, USAGE)?;
        let path = string_param(&params, "path").ok_or_else(|| {
            ToolError::InvalidParameters(format!("path parameter is required. {}", USAGE))
        })?;

        tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => ToolError::InvalidParameters(format!("File not found: {}", path)),
            _ => ToolError::ExecutionError(format!("Error reading file: {}", e)),
        })
    }
}

impl Default for FileReadTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FileReadTool {
    fn name(&self) -> &str {
        "file_read"
    }

    fn description(&self) -> &str {
        r#"Read the contents of a file. Input must be JSON with 'path' field. Example: {"path": "file.txt"}"#
    }

    async fn call(&self, input: &str) -> String {
        into_observation(self.read(input).await)
    }
}
