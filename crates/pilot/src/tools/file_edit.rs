use async_trait::async_trait;
use std::path::Path;

use super::file_write::write_creating_parents;
use super::{into_observation, parse_object, string_param, Tool};
use crate::errors::{ToolError, ToolResult};

const USAGE: &str = "Input must be JSON with 'path', 'old_str', and 'new_str' fields.";

/// Replace text in a file, or create the file when `old_str` is empty
pub struct FileEditTool;

impl FileEditTool {
    pub fn new() -> Self {
        Self
    }

    async fn edit(&self, input: &str) -> ToolResult<String> {
        let params = parse_object(input, USAGE)?;
        let path = string_param(&params, "path")
            .ok_or_else(|| ToolError::InvalidParameters("path parameter is required".to_string()))?;
        let old_str = string_param(&params, "old_str").unwrap_or_default();
        let new_str = string_param(&params, "new_str").unwrap_or_default();

        if old_str == new_str {
            return Err(ToolError::InvalidParameters(
                "old_str and new_str must be different".to_string(),
            ));
        }

        let path = Path::new(path);
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            if old_str.is_empty() {
                return Err(ToolError::InvalidParameters(
                    "Cannot use empty old_str on existing file".to_string(),
                ));
            }

            let content = tokio::fs::read_to_string(path).await.map_err(edit_failed)?;
            if !content.contains(old_str) {
                return Err(ToolError::InvalidParameters(
                    "old_str not found in file".to_string(),
                ));
            }
            tokio::fs::write(path, content.replace(old_str, new_str))
                .await
                .map_err(edit_failed)?;
            Ok("OK".to_string())
        } else {
            if !old_str.is_empty() {
                return Err(ToolError::InvalidParameters(
                    "old_str must be empty when creating new file".to_string(),
                ));
            }
            write_creating_parents(path, new_str)
                .await
                .map_err(edit_failed)?;
            Ok(format!("Successfully created file {}", path.display()))
        }
    }
}

impl Default for FileEditTool {
    fn default() -> Self {
        Self::new()
    }
}

fn edit_failed(e: std::io::Error) -> ToolError {
    ToolError::ExecutionError(format!("Error editing file: {}", e))
}

#[async_trait]
impl Tool for FileEditTool {
    fn name(&self) -> &str {
        "file_edit"
    }

    fn description(&self) -> &str {
        r#"Edit a file by replacing old_str with new_str. Input must be JSON with 'path', 'old_str', and 'new_str' fields. Example: {"path": "file.txt", "old_str": "old", "new_str": "new"}"#
    }

    async fn call(&self, input: &str) -> String {
        into_observation(self.edit(input).await)
    }
}
