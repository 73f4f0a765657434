use async_trait::async_trait;
use std::path::Path;

use super::{into_observation, parse_object, string_param, Tool};
use crate::errors::{ToolError, ToolResult};

const USAGE: &str = r#"Input must be JSON with 'path' and 'content' fields. Example: {"path": "file.txt", "content": "Hello"}"#;

pub struct FileWriteTool;

impl FileWriteTool {
    pub fn new() -> Self {
        Self
    }

    async fn write(&self, input: &str) -> ToolResult<String> {
        let params = parse_object(input, USAGE)?;
        let path = string_param(&params, "path")
            .ok_or_else(|| ToolError::InvalidParameters("path parameter is required".to_string()))?;
        let content = string_param(&params, "content").unwrap_or_default();

        write_creating_parents(Path::new(path), content)
            .await
            .map_err(|e| ToolError::ExecutionError(format!("Error writing file: {}", e)))?;
        Ok(format!("Successfully wrote to {}", path))
    }
}

impl Default for FileWriteTool {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) async fn write_creating_parents(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await
}

#[async_trait]
impl Tool for FileWriteTool {
    fn name(&self) -> &str {
        "file_write"
    }

    fn description(&self) -> &str {
        "Write content to a file, creating it if it doesn't exist. This overwrites the entire file content. Input should be a JSON string with 'path' and 'content' fields."
    }

    async fn call(&self, input: &str) -> String {
        into_observation(self.write(input).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_writes_with_parent_directories() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/deeper/out.txt");

        let input = json!({"path": path, "content": "data"}).to_string();
        let observation = FileWriteTool::new().call(&input).await;

        assert_eq!(observation, format!("Successfully wrote to {}", path.display()));
        assert_eq!(std::fs::read_to_string(&path)?, "data");
        Ok(())
    }

    #[tokio::test]
    async fn test_overwrites_existing_content() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "old content that is longer")?;

        let input = json!({"path": path, "content": "new"}).to_string();
        FileWriteTool::new().call(&input).await;

        assert_eq!(std::fs::read_to_string(&path)?, "new");
        Ok(())
    }

    #[tokio::test]
    async fn test_requires_path() {
        assert_eq!(
            FileWriteTool::new().call(r#"{"content": "x"}"#).await,
            "Error: path parameter is required"
        );
    }
}
