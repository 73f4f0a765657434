use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::{into_observation, parse_object, string_param, Tool};
use crate::errors::{ToolError, ToolResult};

const USAGE: &str = r#"Input must be JSON. Example: {"path": "directory"} or {}"#;

pub struct DirectoryListTool;

impl DirectoryListTool {
    pub fn new() -> Self {
        Self
    }

    async fn list(&self, input: &str) -> ToolResult<String> {
        let params = parse_object(input, USAGE)?;
        let root = string_param(&params, "path").unwrap_or(".");

        let mut entries = collect_entries(Path::new(root))
            .await
            .map_err(|e| ToolError::ExecutionError(format!("Error listing directory: {}", e)))?;
        entries.sort();

        serde_json::to_string(&entries)
            .map_err(|e| ToolError::ExecutionError(format!("Error listing directory: {}", e)))
    }
}

impl Default for DirectoryListTool {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk everything under `root`; directories get a trailing `/`. Symlinked
/// directories are listed but not followed.
async fn collect_entries(root: &Path) -> std::io::Result<Vec<String>> {
    let mut entries = Vec::new();
    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut reader = fs::read_dir(&dir).await?;
        while let Some(entry) = reader.next_entry().await? {
            let path = entry.path();
            let display = path.to_string_lossy().into_owned();

            if entry.file_type().await?.is_dir() {
                entries.push(format!("{}/", display));
                pending.push(path);
            } else {
                entries.push(display);
            }
        }
    }
    Ok(entries)
}

#[async_trait]
impl Tool for DirectoryListTool {
    fn name(&self) -> &str {
        "directory_list"
    }

    fn description(&self) -> &str {
        r#"List files and directories. Input must be JSON with optional 'path' field. Example: {"path": "directory"} or {} for current directory."#
    }

    async fn call(&self, input: &str) -> String {
        into_observation(self.list(input).await)
    }
}
