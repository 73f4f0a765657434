use async_trait::async_trait;
use indoc::indoc;
use reqwest::Client;
use std::time::Duration;
use serde_json::Value;

use super::{http_client, into_observation, Tool, TOOL_HTTP_TIMEOUT};
use crate::errors::ToolResult;

pub const BLOG_SEARCH_ENDPOINT: &str = "https://datasette.simonwillison.net/simonwillisonblog.json";

const SEARCH_SQL: &str = indoc! {"
    select
      blog_entry.title || ': ' || substr(html_strip_tags(blog_entry.body), 0, 1000) as text,
      blog_entry.created
    from
      blog_entry join blog_entry_fts on blog_entry.rowid = blog_entry_fts.rowid
    where
      blog_entry_fts match escape_fts(:q)
    order by
      blog_entry_fts.rank
    limit
      1
"};

/// Full-text search over Simon Willison's blog through its public Datasette
pub struct SimonBlogSearchTool {
    client: Client,
    endpoint: String,
}

impl SimonBlogSearchTool {
    pub fn new() -> Self {
        Self::with_endpoint(BLOG_SEARCH_ENDPOINT)
    }

    pub fn with_endpoint<S: Into<String>>(endpoint: S) -> Self {
        Self {
            client: http_client(TOOL_HTTP_TIMEOUT),
            endpoint: endpoint.into(),
        }
    }

    /// Bound each request by `timeout` instead of the default
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    async fn search(&self, query: &str) -> ToolResult<String> {
        let rows: Value = self
            .client
            .get(&self.endpoint)
            .query(&[("sql", SEARCH_SQL), ("_shape", "array"), ("q", query)])
            .send()
            .await?
            .json()
            .await?;

        Ok(rows
            .pointer("/0/text")
            .and_then(Value::as_str)
            .unwrap_or("No results found")
            .to_string())
    }
}

impl Default for SimonBlogSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for SimonBlogSearchTool {
    fn name(&self) -> &str {
        "simon_blog_search"
    }

    fn description(&self) -> &str {
        "Searches Simon Willison's blog for entries matching the query and returns the best match."
    }

    async fn call(&self, input: &str) -> String {
        into_observation(self.search(input).await)
    }
}
