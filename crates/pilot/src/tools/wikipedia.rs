use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use serde_json::Value;

use super::{http_client, into_observation, Tool, TOOL_HTTP_TIMEOUT};
use crate::errors::ToolResult;

pub const WIKIPEDIA_ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
}

pub struct WikipediaTool {
    client: Client,
    endpoint: String,
}

impl WikipediaTool {
    pub fn new() -> Self {
        Self::with_endpoint(WIKIPEDIA_ENDPOINT)
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
        let response: Value = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("format", "json"),
            ])
            .send()
            .await?
            .json()
            .await?;

        let snippet = response
            .pointer("/query/search/0/snippet")
            .and_then(Value::as_str)
            .map(|snippet| HTML_TAG.replace_all(snippet, "").into_owned());

        Ok(snippet.unwrap_or_else(|| "No results found".to_string()))
    }
}

impl Default for WikipediaTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn description(&self) -> &str {
        "Searches Wikipedia and returns a summary snippet of the best matching article. Input is the search query."
    }

    async fn call(&self, input: &str) -> String {
        into_observation(self.search(input).await)
    }
}
