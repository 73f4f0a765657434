use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use serde_json::Value;
use std::env;

use super::{http_client, into_observation, Tool, TOOL_HTTP_TIMEOUT};
use crate::errors::{ToolError, ToolResult};

pub const GOOGLE_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
const MAX_RESULTS: usize = 10;

pub struct GoogleSearchTool {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    search_engine_id: Option<String>,
}

impl GoogleSearchTool {
    /// Credentials come from `GOOGLE_SEARCH_API_KEY` and `GOOGLE_SEARCH_ENGINE_ID`
    pub fn from_env() -> Self {
        Self::new(
            GOOGLE_SEARCH_ENDPOINT,
            env::var("GOOGLE_SEARCH_API_KEY").ok(),
            env::var("GOOGLE_SEARCH_ENGINE_ID").ok(),
        )
    }

    pub fn new<S: Into<String>>(
        endpoint: S,
        api_key: Option<String>,
        search_engine_id: Option<String>,
    ) -> Self {
        Self {
            client: http_client(TOOL_HTTP_TIMEOUT),
            endpoint: endpoint.into(),
            api_key,
            search_engine_id,
        }
    }

    /// Bound each request by `timeout` instead of the default
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    async fn search(&self, query: &str) -> ToolResult<String> {
        let (Some(api_key), Some(cx)) = (&self.api_key, &self.search_engine_id) else {
            return Err(ToolError::InvalidParameters(
                "GOOGLE_SEARCH_API_KEY and GOOGLE_SEARCH_ENGINE_ID must be set".to_string(),
            ));
        };

        let num = MAX_RESULTS.to_string();
        let response: Value = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", api_key.as_str()),
                ("cx", cx.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        Ok(format_results(&response))
    }
}

fn format_results(response: &Value) -> String {
    let items = match response.get("items").and_then(Value::as_array) {
        Some(items) if !items.is_empty() => items,
        _ => return "No results found".to_string(),
    };

    let info = |key: &str| {
        response
            .pointer(&format!("/searchInformation/{}", key))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let mut output = vec![format!(
        "Found {} results in {} seconds\n",
        info("formattedTotalResults"),
        info("formattedSearchTime")
    )];

    for (index, item) in items.iter().take(MAX_RESULTS).enumerate() {
        let field = |key: &str| item.get(key).and_then(Value::as_str);

        output.push(format!("{}. {}", index + 1, field("title").unwrap_or_default()));
        output.push(format!("URL: {}", field("link").unwrap_or_default()));
        output.push(format!("Description: {}", field("snippet").unwrap_or_default()));
        if let Some(format) = field("fileFormat") {
            output.push(format!("File Format: {}", format));
        }
        if let Some(site) = field("displayLink") {
            output.push(format!("Site Name: {}", site));
        }
        if let Some(meta) = item
            .pointer("/pagemap/metatags/0/og:description")
            .and_then(Value::as_str)
        {
            output.push(format!("Description (meta): {}", meta));
        }
        output.push(String::new());
    }

    output.join("\n")
}

#[async_trait]
impl Tool for GoogleSearchTool {
    fn name(&self) -> &str {
        "google_search"
    }

    fn description(&self) -> &str {
        "Searches the web with Google and returns the top results with titles, URLs and descriptions. Input is the search query."
    }

    async fn call(&self, input: &str) -> String {
        into_observation(self.search(input).await)
    }
}
