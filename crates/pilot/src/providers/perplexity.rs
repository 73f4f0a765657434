use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use super::base::{Provider, RawBackendResponse, ToolChoice, ToolProtocol, Usage};
use super::configs::PerplexityProviderConfig;
use super::deepseek::action_response;
use super::utils::{get_usage, messages_to_openai_spec, post_chat_completion};
use crate::errors::BackendError;
use crate::models::message::Message;
use crate::tools::registry::ToolSchema;

pub const PERPLEXITY_HOST: &str = "https://api.perplexity.ai";
pub const PERPLEXITY_MODEL: &str = "llama-3.1-sonar-huge-128k-online";
pub const PERPLEXITY_SYSTEM_PROMPT: &str = "Be precise and concise.";

/// Perplexity's online models. Always runs with its own short system prompt.
pub struct PerplexityProvider {
    client: Client,
    config: PerplexityProviderConfig,
}

impl PerplexityProvider {
    pub fn new(config: PerplexityProviderConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600))
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Provider for PerplexityProvider {
    fn name(&self) -> &str {
        "Perplexity"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn protocol(&self) -> ToolProtocol {
        ToolProtocol::ActionLine
    }

    fn system_prompt_override(&self) -> Option<&str> {
        Some(PERPLEXITY_SYSTEM_PROMPT)
    }

    async fn complete(
        &self,
        messages: &[Message],
        _tools: &[ToolSchema],
        _tool_choice: ToolChoice,
    ) -> Result<(RawBackendResponse, Usage), BackendError> {
        let payload = json!({
            "model": self.config.model,
            "messages": messages_to_openai_spec(messages),
            "temperature": 0.2,
            "top_p": 0.9,
            "search_domain_filter": ["perplexity.ai"],
            "return_images": false,
            "return_related_questions": false,
            "search_recency_filter": "month",
            "top_k": 0,
            "stream": false,
            "presence_penalty": 0,
            "frequency_penalty": 1
        });

        let url = format!("{}/chat/completions", self.config.host.trim_end_matches('/'));
        let response = post_chat_completion(
            &self.client,
            self.name(),
            &url,
            Some(&self.config.api_key),
            &payload,
        )
        .await?;

        Ok((action_response(&response), get_usage(&response)))
    }
}
