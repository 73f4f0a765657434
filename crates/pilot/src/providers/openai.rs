use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{Provider, RawBackendResponse, ToolChoice, ToolProtocol, Usage};
use super::configs::OpenAiProviderConfig;
use super::utils::{
    get_usage, insert_option, message_content, messages_to_openai_spec, parse_tool_calls,
    post_chat_completion, response_message, tools_to_openai_spec,
};
use crate::errors::BackendError;
use crate::models::message::Message;
use crate::tools::registry::ToolSchema;

pub const OPENAI_HOST: &str = "https://api.openai.com";
pub const OPENAI_MODEL: &str = "gpt-4";
pub const OPENAI_MAX_TOKENS: i32 = 4000;

pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    /// Reasoning models reject `max_tokens` and take `max_completion_tokens` instead
    fn max_tokens_field(&self) -> &'static str {
        let model = self.config.model.as_str();
        if ["o1", "o3", "o4"].iter().any(|prefix| model.starts_with(prefix)) {
            "max_completion_tokens"
        } else {
            "max_tokens"
        }
    }

    fn build_payload(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        tool_choice: ToolChoice,
    ) -> Value {
        let mut payload = json!({
            "model": self.config.model,
            "messages": messages_to_openai_spec(messages),
        });

        if !tools.is_empty() {
            insert_option(&mut payload, "tools", Some(tools_to_openai_spec(tools)));
            if tool_choice != ToolChoice::Auto {
                insert_option(&mut payload, "tool_choice", Some(tool_choice.to_string()));
            }
        }
        insert_option(&mut payload, "temperature", self.config.temperature);
        insert_option(
            &mut payload,
            self.max_tokens_field(),
            Some(self.config.max_tokens.unwrap_or(OPENAI_MAX_TOKENS)),
        );
        payload
    }
}

/// Read a function-calling reply: structured tool calls, otherwise plain content
pub(crate) fn native_response(response: &Value) -> RawBackendResponse {
    let Some(message) = response_message(response) else {
        return RawBackendResponse::Empty;
    };
    let content = message_content(message);
    let tool_calls = parse_tool_calls(message);

    if content.is_none() && tool_calls.is_empty() {
        RawBackendResponse::Empty
    } else {
        RawBackendResponse::ToolCalling {
            content,
            tool_calls,
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "OpenAI"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn protocol(&self) -> ToolProtocol {
        ToolProtocol::Native
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        tool_choice: ToolChoice,
    ) -> Result<(RawBackendResponse, Usage), BackendError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );
        let payload = self.build_payload(messages, tools, tool_choice);

        let response = post_chat_completion(
            &self.client,
            self.name(),
            &url,
            Some(&self.config.api_key),
            &payload,
        )
        .await?;

        Ok((native_response(&response), get_usage(&response)))
    }
}
