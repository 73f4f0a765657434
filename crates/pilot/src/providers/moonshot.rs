use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{Provider, RawBackendResponse, ToolChoice, ToolProtocol, Usage};
use super::configs::MoonshotProviderConfig;
use super::utils::{
    get_usage, insert_option, message_content, messages_to_openai_spec, parse_tool_calls,
    post_chat_completion, response_message, tools_to_openai_spec,
};
use crate::errors::BackendError;
use crate::models::message::Message;
use crate::tools::registry::ToolSchema;

pub const MOONSHOT_HOST: &str = "https://api.moonshot.ai";
pub const MOONSHOT_MODEL: &str = "moonshot-v1-8k";
pub const MOONSHOT_TEMPERATURE: f64 = 0.3;

/// Moonshot accepts tool schemas but often answers with tool-call JSON
/// written into the message text instead of structured `tool_calls`.
pub struct MoonshotProvider {
    client: Client,
    config: MoonshotProviderConfig,
}

impl MoonshotProvider {
    pub fn new(config: MoonshotProviderConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600))
            .build()?;

        Ok(Self { client, config })
    }
}

/// Structured calls win when present; otherwise the text goes to fallback parsing
fn fallback_response(response: &Value) -> RawBackendResponse {
    let Some(message) = response_message(response) else {
        return RawBackendResponse::Empty;
    };

    let tool_calls = parse_tool_calls(message);
    let content = message_content(message);
    match (content, tool_calls.is_empty()) {
        (content, false) => RawBackendResponse::ToolCalling {
            content,
            tool_calls,
        },
        (Some(text), true) => RawBackendResponse::JsonText(text),
        (None, true) => RawBackendResponse::Empty,
    }
}

#[async_trait]
impl Provider for MoonshotProvider {
    fn name(&self) -> &str {
        "Moonshot"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn protocol(&self) -> ToolProtocol {
        ToolProtocol::JsonFallback
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        tool_choice: ToolChoice,
    ) -> Result<(RawBackendResponse, Usage), BackendError> {
        let mut payload = json!({
            "model": self.config.model,
            "messages": messages_to_openai_spec(messages),
            "temperature": self.config.temperature.unwrap_or(MOONSHOT_TEMPERATURE),
        });
        if !tools.is_empty() {
            insert_option(&mut payload, "tools", Some(tools_to_openai_spec(tools)));
            if tool_choice != ToolChoice::Auto {
                insert_option(&mut payload, "tool_choice", Some(tool_choice.to_string()));
            }
        }

        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );
        let response = post_chat_completion(
            &self.client,
            self.name(),
            &url,
            Some(&self.config.api_key),
            &payload,
        )
        .await?;

        Ok((fallback_response(&response), get_usage(&response)))
    }
}
