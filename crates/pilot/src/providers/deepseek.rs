use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{Provider, RawBackendResponse, ToolChoice, ToolProtocol, Usage};
use super::configs::DeepSeekProviderConfig;
use super::utils::{
    get_usage, message_content, messages_to_openai_spec, post_chat_completion, response_message,
};
use crate::errors::BackendError;
use crate::models::message::Message;
use crate::tools::registry::ToolSchema;

pub const DEEPSEEK_HOST: &str = "https://api.deepseek.com";
pub const DEEPSEEK_MODEL: &str = "deepseek-chat";

pub struct DeepSeekProvider {
    client: Client,
    config: DeepSeekProviderConfig,
}

impl DeepSeekProvider {
    pub fn new(config: DeepSeekProviderConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600))
            .build()?;

        Ok(Self { client, config })
    }
}

/// Plain-text reply for backends driven by `Action:` lines
pub(crate) fn action_response(response: &Value) -> RawBackendResponse {
    response_message(response)
        .and_then(message_content)
        .map(RawBackendResponse::ActionText)
        .unwrap_or(RawBackendResponse::Empty)
}

#[async_trait]
impl Provider for DeepSeekProvider {
    fn name(&self) -> &str {
        "DeepSeek"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn protocol(&self) -> ToolProtocol {
        ToolProtocol::ActionLine
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
            "stream": false,
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

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_complete_returns_action_text() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        let messages = vec![
            Message::system().with_text("You run in a loop"),
            Message::user().with_text("What is 4 * 7?"),
        ];
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_json(json!({
                "model": "deepseek-chat",
                "messages": messages_to_openai_spec(&messages),
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {
                    "role": "assistant",
                    "content": "Thought: I should multiply\nAction: calculate: 4 * 7\nPAUSE"
                }}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = DeepSeekProvider::new(DeepSeekProviderConfig {
            host: server.uri(),
            api_key: "sk-test".to_string(),
            model: DEEPSEEK_MODEL.to_string(),
        })?;
        let tools = vec![ToolSchema::new("calculate", "Math")];
        let (response, _) = provider.complete(&messages, &tools, ToolChoice::Auto).await?;

        assert_eq!(
            response,
            RawBackendResponse::ActionText(
                "Thought: I should multiply\nAction: calculate: 4 * 7\nPAUSE".to_string()
            )
        );
        Ok(())
    }

    #[test]
    fn test_missing_content_is_empty() {
        assert_eq!(
            action_response(&json!({"choices": [{"message": {"content": null}}]})),
            RawBackendResponse::Empty
        );
        assert_eq!(action_response(&json!({})), RawBackendResponse::Empty);
    }
}
