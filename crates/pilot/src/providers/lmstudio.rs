use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{Provider, RawBackendResponse, ToolChoice, ToolProtocol, Usage};
use super::configs::LmStudioProviderConfig;
use super::openai::native_response;
use super::utils::{
    get_usage, insert_option, messages_to_openai_spec, post_chat_completion, tools_to_openai_spec,
};
use crate::errors::BackendError;
use crate::models::message::Message;
use crate::tools::registry::ToolSchema;

pub const LMSTUDIO_HOST: &str = "http://localhost:1234";
pub const LMSTUDIO_MODEL: &str = "local-model";
pub const LMSTUDIO_TEMPERATURE: f64 = 0.7;
pub const LMSTUDIO_MAX_TOKENS: i32 = 4000;

/// LM Studio ignores the key but its OpenAI-compatible server expects one
const LMSTUDIO_API_KEY: &str = "lm-studio";

/// A model served locally by LM Studio's OpenAI-compatible server
pub struct LmStudioProvider {
    client: Client,
    config: LmStudioProviderConfig,
}

impl LmStudioProvider {
    pub fn new(config: LmStudioProviderConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600))
            .build()?;

        Ok(Self { client, config })
    }

    fn base_url(&self) -> String {
        format!("{}/v1", self.config.host.trim_end_matches('/'))
    }

    /// Ids of the models currently loaded in LM Studio
    pub async fn list_models(&self) -> Result<Vec<String>, BackendError> {
        let response: Value = self
            .client
            .get(format!("{}/models", self.base_url()))
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
            return Err(BackendError::Api {
                provider: self.name().to_string(),
                payload: error.clone(),
            });
        }

        Ok(response
            .get("data")
            .and_then(Value::as_array)
            .map(|models| {
                models
                    .iter()
                    .filter_map(|model| model.get("id").and_then(Value::as_str))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl Provider for LmStudioProvider {
    fn name(&self) -> &str {
        "LM Studio"
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
        let mut payload = json!({
            "model": self.config.model,
            "messages": messages_to_openai_spec(messages),
            "max_tokens": self.config.max_tokens.unwrap_or(LMSTUDIO_MAX_TOKENS),
            "temperature": self.config.temperature.unwrap_or(LMSTUDIO_TEMPERATURE),
        });
        if !tools.is_empty() {
            insert_option(&mut payload, "tools", Some(tools_to_openai_spec(tools)));
            if tool_choice != ToolChoice::Auto {
                insert_option(&mut payload, "tool_choice", Some(tool_choice.to_string()));
            }
        }

        let url = format!("{}/chat/completions", self.base_url());
        let response = post_chat_completion(
            &self.client,
            self.name(),
            &url,
            Some(LMSTUDIO_API_KEY),
            &payload,
        )
        .await?;

        Ok((native_response(&response), get_usage(&response)))
    }
}
