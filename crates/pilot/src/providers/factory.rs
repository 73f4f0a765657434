use super::{
    base::Provider,
    configs::ProviderConfig,
    deepseek::{DeepSeekProvider, DEEPSEEK_HOST, DEEPSEEK_MODEL},
    lmstudio::{LmStudioProvider, LMSTUDIO_HOST, LMSTUDIO_MODEL},
    moonshot::{MoonshotProvider, MOONSHOT_HOST, MOONSHOT_MODEL},
    openai::{OpenAiProvider, OPENAI_HOST, OPENAI_MODEL},
    perplexity::{PerplexityProvider, PERPLEXITY_HOST, PERPLEXITY_MODEL},
};
use crate::errors::BackendError;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(EnumIter, Display, EnumString, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    OpenAi,
    LmStudio,
    Moonshot,
    DeepSeek,
    Perplexity,
}

impl ProviderType {
    pub fn default_host(&self) -> &'static str {
        match self {
            ProviderType::OpenAi => OPENAI_HOST,
            ProviderType::LmStudio => LMSTUDIO_HOST,
            ProviderType::Moonshot => MOONSHOT_HOST,
            ProviderType::DeepSeek => DEEPSEEK_HOST,
            ProviderType::Perplexity => PERPLEXITY_HOST,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderType::OpenAi => OPENAI_MODEL,
            ProviderType::LmStudio => LMSTUDIO_MODEL,
            ProviderType::Moonshot => MOONSHOT_MODEL,
            ProviderType::DeepSeek => DEEPSEEK_MODEL,
            ProviderType::Perplexity => PERPLEXITY_MODEL,
        }
    }

    /// Environment variable holding the API key, if the backend needs one
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderType::OpenAi => Some("OPENAI_API_KEY"),
            ProviderType::LmStudio => None,
            ProviderType::Moonshot => Some("MOONSHOT_API_KEY"),
            ProviderType::DeepSeek => Some("DEEPSEEK_API_KEY"),
            ProviderType::Perplexity => Some("PERPLEXITY_API_KEY"),
        }
    }
}

pub fn get_provider(config: ProviderConfig) -> Result<Box<dyn Provider>, BackendError> {
    match config {
        ProviderConfig::OpenAi(openai_config) => Ok(Box::new(OpenAiProvider::new(openai_config)?)),
        ProviderConfig::LmStudio(lmstudio_config) => {
            Ok(Box::new(LmStudioProvider::new(lmstudio_config)?))
        }
        ProviderConfig::Moonshot(moonshot_config) => {
            Ok(Box::new(MoonshotProvider::new(moonshot_config)?))
        }
        ProviderConfig::DeepSeek(deepseek_config) => {
            Ok(Box::new(DeepSeekProvider::new(deepseek_config)?))
        }
        ProviderConfig::Perplexity(perplexity_config) => {
            Ok(Box::new(PerplexityProvider::new(perplexity_config)?))
        }
    }
}
