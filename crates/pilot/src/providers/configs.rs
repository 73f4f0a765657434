// Unified enum to wrap different provider configurations
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    OpenAi(OpenAiProviderConfig),
    LmStudio(LmStudioProviderConfig),
    Moonshot(MoonshotProviderConfig),
    DeepSeek(DeepSeekProviderConfig),
    Perplexity(PerplexityProviderConfig),
}

#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f64>,
    pub max_tokens: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct LmStudioProviderConfig {
    pub host: String,
    pub model: String,
    pub temperature: Option<f64>,
    pub max_tokens: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct MoonshotProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct DeepSeekProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct PerplexityProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
}
