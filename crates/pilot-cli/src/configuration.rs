use config::{Config, Environment, File};
use pilot::agent::{AgentConfig, DEFAULT_MAX_TURNS};
use pilot::prompt_template::Personality;
use pilot::providers::configs::{
    DeepSeekProviderConfig, LmStudioProviderConfig, MoonshotProviderConfig, OpenAiProviderConfig,
    PerplexityProviderConfig, ProviderConfig,
};
use pilot::providers::factory::ProviderType;
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Model names of this form select LM Studio regardless of the provider type
const LMSTUDIO_MODEL_PREFIX: &str = "lmstudio/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Unknown personality: {0}")]
    UnknownPersonality(String),

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    #[serde(rename = "type")]
    pub kind: ProviderType,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
}

impl ProviderSettings {
    /// The backend and model actually selected, after the `lmstudio/` shorthand
    pub fn resolved(&self) -> (ProviderType, String) {
        match self.model.as_deref() {
            Some(model) => match model.strip_prefix(LMSTUDIO_MODEL_PREFIX) {
                Some(local) => (ProviderType::LmStudio, local.to_string()),
                None => (self.kind, model.to_string()),
            },
            None => (self.kind, self.kind.default_model().to_string()),
        }
    }

    /// Build the library config, reading the API key from the vendor variable
    pub fn into_config(self) -> Result<ProviderConfig, ConfigError> {
        let (kind, model) = self.resolved();
        let host = self
            .host
            .unwrap_or_else(|| kind.default_host().to_string());
        let temperature = self.temperature;
        let api_key = match kind.api_key_env() {
            Some(var) => env::var(var).map_err(|_| ConfigError::MissingEnvVar {
                env_var: var.to_string(),
            })?,
            None => String::new(),
        };

        Ok(match kind {
            ProviderType::OpenAi => ProviderConfig::OpenAi(OpenAiProviderConfig {
                host,
                api_key,
                model,
                temperature,
                max_tokens: None,
            }),
            ProviderType::LmStudio => ProviderConfig::LmStudio(LmStudioProviderConfig {
                host,
                model,
                temperature,
                max_tokens: None,
            }),
            ProviderType::Moonshot => ProviderConfig::Moonshot(MoonshotProviderConfig {
                host,
                api_key,
                model,
                temperature,
            }),
            ProviderType::DeepSeek => ProviderConfig::DeepSeek(DeepSeekProviderConfig {
                host,
                api_key,
                model,
            }),
            ProviderType::Perplexity => ProviderConfig::Perplexity(PerplexityProviderConfig {
                host,
                api_key,
                model,
            }),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentSettings {
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
    #[serde(default = "default_force_answer")]
    pub force_answer_after_tools: bool,
    #[serde(default)]
    pub personality: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl AgentSettings {
    pub fn agent_config(&self) -> Result<AgentConfig, ConfigError> {
        let personality = self
            .personality
            .as_deref()
            .map(|name| {
                Personality::from_str(name)
                    .map_err(|_| ConfigError::UnknownPersonality(name.to_string()))
            })
            .transpose()?;

        Ok(AgentConfig {
            system_prompt: self.system_prompt.clone(),
            personality,
            force_answer_after_tools: self.force_answer_after_tools,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub provider: ProviderSettings,
    pub agent: AgentSettings,
}

impl Settings {
    /// Defaults, then the TOML file at `path` when given, then `PILOT_*` variables
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("provider.type", "openai")?
            .set_default("agent.max_turns", default_max_turns() as i64)?
            .set_default("agent.force_answer_after_tools", default_force_answer())?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path.to_path_buf()));
        }

        let config = builder
            .add_source(
                Environment::with_prefix("PILOT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize().map_err(|err| {
            tracing::debug!("Configuration error: {:?}", &err);
            ConfigError::Other(err)
        })
    }
}

fn default_max_turns() -> usize {
    DEFAULT_MAX_TURNS
}

fn default_force_answer() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("PILOT_") {
                env::remove_var(&key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();

        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.provider.kind, ProviderType::OpenAi);
        assert_eq!(settings.provider.model, None);
        assert_eq!(settings.agent.max_turns, 5);
        assert!(settings.agent.force_answer_after_tools);
        assert_eq!(settings.agent.personality, None);

        let (kind, model) = settings.provider.resolved();
        assert_eq!(kind, ProviderType::OpenAi);
        assert_eq!(model, "gpt-4");
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        env::set_var("PILOT_PROVIDER__TYPE", "moonshot");
        env::set_var("PILOT_PROVIDER__MODEL", "moonshot-v1-32k");
        env::set_var("PILOT_PROVIDER__TEMPERATURE", "0.5");
        env::set_var("PILOT_AGENT__MAX_TURNS", "8");
        env::set_var("PILOT_AGENT__FORCE_ANSWER_AFTER_TOOLS", "false");

        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.provider.kind, ProviderType::Moonshot);
        assert_eq!(settings.provider.model.as_deref(), Some("moonshot-v1-32k"));
        assert_eq!(settings.provider.temperature, Some(0.5));
        assert_eq!(settings.agent.max_turns, 8);
        assert!(!settings.agent.force_answer_after_tools);

        clean_env();
    }

    #[test]
    #[serial]
    fn test_file_then_environment() {
        clean_env();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[provider]\ntype = \"deepseek\"\nhost = \"http://localhost:9000\"\n\n[agent]\npersonality = \"teacher\"\nmax_turns = 3"
        )
        .unwrap();
        env::set_var("PILOT_AGENT__MAX_TURNS", "7");

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.provider.kind, ProviderType::DeepSeek);
        assert_eq!(settings.provider.host.as_deref(), Some("http://localhost:9000"));
        assert_eq!(settings.agent.personality.as_deref(), Some("teacher"));
        assert_eq!(settings.agent.max_turns, 7);

        clean_env();
    }

    #[test]
    #[serial]
    fn test_missing_config_file_is_an_error() {
        clean_env();
        assert!(Settings::load(Some(Path::new("/nonexistent/pilot.toml"))).is_err());
    }

    #[test]
    #[serial]
    fn test_missing_api_key_names_the_variable() {
        env::remove_var("DEEPSEEK_API_KEY");
        let provider = ProviderSettings {
            kind: ProviderType::DeepSeek,
            model: None,
            host: None,
            temperature: None,
        };

        match provider.into_config() {
            Err(ConfigError::MissingEnvVar { env_var }) => assert_eq!(env_var, "DEEPSEEK_API_KEY"),
            other => panic!("Expected a missing variable error, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_lmstudio_shorthand_needs_no_key() {
        let provider = ProviderSettings {
            kind: ProviderType::OpenAi,
            model: Some("lmstudio/qwen2.5-7b-instruct".to_string()),
            host: None,
            temperature: Some(0.2),
        };

        match provider.into_config().unwrap() {
            ProviderConfig::LmStudio(config) => {
                assert_eq!(config.model, "qwen2.5-7b-instruct");
                assert_eq!(config.host, "http://localhost:1234");
                assert_eq!(config.temperature, Some(0.2));
            }
            other => panic!("Expected LM Studio config, got {:?}", other),
        }
    }

    #[test]
    fn test_personality_lookup() {
        let mut agent = AgentSettings {
            max_turns: 5,
            force_answer_after_tools: true,
            personality: Some("coding_mentor".to_string()),
            system_prompt: None,
        };
        let config = agent.agent_config().unwrap();
        assert_eq!(config.personality, Some(Personality::CodingMentor));

        agent.personality = Some("pirate".to_string());
        assert!(matches!(
            agent.agent_config(),
            Err(ConfigError::UnknownPersonality(name)) if name == "pirate"
        ));
    }
}
