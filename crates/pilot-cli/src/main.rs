use anyhow::{bail, Context, Result};
use clap::Parser;
use pilot::agent::Agent;
use pilot::prompt_template::Personality;
use pilot::providers::configs::ProviderConfig;
use pilot::providers::factory::{get_provider, ProviderType};
use pilot::providers::lmstudio::LmStudioProvider;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod configuration;
mod render;
mod repl;

use configuration::Settings;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Backend to talk to (openai, lmstudio, moonshot, deepseek or perplexity)
    #[arg(short, long)]
    provider: Option<ProviderType>,

    /// Model to use; `lmstudio/<model>` selects a local LM Studio model
    #[arg(short, long)]
    model: Option<String>,

    /// Most model round trips spent on one question
    #[arg(long)]
    max_turns: Option<usize>,

    /// Canned system prompt (therapist, teacher, creative_writer or coding_mentor)
    #[arg(long)]
    personality: Option<Personality>,

    /// Replaces the default system prompt
    #[arg(long)]
    system_prompt: Option<String>,

    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List the models an LM Studio server has loaded, then exit
    #[arg(long)]
    list_models: bool,

    /// Log debug output, including tool observations
    #[arg(short, long)]
    verbose: bool,

    /// Ask one question and exit instead of starting a session
    question: Option<String>,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("pilot=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pilot=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn apply_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(provider) = cli.provider {
        settings.provider.kind = provider;
    }
    if let Some(model) = &cli.model {
        settings.provider.model = Some(model.clone());
    }
    if let Some(max_turns) = cli.max_turns {
        settings.agent.max_turns = max_turns;
    }
    if let Some(personality) = cli.personality {
        settings.agent.personality = Some(personality.to_string());
    }
    if let Some(system_prompt) = &cli.system_prompt {
        settings.agent.system_prompt = Some(system_prompt.clone());
    }
}

async fn list_models(config: ProviderConfig) -> Result<()> {
    let ProviderConfig::LmStudio(config) = config else {
        bail!("--list-models needs the lmstudio provider");
    };
    let models = LmStudioProvider::new(config)?
        .list_models()
        .await
        .context("Failed to list LM Studio models")?;
    for model in models {
        println!("{}", model);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenv::dotenv().ok();
    init_logging(cli.verbose);

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    apply_overrides(&mut settings, &cli);

    let max_turns = settings.agent.max_turns;
    let agent_config = settings.agent.agent_config()?;
    let provider_config = settings.provider.clone().into_config()?;

    if cli.list_models {
        return list_models(provider_config).await;
    }

    let provider = get_provider(provider_config).context("Failed to create provider")?;
    let mut agent = Agent::with_builtin_tools(provider, agent_config)?;
    info!(
        provider = agent.provider().name(),
        model = agent.provider().model(),
        "session started"
    );

    match cli.question {
        Some(question) => {
            let answer = agent
                .query(&question, max_turns)
                .await
                .context("Query failed")?;
            match answer {
                Some(answer) => render::print_markdown(&answer),
                None => render::print_no_answer(max_turns),
            }
            Ok(())
        }
        None => {
            render::print_banner(&agent);
            repl::run(&mut agent, max_turns).await
        }
    }
}
