use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::client::LlmClient;
use crate::errors::AgentResult;
use crate::models::conversation::Conversation;
use crate::models::message::ToolCallRequest;
use crate::models::turn::AgentTurnResult;
use crate::prompt_template::{default_system_prompt, Personality};
use crate::providers::base::{Provider, ToolChoice, ToolProtocol};
use crate::tools::ToolRegistry;

pub const DEFAULT_MAX_TURNS: usize = 5;

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Replaces the default system prompt. An empty string sends none at all.
    pub system_prompt: Option<String>,
    pub personality: Option<Personality>,
    /// Ask for `tool_choice: none` once tool results have been fed back
    pub force_answer_after_tools: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: None,
            personality: None,
            force_answer_after_tools: true,
        }
    }
}

/// Agent drives a conversation with one backend, running the tools it asks for
pub struct Agent {
    client: LlmClient,
    registry: Arc<ToolRegistry>,
    force_answer_after_tools: bool,
}

impl Agent {
    pub fn new(
        provider: Box<dyn Provider>,
        registry: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> AgentResult<Self> {
        let system_prompt = match (provider.system_prompt_override(), config.system_prompt) {
            (Some(forced), _) => forced.to_string(),
            (None, Some(custom)) => custom,
            (None, None) => match config.personality {
                Some(personality) => personality.prompt()?,
                None => default_system_prompt(provider.protocol(), &registry)?,
            },
        };

        let client = LlmClient::new(provider, &system_prompt, registry.schemas());
        Ok(Self {
            client,
            registry,
            force_answer_after_tools: config.force_answer_after_tools,
        })
    }

    /// Agent over the process-wide registry of built-in tools
    pub fn with_builtin_tools(provider: Box<dyn Provider>, config: AgentConfig) -> AgentResult<Self> {
        Self::new(provider, ToolRegistry::global()?, config)
    }

    pub fn provider(&self) -> &dyn Provider {
        self.client.provider()
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn conversation(&self) -> &Conversation {
        self.client.conversation()
    }

    /// Answer `question`, calling tools for at most `max_turns` model round trips.
    ///
    /// Returns `Ok(None)` when the budget runs out or the backend has nothing
    /// usable to say. Only backend failures are errors; the conversation is
    /// kept so the caller can ask again.
    pub async fn query(&mut self, question: &str, max_turns: usize) -> AgentResult<Option<String>> {
        let protocol = self.client.protocol();
        let mut pending = Some(question.to_string());
        let mut tool_choice = ToolChoice::Auto;

        for turn in 1..=max_turns {
            info!("Agent iteration {}/{}", turn, max_turns);

            match self.client.send(pending.take(), tool_choice).await? {
                None => {
                    warn!(provider = self.provider().name(), "backend returned no content");
                    return Ok(None);
                }
                Some(AgentTurnResult::FinalAnswer(answer)) => return Ok(Some(answer)),
                Some(AgentTurnResult::ToolInvocations(calls)) => {
                    info!("Agent making {} tool call(s)", calls.len());
                    let observations = self.dispatch(calls, protocol).await;
                    pending = self.client.attach_observations(observations);

                    if self.force_answer_after_tools && protocol.advertises_tools() {
                        tool_choice = ToolChoice::None;
                    }
                }
            }
        }

        info!(max_turns, "turn budget exhausted without a final answer");
        Ok(None)
    }

    /// Run each call in order. Unknown tools produce an error observation and
    /// the rest of the batch still runs.
    async fn dispatch(
        &self,
        calls: Vec<ToolCallRequest>,
        protocol: ToolProtocol,
    ) -> Vec<(ToolCallRequest, String)> {
        let mut observations = Vec::with_capacity(calls.len());

        for call in calls {
            let observation = match self.registry.fetch(&call.tool_name) {
                Ok(tool) => {
                    let input = tool_input(&call.raw_arguments, protocol);
                    info!(tool = %call.tool_name, "Calling tool");
                    debug!(tool = %call.tool_name, %input, "tool input");
                    tool.call(&input).await
                }
                Err(e) => {
                    warn!(tool = %call.tool_name, "model requested an unknown tool");
                    e.to_string()
                }
            };
            debug!(tool = %call.tool_name, %observation, "Observation");
            observations.push((call, observation));
        }
        observations
    }
}

/// The string a tool is invoked with.
///
/// Schemas advertise a single `input` field, so a JSON object carrying one is
/// unwrapped. Anything else, including JSON that does not parse, reaches the
/// tool untouched.
fn tool_input(raw_arguments: &str, protocol: ToolProtocol) -> String {
    match serde_json::from_str::<Value>(raw_arguments) {
        Ok(Value::Object(mut arguments)) => match arguments.remove("input") {
            Some(Value::String(input)) => input,
            Some(other) => other.to_string(),
            None => raw_arguments.to_string(),
        },
        Ok(_) => raw_arguments.to_string(),
        Err(e) => {
            // Action lines are plain text by design
            if protocol != ToolProtocol::ActionLine {
                warn!(error = %e, "tool arguments are not valid JSON, passing them through");
            }
            raw_arguments.to_string()
        }
    }
}
