use tracing::debug;

use crate::errors::BackendError;
use crate::models::conversation::Conversation;
use crate::models::message::{Message, ToolCallRequest};
use crate::models::turn::AgentTurnResult;
use crate::normalize::normalize;
use crate::providers::base::{Provider, RawBackendResponse, ToolChoice, ToolProtocol};
use crate::tools::registry::ToolSchema;

/// One backend plus the conversation held with it.
///
/// The client is the only owner of the conversation. Each [`LlmClient::send`]
/// is a single round trip that records both sides of the exchange.
pub struct LlmClient {
    provider: Box<dyn Provider>,
    conversation: Conversation,
    tools: Vec<ToolSchema>,
}

impl LlmClient {
    pub fn new(provider: Box<dyn Provider>, system_prompt: &str, tools: Vec<ToolSchema>) -> Self {
        // Backends without structured tool support never see the schemas
        let tools = if provider.protocol().advertises_tools() {
            tools
        } else {
            Vec::new()
        };

        Self {
            provider,
            conversation: Conversation::new(system_prompt),
            tools,
        }
    }

    pub fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    pub fn protocol(&self) -> ToolProtocol {
        self.provider.protocol()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Send the conversation, with `pending` appended as a user message first.
    ///
    /// On a backend failure the pending message stays in the transcript and
    /// nothing else is added. `Ok(None)` means the backend had nothing usable
    /// to say; no assistant message is recorded for it.
    pub async fn send(
        &mut self,
        pending: Option<String>,
        tool_choice: ToolChoice,
    ) -> Result<Option<AgentTurnResult>, BackendError> {
        if let Some(text) = pending {
            self.conversation.push(Message::user().with_text(text));
        }

        let (response, usage) = self
            .provider
            .complete(self.conversation.messages(), &self.tools, tool_choice)
            .await?;
        debug!(
            provider = self.provider.name(),
            input_tokens = ?usage.input_tokens,
            output_tokens = ?usage.output_tokens,
            total_tokens = ?usage.total_tokens,
            "round trip complete"
        );

        let result = normalize(&response);
        if let Some(turn) = &result {
            self.conversation.push(assistant_message(&response, turn));
        }
        Ok(result)
    }

    /// Feed tool observations back to the model.
    ///
    /// Backends that take tool messages get one per call, correlated by id,
    /// and `None` is returned. Action-line backends instead get the next user
    /// input to send, `Observation: <result>`.
    pub fn attach_observations(
        &mut self,
        observations: Vec<(ToolCallRequest, String)>,
    ) -> Option<String> {
        match self.protocol() {
            ToolProtocol::ActionLine => observations
                .into_iter()
                .next()
                .map(|(_, observation)| format!("Observation: {}", observation)),
            ToolProtocol::Native | ToolProtocol::JsonFallback => {
                for (call, observation) in observations {
                    self.conversation.push(Message::tool(call.id, observation));
                }
                None
            }
        }
    }
}

/// The transcript entry for what the backend just said.
///
/// Calls recovered from text are recorded as structured calls with no
/// content, so the tool messages that follow have something to correlate to.
fn assistant_message(response: &RawBackendResponse, turn: &AgentTurnResult) -> Message {
    match (response, turn) {
        (RawBackendResponse::ActionText(text), _) => Message::assistant().with_text(text.as_str()),
        (_, AgentTurnResult::FinalAnswer(text)) => Message::assistant().with_text(text.as_str()),
        (RawBackendResponse::ToolCalling { content, .. }, AgentTurnResult::ToolInvocations(calls)) => {
            Message {
                content: content.clone(),
                ..Message::assistant()
            }
            .with_tool_calls(calls.iter().cloned())
        }
        (_, AgentTurnResult::ToolInvocations(calls)) => {
            Message::assistant().with_tool_calls(calls.iter().cloned())
        }
    }
}
