use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::errors::BackendError;
use crate::models::message::Message;
use crate::providers::base::{Provider, RawBackendResponse, ToolChoice, ToolProtocol, Usage};
use crate::tools::registry::ToolSchema;

/// One round trip as the mock saw it
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<Message>,
    pub tool_names: Vec<String>,
    pub tool_choice: ToolChoice,
}

/// Shared view of every round trip a [`MockProvider`] served
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<RecordedCall>>>);

impl CallLog {
    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn get(&self, index: usize) -> RecordedCall {
        self.0.lock().unwrap()[index].clone()
    }

    pub fn last(&self) -> RecordedCall {
        let calls = self.0.lock().unwrap();
        calls[calls.len() - 1].clone()
    }
}

/// A mock provider that returns pre-configured responses for testing
pub struct MockProvider {
    protocol: ToolProtocol,
    responses: Mutex<VecDeque<Result<RawBackendResponse, BackendError>>>,
    calls: CallLog,
    system_prompt: Option<String>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(protocol: ToolProtocol, responses: Vec<RawBackendResponse>) -> Self {
        Self::scripted(protocol, responses.into_iter().map(Ok).collect())
    }

    /// Like [`MockProvider::new`] but individual round trips may fail
    pub fn scripted(
        protocol: ToolProtocol,
        responses: Vec<Result<RawBackendResponse, BackendError>>,
    ) -> Self {
        Self {
            protocol,
            responses: Mutex::new(responses.into()),
            calls: CallLog::default(),
            system_prompt: None,
        }
    }

    pub fn with_system_prompt_override(mut self, prompt: &str) -> Self {
        self.system_prompt = Some(prompt.to_string());
        self
    }

    pub fn calls(&self) -> CallLog {
        self.calls.clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "Mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    fn protocol(&self) -> ToolProtocol {
        self.protocol
    }

    fn system_prompt_override(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        tool_choice: ToolChoice,
    ) -> Result<(RawBackendResponse, Usage), BackendError> {
        self.calls.0.lock().unwrap().push(RecordedCall {
            messages: messages.to_vec(),
            tool_names: tools.iter().map(|t| t.name().to_string()).collect(),
            tool_choice,
        });

        // Running out of script behaves like a backend with nothing to say
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or(Ok(RawBackendResponse::Empty))
            .map(|response| (response, Usage::default()))
    }
}
