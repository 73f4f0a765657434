use super::message::ToolCallRequest;

/// What the model asked for on one turn, independent of which backend answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentTurnResult {
    FinalAnswer(String),
    ToolInvocations(Vec<ToolCallRequest>),
}
