//! These models represent the objects passed around by the agent
//!
//! There are several different related formats we need to interact with:
//! - openai-compatible chat messages, sent from the agent to the LLM
//! - structured tool calls returned by function-calling backends
//! - tool-call JSON embedded in free text by backends that only emit content
//! - Thought/Action/PAUSE lines from backends driven by a textual protocol
//!
//! We always immediately convert those shapes into the internal structs here,
//! so the agent loop only ever sees a [`turn::AgentTurnResult`].
pub mod conversation;
pub mod message;
pub mod turn;
