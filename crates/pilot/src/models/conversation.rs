use super::message::{Message, Role};

/// The transcript of one agent session.
///
/// Messages can only be appended; nothing is edited or reordered once pushed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Start a conversation, seeding it with a system message unless the prompt is empty
    pub fn new(system_prompt: &str) -> Self {
        let mut conversation = Self::default();
        if !system_prompt.is_empty() {
            conversation.push(Message::system().with_text(system_prompt));
        }
        conversation
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn count_role(&self, role: Role) -> usize {
        self.messages.iter().filter(|m| m.role == role).count()
    }
}
