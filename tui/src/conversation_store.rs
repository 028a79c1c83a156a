//! Ordered transcript of one conversation.

use parley_protocol::Message;
use parley_protocol::MessageId;
use parley_protocol::Role;

#[derive(Debug, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_user(&mut self, text: impl Into<String>) -> &Message {
        self.push(Message::user(text))
    }

    /// Appends an empty, streaming assistant message whose id is handed to the reveal.
    pub fn append_assistant_placeholder(&mut self) -> &Message {
        self.push(Message::assistant_placeholder())
    }

    /// Replaces the content of a streaming message. Returns `false` when the id is unknown or the
    /// message is already done.
    pub fn update_content(&mut self, id: MessageId, content: impl Into<String>) -> bool {
        match self.streaming_mut(id) {
            Some(message) => {
                message.content = content.into();
                true
            }
            None => {
                tracing::trace!(%id, "dropped content update for missing or finished message");
                false
            }
        }
    }

    pub fn mark_done(&mut self, id: MessageId) -> bool {
        match self.streaming_mut(id) {
            Some(message) => {
                message.streaming = false;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_assistant(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == Role::Assistant)
    }

    fn push(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        let idx = self.messages.len() - 1;
        &self.messages[idx]
    }

    fn streaming_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages
            .iter_mut()
            .find(|message| message.id == id && message.streaming)
    }
}
