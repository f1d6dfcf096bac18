use super::message::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenConversationUiState {
    Empty,
    Loading,
    Ready,
}

/// Thread of the active conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenConversationState {
    conversation_id: Option<String>,
    messages: Vec<Message>,
    ui_state: OpenConversationUiState,
}

impl Default for OpenConversationState {
    fn default() -> Self {
        Self {
            conversation_id: None,
            messages: Vec::new(),
            ui_state: OpenConversationUiState::Empty,
        }
    }
}

impl OpenConversationState {
    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn ui_state(&self) -> OpenConversationUiState {
        self.ui_state
    }

    pub fn find(&self, message_id: &str) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == message_id)
    }

    /// Switching conversations drops the previous thread.
    pub fn set_loading(&mut self, conversation_id: impl Into<String>) {
        self.conversation_id = Some(conversation_id.into());
        self.messages.clear();
        self.ui_state = OpenConversationUiState::Loading;
    }

    pub fn set_ready(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.ui_state = OpenConversationUiState::Ready;
    }

    /// Leaves the stale thread in place after a failed fetch.
    pub fn keep_stale(&mut self) {
        if self.ui_state == OpenConversationUiState::Loading {
            self.ui_state = OpenConversationUiState::Ready;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Flips the local bookmark flag. Returns the new value.
    pub fn flip_bookmark(&mut self, message_id: &str) -> Option<bool> {
        let message = self
            .messages
            .iter_mut()
            .find(|message| message.id == message_id)?;
        message.is_bookmarked = !message.is_bookmarked;
        Some(message.is_bookmarked)
    }
}
