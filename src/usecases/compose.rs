//! Composer session for the open conversation.
//!
//! Owns the draft, the reply target and the self-destruct timer. The reply
//! target is cleared only after a successful send; a failed send puts the
//! text back into the draft. The timer stays selected across sends.

use chrono::{DateTime, Utc};

use crate::{
    domain::{
        composer_state::{ComposerOutcome, ComposerState},
        events::{global_shortcut, GlobalAction, KeyInput},
        message::Message,
        self_destruct::{self, UnsupportedTimer},
    },
    usecases::{contracts::Backend, message_thread::SendMessageError, workspace::Workspace},
};

const COMPOSE_SEND_FAILED: &str = "COMPOSE_SEND_FAILED";
const COMPOSE_REPLY_TARGET_DROPPED: &str = "COMPOSE_REPLY_TARGET_DROPPED";

/// What a key press led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeEvent {
    Sent(Message),
    /// The draft holds the unsent text again.
    SendFailed(SendMessageError),
    Global(GlobalAction),
    Edited,
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct ComposeSession {
    composer: ComposerState,
    reply_target: Option<String>,
    self_destruct_seconds: Option<u32>,
}

impl ComposeSession {
    pub fn composer(&self) -> &ComposerState {
        &self.composer
    }

    pub fn reply_target(&self) -> Option<&str> {
        self.reply_target.as_deref()
    }

    pub fn self_destruct_seconds(&self) -> Option<u32> {
        self.self_destruct_seconds
    }

    /// Ids that are not in `messages` are ignored.
    pub fn set_reply_target(&mut self, messages: &[Message], message_id: &str) -> bool {
        if !messages.iter().any(|message| message.id == message_id) {
            return false;
        }
        self.reply_target = Some(message_id.to_owned());
        true
    }

    pub fn clear_reply_target(&mut self) {
        self.reply_target = None;
    }

    /// Accepts `off` or one of the offered timer lengths.
    pub fn set_timer(&mut self, raw: &str) -> Result<Option<u32>, UnsupportedTimer> {
        let seconds = self_destruct::parse_choice(raw)?;
        self.self_destruct_seconds = seconds;
        Ok(seconds)
    }

    /// Global shortcuts win over the composer. Enter sends through the
    /// workspace with the current reply target and timer.
    pub fn handle_key<B>(
        &mut self,
        workspace: &mut Workspace<B>,
        key: &KeyInput,
        now: DateTime<Utc>,
    ) -> ComposeEvent
    where
        B: Backend + ?Sized,
    {
        if let Some(action) = global_shortcut(key) {
            return ComposeEvent::Global(action);
        }

        match self.composer.handle_key(key) {
            ComposerOutcome::Submit(content) => self.send(workspace, &content, now),
            ComposerOutcome::Edited => ComposeEvent::Edited,
            ComposerOutcome::Ignored => ComposeEvent::Ignored,
        }
    }

    fn send<B>(&mut self, workspace: &mut Workspace<B>, content: &str, now: DateTime<Utc>) -> ComposeEvent
    where
        B: Backend + ?Sized,
    {
        self.drop_vanished_reply_target(workspace.messages());

        let result = workspace.send_message(
            content,
            self.reply_target.as_deref(),
            self.self_destruct_seconds,
            now,
        );

        match result {
            Ok(message) => {
                self.reply_target = None;
                ComposeEvent::Sent(message)
            }
            Err(error) => {
                tracing::warn!(code = COMPOSE_SEND_FAILED, error = %error, "send failed; draft restored");
                self.composer.insert_str(content);
                ComposeEvent::SendFailed(error)
            }
        }
    }

    fn drop_vanished_reply_target(&mut self, messages: &[Message]) {
        let Some(target) = self.reply_target.as_deref() else {
            return;
        };
        if !messages.iter().any(|message| message.id == target) {
            tracing::debug!(
                code = COMPOSE_REPLY_TARGET_DROPPED,
                message_id = target,
                "reply target no longer in thread"
            );
            self.reply_target = None;
        }
    }
}
