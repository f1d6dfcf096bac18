//! Live message thread for the active conversation.
//!
//! Every change notification for the active conversation triggers a full
//! re-fetch of messages, sender profiles and reactions.

use std::{
    collections::{HashMap, HashSet},
    sync::{mpsc::Sender, Arc},
};

use crate::{
    domain::{
        events::ChangeNotification,
        message::{aggregate_reactions, Message, NewMessage, NewReaction, ReactionRow},
        open_conversation_state::OpenConversationState,
        profile::Profile,
    },
    usecases::contracts::{BackendError, ChangeFeed, MessageStore, ProfileStore, Subscription},
};

const THREAD_FETCH_FAILED: &str = "THREAD_FETCH_FAILED";
const THREAD_PROFILES_FETCH_FAILED: &str = "THREAD_PROFILES_FETCH_FAILED";
const THREAD_REACTIONS_FETCH_FAILED: &str = "THREAD_REACTIONS_FETCH_FAILED";
const THREAD_SUBSCRIBE_FAILED: &str = "THREAD_SUBSCRIBE_FAILED";
const REACTION_INSERT_FAILED: &str = "REACTION_INSERT_FAILED";
const BOOKMARK_UPDATE_FAILED: &str = "BOOKMARK_UPDATE_FAILED";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendMessageError {
    EmptyMessage,
    NoActiveConversation,
    Unauthorized,
    ConversationNotFound,
    TemporarilyUnavailable,
    Rejected(String),
}

impl std::fmt::Display for SendMessageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => f.write_str("message text is empty"),
            Self::NoActiveConversation => f.write_str("no conversation is open"),
            Self::Unauthorized => f.write_str("not authorized to send to this conversation"),
            Self::ConversationNotFound => f.write_str("conversation not found"),
            Self::TemporarilyUnavailable => f.write_str("backend temporarily unavailable"),
            Self::Rejected(details) => write!(f, "message rejected: {details}"),
        }
    }
}

impl std::error::Error for SendMessageError {}

fn map_send_error(error: BackendError) -> SendMessageError {
    match error {
        BackendError::Unauthorized => SendMessageError::Unauthorized,
        BackendError::NotFound => SendMessageError::ConversationNotFound,
        BackendError::Unavailable(_) => SendMessageError::TemporarilyUnavailable,
        other => SendMessageError::Rejected(other.to_string()),
    }
}

/// Fetches a conversation's messages with senders and aggregated reactions.
pub fn fetch_thread<S>(store: &S, conversation_id: &str) -> Result<Vec<Message>, BackendError>
where
    S: MessageStore + ProfileStore + ?Sized,
{
    let rows = store.messages(conversation_id)?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let mut seen = HashSet::new();
    let sender_ids: Vec<String> = rows
        .iter()
        .filter(|row| seen.insert(row.sender_id.as_str()))
        .map(|row| row.sender_id.clone())
        .collect();

    let profiles: HashMap<String, Profile> = match store.profiles_by_ids(&sender_ids) {
        Ok(profiles) => profiles.into_iter().map(|p| (p.id.clone(), p)).collect(),
        Err(error) => {
            tracing::warn!(
                code = THREAD_PROFILES_FETCH_FAILED,
                conversation_id,
                error = %error,
                "sender profiles unavailable"
            );
            HashMap::new()
        }
    };

    let message_ids: Vec<String> = rows.iter().map(|row| row.id.clone()).collect();
    let reactions = store.reactions_for(&message_ids).unwrap_or_else(|error| {
        tracing::warn!(
            code = THREAD_REACTIONS_FETCH_FAILED,
            conversation_id,
            error = %error,
            "reactions unavailable"
        );
        Vec::new()
    });

    let mut by_message: HashMap<&str, Vec<&ReactionRow>> = HashMap::new();
    for reaction in &reactions {
        by_message
            .entry(reaction.message_id.as_str())
            .or_default()
            .push(reaction);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let reactions = by_message
                .get(row.id.as_str())
                .map(|rows| aggregate_reactions(rows.iter().copied()))
                .unwrap_or_default();
            let sender = profiles.get(&row.sender_id).cloned();
            Message::from_row(row, sender, reactions)
        })
        .collect())
}

pub struct MessageThread<B: ?Sized> {
    backend: Arc<B>,
    viewer_id: String,
    state: OpenConversationState,
    subscription: Option<Box<dyn Subscription>>,
    notifications: Sender<ChangeNotification>,
}

impl<B> MessageThread<B>
where
    B: MessageStore + ProfileStore + ChangeFeed + ?Sized,
{
    pub fn new(
        backend: Arc<B>,
        viewer_id: impl Into<String>,
        notifications: Sender<ChangeNotification>,
    ) -> Self {
        Self {
            backend,
            viewer_id: viewer_id.into(),
            state: OpenConversationState::default(),
            subscription: None,
            notifications,
        }
    }

    pub fn state(&self) -> &OpenConversationState {
        &self.state
    }

    pub fn active_conversation(&self) -> Option<&str> {
        self.state.conversation_id()
    }

    /// Makes `conversation_id` the active thread. The previous change
    /// subscription is released before the new one is requested.
    pub fn open(&mut self, conversation_id: &str) {
        self.release_subscription();
        self.state.set_loading(conversation_id);

        match self
            .backend
            .subscribe(conversation_id, self.notifications.clone())
        {
            Ok(subscription) => self.subscription = Some(subscription),
            Err(error) => tracing::warn!(
                code = THREAD_SUBSCRIBE_FAILED,
                conversation_id,
                error = %error,
                "realtime subscription failed; thread will only refresh on demand"
            ),
        }

        self.refresh();
    }

    pub fn close(&mut self) {
        self.release_subscription();
        self.state.clear();
    }

    /// Re-fetches the active thread. On failure the previous messages stay.
    pub fn refresh(&mut self) {
        let Some(conversation_id) = self.state.conversation_id().map(ToOwned::to_owned) else {
            return;
        };

        match fetch_thread(self.backend.as_ref(), &conversation_id) {
            Ok(messages) => self.state.set_ready(messages),
            Err(error) => {
                tracing::warn!(
                    code = THREAD_FETCH_FAILED,
                    conversation_id = %conversation_id,
                    error = %error,
                    "thread fetch failed; keeping previous messages"
                );
                self.state.keep_stale();
            }
        }
    }

    /// Returns whether the notification caused a refresh.
    pub fn handle_notification(&mut self, notification: &ChangeNotification) -> bool {
        if self.state.conversation_id() != Some(notification.conversation_id.as_str()) {
            tracing::debug!(
                conversation_id = %notification.conversation_id,
                kind = notification.kind.as_str(),
                "dropping change notification for inactive conversation"
            );
            return false;
        }

        tracing::debug!(
            conversation_id = %notification.conversation_id,
            kind = notification.kind.as_str(),
            "change notification received; refreshing thread"
        );
        self.refresh();
        true
    }

    pub fn send_message(
        &mut self,
        content: &str,
        reply_to: Option<&str>,
        self_destruct_seconds: Option<u32>,
    ) -> Result<Message, SendMessageError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(SendMessageError::EmptyMessage);
        }
        let conversation_id = self
            .state
            .conversation_id()
            .ok_or(SendMessageError::NoActiveConversation)?
            .to_owned();

        let row = self
            .backend
            .insert_message(&NewMessage {
                conversation_id,
                sender_id: self.viewer_id.clone(),
                content: content.to_owned(),
                reply_to: reply_to.map(ToOwned::to_owned),
                self_destruct_seconds,
            })
            .map_err(map_send_error)?;

        tracing::info!(message_id = %row.id, "message sent");

        self.refresh();

        let sent = self
            .state
            .find(&row.id)
            .cloned()
            .unwrap_or_else(|| Message::from_row(row, None, Vec::new()));
        Ok(sent)
    }

    /// Reacting twice with the same emoji is a no-op.
    pub fn add_reaction(&mut self, message_id: &str, emoji: &str) {
        let result = self.backend.insert_reaction(&NewReaction {
            message_id: message_id.to_owned(),
            user_id: self.viewer_id.clone(),
            emoji: emoji.to_owned(),
        });

        match result {
            Ok(()) | Err(BackendError::Duplicate) => {}
            Err(error) => tracing::warn!(
                code = REACTION_INSERT_FAILED,
                message_id,
                error = %error,
                "reaction insert failed"
            ),
        }

        self.refresh();
    }

    /// Returns the new bookmark value, or `None` when nothing changed.
    pub fn toggle_bookmark(&mut self, message_id: &str) -> Option<bool> {
        let current = self.state.find(message_id)?.is_bookmarked;

        match self.backend.set_bookmarked(message_id, !current) {
            Ok(()) => self.state.flip_bookmark(message_id),
            Err(error) => {
                tracing::warn!(
                    code = BOOKMARK_UPDATE_FAILED,
                    message_id,
                    error = %error,
                    "bookmark update failed"
                );
                None
            }
        }
    }

    fn release_subscription(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            tracing::debug!(
                conversation_id = subscription.conversation_id(),
                "releasing change subscription"
            );
            subscription.unsubscribe();
        }
    }
}

impl<B: ?Sized> Drop for MessageThread<B> {
    fn drop(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}
