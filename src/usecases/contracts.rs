use std::sync::mpsc::Sender;

use thiserror::Error;

use crate::domain::{
    conversation::{ConversationRow, MemberRow, NewConversation, NewMember},
    events::ChangeNotification,
    message::{MessageRow, NewMessage, NewReaction, ReactionRow},
    profile::{Profile, ProfileUpdate},
    summary::{SummaryRequest, SummaryResponse},
};

/// Failure reported by any store call against the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("backend rejected the credentials")]
    Unauthorized,
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("backend returned malformed data: {0}")]
    InvalidData(String),
    #[error("row already exists")]
    Duplicate,
    #[error("row not found")]
    NotFound,
    #[error("backend error: {0}")]
    Other(String),
}

pub trait ProfileStore {
    fn profiles_by_ids(&self, user_ids: &[String]) -> Result<Vec<Profile>, BackendError>;
    fn profile(&self, user_id: &str) -> Result<Option<Profile>, BackendError>;
    fn all_profiles(&self) -> Result<Vec<Profile>, BackendError>;
    fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<Profile, BackendError>;
}

pub trait ConversationStore {
    fn memberships_for_user(&self, user_id: &str) -> Result<Vec<MemberRow>, BackendError>;
    fn conversations_by_ids(
        &self,
        conversation_ids: &[String],
    ) -> Result<Vec<ConversationRow>, BackendError>;
    fn members_for_conversations(
        &self,
        conversation_ids: &[String],
    ) -> Result<Vec<MemberRow>, BackendError>;
    fn insert_conversation(
        &self,
        conversation: &NewConversation,
    ) -> Result<ConversationRow, BackendError>;
    fn insert_member(&self, member: &NewMember) -> Result<(), BackendError>;
}

pub trait MessageStore {
    fn latest_message(&self, conversation_id: &str) -> Result<Option<MessageRow>, BackendError>;
    /// Messages in the conversation not sent by `viewer_id` and not yet read.
    fn unread_count(&self, conversation_id: &str, viewer_id: &str) -> Result<u32, BackendError>;
    /// All messages of a conversation, oldest first.
    fn messages(&self, conversation_id: &str) -> Result<Vec<MessageRow>, BackendError>;
    fn insert_message(&self, message: &NewMessage) -> Result<MessageRow, BackendError>;
    fn reactions_for(&self, message_ids: &[String]) -> Result<Vec<ReactionRow>, BackendError>;
    /// Fails with [`BackendError::Duplicate`] when the user already reacted with that emoji.
    fn insert_reaction(&self, reaction: &NewReaction) -> Result<(), BackendError>;
    fn set_bookmarked(&self, message_id: &str, bookmarked: bool) -> Result<(), BackendError>;
}

/// A live change subscription for one conversation's messages.
pub trait Subscription {
    fn conversation_id(&self) -> &str;
    fn unsubscribe(&mut self);
}

pub trait ChangeFeed {
    fn subscribe(
        &self,
        conversation_id: &str,
        sink: Sender<ChangeNotification>,
    ) -> Result<Box<dyn Subscription>, BackendError>;
}

/// Raw outcome of a serverless function call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeResponse {
    pub status: u16,
    pub body: Option<SummaryResponse>,
}

pub trait SummaryInvoker {
    fn invoke_summary(
        &self,
        function_name: &str,
        request: &SummaryRequest,
    ) -> Result<InvokeResponse, BackendError>;
}

/// Everything the sync layer needs from the backend.
pub trait Backend: ConversationStore + MessageStore + ProfileStore + ChangeFeed {}

impl<T> Backend for T where T: ConversationStore + MessageStore + ProfileStore + ChangeFeed {}
