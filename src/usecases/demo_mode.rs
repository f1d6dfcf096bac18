//! In-memory stand-in for the backend, seeded from the fixture set.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::{
    domain::{
        conversation::{sort_for_sidebar, Conversation, ConversationMember, MemberRole},
        message::{Message, ReactionCount},
        profile::Profile,
    },
    infra::fixtures::{self, FixtureConversation, FixtureMessage, FixtureUser, CURRENT_USER_ID},
    usecases::message_thread::SendMessageError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoStore {
    conversations: Vec<Conversation>,
    messages: HashMap<String, Vec<Message>>,
}

impl DemoStore {
    /// Materializes the fixtures with timestamps relative to `now`.
    pub fn load(now: DateTime<Utc>) -> Self {
        let mut conversations: Vec<Conversation> = fixtures::CONVERSATIONS
            .iter()
            .map(|fixture| convert_conversation(fixture, now))
            .collect();
        sort_for_sidebar(&mut conversations);

        let messages = fixtures::CONVERSATIONS
            .iter()
            .map(|fixture| {
                let thread = fixtures::messages_for(fixture.id)
                    .iter()
                    .map(|message| convert_message(message, fixture.id, now))
                    .collect();
                (fixture.id.to_owned(), thread)
            })
            .collect();

        tracing::info!(
            conversations = conversations.len(),
            "demo data loaded"
        );

        Self {
            conversations,
            messages,
        }
    }

    pub fn viewer_id(&self) -> &'static str {
        CURRENT_USER_ID
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Thread of a conversation; unknown or unseeded conversations are empty.
    pub fn messages(&self, conversation_id: &str) -> &[Message] {
        self.messages
            .get(conversation_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Appends a read message from the current user and refreshes the
    /// conversation preview. Nothing leaves the process.
    pub fn send_message(
        &mut self,
        conversation_id: &str,
        content: &str,
        reply_to: Option<&str>,
        self_destruct_seconds: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<Message, SendMessageError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(SendMessageError::EmptyMessage);
        }
        let conversation = self
            .conversations
            .iter_mut()
            .find(|conversation| conversation.id == conversation_id)
            .ok_or(SendMessageError::ConversationNotFound)?;

        let message = Message {
            id: format!("demo-{}", now.timestamp_millis()),
            conversation_id: conversation_id.to_owned(),
            sender_id: CURRENT_USER_ID.to_owned(),
            content: content.to_owned(),
            reply_to: reply_to.map(ToOwned::to_owned),
            is_read: true,
            is_bookmarked: false,
            self_destruct_seconds,
            created_at: now,
            sender: Some(profile_of(&fixtures::CURRENT_USER, now)),
            reactions: Vec::new(),
        };

        conversation.last_message = Some(message.clone());
        self.messages
            .entry(conversation_id.to_owned())
            .or_default()
            .push(message.clone());
        sort_for_sidebar(&mut self.conversations);

        tracing::debug!(conversation_id, message_id = %message.id, "demo message appended");

        Ok(message)
    }

    /// Bumps the emoji count on a demo message. Returns false for unknown ids.
    pub fn add_reaction(&mut self, conversation_id: &str, message_id: &str, emoji: &str) -> bool {
        let Some(message) = self.find_mut(conversation_id, message_id) else {
            return false;
        };

        match message.reactions.iter_mut().find(|r| r.emoji == emoji) {
            Some(reaction) => reaction.count += 1,
            None => message.reactions.push(ReactionCount {
                emoji: emoji.to_owned(),
                count: 1,
            }),
        }
        true
    }

    pub fn toggle_bookmark(&mut self, conversation_id: &str, message_id: &str) -> Option<bool> {
        let message = self.find_mut(conversation_id, message_id)?;
        message.is_bookmarked = !message.is_bookmarked;
        Some(message.is_bookmarked)
    }

    fn find_mut(&mut self, conversation_id: &str, message_id: &str) -> Option<&mut Message> {
        self.messages
            .get_mut(conversation_id)?
            .iter_mut()
            .find(|message| message.id == message_id)
    }
}

fn profile_of(user: &FixtureUser, now: DateTime<Utc>) -> Profile {
    Profile {
        id: user.id.to_owned(),
        username: Some(user.username.to_owned()),
        display_name: Some(user.name.to_owned()),
        avatar_url: Some(user.avatar.to_owned()),
        bio: None,
        status: Some(user.presence.as_str().to_owned()),
        last_seen: user
            .last_seen_minutes_ago
            .map(|minutes| now - Duration::minutes(minutes)),
    }
}

fn resolve_sender(sender_id: &str, now: DateTime<Utc>) -> Option<Profile> {
    fixtures::user(sender_id).map(|user| profile_of(user, now))
}

fn convert_message(fixture: &FixtureMessage, conversation_id: &str, now: DateTime<Utc>) -> Message {
    Message {
        id: fixture.id.to_owned(),
        conversation_id: conversation_id.to_owned(),
        sender_id: fixture.sender_id.to_owned(),
        content: fixture.content.to_owned(),
        reply_to: None,
        is_read: fixture.is_read,
        is_bookmarked: false,
        self_destruct_seconds: None,
        created_at: now - Duration::minutes(fixture.minutes_ago),
        sender: resolve_sender(fixture.sender_id, now),
        reactions: fixture
            .reactions
            .iter()
            .map(|(emoji, count)| ReactionCount {
                emoji: (*emoji).to_owned(),
                count: *count,
            })
            .collect(),
    }
}

fn convert_conversation(fixture: &FixtureConversation, now: DateTime<Utc>) -> Conversation {
    let owner = ConversationMember {
        user_id: CURRENT_USER_ID.to_owned(),
        role: MemberRole::Owner,
        is_muted: fixture.is_muted,
        is_pinned: fixture.is_pinned,
        profile: Some(profile_of(&fixtures::CURRENT_USER, now)),
    };
    let others = fixture.participant_ids.iter().map(|user_id| ConversationMember {
        user_id: (*user_id).to_owned(),
        role: MemberRole::Member,
        is_muted: false,
        is_pinned: false,
        profile: resolve_sender(user_id, now),
    });

    let last_message = convert_message(&fixture.last_message, fixture.id, now);

    Conversation {
        id: fixture.id.to_owned(),
        kind: fixture.kind,
        name: Some(fixture.name.to_owned()),
        avatar_url: fixture.avatar.map(ToOwned::to_owned),
        is_private: false,
        created_at: last_message.created_at,
        members: std::iter::once(owner).chain(others).collect(),
        last_message: Some(last_message),
        unread_count: fixture.unread_count,
        is_pinned: fixture.is_pinned,
        is_muted: fixture.is_muted,
    }
}
