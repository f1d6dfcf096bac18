use std::{
    collections::HashMap,
    sync::{mpsc::Sender, Arc, Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};

use crate::{
    domain::{
        conversation::{ConversationKind, ConversationRow, MemberRole, MemberRow, NewConversation, NewMember},
        events::ChangeNotification,
        message::{MessageRow, NewMessage, NewReaction, ReactionRow},
        profile::{Profile, ProfileUpdate},
    },
    usecases::contracts::{
        BackendError, ChangeFeed, ConversationStore, MessageStore, ProfileStore, Subscription,
    },
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

pub fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().expect("env lock should not be poisoned")
}

#[derive(Default)]
struct Tables {
    profiles: Vec<Profile>,
    conversations: Vec<ConversationRow>,
    members: Vec<MemberRow>,
    messages: Vec<MessageRow>,
    reactions: Vec<ReactionRow>,
    next_id: u64,
}

impl Tables {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// Backend fake holding every table in memory. Store calls are recorded and
/// can be made to fail per method name.
#[derive(Default)]
pub struct InMemoryBackend {
    tables: Mutex<Tables>,
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<&'static str, BackendError>>,
    feed: RecordingFeed,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&self) -> &RecordingFeed {
        &self.feed
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn fail_on(&self, method: &'static str, error: BackendError) {
        self.failures.lock().expect("failures lock").insert(method, error);
    }

    pub fn clear_failures(&self) {
        self.failures.lock().expect("failures lock").clear();
    }

    pub fn add_profile(&self, id: &str, display_name: &str) {
        let mut profile = Profile::new(id);
        profile.display_name = Some(display_name.to_owned());
        self.tables().profiles.push(profile);
    }

    pub fn add_conversation(
        &self,
        id: &str,
        kind: ConversationKind,
        name: Option<&str>,
        created_at: DateTime<Utc>,
    ) {
        self.tables().conversations.push(ConversationRow {
            id: id.to_owned(),
            kind,
            name: name.map(ToOwned::to_owned),
            avatar_url: None,
            is_private: None,
            created_at,
        });
    }

    pub fn add_member(&self, conversation_id: &str, user_id: &str, role: MemberRole, pinned: bool) {
        let mut tables = self.tables();
        let id = tables.next_id("member");
        tables.members.push(MemberRow {
            id,
            conversation_id: conversation_id.to_owned(),
            user_id: user_id.to_owned(),
            role,
            is_muted: false,
            is_pinned: pinned,
        });
    }

    pub fn add_message(
        &self,
        id: &str,
        conversation_id: &str,
        sender_id: &str,
        content: &str,
        created_at: DateTime<Utc>,
    ) {
        self.tables().messages.push(MessageRow {
            id: id.to_owned(),
            conversation_id: conversation_id.to_owned(),
            sender_id: sender_id.to_owned(),
            content: content.to_owned(),
            reply_to: None,
            is_read: false,
            is_bookmarked: false,
            self_destruct_seconds: None,
            created_at,
        });
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("tables lock")
    }

    fn enter(&self, method: &str) -> Result<(), BackendError> {
        self.calls.lock().expect("calls lock").push(method.to_owned());
        match self.failures.lock().expect("failures lock").get(method) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl ProfileStore for InMemoryBackend {
    fn profiles_by_ids(&self, user_ids: &[String]) -> Result<Vec<Profile>, BackendError> {
        self.enter("profiles_by_ids")?;
        Ok(self
            .tables()
            .profiles
            .iter()
            .filter(|profile| user_ids.contains(&profile.id))
            .cloned()
            .collect())
    }

    fn profile(&self, user_id: &str) -> Result<Option<Profile>, BackendError> {
        self.enter("profile")?;
        Ok(self.tables().profiles.iter().find(|p| p.id == user_id).cloned())
    }

    fn all_profiles(&self) -> Result<Vec<Profile>, BackendError> {
        self.enter("all_profiles")?;
        Ok(self.tables().profiles.clone())
    }

    fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<Profile, BackendError> {
        self.enter("update_profile")?;
        let mut tables = self.tables();
        let profile = tables
            .profiles
            .iter_mut()
            .find(|p| p.id == user_id)
            .ok_or(BackendError::NotFound)?;
        apply_update(profile, update);
        Ok(profile.clone())
    }
}

fn apply_update(profile: &mut Profile, update: &ProfileUpdate) {
    let fields = [
        (&mut profile.username, &update.username),
        (&mut profile.display_name, &update.display_name),
        (&mut profile.avatar_url, &update.avatar_url),
        (&mut profile.bio, &update.bio),
        (&mut profile.status, &update.status),
    ];
    for (current, new) in fields {
        if let Some(value) = new {
            *current = Some(value.clone());
        }
    }
}

impl ConversationStore for InMemoryBackend {
    fn memberships_for_user(&self, user_id: &str) -> Result<Vec<MemberRow>, BackendError> {
        self.enter("memberships_for_user")?;
        Ok(self
            .tables()
            .members
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    fn conversations_by_ids(&self, ids: &[String]) -> Result<Vec<ConversationRow>, BackendError> {
        self.enter("conversations_by_ids")?;
        Ok(self
            .tables()
            .conversations
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    fn members_for_conversations(&self, ids: &[String]) -> Result<Vec<MemberRow>, BackendError> {
        self.enter("members_for_conversations")?;
        Ok(self
            .tables()
            .members
            .iter()
            .filter(|m| ids.contains(&m.conversation_id))
            .cloned()
            .collect())
    }

    fn insert_conversation(&self, conversation: &NewConversation) -> Result<ConversationRow, BackendError> {
        self.enter("insert_conversation")?;
        let mut tables = self.tables();
        let row = ConversationRow {
            id: tables.next_id("conversation"),
            kind: conversation.kind,
            name: conversation.name.clone(),
            avatar_url: None,
            is_private: Some(false),
            created_at: Utc::now(),
        };
        tables.conversations.push(row.clone());
        Ok(row)
    }

    fn insert_member(&self, member: &NewMember) -> Result<(), BackendError> {
        self.enter("insert_member")?;
        let mut tables = self.tables();
        let id = tables.next_id("member");
        tables.members.push(MemberRow {
            id,
            conversation_id: member.conversation_id.clone(),
            user_id: member.user_id.clone(),
            role: member.role,
            is_muted: false,
            is_pinned: false,
        });
        Ok(())
    }
}

impl MessageStore for InMemoryBackend {
    fn latest_message(&self, conversation_id: &str) -> Result<Option<MessageRow>, BackendError> {
        self.enter("latest_message")?;
        Ok(self
            .tables()
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .max_by_key(|m| m.created_at)
            .cloned())
    }

    fn unread_count(&self, conversation_id: &str, viewer_id: &str) -> Result<u32, BackendError> {
        self.enter("unread_count")?;
        let count = self
            .tables()
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id && m.sender_id != viewer_id && !m.is_read)
            .count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    fn messages(&self, conversation_id: &str) -> Result<Vec<MessageRow>, BackendError> {
        self.enter("messages")?;
        let mut rows: Vec<MessageRow> = self
            .tables()
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.created_at);
        Ok(rows)
    }

    fn insert_message(&self, message: &NewMessage) -> Result<MessageRow, BackendError> {
        self.enter("insert_message")?;
        let mut tables = self.tables();
        let row = MessageRow {
            id: tables.next_id("message"),
            conversation_id: message.conversation_id.clone(),
            sender_id: message.sender_id.clone(),
            content: message.content.clone(),
            reply_to: message.reply_to.clone(),
            is_read: false,
            is_bookmarked: false,
            self_destruct_seconds: message.self_destruct_seconds,
            created_at: Utc::now(),
        };
        tables.messages.push(row.clone());
        Ok(row)
    }

    fn reactions_for(&self, message_ids: &[String]) -> Result<Vec<ReactionRow>, BackendError> {
        self.enter("reactions_for")?;
        Ok(self
            .tables()
            .reactions
            .iter()
            .filter(|r| message_ids.contains(&r.message_id))
            .cloned()
            .collect())
    }

    fn insert_reaction(&self, reaction: &NewReaction) -> Result<(), BackendError> {
        self.enter("insert_reaction")?;
        let mut tables = self.tables();
        let exists = tables.reactions.iter().any(|r| {
            r.message_id == reaction.message_id
                && r.user_id == reaction.user_id
                && r.emoji == reaction.emoji
        });
        if exists {
            return Err(BackendError::Duplicate);
        }
        let id = tables.next_id("reaction");
        tables.reactions.push(ReactionRow {
            id,
            message_id: reaction.message_id.clone(),
            user_id: reaction.user_id.clone(),
            emoji: reaction.emoji.clone(),
        });
        Ok(())
    }

    fn set_bookmarked(&self, message_id: &str, bookmarked: bool) -> Result<(), BackendError> {
        self.enter("set_bookmarked")?;
        let mut tables = self.tables();
        let row = tables
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or(BackendError::NotFound)?;
        row.is_bookmarked = bookmarked;
        Ok(())
    }
}

impl ChangeFeed for InMemoryBackend {
    fn subscribe(
        &self,
        conversation_id: &str,
        sink: Sender<ChangeNotification>,
    ) -> Result<Box<dyn Subscription>, BackendError> {
        self.enter("subscribe")?;
        self.feed.subscribe(conversation_id, sink)
    }
}

#[derive(Default)]
struct FeedInner {
    log: Vec<String>,
    sinks: Vec<(u64, String, Sender<ChangeNotification>)>,
    next_key: u64,
}

/// Change feed fake that logs subscribe/unsubscribe order and lets tests
/// push notifications to live subscribers.
#[derive(Clone, Default)]
pub struct RecordingFeed {
    inner: Arc<Mutex<FeedInner>>,
}

impl RecordingFeed {
    pub fn log(&self) -> Vec<String> {
        self.inner.lock().expect("feed lock").log.clone()
    }

    pub fn emit(&self, notification: ChangeNotification) {
        let inner = self.inner.lock().expect("feed lock");
        for (_, conversation_id, sink) in &inner.sinks {
            if *conversation_id == notification.conversation_id {
                let _ = sink.send(notification.clone());
            }
        }
    }
}

impl ChangeFeed for RecordingFeed {
    fn subscribe(
        &self,
        conversation_id: &str,
        sink: Sender<ChangeNotification>,
    ) -> Result<Box<dyn Subscription>, BackendError> {
        let mut inner = self.inner.lock().expect("feed lock");
        inner.next_key += 1;
        let key = inner.next_key;
        inner.log.push(format!("subscribe:{conversation_id}"));
        inner.sinks.push((key, conversation_id.to_owned(), sink));

        Ok(Box::new(RecordedSubscription {
            feed: self.clone(),
            key,
            conversation_id: conversation_id.to_owned(),
            active: true,
        }))
    }
}

struct RecordedSubscription {
    feed: RecordingFeed,
    key: u64,
    conversation_id: String,
    active: bool,
}

impl Subscription for RecordedSubscription {
    fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        let mut inner = self.feed.inner.lock().expect("feed lock");
        inner.sinks.retain(|(key, _, _)| *key != self.key);
        inner.log.push(format!("unsubscribe:{}", self.conversation_id));
    }
}
