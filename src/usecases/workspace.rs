//! Root composition: owns the conversation list, the active thread and the
//! live-vs-demo decision, and routes every user action to the right store.

use std::sync::{mpsc::Sender, Arc};

use chrono::{DateTime, Utc};

use crate::{
    domain::{
        conversation::Conversation, conversation_list_state::ConversationListState,
        events::ChangeNotification, message::Message,
    },
    infra::config::DemoConfig,
    usecases::{
        context::SessionContext,
        contracts::Backend,
        create_conversation::{self, CreateConversationCommand, CreateConversationError},
        demo_mode::DemoStore,
        list_conversations::load_conversations,
        message_thread::{MessageThread, SendMessageError},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Live,
    Demo,
}

impl DataSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Demo => "demo",
        }
    }
}

pub struct Workspace<B: ?Sized> {
    backend: Arc<B>,
    session: SessionContext,
    demo_config: DemoConfig,
    source: DataSource,
    list: ConversationListState,
    thread: MessageThread<B>,
    demo: Option<DemoStore>,
    demo_active: Option<String>,
}

impl<B> Workspace<B>
where
    B: Backend + ?Sized,
{
    pub fn new(
        backend: Arc<B>,
        session: SessionContext,
        demo_config: DemoConfig,
        notifications: Sender<ChangeNotification>,
    ) -> Self {
        let thread = MessageThread::new(Arc::clone(&backend), session.user_id.clone(), notifications);
        let list = ConversationListState::new(session.user_id.clone());
        Self {
            backend,
            session,
            demo_config,
            source: DataSource::Live,
            list,
            thread,
            demo: None,
            demo_active: None,
        }
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn list(&self) -> &ConversationListState {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ConversationListState {
        &mut self.list
    }

    pub fn viewer_id(&self) -> &str {
        match (&self.source, &self.demo) {
            (DataSource::Demo, Some(demo)) => demo.viewer_id(),
            _ => &self.session.user_id,
        }
    }

    /// Loads the sidebar. Falls back to fixture data when the signed-in
    /// user has no conversations and the fallback is enabled. A failed fetch
    /// keeps the current source and its stale rows in the error state.
    pub fn load_conversations(&mut self, now: DateTime<Utc>) -> DataSource {
        self.list.set_loading();

        let live = if self.session.is_signed_in() {
            match load_conversations(self.backend.as_ref(), &self.session.user_id) {
                Ok(live) => live,
                Err(_) => {
                    self.list.set_error();
                    return self.source;
                }
            }
        } else {
            tracing::info!("no signed-in user; skipping live conversation fetch");
            Vec::new()
        };

        if !live.is_empty() {
            if self.source == DataSource::Demo {
                self.leave_demo();
            }
            self.list.set_ready(live);
            return self.source;
        }

        if !self.demo_config.fallback_when_empty {
            self.list.set_empty();
            return self.source;
        }

        let demo = DemoStore::load(now);
        if self.source == DataSource::Live {
            tracing::info!("no live conversations; switching to demo data");
            self.list = ConversationListState::new(demo.viewer_id());
        }
        self.list.set_ready(demo.conversations().to_vec());
        self.demo = Some(demo);
        self.source = DataSource::Demo;
        self.source
    }

    pub fn conversation(&self, conversation_id: &str) -> Option<&Conversation> {
        self.list
            .conversations()
            .iter()
            .find(|conversation| conversation.id == conversation_id)
    }

    pub fn active_conversation(&self) -> Option<&str> {
        match self.source {
            DataSource::Live => self.thread.active_conversation(),
            DataSource::Demo => self.demo_active.as_deref(),
        }
    }

    pub fn open_conversation(&mut self, conversation_id: &str) {
        self.list.select(conversation_id);
        match self.source {
            DataSource::Live => self.thread.open(conversation_id),
            DataSource::Demo => self.demo_active = Some(conversation_id.to_owned()),
        }
    }

    pub fn close_conversation(&mut self) {
        self.thread.close();
        self.demo_active = None;
    }

    pub fn messages(&self) -> &[Message] {
        match (self.source, &self.demo, self.demo_active.as_deref()) {
            (DataSource::Demo, Some(demo), Some(active)) => demo.messages(active),
            (DataSource::Demo, _, _) => &[],
            (DataSource::Live, _, _) => self.thread.state().messages(),
        }
    }

    /// Returns whether the notification refreshed the active thread.
    pub fn handle_notification(&mut self, notification: &ChangeNotification) -> bool {
        match self.source {
            DataSource::Live => self.thread.handle_notification(notification),
            DataSource::Demo => false,
        }
    }

    pub fn send_message(
        &mut self,
        content: &str,
        reply_to: Option<&str>,
        self_destruct_seconds: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<Message, SendMessageError> {
        match self.source {
            DataSource::Live => self.thread.send_message(content, reply_to, self_destruct_seconds),
            DataSource::Demo => {
                let active = self
                    .demo_active
                    .clone()
                    .ok_or(SendMessageError::NoActiveConversation)?;
                let demo = self
                    .demo
                    .as_mut()
                    .ok_or(SendMessageError::NoActiveConversation)?;
                let message =
                    demo.send_message(&active, content, reply_to, self_destruct_seconds, now)?;
                self.list.set_ready(demo.conversations().to_vec());
                Ok(message)
            }
        }
    }

    pub fn add_reaction(&mut self, message_id: &str, emoji: &str) {
        match self.source {
            DataSource::Live => self.thread.add_reaction(message_id, emoji),
            DataSource::Demo => {
                if let (Some(demo), Some(active)) = (self.demo.as_mut(), self.demo_active.as_deref()) {
                    demo.add_reaction(active, message_id, emoji);
                }
            }
        }
    }

    pub fn toggle_bookmark(&mut self, message_id: &str) -> Option<bool> {
        match self.source {
            DataSource::Live => self.thread.toggle_bookmark(message_id),
            DataSource::Demo => {
                let active = self.demo_active.as_deref()?;
                self.demo.as_mut()?.toggle_bookmark(active, message_id)
            }
        }
    }

    /// Creates a conversation on the backend and reloads the sidebar.
    pub fn create_conversation(
        &mut self,
        command: CreateConversationCommand,
        now: DateTime<Utc>,
    ) -> Result<Conversation, CreateConversationError> {
        let row = create_conversation::create_conversation(
            self.backend.as_ref(),
            &self.session.user_id,
            command,
        )?;

        self.load_conversations(now);
        self.list.select(&row.id);

        Ok(self.conversation(&row.id).cloned().unwrap_or(Conversation {
            id: row.id,
            kind: row.kind,
            name: row.name,
            avatar_url: row.avatar_url,
            is_private: row.is_private.unwrap_or(false),
            created_at: row.created_at,
            members: Vec::new(),
            last_message: None,
            unread_count: 0,
            is_pinned: false,
            is_muted: false,
        }))
    }

    fn leave_demo(&mut self) {
        tracing::info!("live conversations available; leaving demo data");
        self.demo = None;
        self.demo_active = None;
        self.source = DataSource::Live;
        self.list = ConversationListState::new(self.session.user_id.clone());
    }
}
