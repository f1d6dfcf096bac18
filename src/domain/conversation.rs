use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    message::Message,
    profile::{label_or, Profile, UNKNOWN_LABEL},
};

/// Title used for group conversations and channels without a name.
pub const UNNAMED_LABEL: &str = "Unnamed";

/// Kind of conversation container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    /// 1-to-1 conversation.
    #[default]
    Direct,
    Group,
    /// Broadcast channel.
    Channel,
}

impl ConversationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Group => "group",
            Self::Channel => "channel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Admin,
    #[default]
    Member,
}

/// Row of the `conversations` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRow {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: ConversationKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_private: Option<bool>,
    pub created_at: DateTime<Utc>,
}

/// Row of the `conversation_members` join table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRow {
    #[serde(default)]
    pub id: String,
    pub conversation_id: String,
    pub user_id: String,
    #[serde(default)]
    pub role: MemberRole,
    #[serde(default)]
    pub is_muted: bool,
    #[serde(default)]
    pub is_pinned: bool,
}

/// Insert payload for `conversations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewConversation {
    #[serde(rename = "type")]
    pub kind: ConversationKind,
    pub name: Option<String>,
    pub created_by: String,
}

/// Insert payload for `conversation_members`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMember {
    pub conversation_id: String,
    pub user_id: String,
    pub role: MemberRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationMember {
    pub user_id: String,
    pub role: MemberRole,
    pub is_muted: bool,
    pub is_pinned: bool,
    pub profile: Option<Profile>,
}

impl ConversationMember {
    pub fn label(&self) -> &str {
        label_or(self.profile.as_ref(), UNKNOWN_LABEL)
    }
}

/// Denormalized conversation view as shown in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: String,
    pub kind: ConversationKind,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
    pub members: Vec<ConversationMember>,
    pub last_message: Option<Message>,
    pub unread_count: u32,
    /// Pinned flag of the signed-in user's membership.
    pub is_pinned: bool,
    /// Muted flag of the signed-in user's membership.
    pub is_muted: bool,
}

impl Conversation {
    /// Last message time, falling back to creation time.
    pub fn activity_at(&self) -> DateTime<Utc> {
        self.last_message
            .as_ref()
            .map(|message| message.created_at)
            .unwrap_or(self.created_at)
    }

    /// Title as seen by `viewer_id`: explicit name, else the other member of a
    /// direct conversation.
    pub fn title_for(&self, viewer_id: &str) -> String {
        if let Some(name) = self.name.as_deref().filter(|name| !name.trim().is_empty()) {
            return name.to_owned();
        }

        if self.kind == ConversationKind::Direct {
            return self
                .members
                .iter()
                .find(|member| member.user_id != viewer_id)
                .map(|member| member.label().to_owned())
                .unwrap_or_else(|| UNKNOWN_LABEL.to_owned());
        }

        UNNAMED_LABEL.to_owned()
    }
}

/// Pinned first, then most recent activity first.
pub fn compare_for_sidebar(a: &Conversation, b: &Conversation) -> Ordering {
    b.is_pinned
        .cmp(&a.is_pinned)
        .then_with(|| b.activity_at().cmp(&a.activity_at()))
}

pub fn sort_for_sidebar(conversations: &mut [Conversation]) {
    conversations.sort_by(compare_for_sidebar);
}
