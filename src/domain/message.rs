use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::profile::{label_or, Profile, UNKNOWN_LABEL};

/// Row of the `messages` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRow {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    #[serde(default)]
    pub reply_to: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub is_bookmarked: bool,
    #[serde(default)]
    pub self_destruct_seconds: Option<u32>,
    pub created_at: DateTime<Utc>,
}

/// Row of the `message_reactions` table. Unique on (message_id, user_id, emoji).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionRow {
    #[serde(default)]
    pub id: String,
    pub message_id: String,
    pub user_id: String,
    pub emoji: String,
}

/// Emoji with the number of users who reacted with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionCount {
    pub emoji: String,
    pub count: u32,
}

/// Groups reaction rows into emoji counts, keeping first-seen emoji order.
pub fn aggregate_reactions<'a>(rows: impl IntoIterator<Item = &'a ReactionRow>) -> Vec<ReactionCount> {
    let mut counts: Vec<ReactionCount> = Vec::new();

    for row in rows {
        match counts.iter_mut().find(|entry| entry.emoji == row.emoji) {
            Some(entry) => entry.count += 1,
            None => counts.push(ReactionCount {
                emoji: row.emoji.clone(),
                count: 1,
            }),
        }
    }

    counts
}

/// Denormalized message view: row fields plus resolved sender and reactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub reply_to: Option<String>,
    pub is_read: bool,
    pub is_bookmarked: bool,
    /// Display-only lifetime hint. Nothing deletes the message when it elapses.
    pub self_destruct_seconds: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub sender: Option<Profile>,
    pub reactions: Vec<ReactionCount>,
}

impl Message {
    pub fn from_row(row: MessageRow, sender: Option<Profile>, reactions: Vec<ReactionCount>) -> Self {
        Self {
            id: row.id,
            conversation_id: row.conversation_id,
            sender_id: row.sender_id,
            content: row.content,
            reply_to: row.reply_to,
            is_read: row.is_read,
            is_bookmarked: row.is_bookmarked,
            self_destruct_seconds: row.self_destruct_seconds,
            created_at: row.created_at,
            sender,
            reactions,
        }
    }

    pub fn sender_label(&self) -> &str {
        label_or(self.sender.as_ref(), UNKNOWN_LABEL)
    }

    pub fn is_voice_note(&self) -> bool {
        self.content.starts_with(VOICE_NOTE_PREFIX)
    }

    pub fn has_attachment(&self) -> bool {
        self.content.starts_with(ATTACHMENT_PREFIX)
    }
}

/// Insert payload for `messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMessage {
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub reply_to: Option<String>,
    pub self_destruct_seconds: Option<u32>,
}

/// Insert payload for `message_reactions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReaction {
    pub message_id: String,
    pub user_id: String,
    pub emoji: String,
}

pub const VOICE_NOTE_PREFIX: &str = "[Voice message";
pub const ATTACHMENT_PREFIX: &str = "[Attached";

/// Content placeholder sent in place of a recorded voice note.
pub fn voice_note_content(duration_secs: u32) -> String {
    format!(
        "{} {}:{:02}]",
        VOICE_NOTE_PREFIX,
        duration_secs / 60,
        duration_secs % 60
    )
}
