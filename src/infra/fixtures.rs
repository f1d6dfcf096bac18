//! Static sample data backing demo mode.

use crate::domain::{conversation::ConversationKind, profile::Presence};

pub const CURRENT_USER_ID: &str = "me";

#[derive(Debug, Clone, Copy)]
pub struct FixtureUser {
    pub id: &'static str,
    pub name: &'static str,
    pub username: &'static str,
    pub avatar: &'static str,
    pub presence: Presence,
    pub last_seen_minutes_ago: Option<i64>,
}

#[derive(Debug, Clone, Copy)]
pub struct FixtureMessage {
    pub id: &'static str,
    pub content: &'static str,
    pub sender_id: &'static str,
    pub minutes_ago: i64,
    pub reactions: &'static [(&'static str, u32)],
    pub is_read: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct FixtureConversation {
    pub id: &'static str,
    pub kind: ConversationKind,
    pub name: &'static str,
    pub avatar: Option<&'static str>,
    pub participant_ids: &'static [&'static str],
    pub last_message: FixtureMessage,
    pub unread_count: u32,
    pub is_pinned: bool,
    pub is_muted: bool,
}

pub const CURRENT_USER: FixtureUser = FixtureUser {
    id: CURRENT_USER_ID,
    name: "You",
    username: "user",
    avatar: "https://api.dicebear.com/7.x/avataaars/svg?seed=me",
    presence: Presence::Online,
    last_seen_minutes_ago: None,
};

pub const USERS: [FixtureUser; 5] = [
    FixtureUser {
        id: "1",
        name: "Alex Chen",
        username: "alexchen",
        avatar: "https://api.dicebear.com/7.x/avataaars/svg?seed=alex",
        presence: Presence::Online,
        last_seen_minutes_ago: None,
    },
    FixtureUser {
        id: "2",
        name: "Sarah Miller",
        username: "sarahmiller",
        avatar: "https://api.dicebear.com/7.x/avataaars/svg?seed=sarah",
        presence: Presence::Away,
        last_seen_minutes_ago: Some(5),
    },
    FixtureUser {
        id: "3",
        name: "Jordan Lee",
        username: "jordanlee",
        avatar: "https://api.dicebear.com/7.x/avataaars/svg?seed=jordan",
        presence: Presence::Offline,
        last_seen_minutes_ago: Some(120),
    },
    FixtureUser {
        id: "4",
        name: "Maya Patel",
        username: "mayapatel",
        avatar: "https://api.dicebear.com/7.x/avataaars/svg?seed=maya",
        presence: Presence::Online,
        last_seen_minutes_ago: None,
    },
    FixtureUser {
        id: "5",
        name: "Chris Wong",
        username: "chriswong",
        avatar: "https://api.dicebear.com/7.x/avataaars/svg?seed=chris",
        presence: Presence::Online,
        last_seen_minutes_ago: None,
    },
];

const fn last(id: &'static str, content: &'static str, sender_id: &'static str, minutes_ago: i64) -> FixtureMessage {
    FixtureMessage {
        id,
        content,
        sender_id,
        minutes_ago,
        reactions: &[],
        is_read: false,
    }
}

pub const CONVERSATIONS: [FixtureConversation; 6] = [
    FixtureConversation {
        id: "conv-1",
        kind: ConversationKind::Direct,
        name: "Alex Chen",
        avatar: None,
        participant_ids: &["1"],
        last_message: last("m1", "Hey! Did you see the new design specs?", "1", 2),
        unread_count: 2,
        is_pinned: true,
        is_muted: false,
    },
    FixtureConversation {
        id: "conv-2",
        kind: ConversationKind::Group,
        name: "Design Team",
        avatar: Some("https://api.dicebear.com/7.x/shapes/svg?seed=design"),
        participant_ids: &["1", "2", "4"],
        last_message: last("m2", "The mockups are ready for review 🎨", "2", 15),
        unread_count: 0,
        is_pinned: true,
        is_muted: false,
    },
    FixtureConversation {
        id: "conv-3",
        kind: ConversationKind::Direct,
        name: "Sarah Miller",
        avatar: None,
        participant_ids: &["2"],
        last_message: last("m3", "Thanks for the help earlier!", CURRENT_USER_ID, 45),
        unread_count: 0,
        is_pinned: false,
        is_muted: false,
    },
    FixtureConversation {
        id: "conv-4",
        kind: ConversationKind::Channel,
        name: "announcements",
        avatar: Some("https://api.dicebear.com/7.x/shapes/svg?seed=announce"),
        participant_ids: &["1", "2", "3", "4", "5"],
        last_message: last("m4", "New features launching next week! 🚀", "4", 120),
        unread_count: 1,
        is_pinned: false,
        is_muted: false,
    },
    FixtureConversation {
        id: "conv-5",
        kind: ConversationKind::Direct,
        name: "Jordan Lee",
        avatar: None,
        participant_ids: &["3"],
        last_message: last("m5", "Let me know when you're free to call", "3", 300),
        unread_count: 0,
        is_pinned: false,
        is_muted: false,
    },
    FixtureConversation {
        id: "conv-6",
        kind: ConversationKind::Group,
        name: "Engineering",
        avatar: Some("https://api.dicebear.com/7.x/shapes/svg?seed=eng"),
        participant_ids: &["3", "5"],
        last_message: last("m6", "PR merged! ✅", "5", 1440),
        unread_count: 0,
        is_pinned: false,
        is_muted: true,
    },
];

const ALEX_THREAD: [FixtureMessage; 7] = [
    FixtureMessage {
        id: "msg-1",
        content: "Hey there! 👋",
        sender_id: CURRENT_USER_ID,
        minutes_ago: 30,
        reactions: &[],
        is_read: true,
    },
    FixtureMessage {
        id: "msg-2",
        content: "Hi! How are you doing?",
        sender_id: "1",
        minutes_ago: 28,
        reactions: &[],
        is_read: true,
    },
    FixtureMessage {
        id: "msg-3",
        content: "Pretty good! Just working on the new messaging app design.",
        sender_id: CURRENT_USER_ID,
        minutes_ago: 25,
        reactions: &[],
        is_read: true,
    },
    FixtureMessage {
        id: "msg-4",
        content: "That sounds exciting! Can't wait to see it.",
        sender_id: "1",
        minutes_ago: 20,
        reactions: &[("🔥", 1)],
        is_read: true,
    },
    FixtureMessage {
        id: "msg-5",
        content: "I've been thinking about the UI flow. We need something really clean and intuitive.",
        sender_id: CURRENT_USER_ID,
        minutes_ago: 15,
        reactions: &[],
        is_read: true,
    },
    FixtureMessage {
        id: "msg-6",
        content: "Absolutely. Users are tired of cluttered interfaces. We should aim for that Apple-level polish.",
        sender_id: "1",
        minutes_ago: 10,
        reactions: &[],
        is_read: true,
    },
    FixtureMessage {
        id: "msg-7",
        content: "Hey! Did you see the new design specs?",
        sender_id: "1",
        minutes_ago: 2,
        reactions: &[],
        is_read: false,
    },
];

const DESIGN_THREAD: [FixtureMessage; 4] = [
    FixtureMessage {
        id: "msg-g1",
        content: "Team, I just uploaded the latest wireframes to Figma.",
        sender_id: "2",
        minutes_ago: 60,
        reactions: &[],
        is_read: true,
    },
    FixtureMessage {
        id: "msg-g2",
        content: "Nice! I'll take a look right now.",
        sender_id: "1",
        minutes_ago: 55,
        reactions: &[],
        is_read: true,
    },
    FixtureMessage {
        id: "msg-g3",
        content: "The color palette looks amazing 🎨",
        sender_id: "4",
        minutes_ago: 45,
        reactions: &[("❤️", 2), ("👍", 1)],
        is_read: true,
    },
    FixtureMessage {
        id: "msg-g4",
        content: "The mockups are ready for review 🎨",
        sender_id: "2",
        minutes_ago: 15,
        reactions: &[],
        is_read: true,
    },
];

/// Seeded thread for a fixture conversation. Most conversations have none.
pub fn messages_for(conversation_id: &str) -> &'static [FixtureMessage] {
    match conversation_id {
        "conv-1" => &ALEX_THREAD,
        "conv-2" => &DESIGN_THREAD,
        _ => &[],
    }
}

pub fn user(user_id: &str) -> Option<&'static FixtureUser> {
    if user_id == CURRENT_USER_ID {
        return Some(&CURRENT_USER);
    }
    USERS.iter().find(|user| user.id == user_id)
}
