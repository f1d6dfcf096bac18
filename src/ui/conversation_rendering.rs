//! Sidebar rendering: pinned section first, one line per conversation.

use chrono::{DateTime, Utc};

use crate::{
    domain::{
        conversation::{Conversation, ConversationKind},
        conversation_list_state::{ConversationListState, ConversationListUiState},
        profile::Presence,
    },
    ui::time_format,
};

const NO_MESSAGES_PREVIEW: &str = "No messages yet";
const ONLINE_INDICATOR: &str = " \u{25CF}";
const MUTED_INDICATOR: &str = " (muted)";
const STALE_NOTICE: &str = "(refresh failed; showing last loaded conversations)";

pub fn render_conversation_list(
    state: &ConversationListState,
    viewer_id: &str,
    now: DateTime<Utc>,
    width: usize,
) -> Vec<String> {
    match state.ui_state() {
        ConversationListUiState::Loading => return vec!["Loading conversations...".to_owned()],
        ConversationListUiState::Empty => return vec!["No conversations yet".to_owned()],
        ConversationListUiState::Error if state.conversations().is_empty() => {
            return vec!["Could not load conversations".to_owned()]
        }
        _ => {}
    }

    let (pinned, others) = state.sections();
    let selected = state.selected().map(|c| c.id.as_str());
    let mut lines = Vec::new();

    if state.ui_state() == ConversationListUiState::Error {
        lines.push(STALE_NOTICE.to_owned());
    }

    if !pinned.is_empty() {
        lines.push(section_header("Pinned"));
        for conversation in &pinned {
            lines.push(row(conversation, viewer_id, selected, now, width));
        }
    }

    if !others.is_empty() || pinned.is_empty() {
        lines.push(section_header(state.filter().label()));
        for conversation in &others {
            lines.push(row(conversation, viewer_id, selected, now, width));
        }
    }

    lines
}

fn section_header(title: &str) -> String {
    format!("-- {title} --")
}

fn row(
    conversation: &Conversation,
    viewer_id: &str,
    selected: Option<&str>,
    now: DateTime<Utc>,
    width: usize,
) -> String {
    let cursor = if selected == Some(conversation.id.as_str()) { "> " } else { "  " };
    let timestamp = time_format::relative(conversation.activity_at(), now);
    let title = conversation.title_for(viewer_id);

    let unread = if conversation.unread_count > 0 {
        format!(" [{}]", conversation.unread_count)
    } else {
        String::new()
    };
    let muted = if conversation.is_muted { MUTED_INDICATOR } else { "" };
    let online = if is_counterpart_online(conversation, viewer_id) {
        ONLINE_INDICATOR
    } else {
        ""
    };
    let suffix = format!("{unread}{muted}{online}");

    let head = format!("{cursor}{timestamp:>6} | {title} ");
    let preview = preview_text(conversation, viewer_id);
    let available = width.saturating_sub(head.chars().count() + suffix.chars().count());

    format!("{head}{}{suffix}", truncate(&preview, available))
}

/// Last message with a sender prefix: `You: ` for own messages, the sender
/// name in groups and channels.
pub fn preview_text(conversation: &Conversation, viewer_id: &str) -> String {
    let Some(message) = conversation.last_message.as_ref() else {
        return NO_MESSAGES_PREVIEW.to_owned();
    };

    let content = normalize(&message.content);
    if content.is_empty() {
        return NO_MESSAGES_PREVIEW.to_owned();
    }

    if message.sender_id == viewer_id {
        format!("You: {content}")
    } else if conversation.kind != ConversationKind::Direct {
        format!("{}: {content}", message.sender_label())
    } else {
        content
    }
}

fn is_counterpart_online(conversation: &Conversation, viewer_id: &str) -> bool {
    conversation.kind == ConversationKind::Direct
        && conversation
            .members
            .iter()
            .filter(|member| member.user_id != viewer_id)
            .any(|member| {
                member.profile.as_ref().map(|profile| profile.presence()) == Some(Presence::Online)
            })
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(text: &str, max: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max {
        return text.to_owned();
    }
    if max < 3 {
        return chars[..max].iter().collect();
    }
    let keep = max.saturating_sub(3);
    format!("{}...", chars[..keep].iter().collect::<String>())
}
