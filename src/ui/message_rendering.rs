//! Message thread rendering.
//!
//! Handles visual formatting of a thread including:
//! - Sender grouping (consecutive messages from same sender show name only once)
//! - Date separators between messages from different days
//! - Reply, bookmark and self-destruct markers
//! - Reaction counts under the message body

use chrono::NaiveDate;

use crate::{
    domain::{message::Message, self_destruct},
    ui::time_format,
};

const INDENT: &str = "      ";
const REPLY_SNIPPET_CHARS: usize = 40;

/// Represents a visual element in the thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadElement {
    /// Date separator line (e.g., "--- 14 Feb 2026 ---").
    DateSeparator(String),
    Message {
        id: String,
        time: String,
        sender: Option<String>,
        content: String,
        reply: Option<String>,
        markers: Vec<String>,
        reactions: Option<String>,
    },
}

/// Builds the element list for `messages` as seen by `viewer_id`.
///
/// Groups consecutive messages from the same sender and inserts date separators.
pub fn build_thread_elements(messages: &[Message], viewer_id: &str) -> Vec<ThreadElement> {
    let mut elements = Vec::new();
    let mut prev_date: Option<NaiveDate> = None;
    let mut prev_sender: Option<&str> = None;

    for message in messages {
        let date = message.created_at.date_naive();
        if prev_date != Some(date) {
            elements.push(ThreadElement::DateSeparator(time_format::date_label(date)));
            prev_sender = None;
        }

        let sender_name = if message.sender_id == viewer_id {
            "You"
        } else {
            message.sender_label()
        };
        let sender = (prev_sender != Some(sender_name)).then(|| sender_name.to_owned());

        elements.push(ThreadElement::Message {
            id: message.id.clone(),
            time: time_format::clock(message.created_at),
            sender,
            content: message.content.clone(),
            reply: reply_line(message, messages, viewer_id),
            markers: markers(message),
            reactions: reactions_line(message),
        });

        prev_date = Some(date);
        prev_sender = Some(sender_name);
    }

    elements
}

/// Flattens the thread into printable lines. The message with id
/// `highlighted` gets a `>` gutter.
pub fn render_thread(messages: &[Message], viewer_id: &str, highlighted: Option<&str>) -> Vec<String> {
    if messages.is_empty() {
        return vec!["No messages yet. Say hello!".to_owned()];
    }

    let mut lines = Vec::new();
    for element in build_thread_elements(messages, viewer_id) {
        match element {
            ThreadElement::DateSeparator(date) => {
                lines.push(String::new());
                lines.push(format!("--- {date} ---"));
            }
            ThreadElement::Message {
                id,
                time,
                sender,
                content,
                reply,
                markers,
                reactions,
            } => {
                let gutter = if highlighted == Some(id.as_str()) { ">" } else { " " };
                let marker_text = if markers.is_empty() {
                    String::new()
                } else {
                    format!(" {}", markers.join(" "))
                };

                if let Some(sender) = sender {
                    lines.push(format!("{gutter}{time:>5} {sender}:{marker_text}"));
                    if let Some(reply) = reply {
                        lines.push(format!("{INDENT}{reply}"));
                    }
                    push_content(&mut lines, INDENT, &content);
                } else {
                    if let Some(reply) = reply {
                        lines.push(format!("{INDENT}{reply}"));
                    }
                    let mut content_lines = content.lines();
                    let first = content_lines.next().unwrap_or("[Empty message]");
                    lines.push(format!("{gutter}{time:>5} {first}{marker_text}"));
                    for line in content_lines {
                        lines.push(format!("{INDENT}{line}"));
                    }
                }

                if let Some(reactions) = reactions {
                    lines.push(format!("{INDENT}{reactions}"));
                }
            }
        }
    }

    lines
}

fn push_content(lines: &mut Vec<String>, indent: &str, content: &str) {
    if content.is_empty() {
        lines.push(format!("{indent}[Empty message]"));
        return;
    }
    for line in content.lines() {
        lines.push(format!("{indent}{line}"));
    }
}

/// Quote line for a reply. A parent outside the loaded thread still shows
/// that the message is a reply.
fn reply_line(message: &Message, thread: &[Message], viewer_id: &str) -> Option<String> {
    let parent_id = message.reply_to.as_deref()?;
    let Some(parent) = thread.iter().find(|candidate| candidate.id == parent_id) else {
        return Some("\u{21AA} reply to an earlier message".to_owned());
    };

    let name = if parent.sender_id == viewer_id {
        "You"
    } else {
        parent.sender_label()
    };
    let snippet: String = parent.content.chars().take(REPLY_SNIPPET_CHARS).collect();
    let ellipsis = if parent.content.chars().count() > REPLY_SNIPPET_CHARS {
        "..."
    } else {
        ""
    };
    Some(format!("\u{21AA} {name}: {snippet}{ellipsis}"))
}

fn markers(message: &Message) -> Vec<String> {
    let mut markers = Vec::new();
    if message.is_voice_note() {
        markers.push("[voice]".to_owned());
    } else if message.has_attachment() {
        markers.push("[file]".to_owned());
    }
    if let Some(seconds) = message.self_destruct_seconds {
        markers.push(format!("[\u{23F1} {}]", self_destruct::badge(seconds)));
    }
    if message.is_bookmarked {
        markers.push("[bookmarked]".to_owned());
    }
    markers
}

fn reactions_line(message: &Message) -> Option<String> {
    if message.reactions.is_empty() {
        return None;
    }
    let parts: Vec<String> = message
        .reactions
        .iter()
        .map(|reaction| format!("{} {}", reaction.emoji, reaction.count))
        .collect();
    Some(parts.join("  "))
}
