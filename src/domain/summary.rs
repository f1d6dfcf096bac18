//! Conversation summary contract shared by the client and the summary service.

use serde::{Deserialize, Serialize};

pub const RATE_LIMITED_NOTICE: &str = "Rate limits exceeded, please try again later.";
pub const CREDITS_DEPLETED_NOTICE: &str = "AI credits depleted. Please add credits to continue.";
pub const GENERIC_FAILURE_NOTICE: &str = "Failed to generate AI summary";
pub const UNAVAILABLE_BODY: &str = "Unable to generate summary. Please try again later.";
pub const EMPTY_SUMMARY_BODY: &str = "No summary available.";
/// Sender label used when the sender profile is unresolved.
pub const FALLBACK_SENDER_NAME: &str = "User";

/// One message as packaged for summarization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryMessage {
    pub sender_name: String,
    pub content: String,
    pub created_at: String,
}

/// Body of the `ai-summary` function call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub messages: Option<Vec<SummaryMessage>>,
    #[serde(rename = "conversationName", default)]
    pub conversation_name: String,
}

/// Body returned by the `ai-summary` function.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SummaryResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A rendered line of summary output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryBlock {
    Heading(String),
    Bullet(String),
    Numbered(String),
    Paragraph(String),
}

/// Splits completion text into blocks using line-prefix rules.
///
/// `**Heading**` lines lose their markers, bullet and numbered lines keep
/// their prefix, blank lines are dropped.
pub fn parse_summary(text: &str) -> Vec<SummaryBlock> {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<SummaryBlock> {
    if line.len() >= 2 && line.starts_with("**") && line.ends_with("**") {
        return Some(SummaryBlock::Heading(line.replace("**", "")));
    }

    if line.starts_with('•') {
        return Some(SummaryBlock::Bullet(line.to_owned()));
    }

    if is_numbered(line) {
        return Some(SummaryBlock::Numbered(line.to_owned()));
    }

    if line.is_empty() {
        None
    } else {
        Some(SummaryBlock::Paragraph(line.to_owned()))
    }
}

fn is_numbered(line: &str) -> bool {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && line[digits..].starts_with('.')
}
