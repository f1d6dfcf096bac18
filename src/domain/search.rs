//! In-conversation message search.

use super::message::{Message, ATTACHMENT_PREFIX, VOICE_NOTE_PREFIX};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchFilter {
    #[default]
    All,
    Media,
    Links,
    Files,
}

impl SearchFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "media" => Some(Self::Media),
            "links" => Some(Self::Links),
            "files" => Some(Self::Files),
            _ => None,
        }
    }

    fn matches(self, content: &str) -> bool {
        match self {
            Self::All => true,
            Self::Media => content.contains(VOICE_NOTE_PREFIX) || content.contains(ATTACHMENT_PREFIX),
            Self::Links => content.contains("http"),
            Self::Files => content.contains(ATTACHMENT_PREFIX),
        }
    }
}

/// Search results over one thread with a wrap-around cursor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageSearch {
    results: Vec<String>,
    current: usize,
}

impl MessageSearch {
    /// Runs a case-insensitive content search. A blank query finds nothing.
    pub fn run(messages: &[Message], query: &str, filter: SearchFilter) -> Self {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Self::default();
        }

        let results = messages
            .iter()
            .filter(|message| message.content.to_lowercase().contains(&needle))
            .filter(|message| filter.matches(&message.content))
            .map(|message| message.id.clone())
            .collect();

        Self {
            results,
            current: 0,
        }
    }

    pub fn results(&self) -> &[String] {
        &self.results
    }

    pub fn current(&self) -> Option<&str> {
        self.results.get(self.current).map(String::as_str)
    }

    pub fn next(&mut self) -> Option<&str> {
        if self.results.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.results.len();
        self.current()
    }

    pub fn previous(&mut self) -> Option<&str> {
        if self.results.is_empty() {
            return None;
        }
        self.current = self
            .current
            .checked_sub(1)
            .unwrap_or(self.results.len() - 1);
        self.current()
    }
}
