use super::conversation::{Conversation, ConversationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationListUiState {
    Loading,
    Ready,
    Empty,
    Error,
}

/// Sidebar filter tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationFilter {
    #[default]
    All,
    Unread,
    Groups,
    Channels,
}

impl ConversationFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "unread" => Some(Self::Unread),
            "groups" => Some(Self::Groups),
            "channels" => Some(Self::Channels),
            _ => None,
        }
    }

    /// Header of the unpinned sidebar section.
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All Conversations",
            Self::Unread => "Unread",
            Self::Groups => "Groups",
            Self::Channels => "Channels",
        }
    }

    fn matches(self, conversation: &Conversation) -> bool {
        match self {
            Self::All => true,
            Self::Unread => conversation.unread_count > 0,
            Self::Groups => conversation.kind == ConversationKind::Group,
            Self::Channels => conversation.kind == ConversationKind::Channel,
        }
    }
}

/// Sidebar state: loaded conversations, selection, filter and search query.
///
/// Conversations are kept in the order they were delivered (already sorted
/// for the sidebar); `visible` narrows them without reordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationListState {
    ui_state: ConversationListUiState,
    conversations: Vec<Conversation>,
    selected_id: Option<String>,
    filter: ConversationFilter,
    query: String,
    viewer_id: String,
}

impl ConversationListState {
    pub fn new(viewer_id: impl Into<String>) -> Self {
        Self {
            ui_state: ConversationListUiState::Loading,
            conversations: Vec::new(),
            selected_id: None,
            filter: ConversationFilter::All,
            query: String::new(),
            viewer_id: viewer_id.into(),
        }
    }

    pub fn ui_state(&self) -> ConversationListUiState {
        self.ui_state
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn filter(&self) -> ConversationFilter {
        self.filter
    }

    pub fn selected(&self) -> Option<&Conversation> {
        let selected_id = self.selected_id.as_deref()?;
        self.conversations
            .iter()
            .find(|conversation| conversation.id == selected_id)
    }

    pub fn set_loading(&mut self) {
        self.ui_state = ConversationListUiState::Loading;
    }

    /// Replaces the list, keeping the selection when its conversation survives.
    pub fn set_ready(&mut self, conversations: Vec<Conversation>) {
        if conversations.is_empty() {
            self.set_empty();
            return;
        }

        self.ui_state = ConversationListUiState::Ready;
        self.conversations = conversations;
        let survives = self.selected_id.as_deref().is_some_and(|id| {
            self.conversations
                .iter()
                .any(|conversation| conversation.id == id)
        });
        if !survives {
            let first_visible = self.visible().first().map(|conv| conv.id.clone());
            self.selected_id = first_visible;
        }
    }

    pub fn set_empty(&mut self) {
        self.ui_state = ConversationListUiState::Empty;
        self.conversations.clear();
        self.selected_id = None;
    }

    pub fn set_error(&mut self) {
        self.ui_state = ConversationListUiState::Error;
    }

    pub fn set_filter(&mut self, filter: ConversationFilter) {
        self.filter = filter;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Selects by id. Returns false when the id is not in the list.
    pub fn select(&mut self, conversation_id: &str) -> bool {
        let found = self
            .conversations
            .iter()
            .any(|conversation| conversation.id == conversation_id);
        if found {
            self.selected_id = Some(conversation_id.to_owned());
        }
        found
    }

    /// Conversations passing the filter and the case-insensitive title search.
    pub fn visible(&self) -> Vec<&Conversation> {
        let needle = self.query.trim().to_lowercase();
        self.conversations
            .iter()
            .filter(|conversation| self.filter.matches(conversation))
            .filter(|conversation| {
                needle.is_empty()
                    || conversation
                        .title_for(&self.viewer_id)
                        .to_lowercase()
                        .contains(&needle)
            })
            .collect()
    }

    /// Visible conversations split into the pinned section and the rest.
    pub fn sections(&self) -> (Vec<&Conversation>, Vec<&Conversation>) {
        self.visible()
            .into_iter()
            .partition(|conversation| conversation.is_pinned)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn conversation(id: &str, kind: ConversationKind, unread: u32, pinned: bool) -> Conversation {
        Conversation {
            id: id.to_owned(),
            kind,
            name: Some(format!("{id} room")),
            avatar_url: None,
            is_private: false,
            created_at: Utc.with_ymd_and_hms(2026, 2, 14, 10, 0, 0).unwrap(),
            members: vec![],
            last_message: None,
            unread_count: unread,
            is_pinned: pinned,
            is_muted: false,
        }
    }

    fn sample() -> Vec<Conversation> {
        vec![
            conversation("alpha", ConversationKind::Direct, 2, true),
            conversation("design", ConversationKind::Group, 0, true),
            conversation("news", ConversationKind::Channel, 1, false),
            conversation("eng", ConversationKind::Group, 0, false),
        ]
    }

    fn visible_ids(state: &ConversationListState) -> Vec<String> {
        state.visible().iter().map(|conv| conv.id.clone()).collect()
    }

    #[test]
    fn default_state_is_loading_without_selection() {
        let state = ConversationListState::new("me");

        assert_eq!(state.ui_state(), ConversationListUiState::Loading);
        assert!(state.selected().is_none());
    }

    #[test]
    fn set_ready_selects_first_conversation() {
        let mut state = ConversationListState::new("me");

        state.set_ready(sample());

        assert_eq!(state.ui_state(), ConversationListUiState::Ready);
        assert_eq!(state.selected().map(|conv| conv.id.as_str()), Some("alpha"));
    }

    #[test]
    fn set_ready_with_no_conversations_is_empty() {
        let mut state = ConversationListState::new("me");

        state.set_ready(vec![]);

        assert_eq!(state.ui_state(), ConversationListUiState::Empty);
    }

    #[test]
    fn selection_survives_reload_by_id() {
        let mut state = ConversationListState::new("me");
        state.set_ready(sample());
        assert!(state.select("news"));

        let mut reloaded = sample();
        reloaded.reverse();
        state.set_ready(reloaded);

        assert_eq!(state.selected().map(|conv| conv.id.as_str()), Some("news"));
    }

    #[test]
    fn error_keeps_stale_conversations() {
        let mut state = ConversationListState::new("me");
        state.set_ready(sample());

        state.set_error();

        assert_eq!(state.ui_state(), ConversationListUiState::Error);
        assert_eq!(state.conversations().len(), 4);
    }

    #[test]
    fn filters_narrow_visible_conversations() {
        let mut state = ConversationListState::new("me");
        state.set_ready(sample());

        state.set_filter(ConversationFilter::Unread);
        assert_eq!(visible_ids(&state), vec!["alpha", "news"]);

        state.set_filter(ConversationFilter::Groups);
        assert_eq!(visible_ids(&state), vec!["design", "eng"]);

        state.set_filter(ConversationFilter::Channels);
        assert_eq!(visible_ids(&state), vec!["news"]);
    }

    #[test]
    fn search_is_case_insensitive_on_title() {
        let mut state = ConversationListState::new("me");
        state.set_ready(sample());

        state.set_query("DESIGN");

        assert_eq!(visible_ids(&state), vec!["design"]);
    }

    #[test]
    fn sections_split_pinned_from_others() {
        let mut state = ConversationListState::new("me");
        state.set_ready(sample());

        let (pinned, others) = state.sections();

        assert_eq!(pinned.len(), 2);
        assert_eq!(others.len(), 2);
    }

    #[test]
    fn filter_names_parse_case_insensitively() {
        assert_eq!(ConversationFilter::parse("Unread"), Some(ConversationFilter::Unread));
        assert_eq!(ConversationFilter::parse("channels"), Some(ConversationFilter::Channels));
        assert_eq!(ConversationFilter::parse("archived"), None);
    }
}
