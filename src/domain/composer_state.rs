//! State of the message composer.

use super::events::KeyInput;

/// Maximum composed message length, in characters.
const MAX_COMPOSER_LENGTH: usize = 4096;

/// What a key press did to the composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerOutcome {
    /// Enter was pressed with sendable text. Carries the trimmed content.
    Submit(String),
    Edited,
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComposerState {
    text: String,
    /// Character index, not byte index.
    cursor: usize,
}

impl ComposerState {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Enter submits, Shift+Enter inserts a newline.
    pub fn handle_key(&mut self, key: &KeyInput) -> ComposerOutcome {
        if key.ctrl || key.meta {
            return ComposerOutcome::Ignored;
        }

        match key.key.as_str() {
            "enter" if key.shift => Self::edited(self.insert_char('\n')),
            "enter" => self.submit(),
            "backspace" => Self::edited(self.delete_before()),
            "delete" => Self::edited(self.delete_at()),
            "left" => Self::edited(self.move_left()),
            "right" => Self::edited(self.move_right()),
            "home" => {
                self.cursor = 0;
                ComposerOutcome::Edited
            }
            "end" => {
                self.cursor = self.char_count();
                ComposerOutcome::Edited
            }
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Self::edited(self.insert_char(ch)),
                    _ => ComposerOutcome::Ignored,
                }
            }
        }
    }

    /// Inserts pasted text at the cursor, truncating at the length cap.
    pub fn insert_str(&mut self, text: &str) {
        for ch in text.chars() {
            if !self.insert_char(ch) {
                break;
            }
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn submit(&mut self) -> ComposerOutcome {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            return ComposerOutcome::Ignored;
        }

        let content = trimmed.to_owned();
        self.clear();
        ComposerOutcome::Submit(content)
    }

    fn edited(changed: bool) -> ComposerOutcome {
        if changed {
            ComposerOutcome::Edited
        } else {
            ComposerOutcome::Ignored
        }
    }

    fn insert_char(&mut self, ch: char) -> bool {
        if self.char_count() >= MAX_COMPOSER_LENGTH {
            return false;
        }
        let byte_idx = self.byte_index(self.cursor);
        self.text.insert(byte_idx, ch);
        self.cursor += 1;
        true
    }

    fn delete_before(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.remove_at_cursor();
        true
    }

    fn delete_at(&mut self) -> bool {
        if self.cursor >= self.char_count() {
            return false;
        }
        self.remove_at_cursor();
        true
    }

    fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    fn move_right(&mut self) -> bool {
        if self.cursor >= self.char_count() {
            return false;
        }
        self.cursor += 1;
        true
    }

    fn remove_at_cursor(&mut self) {
        let start = self.byte_index(self.cursor);
        let end = self.byte_index(self.cursor + 1);
        self.text.drain(start..end);
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(state: &mut ComposerState, text: &str) {
        for ch in text.chars() {
            state.handle_key(&KeyInput::new(ch.to_string()));
        }
    }

    #[test]
    fn enter_submits_trimmed_text_and_clears() {
        let mut state = ComposerState::default();
        type_text(&mut state, "  hello  ");

        let outcome = state.handle_key(&KeyInput::new("enter"));

        assert_eq!(outcome, ComposerOutcome::Submit("hello".to_owned()));
        assert!(state.is_empty());
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn shift_enter_inserts_newline_instead_of_sending() {
        let mut state = ComposerState::default();
        type_text(&mut state, "line one");

        let outcome = state.handle_key(&KeyInput::new("enter").with_shift());
        type_text(&mut state, "line two");

        assert_eq!(outcome, ComposerOutcome::Edited);
        assert_eq!(state.text(), "line one\nline two");
    }

    #[test]
    fn enter_on_whitespace_only_is_ignored() {
        let mut state = ComposerState::default();
        type_text(&mut state, "   ");

        assert_eq!(
            state.handle_key(&KeyInput::new("enter")),
            ComposerOutcome::Ignored
        );
        assert_eq!(state.text(), "   ");
    }

    #[test]
    fn editing_keys_respect_character_boundaries() {
        let mut state = ComposerState::default();
        type_text(&mut state, "Привет");

        state.handle_key(&KeyInput::new("backspace"));
        state.handle_key(&KeyInput::new("home"));
        state.handle_key(&KeyInput::new("delete"));

        assert_eq!(state.text(), "риве");
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn cursor_moves_within_bounds() {
        let mut state = ComposerState::default();
        type_text(&mut state, "ab");

        assert_eq!(
            state.handle_key(&KeyInput::new("right")),
            ComposerOutcome::Ignored
        );
        state.handle_key(&KeyInput::new("left"));
        state.handle_key(&KeyInput::new("left"));
        assert_eq!(
            state.handle_key(&KeyInput::new("left")),
            ComposerOutcome::Ignored
        );
        type_text(&mut state, "x");

        assert_eq!(state.text(), "xab");
    }

    #[test]
    fn modifier_chords_are_left_to_global_shortcuts() {
        let mut state = ComposerState::default();

        assert_eq!(
            state.handle_key(&KeyInput::new("k").with_ctrl()),
            ComposerOutcome::Ignored
        );
        assert!(state.is_empty());
    }

    #[test]
    fn paste_truncates_at_length_cap() {
        let mut state = ComposerState::default();
        let long = "x".repeat(MAX_COMPOSER_LENGTH + 10);

        state.insert_str(&long);

        assert_eq!(state.text().chars().count(), MAX_COMPOSER_LENGTH);
    }
}
