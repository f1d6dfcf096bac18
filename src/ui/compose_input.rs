//! Line-driven input for compose mode.
//!
//! Every line is typed into the composer key by key and finished with Enter.
//! A trailing backslash finishes it with Shift+Enter instead, so the next line
//! continues the same message. `^k` and `M-k` are Ctrl and Meta chords.
//! `/reply [id]`, `/timer <off|seconds>` and `/close` are directives.

use crate::domain::{composer_state::ComposerState, events::KeyInput};

const CARET: char = '|';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeLine {
    Keys(Vec<KeyInput>),
    /// `None` clears the reply target.
    Reply(Option<String>),
    Timer(String),
    Close,
}

pub fn parse_line(line: &str) -> ComposeLine {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(key) = chord(line) {
        return ComposeLine::Keys(vec![key]);
    }

    if let Some(directive) = line.strip_prefix('/') {
        let (name, argument) = directive
            .split_once(char::is_whitespace)
            .map(|(name, argument)| (name, argument.trim()))
            .unwrap_or((directive, ""));
        match name {
            "reply" => {
                return ComposeLine::Reply((!argument.is_empty()).then(|| argument.to_owned()))
            }
            "timer" => return ComposeLine::Timer(argument.to_owned()),
            "close" | "quit" => return ComposeLine::Close,
            _ => {}
        }
    }

    let (text, finish) = match line.strip_suffix('\\') {
        Some(text) => (text, KeyInput::new("enter").with_shift()),
        None => (line, KeyInput::new("enter")),
    };
    let mut keys: Vec<KeyInput> = text.chars().map(|ch| KeyInput::new(ch.to_string())).collect();
    keys.push(finish);
    ComposeLine::Keys(keys)
}

fn chord(line: &str) -> Option<KeyInput> {
    let line = line.trim();
    let (key, ctrl) = match (line.strip_prefix('^'), line.strip_prefix("M-")) {
        (Some(key), _) => (key, true),
        (None, Some(key)) => (key, false),
        (None, None) => return None,
    };
    if key.chars().count() != 1 {
        return None;
    }

    let input = KeyInput::new(key);
    Some(if ctrl { input.with_ctrl() } else { input.with_meta() })
}

/// The unsent draft with a caret at the cursor.
pub fn render_draft(composer: &ComposerState) -> String {
    let mut rendered: String = composer.text().chars().take(composer.cursor()).collect();
    rendered.push(CARET);
    rendered.extend(composer.text().chars().skip(composer.cursor()));
    rendered
}
