//! Domain layer: rows, view models and interaction state.

pub mod composer_state;
pub mod conversation;
pub mod conversation_list_state;
pub mod events;
pub mod message;
pub mod open_conversation_state;
pub mod profile;
pub mod search;
pub mod self_destruct;
pub mod summary;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
