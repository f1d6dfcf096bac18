//! Use case layer: application workflows and orchestration.

pub mod bootstrap;
pub mod compose;
pub mod context;
pub mod contracts;
pub mod create_conversation;
pub mod demo_mode;
pub mod list_conversations;
pub mod message_thread;
pub mod profile;
pub mod summarize;
pub mod workspace;

/// Returns the usecases module name for smoke checks.
pub fn module_name() -> &'static str {
    "usecases"
}
