//! UI layer: plain-text rendering of the sidebar, threads and summaries,
//! plus the line-driven compose input.

pub mod compose_input;
pub mod conversation_rendering;
pub mod message_rendering;
pub mod profile_rendering;
pub mod summary_rendering;
pub mod time_format;

/// Returns the UI module name for smoke checks.
pub fn module_name() -> &'static str {
    "ui"
}
