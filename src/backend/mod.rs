//! Hosted backend adapter: REST tables, realtime channels and functions.

pub mod functions;
pub mod realtime;
pub mod rest;

pub use rest::RestBackend;

/// Returns the backend module name for smoke checks.
pub fn module_name() -> &'static str {
    "backend"
}
