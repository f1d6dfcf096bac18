//! Infrastructure layer: config, logging, secrets and fixture data.

pub mod config;
pub mod contracts;
pub mod error;
pub mod fixtures;
pub mod logging;
pub mod secrets;

/// Returns the infra module name for smoke checks.
pub fn module_name() -> &'static str {
    "infra"
}
