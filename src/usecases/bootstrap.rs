use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;

use crate::{
    infra::{self, config::FileConfigAdapter, contracts::ConfigAdapter, error::AppError},
    usecases::context::AppContext,
};

/// Loads configuration and installs logging. The guard must outlive every
/// log call that should reach the log file.
pub fn bootstrap(config_path: Option<&Path>) -> Result<(AppContext, Option<WorkerGuard>), AppError> {
    let context = build_context(config_path)?;
    let guard = infra::logging::init(&context.config.logging)?;

    tracing::debug!(
        signed_in = context.session.is_signed_in(),
        backend_url = %context.config.backend.url,
        "application context ready"
    );

    Ok((context, guard))
}

fn build_context(config_path: Option<&Path>) -> Result<AppContext, AppError> {
    let config_adapter = FileConfigAdapter::new(config_path);
    let config = config_adapter.load().map_err(AppError::Other)?;

    Ok(AppContext::new(config))
}
