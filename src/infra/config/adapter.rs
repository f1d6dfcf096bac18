use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::infra::{
    config::{load, AppConfig},
    contracts::ConfigAdapter,
    error::AppError,
};

#[derive(Debug, Clone, Default)]
pub struct FileConfigAdapter {
    path: Option<PathBuf>,
}

impl FileConfigAdapter {
    pub fn new(path: Option<&Path>) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
        }
    }
}

impl ConfigAdapter for FileConfigAdapter {
    fn load(&self) -> Result<AppConfig> {
        let config = load(self.path.as_deref())?;
        validate(&config)?;
        Ok(config)
    }
}

fn validate(config: &AppConfig) -> Result<(), AppError> {
    let url = &config.backend.url;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(AppError::ConfigInvalid {
            details: format!("backend.url must be an http(s) URL, got `{url}`"),
        });
    }

    if config.backend.request_timeout_ms == 0 {
        return Err(AppError::ConfigInvalid {
            details: "backend.request_timeout_ms must be greater than zero".to_owned(),
        });
    }

    if config.summary.max_messages == 0 {
        return Err(AppError::ConfigInvalid {
            details: "summary.max_messages must be greater than zero".to_owned(),
        });
    }

    Ok(())
}
