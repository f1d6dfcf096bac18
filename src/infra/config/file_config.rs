use std::path::PathBuf;

use serde::Deserialize;

use crate::infra::config::{
    AppConfig, BackendConfig, DemoConfig, LogConfig, SummaryConfig, SummaryServiceConfig,
};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub backend: Option<FileBackendConfig>,
    pub demo: Option<FileDemoConfig>,
    pub summary: Option<FileSummaryConfig>,
    pub summary_service: Option<FileSummaryServiceConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(backend) = self.backend {
            backend.merge_into(&mut config.backend);
        }

        if let Some(demo) = self.demo {
            demo.merge_into(&mut config.demo);
        }

        if let Some(summary) = self.summary {
            summary.merge_into(&mut config.summary);
        }

        if let Some(summary_service) = self.summary_service {
            summary_service.merge_into(&mut config.summary_service);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
    pub file_dir: Option<PathBuf>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }

        if let Some(file_dir) = self.file_dir {
            config.file_dir = Some(file_dir);
        }
    }
}

#[derive(Deserialize, Default)]
pub struct FileBackendConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub access_token: Option<String>,
    pub user_id: Option<String>,
    pub request_timeout_ms: Option<u64>,
}

impl FileBackendConfig {
    fn merge_into(self, config: &mut BackendConfig) {
        if let Some(url) = self.url {
            config.url = url.trim_end_matches('/').to_owned();
        }

        if let Some(anon_key) = self.anon_key {
            config.anon_key = anon_key;
        }

        if let Some(access_token) = self.access_token {
            config.access_token = Some(access_token);
        }

        if let Some(user_id) = self.user_id {
            config.user_id = user_id;
        }

        if let Some(timeout_ms) = self.request_timeout_ms {
            config.request_timeout_ms = timeout_ms;
        }
    }
}

impl std::fmt::Debug for FileBackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileBackendConfig")
            .field("url", &self.url)
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileDemoConfig {
    pub fallback_when_empty: Option<bool>,
}

impl FileDemoConfig {
    fn merge_into(self, config: &mut DemoConfig) {
        if let Some(fallback) = self.fallback_when_empty {
            config.fallback_when_empty = fallback;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileSummaryConfig {
    pub function_name: Option<String>,
    pub max_messages: Option<usize>,
}

impl FileSummaryConfig {
    fn merge_into(self, config: &mut SummaryConfig) {
        if let Some(function_name) = self.function_name {
            config.function_name = function_name;
        }

        if let Some(max_messages) = self.max_messages {
            config.max_messages = max_messages;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileSummaryServiceConfig {
    pub bind_addr: Option<String>,
    pub upstream_url: Option<String>,
    pub model: Option<String>,
    pub api_key_env: Option<String>,
}

impl FileSummaryServiceConfig {
    fn merge_into(self, config: &mut SummaryServiceConfig) {
        if let Some(bind_addr) = self.bind_addr {
            config.bind_addr = bind_addr;
        }

        if let Some(upstream_url) = self.upstream_url {
            config.upstream_url = upstream_url;
        }

        if let Some(model) = self.model {
            config.model = model;
        }

        if let Some(api_key_env) = self.api_key_env {
            config.api_key_env = api_key_env;
        }
    }
}
