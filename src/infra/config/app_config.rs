use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub backend: BackendConfig,
    pub demo: DemoConfig,
    pub summary: SummaryConfig,
    pub summary_service: SummaryServiceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    /// When set, logs also go to a daily-rolled file in this directory.
    pub file_dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            file_dir: None,
        }
    }
}

/// Hosted backend endpoint and the signed-in session's credentials.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
    pub access_token: Option<String>,
    pub user_id: String,
    pub request_timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_owned(),
            anon_key: "replace-me".to_owned(),
            access_token: None,
            user_id: String::new(),
            request_timeout_ms: 10_000,
        }
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("anon_key", &"[REDACTED]")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("user_id", &self.user_id)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DemoConfig {
    /// Switch to fixture data when the backend has no conversations for the user.
    pub fallback_when_empty: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            fallback_when_empty: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryConfig {
    pub function_name: String,
    pub max_messages: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            function_name: "ai-summary".to_owned(),
            max_messages: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryServiceConfig {
    pub bind_addr: String,
    pub upstream_url: String,
    pub model: String,
    /// Name of the environment variable holding the completion API key.
    pub api_key_env: String,
}

impl Default for SummaryServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8787".to_owned(),
            upstream_url: "https://ai.gateway.lovable.dev/v1/chat/completions".to_owned(),
            model: "google/gemini-2.5-flash".to_owned(),
            api_key_env: "LOVABLE_API_KEY".to_owned(),
        }
    }
}
