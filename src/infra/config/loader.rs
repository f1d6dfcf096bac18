use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::infra::{
    config::{file_config::FileConfig, AppConfig},
    error::AppError,
};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub fn load(path: Option<&Path>) -> Result<AppConfig, AppError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = AppConfig::default();

    if !config_path.exists() {
        return Ok(config);
    }

    let raw = fs::read_to_string(&config_path).map_err(|source| AppError::ConfigRead {
        path: config_path.clone(),
        source,
    })?;

    let file_config: FileConfig = toml::from_str(&raw).map_err(|source| AppError::ConfigParse {
        path: config_path,
        source,
    })?;

    file_config.merge_into(&mut config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_defaults_when_file_is_missing() {
        let config = load(Some(Path::new("./missing-config.toml"))).expect("config must load");

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn merges_file_values_over_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            r#"[logging]
level = "debug"

[backend]
url = "https://project.example.co/"
anon_key = "anon"
user_id = "user-1"

[demo]
fallback_when_empty = false

[summary]
max_messages = 20
"#,
        )
        .expect("must write test config");

        let config = load(Some(&config_path)).expect("config must load");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.backend.url, "https://project.example.co");
        assert_eq!(config.backend.anon_key, "anon");
        assert_eq!(config.backend.user_id, "user-1");
        assert_eq!(config.backend.request_timeout_ms, 10_000);
        assert!(!config.demo.fallback_when_empty);
        assert_eq!(config.summary.max_messages, 20);
        assert_eq!(config.summary.function_name, "ai-summary");
    }

    #[test]
    fn reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config_path = dir.path().join("broken.toml");
        fs::write(&config_path, "[backend\nurl = 1").expect("must write test config");

        let error = load(Some(&config_path)).expect_err("broken config must fail");

        assert!(matches!(error, AppError::ConfigParse { .. }));
        assert!(error.to_string().contains("broken.toml"));
    }

    #[test]
    fn backend_debug_output_hides_credentials() {
        let mut config = AppConfig::default();
        config.backend.anon_key = "anon-secret".to_owned();
        config.backend.access_token = Some("jwt-secret".to_owned());

        let rendered = format!("{:?}", config.backend);

        assert!(!rendered.contains("anon-secret"));
        assert!(!rendered.contains("jwt-secret"));
    }
}
