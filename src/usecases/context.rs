use crate::infra::config::AppConfig;

/// Identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub user_id: String,
}

impl SessionContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.backend.user_id.trim())
    }

    pub fn is_signed_in(&self) -> bool {
        !self.user_id.is_empty()
    }
}

#[derive(Debug)]
pub struct AppContext {
    pub config: AppConfig,
    pub session: SessionContext,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        let session = SessionContext::from_config(&config);
        Self { config, session }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_is_anonymous_when_user_id_is_blank() {
        let mut config = AppConfig::default();
        config.backend.user_id = "   ".to_owned();

        let context = AppContext::new(config);

        assert!(!context.session.is_signed_in());
    }

    #[test]
    fn session_takes_trimmed_user_id_from_backend_config() {
        let mut config = AppConfig::default();
        config.backend.user_id = " user-1 ".to_owned();

        let context = AppContext::new(config);

        assert_eq!(context.session, SessionContext::new("user-1"));
    }
}
