use entities::locations::OwnerId;
use serde::Deserialize;
use shared_kernel::configuration::config;
use use_cases::session::Session;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct Settings {
    session: SessionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub user_id: Uuid,
    pub email: String,
}

/// The signed in user as recorded in configuration.
pub struct ConfiguredSession {
    config: SessionConfig,
}

impl ConfiguredSession {
    pub fn new() -> anyhow::Result<Self> {
        let settings = config::<Settings>()?;
        Ok(Self::with_config(settings.session))
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self { config }
    }
}

impl Session for ConfiguredSession {
    fn user_id(&self) -> OwnerId {
        self.config.user_id.into()
    }

    fn email(&self) -> String {
        self.config.email.clone()
    }
}
