use secrecy::Secret;
use serde::Deserialize;
use shared_kernel::configuration::config;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub backend: BackendConfig,
}

#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    /// Project base url, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// The public anon key, sent as `apikey`.
    pub api_key: Secret<String>,
    /// The signed in user's access token.
    pub access_token: Secret<String>,
    pub bucket: String,
}

impl Settings {
    pub fn parse() -> anyhow::Result<Self> {
        config::<Settings>()
    }
}
