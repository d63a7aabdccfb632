use secrecy::Secret;
use serde::Deserialize;
use shared_kernel::configuration::config;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub geocoding: GeocoderConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeocoderConfig {
    pub host: String,
    pub access_token: Secret<String>,
}

impl Settings {
    pub fn parse() -> anyhow::Result<Self> {
        config::<Settings>()
    }
}
