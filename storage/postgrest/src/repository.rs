use crate::configuration::{BackendConfig, Settings};
use anyhow::{anyhow, Context};
use secrecy::ExposeSecret;
use std::collections::HashMap;
use url::Url;

/// Client for the hosted backend: the `locations` table behind its REST
/// interface and the photo bucket behind its storage interface.
pub struct Repository {
    config: BackendConfig,
}

impl Repository {
    pub fn new() -> anyhow::Result<Self> {
        let settings = Settings::parse()?;
        Ok(Self::with_config(settings.backend))
    }

    pub fn with_config(config: BackendConfig) -> Self {
        Self { config }
    }

    pub(crate) fn bucket(&self) -> &str {
        &self.config.bucket
    }

    pub(crate) fn headers(&self) -> HashMap<&'static str, String> {
        HashMap::from([
            ("apikey", self.config.api_key.expose_secret().to_owned()),
            (
                "Authorization",
                format!("Bearer {}", self.config.access_token.expose_secret()),
            ),
        ])
    }

    /// `{url}/{segments..}` with every segment escaped on its own.
    pub(crate) fn endpoint<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> anyhow::Result<Url> {
        let mut url = Url::parse(self.config.url.trim_end_matches('/'))
            .with_context(|| format!("Failed to parse backend url {}", self.config.url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("{} cannot be used as a base url", self.config.url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
