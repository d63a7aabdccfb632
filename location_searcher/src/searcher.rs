use crate::configuration::{GeocoderConfig, Settings};
use anyhow::{anyhow, Context};
use secrecy::{ExposeSecret, Secret};
use url::Url;

const PLACES_PATH: &str = "/geocoding/v5/mapbox.places";

pub struct Searcher {
    config: GeocoderConfig,
}

impl Searcher {
    pub fn new() -> anyhow::Result<Self> {
        let settings = Settings::parse()?;
        Ok(Self::with_config(settings.geocoding))
    }

    pub fn with_config(config: GeocoderConfig) -> Self {
        Searcher { config }
    }

    pub(crate) fn host(&self) -> &str {
        self.config.host.trim_end_matches('/')
    }

    pub(crate) fn access_token(&self) -> &Secret<String> {
        &self.config.access_token
    }

    /// `{host}/geocoding/v5/mapbox.places/{term}.json?access_token=..&limit=..`
    /// with `term` escaped as a single path segment.
    pub(crate) fn places_url(&self, term: &str, limit: usize) -> anyhow::Result<Url> {
        let mut url = Url::parse_with_params(
            &format!("{}{}", self.host(), PLACES_PATH),
            &[
                ("access_token", self.access_token().expose_secret().as_str()),
                ("limit", limit.to_string().as_str()),
            ],
        )
        .context("Failed to parse url")?;

        url.path_segments_mut()
            .map_err(|_| anyhow!("{} cannot be used as a base url", self.host()))?
            .push(&format!("{term}.json"));
        Ok(url)
    }
}
