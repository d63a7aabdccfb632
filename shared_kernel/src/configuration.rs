use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::Path;

const DIRECTORY: &str = "configuration";
const PREFIX: &str = "APP";
const PROFILE_VARIABLE: &str = "APP_PROFILE";

/// Settings from `configuration/{profile}.yaml` in the working directory.
/// The profile is `base` unless `APP_PROFILE` names another one.
pub fn config<Settings: DeserializeOwned>() -> anyhow::Result<Settings> {
    let root = std::env::current_dir().context("Failed to determine the current directory")?;
    let profile = std::env::var(PROFILE_VARIABLE).unwrap_or_else(|_| "base".to_owned());
    let file = root.join(DIRECTORY).join(format!("{profile}.yaml"));
    load(&file, std::env::vars())
}

/// Layers `APP_` variables over `file`. A double underscore steps into a
/// nested table, so `APP_BACKEND__API_KEY` sets `backend.api_key`. A missing
/// file is treated as empty.
pub fn load<Settings, Variables>(file: &Path, variables: Variables) -> anyhow::Result<Settings>
where
    Settings: DeserializeOwned,
    Variables: IntoIterator<Item = (String, String)>,
{
    let overrides: config::Map<String, String> = variables.into_iter().collect();
    let settings = config::Config::builder()
        .add_source(config::File::from(file).required(false))
        .add_source(
            config::Environment::with_prefix(PREFIX)
                .prefix_separator("_")
                .separator("__")
                .source(Some(overrides)),
        )
        .build()
        .with_context(|| format!("Failed to build configuration from {}", file.display()))?;

    settings
        .try_deserialize::<Settings>()
        .context("Failed to deserialize settings")
}
