use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::error::{ClientError, ClientResult};

pub const SETTINGS_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080".into(),
            request_timeout_secs: 30,
            user_agent: concat!("personal-info-client/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl ClientSettings {
    /// Base URL with a trailing slash so relative endpoint paths join beneath it.
    pub fn api_base_url(&self) -> ClientResult<Url> {
        let raw = self.api_base_url.trim();
        if raw.is_empty() {
            return Err(ClientError::Settings("api_base_url must not be empty".into()));
        }
        let mut url = Url::parse(raw)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Loads `client.toml` from the working directory, then applies `APP__*` overrides.
pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE))
}

pub fn load_settings_from(path: &Path) -> ClientSettings {
    let mut settings = if path.exists() {
        try_load_settings_file(path).unwrap_or_else(|err| {
            warn!(error = %format!("{err:#}"), "ignoring unreadable client settings file");
            ClientSettings::default()
        })
    } else {
        ClientSettings::default()
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub fn try_load_settings_file(path: &Path) -> anyhow::Result<ClientSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))
}

fn apply_env_overrides(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(_) => warn!(value = %v, "ignoring invalid APP__REQUEST_TIMEOUT_SECS"),
        }
    }
    if let Some(v) = lookup("APP__USER_AGENT") {
        settings.user_agent = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
