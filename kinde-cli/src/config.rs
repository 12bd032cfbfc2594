//! CLI configuration handling.
//!
//! Credentials come from `config.toml` (the project config directory, or
//! `--config`), then any non-empty `KINDE_*` environment variable replaces
//! the file's value.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use kinde_core::Credentials;
use kinde_core::config::{ENV_AUDIENCE, ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_DOMAIN, ENV_SCOPES};
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_FILE: &str = "config.toml";

/// Default location of the config file, if a home directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join(CONFIG_FILE))
}

/// Load credentials from `explicit`, or the default path if it exists, then
/// apply the environment on top.
///
/// An explicit path that cannot be read is an error; a missing default file
/// is not.
pub fn load_credentials(explicit: Option<&Path>) -> Result<Credentials> {
    let from_file = match explicit {
        Some(path) => read_config(path)?,
        None => match default_config_path() {
            Some(path) if path.exists() => read_config(&path)?,
            _ => Credentials::default(),
        },
    };

    Ok(overlay_env(from_file, |key| std::env::var(key).ok()))
}

/// Parse a config file.
pub fn read_config(path: &Path) -> Result<Credentials> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {:?}", path))?;
    let credentials = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config from {:?}", path))?;

    debug!("Loaded configuration from {:?}", path);
    Ok(credentials)
}

/// Replace fields of `credentials` with non-empty values from `lookup`.
pub fn overlay_env<F>(mut credentials: Credentials, lookup: F) -> Credentials
where
    F: Fn(&str) -> Option<String>,
{
    let set = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(domain) = set(ENV_DOMAIN) {
        credentials = credentials.with_domain(domain);
    }
    if let Some(audience) = set(ENV_AUDIENCE) {
        credentials = credentials.with_audience(audience);
    }
    if let Some(client_id) = set(ENV_CLIENT_ID) {
        credentials = credentials.with_client_id(client_id);
    }
    if let Some(client_secret) = set(ENV_CLIENT_SECRET) {
        credentials = credentials.with_client_secret(client_secret);
    }
    if let Some(scopes) = set(ENV_SCOPES) {
        credentials = credentials.with_scopes(scopes.split_whitespace());
    }

    credentials
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "kinde", "kinde")
}
