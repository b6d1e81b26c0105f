//! TOML configuration loading shared by the server and the agent.

use std::str::FromStr;
use std::{env, fs, io, path};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    ReadFailed { path: path::PathBuf, source: io::Error },
    #[error("failed to write {path}: {source}")]
    WriteFailed { path: path::PathBuf, source: io::Error },
    #[error("failed to parse {path}: {source}")]
    ParseFailed { path: path::PathBuf, source: toml::de::Error },
    #[error("failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),
    #[error("no configuration directory available")]
    ConfigPathUnavailable,
}

/// Used to ensure we are actually reading a toml file
pub fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/checkup/<file_name> or
/// $HOME/.config/...)
pub fn default_config_path(file_name: &str) -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::ConfigPathUnavailable);
    };

    Ok(path.join("checkup").join(file_name))
}

/// Load a config from `optional_path` or the default location.
///
/// When the file does not exist the default config is written there first.
pub fn load_or_create<T>(
    optional_path: Option<&path::Path>,
    file_name: &str,
) -> Result<T, ConfigError>
where
    T: Default + Serialize + DeserializeOwned,
{
    let config_path = match optional_path {
        Some(path) => normalize_toml_path(path),
        None => default_config_path(file_name)?,
    };

    if config_path.exists() {
        let raw_string = fs::read_to_string(&config_path)
            .map_err(|source| ConfigError::ReadFailed { path: config_path.clone(), source })?;
        toml::from_str(&raw_string)
            .map_err(|source| ConfigError::ParseFailed { path: config_path, source })
    } else {
        let config = T::default();
        write_config(&config, &config_path)?;
        Ok(config)
    }
}

/// Serialize and write a config to a file
pub fn write_config<T: Serialize>(config: &T, path: &path::Path) -> Result<(), ConfigError> {
    let config_str = toml::to_string_pretty(config)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|source| ConfigError::WriteFailed { path: path.to_path_buf(), source })?;
    }

    fs::write(path, config_str)
        .map_err(|source| ConfigError::WriteFailed { path: path.to_path_buf(), source })
}

/// Read and parse an environment variable, ignoring unset, empty or
/// unparsable values
pub fn env_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().filter(|v| !v.trim().is_empty()).and_then(|v| v.trim().parse().ok())
}
