//! `dlutil.yaml` settings.
//!
//! Every field has a default, so a missing file (or an empty one) yields
//! `Settings::default()`. The file lives next to the token files unless
//! `DLUTIL_CONFIG` points elsewhere.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::os_user;

/// Environment variable overriding the Data Lab state directory.
pub const DATALAB_DIR_ENV: &str = "DATALAB_DIR";
/// Environment variable overriding the settings file location.
pub const CONFIG_ENV: &str = "DLUTIL_CONFIG";
/// Settings file name inside the Data Lab directory.
pub const SETTINGS_FILE: &str = "dlutil.yaml";


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Overrides `$HOME/.datalab` as the directory holding `dl.conf` and
    /// the `id_token.<user>` files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datalab_dir: Option<String>,

    /// Maximum number of bytes read from a token file.
    #[serde(default = "default_token_read_limit")]
    pub token_read_limit: usize,

    /// Length of generated multipart boundaries.
    #[serde(default = "default_boundary_length")]
    pub boundary_length: usize,

    /// MIME type used when a file part's type cannot be guessed.
    #[serde(default = "default_mimetype")]
    pub default_mimetype: String,
}

fn default_token_read_limit() -> usize {
    128
}

fn default_boundary_length() -> usize {
    30
}

fn default_mimetype() -> String {
    "application/octet-stream".into()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            datalab_dir: None,
            token_read_limit: default_token_read_limit(),
            boundary_length: default_boundary_length(),
            default_mimetype: default_mimetype(),
        }
    }
}

impl Settings {
    /// The directory holding `dl.conf` and token files: the `datalab_dir`
    /// setting, else `$DATALAB_DIR`, else `$HOME/.datalab`. `None` when
    /// none of these is known.
    pub fn datalab_dir(&self) -> Option<PathBuf> {
        match self.configured_dir() {
            Some(dir) => Some(dir),
            None => default_datalab_dir(),
        }
    }

    fn configured_dir(&self) -> Option<PathBuf> {
        self.datalab_dir
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
    }
}


#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}


/// `$DATALAB_DIR` if set, else `$HOME/.datalab`, else `None`.
pub fn default_datalab_dir() -> Option<PathBuf> {
    let env_dir = std::env::var(DATALAB_DIR_ENV).ok();
    datalab_dir_from(env_dir.as_deref(), os_user::home_dir())
}

/// Directory lookup over already-read environment values. There is no
/// shared fallback directory: without a home the result is `None`.
pub fn datalab_dir_from(env_dir: Option<&str>, home: Option<PathBuf>) -> Option<PathBuf> {
    match env_dir {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => home.map(|h| h.join(".datalab")),
    }
}

/// `$DLUTIL_CONFIG` if set, else `dlutil.yaml` in the default Data Lab dir.
pub fn settings_path() -> Option<PathBuf> {
    let config_env = std::env::var(CONFIG_ENV).ok();
    settings_path_from(config_env.as_deref(), default_datalab_dir())
}

pub fn settings_path_from(config_env: Option<&str>, datalab_dir: Option<PathBuf>) -> Option<PathBuf> {
    match config_env {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => datalab_dir.map(|d| d.join(SETTINGS_FILE)),
    }
}

/// Load settings from `path`. A missing file yields the defaults.
pub fn load(path: &Path) -> Result<Settings, SettingsError> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content)
}

/// Parse settings from a YAML string.
pub fn parse(content: &str) -> Result<Settings, SettingsError> {
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }
    let settings: Settings = serde_yaml::from_str(content)?;
    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), SettingsError> {
    if settings.token_read_limit == 0 {
        return Err(SettingsError::Invalid("token_read_limit must be positive".into()));
    }
    if settings.boundary_length == 0 {
        return Err(SettingsError::Invalid("boundary_length must be positive".into()));
    }
    if settings.default_mimetype.trim().is_empty() {
        return Err(SettingsError::Invalid("default_mimetype must not be empty".into()));
    }
    Ok(())
}
