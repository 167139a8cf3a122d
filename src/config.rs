use crate::core::{MscliError, Result};
use crate::pager::DEFAULT_PAGER_THRESHOLD;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory name under the user's configuration directory.
pub const APP_DIR: &str = "mscli";
pub const CONFIG_FILE: &str = "config.toml";
pub const HISTORY_FILE: &str = "history.txt";

pub const DEFAULT_PORT: u16 = 1433;

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub ui: UiConfig,
}

/// Connection defaults. The password is never read from the file.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConnectionConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub trust_cert: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            host: None,
            port: None,
            username: None,
            trust_cert: true,
        }
    }
}

/// Prompt and output settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    /// Tables with more rows than this are paged
    pub pager_threshold: usize,
    pub history_size: usize,
    /// Keep reading lines until the statement ends with `;`
    pub multiline: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            pager_threshold: DEFAULT_PAGER_THRESHOLD,
            history_size: 1000,
            multiline: false,
        }
    }
}

/// Loads configuration from a TOML file at the given path.
///
/// A missing file yields the defaults.
///
/// # Example
///
/// ```no_run
/// let config = mscli::config::load_config("config.toml").expect("Failed to load config");
/// println!("{:?}", config);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(?path, "no configuration file, using defaults");
            return Ok(Config::default());
        }
        Err(e) => return Err(e.into()),
    };
    toml::from_str(&content)
        .map_err(|e| MscliError::Config(format!("{}: {}", path.display(), e)))
}

/// The per-user directory holding configuration and history, created on first use.
pub fn ensure_app_dir() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| MscliError::Config("cannot determine the user configuration directory".to_string()))?;
    let dir = base.join(APP_DIR);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}
