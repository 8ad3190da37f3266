//! Configuration loading and config file resolution
//!
//! Bootstrap configuration is a small TOML file. Config file location
//! follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. `QUOTER_CONFIG` environment variable
//! 3. `./quoter.toml`
//! 4. `<user config dir>/quoter/config.toml`
//! 5. Compiled defaults (fallback)
//!
//! A missing config file is never fatal; a malformed one is.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "QUOTER_CONFIG";

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "quoter.toml";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    /// Socket address the HTTP server binds to
    pub bind_addr: String,

    /// Path to SQLite database file (relative or absolute)
    pub database_path: PathBuf,

    /// Root of the music library exposed by the music browser
    ///
    /// When absent the music endpoints answer 418.
    pub music_dir: Option<PathBuf>,

    /// Directory served under `/static` (stylesheets for the HTML view)
    pub static_dir: Option<PathBuf>,

    /// SHA-256 (hex) of the access key guarding write endpoints
    pub access_key_sha256: Option<String>,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            database_path: PathBuf::from("quoter.db"),
            music_dir: None,
            static_dir: None,
            access_key_sha256: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:6741".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would only fail later at request time
    pub fn validate(&self) -> Result<()> {
        if let Some(digest) = &self.access_key_sha256 {
            let digest = digest.trim();
            if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(Error::Config(
                    "access_key_sha256 must be 64 hex characters".to_string(),
                ));
            }
        }

        if self.bind_addr.trim().is_empty() {
            return Err(Error::Config("bind_addr must not be empty".to_string()));
        }

        Ok(())
    }
}

/// Resolve which config file to read
///
/// Returns `None` when no candidate applies, meaning compiled defaults.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Working directory
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    // Priority 4: User config directory
    dirs::config_dir()
        .map(|d| d.join("quoter").join("config.toml"))
        .filter(|p| p.exists())
}

/// Load bootstrap configuration
///
/// Missing file → warning + defaults. Unreadable or malformed file → error.
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = resolve_config_path(cli_arg) else {
        info!("No config file found, using compiled defaults");
        return Ok(TomlConfig::default());
    };

    load_config_file(&path)
}

/// Load configuration from an explicit path
pub fn load_config_file(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file {} not found, using compiled defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config = TomlConfig::from_toml_str(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:6741");
        assert_eq!(config.database_path, PathBuf::from("quoter.db"));
        assert!(config.music_dir.is_none());
        assert!(config.access_key_sha256.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = TomlConfig::from_toml_str("music_dir = \"/srv/music\"\n").unwrap();
        assert_eq!(config.music_dir, Some(PathBuf::from("/srv/music")));
        assert_eq!(config.bind_addr, "127.0.0.1:6741");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_digest_rejected() {
        let result = TomlConfig::from_toml_str("access_key_sha256 = \"abc\"\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let result = TomlConfig::from_toml_str("bind_addr = [");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_cli_path_wins() {
        let path = PathBuf::from("/nonexistent/explicit.toml");
        assert_eq!(resolve_config_path(Some(&path)), Some(path));
    }
}
