//! TOML configuration for the Casemind terminal client.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. `casemind.toml` (or the file given with `--config`)
//! 3. `.env` and process environment (`CASEMIND_API_BASE_URL`,
//!    `CASEMIND_SESSION_DIR`, `CASEMIND_LOG_LEVEL`, `CASEMIND_API_TIMEOUT_SECS`)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use casemind_core::DEFAULT_API_BASE_URL;

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = "casemind.toml";

/// Root configuration loaded from casemind.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CasemindConfig {
    /// `[api]` section
    #[serde(default)]
    pub api: ApiConfig,

    /// `[session]` section
    #[serde(default)]
    pub session: SessionConfig,

    /// Default tracing level when neither RUST_LOG nor --verbose is set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ============= API Configuration =============

/// Where the API lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every request path is joined to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout enforced by the HTTP client
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ============= Session Configuration =============

/// Where the signed-in session is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Directory holding the session record; defaults to the platform data dir
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for CasemindConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            session: SessionConfig::default(),
            log_level: default_log_level(),
        }
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("No data directory available; set session.dir or CASEMIND_SESSION_DIR")]
    NoDataDir,
}

impl CasemindConfig {
    /// Load configuration, then apply `.env` and environment overrides.
    ///
    /// An explicit `path` must exist. Without one, `casemind.toml` in the
    /// current directory is used when present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = PathBuf::from(CONFIG_FILE_NAME);
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                    Self::default()
                }
            }
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse one TOML file without applying overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let config: CasemindConfig = toml::from_str(&content)?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Apply `CASEMIND_*` overrides from `lookup`. Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("CASEMIND_API_BASE_URL") {
            self.api.base_url = url;
        }
        if let Some(timeout) = get("CASEMIND_API_TIMEOUT_SECS").and_then(|v| v.trim().parse().ok()) {
            self.api.timeout_secs = timeout;
        }
        if let Some(dir) = get("CASEMIND_SESSION_DIR") {
            self.session.dir = Some(PathBuf::from(dir));
        }
        if let Some(level) = get("CASEMIND_LOG_LEVEL") {
            self.log_level = level;
        }
    }

    /// Reject base URLs that are not http(s) and a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "api.base_url must start with http:// or https:// (got '{}')",
                self.api.base_url
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "api.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory the session record is stored in.
    pub fn session_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.session.dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join("casemind"))
                .ok_or(ConfigError::NoDataDir),
        }
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = CasemindConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.session.dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: CasemindConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://claims.example.org"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://claims.example.org");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = CasemindConfig::from_file(&dir.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("casemind.toml");
        fs::write(
            &path,
            "log_level = \"debug\"\n[api]\nbase_url = \"http://10.0.0.5:8080\"\ntimeout_secs = 5\n[session]\ndir = \"/tmp/cm\"\n",
        )
        .unwrap();

        let config = CasemindConfig::from_file(&path).unwrap();
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.session_dir().unwrap(), PathBuf::from("/tmp/cm"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("CASEMIND_API_BASE_URL", "https://api.casemind.test"),
            ("CASEMIND_SESSION_DIR", "/var/lib/casemind"),
            ("CASEMIND_LOG_LEVEL", "  "),
            ("CASEMIND_API_TIMEOUT_SECS", "12"),
        ]);
        let mut config = CasemindConfig::default();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "https://api.casemind.test");
        assert_eq!(config.api.timeout_secs, 12);
        assert_eq!(config.session.dir, Some(PathBuf::from("/var/lib/casemind")));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_validation_rejects_bad_url() {
        let mut config = CasemindConfig::default();
        config.api.base_url = "localhost:8080".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
