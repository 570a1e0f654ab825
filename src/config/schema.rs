use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Crate-wide configuration, loaded from TOML. Every field has a default so a
/// missing file or an empty table still yields a working engine pointed at a
/// local backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub backend: BackendConfig,
    pub preview: PreviewConfig,
    pub storage: StorageConfig,
}

/// Where completions come from. Endpoint and model are configuration, not
/// protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    pub base_url: String,
    pub model: String,
    /// Upper bound on a single completion round trip. The backend runs
    /// locally and may be slow, but a dead backend must not hang the preview
    /// forever.
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "phi3".to_string(),
            request_timeout_secs: 300,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewConfig {
    /// Quiet period after the last edit before a formatting cycle starts.
    pub debounce_ms: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { debounce_ms: 2000 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Draft store location. `None` resolves to the platform data directory.
    pub database_path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn resolve_database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            return Ok(path.clone());
        }
        let dirs = directories::ProjectDirs::from("", "", "paperscribe").ok_or_else(|| {
            ConfigError::Load("could not determine a platform data directory".to_string())
        })?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        Ok(data_dir.join("drafts.db"))
    }
}

impl Config {
    /// Parse and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&raw).map_err(|error| ConfigError::Load(error.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the platform config directory, falling back to defaults when
    /// no file exists yet.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let dirs = directories::ProjectDirs::from("", "", "paperscribe").ok_or_else(|| {
            ConfigError::Load("could not determine a platform config directory".to_string())
        })?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "backend.base_url must not be empty".to_string(),
            ));
        }
        if !self.backend.base_url.starts_with("http://")
            && !self.backend.base_url.starts_with("https://")
        {
            return Err(ConfigError::Validation(format!(
                "backend.base_url must be an http(s) URL, got {}",
                self.backend.base_url
            )));
        }
        if self.backend.model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "backend.model must not be empty".to_string(),
            ));
        }
        if self.backend.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "backend.request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_backend() {
        let config = Config::default();
        assert_eq!(config.backend.base_url, "http://localhost:11434");
        assert_eq!(config.backend.model, "phi3");
        assert_eq!(config.preview.debounce_ms, 2000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [backend]
            model = "llama3"

            [preview]
            debounce_ms = 500
            "#,
        )
        .expect("partial config should parse");
        assert_eq!(config.backend.model, "llama3");
        assert_eq!(config.backend.base_url, "http://localhost:11434");
        assert_eq!(config.preview.debounce_ms, 500);
    }

    #[test]
    fn rejects_unknown_keys() {
        let parsed: Result<Config, _> = toml::from_str("[backend]\nmodle = \"typo\"\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn rejects_non_http_url() {
        let mut config = Config::default();
        config.backend.base_url = "ftp://example.com".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut config = Config::default();
        config.backend.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reports_bad_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").expect("write");
        assert!(matches!(Config::load(&path), Err(ConfigError::Load(_))));
    }

    #[test]
    fn explicit_database_path_is_used() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = StorageConfig {
            database_path: Some(dir.path().join("nested").join("drafts.db")),
        };
        let resolved = storage.resolve_database_path().expect("resolve");
        assert!(resolved.ends_with("drafts.db"));
        assert!(resolved.parent().expect("parent").exists());
    }
}
