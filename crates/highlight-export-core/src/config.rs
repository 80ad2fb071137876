//! Configuration for highlight-export
//!
//! Stored as TOML in `<config dir>/highlight-export/config.toml`. The
//! directory can be overridden with `HIGHLIGHT_EXPORT_CONFIG_DIR`, and a few
//! fields can be overridden from the environment.

pub mod types;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ExportError, Result};
use crate::source::readeck::{ReadeckSettings, MAX_PAGE_SIZE, MIN_PAGE_SIZE};

pub use types::{Config, ExportConfig, ReadeckConfig};

const CONFIG_DIR: &str = "highlight-export";
const CONFIG_FILE: &str = "config.toml";
const CONFIG_DIR_ENV_VAR: &str = "HIGHLIGHT_EXPORT_CONFIG_DIR";

const BASE_URL_ENV_VAR: &str = "HIGHLIGHT_EXPORT_BASE_URL";
const TOKEN_ENV_VAR: &str = "HIGHLIGHT_EXPORT_TOKEN";
const NOTES_DIR_ENV_VAR: &str = "HIGHLIGHT_EXPORT_NOTES_DIR";

impl Config {
    /// Default config file location
    pub fn default_path() -> Result<PathBuf> {
        // Allow environment variable override for testing
        let config_dir = if let Ok(env_dir) = std::env::var(CONFIG_DIR_ENV_VAR) {
            PathBuf::from(env_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| {
                    ExportError::Other("unable to determine config directory".to_string())
                })?
                .join(CONFIG_DIR)
        };

        Ok(config_dir.join(CONFIG_FILE))
    }

    /// Load configuration from a file; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ExportError::io_at(path, e))?;
        toml::from_str(&content).map_err(|e| ExportError::InvalidConfig {
            reason: format!("{}: {}", path.display(), e),
        })
    }

    /// Save configuration as pretty TOML, creating the parent directory
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| ExportError::io_at(dir, e))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ExportError::Other(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content).map_err(|e| ExportError::io_at(path, e))?;
        Ok(())
    }

    /// Apply `HIGHLIGHT_EXPORT_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(base_url) = lookup(BASE_URL_ENV_VAR) {
            self.readeck.base_url = base_url;
        }
        if let Some(token) = lookup(TOKEN_ENV_VAR) {
            self.readeck.token = token;
        }
        if let Some(notes_dir) = lookup(NOTES_DIR_ENV_VAR) {
            self.export.notes_dir = Some(PathBuf::from(notes_dir));
        }
    }

    /// Check that everything a sync run needs is present
    pub fn validate_for_sync(&self, needs_remote: bool) -> Result<()> {
        let invalid = |reason: &str| ExportError::InvalidConfig {
            reason: reason.to_string(),
        };

        if self.export.notes_dir.is_none() {
            return Err(invalid("export.notes_dir is not set"));
        }
        if self.export.extension.trim().is_empty() || self.export.extension.contains('/') {
            return Err(invalid("export.extension must be a plain file extension"));
        }

        if needs_remote {
            if self.readeck.base_url.trim().is_empty() {
                return Err(invalid("readeck.base_url is not set"));
            }
            if self.readeck.token.trim().is_empty() {
                return Err(invalid("readeck.token is not set"));
            }
            if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&self.readeck.page_size) {
                return Err(ExportError::InvalidConfig {
                    reason: format!(
                        "readeck.page_size must be between {} and {}, got {}",
                        MIN_PAGE_SIZE, MAX_PAGE_SIZE, self.readeck.page_size
                    ),
                });
            }
        }

        Ok(())
    }

    /// Connection settings for the HTTP client
    pub fn readeck_settings(&self) -> ReadeckSettings {
        ReadeckSettings {
            base_url: self.readeck.base_url.clone(),
            token: self.readeck.token.clone(),
            page_size: self.readeck.page_size,
            timeout: Duration::from_secs(self.readeck.timeout_seconds),
        }
    }

    /// Copy suitable for display, with the token masked
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.readeck.token.is_empty() {
            config.readeck.token = "********".to_string();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.readeck.page_size, 100);
        assert_eq!(config.readeck.timeout_seconds, 30);
        assert_eq!(config.export.extension, "md");
        assert_eq!(
            config.export.base_tags,
            vec!["highlights", "zettelkasten", "fleeting-note"]
        );
        assert_eq!(config.colors.order, vec!["green", "red", "yellow", "blue"]);
        assert!(config.export.notes_dir.is_none());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let config = Config::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.readeck.base_url = "https://readeck.example".to_string();
        config.export.notes_dir = Some(PathBuf::from("/notes"));
        config
            .colors
            .names
            .insert("purple".to_string(), "Questions".to_string());
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[export]\nnotes_dir = \"/notes\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.export.notes_dir, Some(PathBuf::from("/notes")));
        assert_eq!(config.export.extension, "md");
        assert_eq!(config.readeck.page_size, 100);
        assert_eq!(config.colors.names["green"], "Key takeaways");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[export\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ExportError::InvalidConfig { .. }));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (BASE_URL_ENV_VAR, "https://env.example"),
            (TOKEN_ENV_VAR, "t0k"),
            (NOTES_DIR_ENV_VAR, "  "),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.export.notes_dir = Some(PathBuf::from("/kept"));
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.readeck.base_url, "https://env.example");
        assert_eq!(config.readeck.token, "t0k");
        assert_eq!(config.export.notes_dir, Some(PathBuf::from("/kept")));
    }

    #[test]
    fn test_validate_for_sync() {
        let mut config = Config::default();
        assert!(config.validate_for_sync(false).is_err());

        config.export.notes_dir = Some(PathBuf::from("/notes"));
        assert!(config.validate_for_sync(false).is_ok());

        let err = config.validate_for_sync(true).unwrap_err();
        assert!(err.to_string().contains("base_url"));

        config.readeck.base_url = "https://readeck.example".to_string();
        config.readeck.token = "secret".to_string();
        assert!(config.validate_for_sync(true).is_ok());

        config.readeck.page_size = 5;
        let err = config.validate_for_sync(true).unwrap_err();
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn test_redacted_masks_token() {
        let mut config = Config::default();
        config.readeck.token = "secret".to_string();
        assert_eq!(config.redacted().readeck.token, "********");
        assert_eq!(Config::default().redacted().readeck.token, "");
    }
}
