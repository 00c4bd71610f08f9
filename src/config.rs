use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::store::Backend;

/// Application configuration loaded from TOML config file.
/// All fields have defaults; the config file is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Custom database path (overrides XDG default).
    pub db_path: Option<PathBuf>,
    /// JSON file used to populate an empty store at startup.
    pub seed_path: PathBuf,
    /// Address the HTTP server binds to.
    pub bind: String,
    /// Storage backend.
    pub backend: Backend,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            seed_path: PathBuf::from("data").join("tracks.json"),
            bind: "127.0.0.1:8000".to_string(),
            backend: Backend::default(),
        }
    }
}

impl AppConfig {
    /// Load config from `path`, or `~/.config/trackbox/config.toml` when `None`.
    /// Returns default config if file doesn't exist.
    /// Logs a warning if the file exists but can't be parsed.
    pub fn load(path: Option<&Path>) -> Self {
        let config_path = path.map(Path::to_path_buf).or_else(Self::config_path);
        match config_path {
            Some(path) if path.exists() => match std::fs::read_to_string(&path) {
                Ok(contents) => match Self::parse(&contents) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", path.display());
                        config
                    }
                    Err(e) => {
                        log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                        Self::default()
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Resolve the default database path using XDG data directory.
pub fn default_db_path() -> PathBuf {
    if let Some(dirs) = ProjectDirs::from("", "", crate::APP_NAME) {
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir).ok();
        data_dir.join("trackbox.db")
    } else {
        // Fallback: current directory
        PathBuf::from("trackbox.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.db_path, None);
        assert_eq!(config.seed_path, PathBuf::from("data/tracks.json"));
        assert_eq!(config.bind, "127.0.0.1:8000");
        assert_eq!(config.backend, Backend::Sqlite);
    }

    #[test]
    fn test_partial_config() {
        let config = AppConfig::parse(
            r#"
            db_path = "/var/lib/trackbox/tracks.db"
            backend = "memory"
            "#,
        )
        .unwrap();
        assert_eq!(config.db_path, Some(PathBuf::from("/var/lib/trackbox/tracks.db")));
        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.bind, "127.0.0.1:8000");
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(AppConfig::parse("backend = \"postgres\"").is_err());
    }

    #[test]
    fn test_load_bad_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "bind = [").unwrap();
        let config = AppConfig::load(Some(&path));
        assert_eq!(config.bind, "127.0.0.1:8000");
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "bind = \"0.0.0.0:9000\"\nseed_path = \"seed.json\"").unwrap();
        let config = AppConfig::load(Some(&path));
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.seed_path, PathBuf::from("seed.json"));
    }
}
