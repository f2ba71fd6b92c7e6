use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::db::DB_FILENAME;
use crate::error::{Result, TallyError};
use crate::store::DEFAULT_MAX_RETRIES;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_max_storage_retries")]
    pub max_storage_retries: u32,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_max_storage_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            log_level: default_log_level(),
            max_storage_retries: default_max_storage_retries(),
        }
    }
}

impl Settings {
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(DB_FILENAME)
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("tally")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("tally")
}

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    std::fs::create_dir_all(config_dir())?;
    let json = serde_json::to_string_pretty(settings).map_err(|e| TallyError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.log_level, "warn");
        assert_eq!(s.max_storage_retries, 3);
        assert!(s.data_dir.ends_with("tally"));
    }

    #[test]
    fn test_partial_json_merges_with_defaults() {
        let s: Settings = serde_json::from_str(r#"{"data_dir": "/tmp/books"}"#).unwrap();
        assert_eq!(s.data_dir, "/tmp/books");
        assert_eq!(s.log_level, "warn");
        assert_eq!(s.max_storage_retries, 3);
    }

    #[test]
    fn test_json_roundtrip() {
        let settings = Settings {
            data_dir: "/tmp/books".to_string(),
            log_level: "debug".to_string(),
            max_storage_retries: 5,
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        let loaded: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_db_path_is_inside_data_dir() {
        let settings = Settings {
            data_dir: "/tmp/books".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.db_path(), PathBuf::from("/tmp/books/tally.db"));
    }

    #[test]
    fn test_shellexpand_keeps_unknown_path() {
        assert_eq!(shellexpand_path("/no/such/dir"), "/no/such/dir");
    }
}
