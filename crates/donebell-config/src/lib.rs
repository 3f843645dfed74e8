use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use donebell_types::LogMode;

/// Environment variable that overrides the configured [`LogMode`].
pub const MODE_ENV: &str = "DONEBELL_MODE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON5 parse error: {0}")]
    Json5(#[from] json5::Error),
    #[error("Invalid value for {var}: {reason}")]
    InvalidEnv { var: &'static str, reason: String },
    #[error("Config directory not found")]
    NoDirFound,
}

/// The external command that delivers notifications.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandConfig {
    /// Program to execute.
    #[serde(default = "default_program")]
    pub program: String,
    /// Leading arguments placed before the notification arguments.
    #[serde(default = "default_args")]
    pub args: Vec<String>,
}

fn default_program() -> String {
    "se".to_string()
}

fn default_args() -> Vec<String> {
    vec!["pushover".to_string()]
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
        }
    }
}

/// Top-level donebell configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Verbose (log everything) or silent (log nothing, quiet command).
    #[serde(default)]
    pub mode: LogMode,
    /// Notification command.
    #[serde(default)]
    pub command: CommandConfig,
}

impl NotifierConfig {
    /// Replace `mode` with a parsed override value, if one is given.
    pub fn apply_mode_override(&mut self, value: Option<&str>) -> Result<(), ConfigError> {
        if let Some(raw) = value.filter(|v| !v.trim().is_empty()) {
            self.mode = raw.parse().map_err(|reason| ConfigError::InvalidEnv {
                var: MODE_ENV,
                reason,
            })?;
        }
        Ok(())
    }
}

/// Resolve the donebell config directory (~/.donebell/).
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|h| h.join(".donebell"))
        .ok_or(ConfigError::NoDirFound)
}

/// Resolve the config file path (~/.donebell/config.json5).
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.json5"))
}

/// Load configuration from the default path, falling back to defaults.
///
/// `.env` is loaded first so that [`MODE_ENV`] may come from it.
pub fn load_config() -> Result<NotifierConfig, ConfigError> {
    let _ = dotenvy::dotenv();

    let path = config_file_path()?;
    load_config_with_env(&path)
}

/// Load configuration from a specific path and apply environment overrides.
pub fn load_config_with_env(path: &Path) -> Result<NotifierConfig, ConfigError> {
    let mut config = load_config_from(path)?;
    let mode = std::env::var(MODE_ENV).ok();
    config.apply_mode_override(mode.as_deref())?;
    Ok(config)
}

/// Load configuration from a specific path, falling back to defaults if not found.
pub fn load_config_from(path: &Path) -> Result<NotifierConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("Config file not found at {}, using defaults", path.display());
        return Ok(NotifierConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: NotifierConfig = json5::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NotifierConfig::default();
        assert_eq!(config.mode, LogMode::Verbose);
        assert_eq!(config.command.program, "se");
        assert_eq!(config.command.args, vec!["pushover"]);
    }

    #[test]
    fn test_json5_parse() {
        let json5_str = r#"{
            // quiet on the laptop
            mode: "silent",
            command: { program: "/usr/local/bin/se" },
        }"#;
        let config: NotifierConfig = json5::from_str(json5_str).unwrap();
        assert_eq!(config.mode, LogMode::Silent);
        assert_eq!(config.command.program, "/usr/local/bin/se");
        assert_eq!(config.command.args, vec!["pushover"]);
    }

    #[test]
    fn test_json5_parse_empty() {
        let config: NotifierConfig = json5::from_str("{}").unwrap();
        assert_eq!(config.mode, LogMode::Verbose);
        assert_eq!(config.command, CommandConfig::default());
    }

    #[test]
    fn test_mode_override() {
        let mut config = NotifierConfig::default();
        config.apply_mode_override(None).unwrap();
        assert_eq!(config.mode, LogMode::Verbose);

        config.apply_mode_override(Some("  ")).unwrap();
        assert_eq!(config.mode, LogMode::Verbose);

        config.apply_mode_override(Some("silent")).unwrap();
        assert_eq!(config.mode, LogMode::Silent);

        let err = config.apply_mode_override(Some("shouty")).unwrap_err();
        assert!(err.to_string().contains(MODE_ENV));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("donebell-does-not-exist/config.json5");
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.command, CommandConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("donebell-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json5");
        std::fs::write(&path, r#"{ command: { program: "notify", args: [] } }"#).unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.command.program, "notify");
        assert!(config.command.args.is_empty());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = std::env::temp_dir().join(format!("donebell-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json5");
        std::fs::write(&path, "{ mode: ").unwrap();

        assert!(matches!(load_config_from(&path), Err(ConfigError::Json5(_))));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
