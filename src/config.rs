//! Configuration for supervised commands.
//!
//! A supervisor config file describes the commands it will hand to the
//! engine as JSON blocks:
//!
//! ```json
//! {
//!     "logging": { "level": "info" },
//!     "commands": [
//!         { "name": "app", "exec": "node /srv/app.js", "timeout": "" },
//!         { "name": "health", "exec": "sh checks/health.sh", "timeout": "200ms" }
//!     ]
//! }
//! ```
//!
//! Blocks convert into [`Command`] descriptors; the timeout string goes
//! through the same resolver as everything else, so a malformed duration
//! fails the conversion rather than reaching the engine.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::execution::Command;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration.
    pub logging: LoggingSection,
    /// Command blocks available to run.
    pub commands: Vec<CommandConfig>,
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// One command block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Command name; generated if omitted.
    pub name: Option<String>,
    /// Command line, whitespace-split into executable and arguments.
    pub exec: String,
    /// Timeout string; empty means no deadline.
    pub timeout: String,
    /// Log fields attached to every line the engine emits for this command.
    pub log: HashMap<String, String>,
}

impl CommandConfig {
    /// Convert this block into a runnable descriptor.
    pub fn into_command(self) -> crate::error::Result<Command> {
        let cmd = Command::parse(&self.exec, &self.timeout, self.log)?;
        Ok(match self.name {
            Some(name) => cmd.with_name(name),
            None => cmd,
        })
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Find a command block by name.
    pub fn command(&self, name: &str) -> Option<&CommandConfig> {
        self.commands
            .iter()
            .find(|c| c.name.as_deref() == Some(name))
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcHarnessError;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert!(config.commands.is_empty());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "logging": { "level": "debug" },
            "commands": [
                { "name": "app", "exec": "node /srv/app.js", "timeout": "" },
                { "name": "health", "exec": "sh checks/health.sh", "timeout": "200ms" }
            ]
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.commands.len(), 2);
        assert!(config.command("health").is_some());
        assert!(config.command("missing").is_none());
    }

    #[test]
    fn test_config_partial_json() {
        let json = r#"{
            "commands": [ { "exec": "true" } ]
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.logging.level, "info"); // Default
        assert_eq!(config.commands.len(), 1);
        assert_eq!(config.commands[0].timeout, "");
    }

    #[test]
    fn test_into_command() {
        let block = CommandConfig {
            name: Some("health".to_string()),
            exec: "sh checks/health.sh --fast".to_string(),
            timeout: "200ms".to_string(),
            log: HashMap::new(),
        };

        let cmd = block.into_command().unwrap();
        assert_eq!(cmd.name(), "health");
        assert_eq!(cmd.executable(), "sh");
        assert_eq!(cmd.args(), ["checks/health.sh", "--fast"]);
        assert_eq!(cmd.timeout().duration(), Some(Duration::from_millis(200)));
    }

    #[test]
    fn test_into_command_bad_timeout() {
        let block = CommandConfig {
            exec: "true".to_string(),
            timeout: "soon".to_string(),
            ..Default::default()
        };

        let err = block.into_command().unwrap_err();
        assert!(matches!(err, ProcHarnessError::DurationParse(_)));
    }

    #[test]
    fn test_into_command_empty_exec() {
        let block = CommandConfig::default();
        assert!(block.into_command().is_err());
    }

    #[test]
    fn test_invalid_json_fails() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"not json").unwrap();

        let result = Config::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"logging\""));
        assert!(json.contains("\"commands\""));
    }
}
