use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading a builder configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration value: {0}")]
    Invalid(String),
}

/// Configuration for the query builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuilderConfig {
    /// Retention policy appended to bucket names that carry none
    pub default_retention_policy: String,
    /// Aggregate function used when no function is selected
    pub default_function: String,
    /// Tag keys preferred, in order, when a card picks its key automatically
    pub default_tag_keys: Vec<String>,
    /// Append a fresh card once a value is picked in the last card
    pub auto_append_card: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            default_retention_policy: "autogen".to_string(),
            default_function: "mean".to_string(),
            default_tag_keys: vec!["_measurement".to_string(), "_field".to_string()],
            auto_append_card: true,
        }
    }
}

impl BuilderConfig {
    /// Parses and validates a JSON configuration document
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: BuilderConfig = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Checks the values the assembler depends on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_retention_policy.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "defaultRetentionPolicy must not be empty".to_string(),
            ));
        }
        if self.default_function.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "defaultFunction must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config = BuilderConfig::from_json_str(r#"{"defaultFunction": "max"}"#).unwrap();
        assert_eq!(config.default_function, "max");
        assert_eq!(config.default_retention_policy, "autogen");
        assert!(config.auto_append_card);
    }

    #[test]
    fn test_empty_function_rejected() {
        let result = BuilderConfig::from_json_str(r#"{"defaultFunction": " "}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_document_rejected() {
        let result = BuilderConfig::from_json_str("{not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"defaultRetentionPolicy": "weekly", "autoAppendCard": false}}"#
        )
        .unwrap();

        let config = BuilderConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.default_retention_policy, "weekly");
        assert!(!config.auto_append_card);
        assert_eq!(config.default_tag_keys, vec!["_measurement", "_field"]);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = BuilderConfig::from_json_file(dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
