//! Configuration settings for biji-mcp.

use crate::error::{BijiError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "BIJI_MCP_CONFIG";

/// One configured knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeBase {
    /// API token used as the bearer credential.
    pub token: String,
    /// Remote knowledge base identifier.
    pub topic_id: String,
    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Global settings shared by all knowledge bases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Result count used by recall when the caller does not pass one.
    pub default_top_k: u32,
    /// Per-request timeout in seconds.
    pub timeout: u64,
    /// Override for the API base URL (self-hosted gateways, tests).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_top_k: 10,
            timeout: 30,
            base_url: None,
        }
    }
}

/// Complete configuration: named knowledge bases, the default name and settings.
///
/// Knowledge bases keep the order they were declared in the file. Names are unique.
#[derive(Debug, Clone)]
pub struct Config {
    knowledge_bases: Vec<(String, KnowledgeBase)>,
    default: String,
    settings: Settings,
}

/// On-disk shape. Knowledge bases are read as a raw JSON map so declaration order survives.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    knowledge_bases: Map<String, Value>,
    default: String,
    #[serde(default)]
    settings: Settings,
}

impl Config {
    /// Build a configuration, checking that every entry is usable and that the
    /// default name exists.
    pub fn new(
        knowledge_bases: Vec<(String, KnowledgeBase)>,
        default: impl Into<String>,
        settings: Settings,
    ) -> Result<Self> {
        let default = default.into();

        for (i, (name, kb)) in knowledge_bases.iter().enumerate() {
            if knowledge_bases[..i].iter().any(|(other, _)| other == name) {
                return Err(BijiError::Config(format!(
                    "config validation failed: duplicate knowledge base name '{}'",
                    name
                )));
            }
            if kb.token.trim().is_empty() {
                return Err(BijiError::Config(format!(
                    "config validation failed: knowledge base '{}' has an empty token",
                    name
                )));
            }
            if kb.topic_id.trim().is_empty() {
                return Err(BijiError::Config(format!(
                    "config validation failed: knowledge base '{}' has an empty topic_id",
                    name
                )));
            }
        }

        if !knowledge_bases.iter().any(|(name, _)| *name == default) {
            let available = knowledge_bases
                .iter()
                .map(|(name, _)| name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(BijiError::Config(format!(
                "default knowledge base '{}' does not exist, available: {}",
                default, available
            )));
        }

        Ok(Self {
            knowledge_bases,
            default,
            settings,
        })
    }

    /// Parse configuration from its JSON text.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)
            .map_err(|e| BijiError::Config(format!("invalid config file format: {}", e)))?;

        let file: ConfigFile = serde_json::from_value(value)
            .map_err(|e| BijiError::Config(format!("config validation failed: {}", e)))?;

        let mut knowledge_bases = Vec::with_capacity(file.knowledge_bases.len());
        for (name, raw) in file.knowledge_bases {
            let kb: KnowledgeBase = serde_json::from_value(raw).map_err(|e| {
                BijiError::Config(format!(
                    "config validation failed: knowledge base '{}': {}",
                    name, e
                ))
            })?;
            knowledge_bases.push((name, kb));
        }

        Self::new(knowledge_bases, file.default, file.settings)
    }

    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from a specific path, or the default location if None.
    ///
    /// A missing file is replaced by a template and reported as an error; the
    /// caller never gets a configuration it did not write.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path(),
        };

        if !config_path.exists() {
            write_template(&config_path)?;
            return Err(BijiError::Config(format!(
                "config file not found, a template was created at {}\n\
                 edit it to fill in your API token and knowledge base topic_id",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config = Self::from_json_str(&content)?;

        debug!(
            "Configuration loaded, knowledge bases: {:?}",
            config.names().collect::<Vec<_>>()
        );
        Ok(config)
    }

    /// Get the default configuration file path.
    ///
    /// `BIJI_MCP_CONFIG` wins over `~/.biji-mcp/config.json`.
    pub fn default_config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            if !path.is_empty() {
                return Self::expand_path(&path);
            }
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".biji-mcp")
            .join("config.json")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Configured knowledge bases in declaration order.
    pub fn knowledge_bases(&self) -> impl Iterator<Item = (&str, &KnowledgeBase)> {
        self.knowledge_bases
            .iter()
            .map(|(name, kb)| (name.as_str(), kb))
    }

    /// Configured knowledge-base names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.knowledge_bases.iter().map(|(name, _)| name.as_str())
    }

    /// Look up a knowledge base by its exact name.
    pub fn get(&self, name: &str) -> Option<&KnowledgeBase> {
        self.knowledge_bases
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, kb)| kb)
    }

    /// Name of the default knowledge base.
    pub fn default_name(&self) -> &str {
        &self.default
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// Template written when no configuration exists. Values are obviously fake.
pub fn template() -> Value {
    json!({
        "knowledge_bases": {
            "work": {
                "token": "your-api-token-here",
                "topic_id": "your-topic-id-here",
                "description": "Work notes"
            }
        },
        "default": "work",
        "settings": {
            "default_top_k": 10,
            "timeout": 30
        }
    })
}

/// Write the template to `path`, creating parent directories.
pub fn write_template(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(&template())?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "knowledge_bases": {
            "work": {"token": "t1", "topic_id": "k1", "description": "Work notes"},
            "reading": {"token": "t2", "topic_id": "k2"}
        },
        "default": "work",
        "settings": {"default_top_k": 5, "timeout": 10}
    }"#;

    #[test]
    fn test_parse_valid_config() {
        let config = Config::from_json_str(VALID).unwrap();

        assert_eq!(config.default_name(), "work");
        assert_eq!(config.names().collect::<Vec<_>>(), vec!["work", "reading"]);
        assert_eq!(config.settings().default_top_k, 5);
        assert_eq!(config.settings().timeout, 10);
        assert_eq!(config.get("reading").unwrap().description, None);
        assert_eq!(
            config.get("work").unwrap().description.as_deref(),
            Some("Work notes")
        );
    }

    #[test]
    fn test_settings_default_when_absent() {
        let config = Config::from_json_str(
            r#"{"knowledge_bases": {"a": {"token": "t", "topic_id": "k"}}, "default": "a"}"#,
        )
        .unwrap();

        assert_eq!(config.settings(), &Settings::default());
    }

    #[test]
    fn test_invalid_json_is_format_error() {
        let err = Config::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, BijiError::Config(ref m) if m.starts_with("invalid config file format")));
    }

    #[test]
    fn test_missing_token_is_validation_error() {
        let err = Config::from_json_str(
            r#"{"knowledge_bases": {"a": {"topic_id": "k"}}, "default": "a"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, BijiError::Config(ref m) if m.contains("validation failed") && m.contains("token")));
    }

    #[test]
    fn test_empty_token_rejected() {
        let err = Config::from_json_str(
            r#"{"knowledge_bases": {"a": {"token": "", "topic_id": "k"}}, "default": "a"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, BijiError::Config(ref m) if m.contains("empty token")));
    }

    #[test]
    fn test_missing_default_lists_available() {
        let err = Config::from_json_str(
            r#"{"knowledge_bases": {"a": {"token": "t", "topic_id": "k"}, "b": {"token": "t", "topic_id": "k"}}, "default": "c"}"#,
        )
        .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("'c'"));
        assert!(msg.contains("a, b"));
    }

    #[test]
    fn test_missing_file_creates_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let err = Config::load_from(Some(&path)).unwrap_err();
        assert!(matches!(err, BijiError::Config(_)));
        assert!(path.exists());

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, template());
        assert_eq!(
            written["knowledge_bases"]["work"]["token"],
            "your-api-token-here"
        );
    }

    #[test]
    fn test_load_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, VALID).unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.get("work").unwrap().token, "t1");
    }

    #[test]
    fn test_template_parses_as_config() {
        let config = Config::from_json_str(&template().to_string()).unwrap();
        assert_eq!(config.default_name(), "work");
    }
}
