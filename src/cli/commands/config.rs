//! Config command implementation.

use crate::cli::{mask_token, ConfigAction, Output};
use crate::config::{write_template, Config};
use anyhow::Result;
use serde_json::{json, Map, Value};
use std::path::Path;

/// Run the config command.
pub fn run_config(action: &ConfigAction, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load_from(Some(config_path))?;
            println!("{}", serde_json::to_string_pretty(&masked(&config))?);
        }

        ConfigAction::Init => {
            if config_path.exists() {
                Output::warning(&format!(
                    "Config already exists at {}, leaving it untouched.",
                    config_path.display()
                ));
            } else {
                write_template(config_path)?;
                Output::success(&format!("Created template config at {}", config_path.display()));
                Output::info("Edit it to fill in your API token and knowledge base topic_id.");
            }
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// JSON view of the configuration with tokens masked.
fn masked(config: &Config) -> Value {
    let mut knowledge_bases = Map::new();
    for (name, kb) in config.knowledge_bases() {
        let mut entry = json!({
            "token": mask_token(&kb.token),
            "topic_id": kb.topic_id,
        });
        if let Some(description) = &kb.description {
            entry["description"] = json!(description);
        }
        knowledge_bases.insert(name.to_string(), entry);
    }

    json!({
        "knowledge_bases": knowledge_bases,
        "default": config.default_name(),
        "settings": config.settings(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_hides_tokens() {
        let config = Config::from_json_str(
            r#"{"knowledge_bases": {"work": {"token": "secret-token", "topic_id": "k1"}}, "default": "work"}"#,
        )
        .unwrap();

        let view = masked(&config);
        assert_eq!(view["knowledge_bases"]["work"]["token"], "secr****");
        assert_eq!(view["knowledge_bases"]["work"]["topic_id"], "k1");
        assert_eq!(view["settings"]["timeout"], 30);
        assert!(!view.to_string().contains("secret-token"));
    }

    #[test]
    fn test_init_writes_template_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        run_config(&ConfigAction::Init, &path).unwrap();
        assert!(Config::from_json_str(&std::fs::read_to_string(&path).unwrap()).is_ok());

        std::fs::write(&path, "{}").unwrap();
        run_config(&ConfigAction::Init, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
