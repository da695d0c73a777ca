//! Knowledge-base name resolution.

use super::{Config, KnowledgeBase};
use crate::error::{BijiError, Result};

impl Config {
    /// Resolve a user-supplied knowledge-base name.
    ///
    /// `None`, an empty string, and a whitespace-only string all mean the
    /// configured default. An exact name match always wins;
    /// only when there is none does a substring match run, and it must be
    /// unambiguous.
    pub fn resolve(&self, requested: Option<&str>) -> Result<(&str, &KnowledgeBase)> {
        let name = requested
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(self.default_name());

        if let Some(hit) = self.knowledge_bases().find(|(n, _)| *n == name) {
            return Ok(hit);
        }

        let matches: Vec<(&str, &KnowledgeBase)> = self
            .knowledge_bases()
            .filter(|(n, _)| n.contains(name))
            .collect();

        match matches.as_slice() {
            [single] => Ok(*single),
            [] => {
                let available = self.names().collect::<Vec<_>>().join(", ");
                Err(BijiError::Config(format!(
                    "knowledge base '{}' not found, available: {}",
                    name, available
                )))
            }
            many => {
                let names = many.iter().map(|(n, _)| *n).collect::<Vec<_>>().join(", ");
                Err(BijiError::Config(format!(
                    "knowledge base name '{}' is ambiguous, matches: {}; use a more specific name",
                    name, names
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn kb(topic_id: &str) -> KnowledgeBase {
        KnowledgeBase {
            token: "token".to_string(),
            topic_id: topic_id.to_string(),
            description: None,
        }
    }

    fn config(names: &[&str]) -> Config {
        let kbs = names
            .iter()
            .map(|n| (n.to_string(), kb(&format!("topic-{}", n))))
            .collect();
        Config::new(kbs, names[0], Settings::default()).unwrap()
    }

    #[test]
    fn test_none_uses_default() {
        let config = config(&["work", "reading"]);
        let (name, kb) = config.resolve(None).unwrap();
        assert_eq!(name, "work");
        assert_eq!(kb.topic_id, "topic-work");
    }

    #[test]
    fn test_blank_uses_default() {
        let config = config(&["work", "reading"]);
        for blank in ["", "   ", "\t"] {
            let (name, _) = config.resolve(Some(blank)).unwrap();
            assert_eq!(name, "work");
        }
    }

    #[test]
    fn test_exact_match() {
        let config = config(&["work", "reading"]);
        let (name, _) = config.resolve(Some("reading")).unwrap();
        assert_eq!(name, "reading");
    }

    #[test]
    fn test_exact_match_beats_ambiguous_fuzzy() {
        // "notes" is contained in all three names, but one is an exact hit.
        let config = config(&["notes", "work notes", "notes archive"]);
        let (name, kb) = config.resolve(Some("notes")).unwrap();
        assert_eq!(name, "notes");
        assert_eq!(kb.topic_id, "topic-notes");
    }

    #[test]
    fn test_unique_fuzzy_match() {
        let config = config(&["work notes", "reading list"]);
        let (name, _) = config.resolve(Some("reading")).unwrap();
        assert_eq!(name, "reading list");
    }

    #[test]
    fn test_ambiguous_fuzzy_lists_matches() {
        let config = config(&["work notes", "side notes", "books"]);
        let err = config.resolve(Some("notes")).unwrap_err();

        let msg = err.to_string();
        assert!(matches!(err, BijiError::Config(_)));
        assert!(msg.contains("ambiguous"));
        assert!(msg.contains("work notes, side notes"));
        assert!(!msg.contains("books"));
    }

    #[test]
    fn test_not_found_lists_all_names() {
        let config = config(&["work", "reading"]);
        let err = config.resolve(Some("travel")).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("work, reading"));
    }

    #[test]
    fn test_substring_is_case_sensitive() {
        let config = config(&["Work"]);
        assert!(config.resolve(Some("work")).is_err());
    }
}
