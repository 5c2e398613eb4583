//! Static remedy/fertilizer knowledge keyed by disease class.
//!
//! Loaded once from `agri_knowledge.json` and read-only for the process
//! lifetime. At startup the table is checked against the class-index map so
//! a desync between trained classes and knowledge entries fails fast
//! instead of surfacing on the first unlucky request.

use crate::core::constants::AGRI_KNOWLEDGE_FILE;
use crate::core::errors::{DetectError, DetectResult};
use crate::domain::classes::ClassIndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::error;

/// Remedy and fertilizer guidance for one disease class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Treatment guidance for the disease.
    pub remedy: String,
    /// Fertilizer guidance for the affected crop.
    pub fertilizer: String,
}

/// The full knowledge table, keyed by raw class name.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: HashMap<String, KnowledgeEntry>,
}

impl KnowledgeBase {
    /// Builds a knowledge base from in-memory entries.
    pub fn from_entries(entries: HashMap<String, KnowledgeEntry>) -> Self {
        Self { entries }
    }

    /// Loads the table from its JSON artifact.
    pub fn load(path: impl AsRef<Path>) -> DetectResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| {
            DetectError::model_unavailable(
                AGRI_KNOWLEDGE_FILE,
                format!("failed to read '{}'", path.display()),
                Some(e),
            )
        })?;
        let entries: HashMap<String, KnowledgeEntry> =
            serde_json::from_str(&data).map_err(|e| {
                DetectError::model_unavailable(
                    AGRI_KNOWLEDGE_FILE,
                    format!("failed to parse '{}'", path.display()),
                    Some(e),
                )
            })?;
        Ok(Self::from_entries(entries))
    }

    /// Looks up the entry for a raw class name.
    pub fn get(&self, class: &str) -> Option<&KnowledgeEntry> {
        self.entries.get(class)
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Verifies that every classifier-reachable class has a knowledge
    /// entry.
    ///
    /// # Errors
    ///
    /// Returns `KnowledgeNotFound` for the first missing class; all missing
    /// classes are logged so operators see the full extent of the desync.
    pub fn validate_against(&self, classes: &ClassIndexMap) -> DetectResult<()> {
        let missing: Vec<&str> = classes
            .names()
            .filter(|name| !self.entries.contains_key(*name))
            .collect();

        if let Some(&first) = missing.first() {
            error!(
                missing = ?missing,
                known_entries = self.entries.len(),
                "knowledge base out of sync with trained classes"
            );
            return Err(DetectError::knowledge_not_found(first));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn entry(remedy: &str, fertilizer: &str) -> KnowledgeEntry {
        KnowledgeEntry {
            remedy: remedy.to_string(),
            fertilizer: fertilizer.to_string(),
        }
    }

    fn classes(names: &[&str]) -> ClassIndexMap {
        let table: HashMap<String, usize> = names
            .iter()
            .enumerate()
            .map(|(id, name)| (name.to_string(), id))
            .collect();
        ClassIndexMap::from_table(table).unwrap()
    }

    #[test]
    fn validates_complete_coverage() {
        let mut entries = HashMap::new();
        entries.insert("Healthy".to_string(), entry("none", "balanced NPK"));
        entries.insert(
            "Tomato___Early_blight".to_string(),
            entry("remove affected leaves", "low nitrogen"),
        );
        let kb = KnowledgeBase::from_entries(entries);

        assert!(kb
            .validate_against(&classes(&["Healthy", "Tomato___Early_blight"]))
            .is_ok());
    }

    #[test]
    fn missing_entry_is_knowledge_not_found() {
        let mut entries = HashMap::new();
        entries.insert("Healthy".to_string(), entry("none", "balanced NPK"));
        let kb = KnowledgeBase::from_entries(entries);

        let err = kb
            .validate_against(&classes(&["Healthy", "Tomato___Early_blight"]))
            .unwrap_err();
        assert!(matches!(
            err,
            DetectError::KnowledgeNotFound { ref class } if class == "Tomato___Early_blight"
        ));
    }

    #[test]
    fn loads_from_json_artifact() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"Healthy": {{"remedy": "none", "fertilizer": "balanced NPK"}}}}"#
        )
        .unwrap();

        let kb = KnowledgeBase::load(file.path()).unwrap();
        assert_eq!(kb.len(), 1);
        assert_eq!(kb.get("Healthy").unwrap().remedy, "none");
        assert!(kb.get("Unknown").is_none());
    }

    #[test]
    fn missing_artifact_is_model_unavailable() {
        let err = KnowledgeBase::load("does/not/exist.json").unwrap_err();
        assert!(matches!(err, DetectError::ModelUnavailable { .. }));
    }
}
