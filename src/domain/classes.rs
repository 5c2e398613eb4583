//! Bidirectional mapping between class ids and disease-class names.
//!
//! Class ids are assigned contiguously at training time and persisted as
//! `class_indices.json` (name → id). The mapping is validated once at load:
//! ids must be unique and contiguous from zero, so every id the classifier
//! can produce resolves to exactly one name.

use crate::core::constants::CLASS_INDICES_FILE;
use crate::core::errors::{DetectError, DetectResult};
use std::collections::HashMap;
use std::path::Path;

/// Validated, invertible class id ↔ class name mapping.
#[derive(Debug, Clone)]
pub struct ClassIndexMap {
    id_to_name: Vec<String>,
    name_to_id: HashMap<String, usize>,
}

impl ClassIndexMap {
    /// Builds a map from the raw name → id table.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the table is empty, contains duplicate
    /// ids, or its ids are not contiguous from 0.
    pub fn from_table(table: HashMap<String, usize>) -> DetectResult<Self> {
        if table.is_empty() {
            return Err(DetectError::config_error("class index table is empty"));
        }

        let num_classes = table.len();
        let mut id_to_name: Vec<Option<String>> = vec![None; num_classes];

        for (name, &id) in &table {
            let slot = id_to_name.get_mut(id).ok_or_else(|| {
                DetectError::config_error(format!(
                    "class id {id} for '{name}' out of range for {num_classes} classes"
                ))
            })?;
            if let Some(existing) = slot {
                return Err(DetectError::config_error(format!(
                    "duplicate class id {id}: '{existing}' and '{name}'"
                )));
            }
            *slot = Some(name.clone());
        }

        let id_to_name: Vec<String> = id_to_name
            .into_iter()
            .enumerate()
            .map(|(id, name)| {
                name.ok_or_else(|| {
                    DetectError::config_error(format!(
                        "class ids are not contiguous: id {id} is unassigned"
                    ))
                })
            })
            .collect::<DetectResult<_>>()?;

        Ok(Self {
            id_to_name,
            name_to_id: table,
        })
    }

    /// Loads the mapping from its JSON artifact.
    pub fn load(path: impl AsRef<Path>) -> DetectResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| {
            DetectError::model_unavailable(
                CLASS_INDICES_FILE,
                format!("failed to read '{}'", path.display()),
                Some(e),
            )
        })?;
        let table: HashMap<String, usize> = serde_json::from_str(&data).map_err(|e| {
            DetectError::model_unavailable(
                CLASS_INDICES_FILE,
                format!("failed to parse '{}'", path.display()),
                Some(e),
            )
        })?;
        Self::from_table(table)
    }

    /// Resolves a class id to its name.
    pub fn name(&self, id: usize) -> Option<&str> {
        self.id_to_name.get(id).map(String::as_str)
    }

    /// Resolves a class name to its id.
    pub fn id(&self, name: &str) -> Option<usize> {
        self.name_to_id.get(name).copied()
    }

    /// Number of classes in the mapping.
    pub fn len(&self) -> usize {
        self.id_to_name.len()
    }

    /// Whether the mapping is empty. Never true for a validated map.
    pub fn is_empty(&self) -> bool {
        self.id_to_name.is_empty()
    }

    /// Iterates over class names in id order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.id_to_name.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, usize)]) -> HashMap<String, usize> {
        entries
            .iter()
            .map(|&(name, id)| (name.to_string(), id))
            .collect()
    }

    #[test]
    fn builds_invertible_mapping() {
        let map = ClassIndexMap::from_table(table(&[
            ("Healthy", 0),
            ("Tomato___Early_blight", 1),
            ("Tomato___Late_blight", 2),
        ]))
        .unwrap();

        assert_eq!(map.len(), 3);
        assert_eq!(map.name(1), Some("Tomato___Early_blight"));
        assert_eq!(map.id("Tomato___Late_blight"), Some(2));
        assert_eq!(map.name(3), None);
        assert_eq!(map.id("Potato___Scab"), None);
    }

    #[test]
    fn rejects_empty_table() {
        assert!(ClassIndexMap::from_table(HashMap::new()).is_err());
    }

    #[test]
    fn rejects_non_contiguous_ids() {
        let err = ClassIndexMap::from_table(table(&[("Healthy", 0), ("Blight", 2)])).unwrap_err();
        assert!(matches!(err, DetectError::ConfigError { .. }));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = ClassIndexMap::from_table(table(&[("Healthy", 0), ("Blight", 0)])).unwrap_err();
        assert!(matches!(err, DetectError::ConfigError { .. }));
    }

    #[test]
    fn names_iterate_in_id_order() {
        let map =
            ClassIndexMap::from_table(table(&[("B", 1), ("A", 0), ("C", 2)])).unwrap();
        let names: Vec<&str> = map.names().collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }
}
