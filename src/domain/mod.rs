//! Domain types: class mappings, the knowledge base, and the diagnosis
//! record returned to callers.

pub mod classes;
pub mod diagnosis;
pub mod knowledge;

pub use classes::ClassIndexMap;
pub use diagnosis::{display_name, Diagnosis, SeverityLevel};
pub use knowledge::{KnowledgeBase, KnowledgeEntry};
