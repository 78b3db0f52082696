//! Registry mapping extension ids to implementations.

use std::collections::HashMap;

use crate::extension::BuildExtension;

/// Registry of available extension implementations.
///
/// Descriptors name extensions by id; the registry is where those ids
/// resolve. A descriptor whose id is absent here fails the pipeline at that
/// descriptor's position.
#[derive(Default)]
pub struct ExtensionRegistry {
    entries: HashMap<String, Box<dyn BuildExtension>>,
}

impl ExtensionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register an implementation under an id, replacing any previous one.
    pub fn register(&mut self, id: impl Into<String>, extension: Box<dyn BuildExtension>) {
        self.entries.insert(id.into(), extension);
    }

    /// Look up an extension by id.
    pub fn get(&self, id: &str) -> Option<&dyn BuildExtension> {
        self.entries.get(id).map(Box::as_ref)
    }

    /// Whether an id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// All registered ids (sorted).
    pub fn known_extensions(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered extensions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
