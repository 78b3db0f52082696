//! Descriptors: the user-ordered list of extensions to apply.

use std::collections::BTreeMap;

/// One configured extension: which one, plus its opaque configuration
/// payload. Ordering is carried by list position, not by the descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionDescriptor {
    /// Registered extension id.
    pub id: String,
    /// Key-value configuration passed through to the extension untouched.
    pub properties: BTreeMap<String, String>,
}

impl ExtensionDescriptor {
    /// Descriptor for an extension id with no properties.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Add one configuration property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}
