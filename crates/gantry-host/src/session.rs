//! Host session: tool version and invocation-wide properties.

use std::collections::BTreeMap;

/// Immutable facts about the host invocation, shared by every project.
///
/// Properties here come from the command line or the host environment and
/// apply to the whole build, unlike per-project properties.
#[derive(Debug, Clone)]
pub struct Session {
    tool_version: String,
    properties: BTreeMap<String, String>,
}

impl Session {
    /// Create a session for a host tool version.
    pub fn new(tool_version: impl Into<String>) -> Self {
        Self {
            tool_version: tool_version.into(),
            properties: BTreeMap::new(),
        }
    }

    /// The running host tool version, as reported by the host.
    pub fn tool_version(&self) -> &str {
        &self.tool_version
    }

    /// Look up a session-wide property.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Set a session-wide property.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }
}
