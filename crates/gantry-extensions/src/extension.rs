//! The extension contract: transform a build configuration or fail.

use std::collections::BTreeMap;

use gantry_engine::{BuildConfiguration, LogSink};
use gantry_host::{Project, Session};

use crate::error::ExtensionError;

/// Read-only view handed to an extension alongside the configuration.
pub struct ExtensionContext<'a> {
    project: &'a Project,
    session: &'a Session,
    properties: &'a BTreeMap<String, String>,
}

impl<'a> ExtensionContext<'a> {
    /// Assemble a context for one extension invocation.
    pub fn new(
        project: &'a Project,
        session: &'a Session,
        properties: &'a BTreeMap<String, String>,
    ) -> Self {
        Self {
            project,
            session,
            properties,
        }
    }

    /// The project being containerized.
    pub fn project(&self) -> &Project {
        self.project
    }

    /// The host session.
    pub fn session(&self) -> &Session {
        self.session
    }

    /// Configuration properties declared for this extension in the
    /// project's descriptor list.
    pub fn properties(&self) -> &BTreeMap<String, String> {
        self.properties
    }

    /// Convenience lookup into [`properties`](Self::properties).
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// A third-party transformation over the build configuration.
///
/// The default body returns its input unchanged, so an extension that only
/// wants to observe the build (or is a placeholder) needs no code.
pub trait BuildExtension: Send + Sync {
    fn extend(
        &self,
        configuration: BuildConfiguration,
        context: &ExtensionContext<'_>,
        log: &dyn LogSink,
    ) -> Result<BuildConfiguration, ExtensionError> {
        let _ = (context, log);
        Ok(configuration)
    }
}
