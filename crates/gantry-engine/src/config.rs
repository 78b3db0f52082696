//! The chainable build configuration handed to the engine.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, TimeDelta, Utc};

use crate::path::ContainerPath;
use crate::reference::ImageReference;

/// A containerizing mode string was neither `exploded` nor `packaged`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid containerizing mode: '{mode}'")]
pub struct InvalidContainerizingMode {
    /// The offending literal, verbatim.
    pub mode: String,
}

/// Whether the image is built from exploded class files or from a single
/// packaged archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContainerizingMode {
    /// Compiled output goes into the image as individual files.
    #[default]
    Exploded,
    /// The project's archive goes into the image whole.
    Packaged,
}

impl std::str::FromStr for ContainerizingMode {
    type Err = InvalidContainerizingMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exploded" => Ok(Self::Exploded),
            "packaged" => Ok(Self::Packaged),
            other => Err(InvalidContainerizingMode {
                mode: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ContainerizingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exploded => f.write_str("exploded"),
            Self::Packaged => f.write_str("packaged"),
        }
    }
}

/// Accreting snapshot of everything the engine needs to assemble an image.
///
/// Transform calls consume and return the configuration, so a chain of
/// transformations reads as a single expression and no two stages can alias
/// the same snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfiguration {
    base_image: ImageReference,
    app_root: ContainerPath,
    working_directory: Option<ContainerPath>,
    user: Option<String>,
    volumes: BTreeSet<ContainerPath>,
    environment: BTreeMap<String, String>,
    labels: BTreeMap<String, String>,
    entrypoint: Option<Vec<String>>,
    program_arguments: Option<Vec<String>>,
    exposed_ports: BTreeSet<u16>,
    creation_time: DateTime<Utc>,
    files_modification_time: DateTime<Utc>,
    containerizing_mode: ContainerizingMode,
}

impl BuildConfiguration {
    /// Default in-container application root.
    pub const DEFAULT_APP_ROOT: &'static str = "/app";

    /// Start a configuration from a base image.
    ///
    /// Defaults: app root `/app`, creation time at the epoch,
    /// files-modification time one second after the epoch, exploded mode.
    pub fn from_base(base_image: ImageReference) -> Self {
        Self {
            base_image,
            app_root: ContainerPath::new(Self::DEFAULT_APP_ROOT)
                .expect("default app root is a valid container path"),
            working_directory: None,
            user: None,
            volumes: BTreeSet::new(),
            environment: BTreeMap::new(),
            labels: BTreeMap::new(),
            entrypoint: None,
            program_arguments: None,
            exposed_ports: BTreeSet::new(),
            creation_time: DateTime::UNIX_EPOCH,
            files_modification_time: DateTime::UNIX_EPOCH + TimeDelta::seconds(1),
            containerizing_mode: ContainerizingMode::default(),
        }
    }

    /// Replace the base image.
    pub fn with_base_image(mut self, base_image: ImageReference) -> Self {
        self.base_image = base_image;
        self
    }

    /// Set the in-container application root.
    pub fn with_app_root(mut self, app_root: ContainerPath) -> Self {
        self.app_root = app_root;
        self
    }

    /// Set the container working directory.
    pub fn with_working_directory(mut self, dir: ContainerPath) -> Self {
        self.working_directory = Some(dir);
        self
    }

    /// Set the container user.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Declare a volume mount point. Duplicates collapse.
    pub fn with_volume(mut self, volume: ContainerPath) -> Self {
        self.volumes.insert(volume);
        self
    }

    /// Set one environment variable.
    pub fn with_environment_variable(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.environment.insert(name.into(), value.into());
        self
    }

    /// Set one image label.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Replace the entrypoint.
    pub fn with_entrypoint(mut self, entrypoint: Vec<String>) -> Self {
        self.entrypoint = Some(entrypoint);
        self
    }

    /// Replace the program arguments.
    pub fn with_program_arguments(mut self, arguments: Vec<String>) -> Self {
        self.program_arguments = Some(arguments);
        self
    }

    /// Expose a container port.
    pub fn with_exposed_port(mut self, port: u16) -> Self {
        self.exposed_ports.insert(port);
        self
    }

    /// Set the image creation time.
    pub fn with_creation_time(mut self, time: DateTime<Utc>) -> Self {
        self.creation_time = time;
        self
    }

    /// Set the modification time stamped onto files in the image.
    pub fn with_files_modification_time(mut self, time: DateTime<Utc>) -> Self {
        self.files_modification_time = time;
        self
    }

    /// Set the containerizing mode.
    pub fn with_containerizing_mode(mut self, mode: ContainerizingMode) -> Self {
        self.containerizing_mode = mode;
        self
    }

    pub fn base_image(&self) -> &ImageReference {
        &self.base_image
    }

    pub fn app_root(&self) -> &ContainerPath {
        &self.app_root
    }

    pub fn working_directory(&self) -> Option<&ContainerPath> {
        self.working_directory.as_ref()
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn volumes(&self) -> impl Iterator<Item = &ContainerPath> {
        self.volumes.iter()
    }

    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    pub fn entrypoint(&self) -> Option<&[String]> {
        self.entrypoint.as_deref()
    }

    pub fn program_arguments(&self) -> Option<&[String]> {
        self.program_arguments.as_deref()
    }

    pub fn exposed_ports(&self) -> impl Iterator<Item = u16> {
        self.exposed_ports.iter().copied()
    }

    pub fn creation_time(&self) -> DateTime<Utc> {
        self.creation_time
    }

    pub fn files_modification_time(&self) -> DateTime<Utc> {
        self.files_modification_time
    }

    pub fn containerizing_mode(&self) -> ContainerizingMode {
        self.containerizing_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> BuildConfiguration {
        BuildConfiguration::from_base(ImageReference::parse("eclipse-temurin:17").unwrap())
    }

    #[test]
    fn test_defaults() {
        let config = base();
        assert_eq!(config.app_root().as_str(), "/app");
        assert_eq!(config.containerizing_mode(), ContainerizingMode::Exploded);
        assert_eq!(config.creation_time().timestamp(), 0);
        assert_eq!(config.files_modification_time().timestamp(), 1);
        assert_eq!(config.entrypoint(), None);
    }

    #[test]
    fn test_chaining_accretes() {
        let config = base()
            .with_app_root(ContainerPath::new("/srv").unwrap())
            .with_environment_variable("PORT", "8080")
            .with_environment_variable("MODE", "prod")
            .with_label("team", "delivery")
            .with_volume(ContainerPath::new("/data").unwrap())
            .with_volume(ContainerPath::new("/data").unwrap())
            .with_exposed_port(8080);

        assert_eq!(config.app_root().as_str(), "/srv");
        assert_eq!(config.environment().len(), 2);
        assert_eq!(config.volumes().count(), 1);
        assert_eq!(config.exposed_ports().collect::<Vec<_>>(), vec![8080]);
    }

    #[test]
    fn test_mode_parsing_preserves_literal() {
        assert_eq!(
            "exploded".parse::<ContainerizingMode>().unwrap(),
            ContainerizingMode::Exploded
        );
        assert_eq!(
            "packaged".parse::<ContainerizingMode>().unwrap(),
            ContainerizingMode::Packaged
        );
        let err = "zip".parse::<ContainerizingMode>().unwrap_err();
        assert_eq!(err.mode, "zip");
        assert_eq!(err.to_string(), "invalid containerizing mode: 'zip'");
    }
}
