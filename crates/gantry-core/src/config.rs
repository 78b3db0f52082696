//! Per-project gantry configuration: raw TOML in, validated values out.
//!
//! [`RawConfiguration`] is the serde image of `gantry.toml` — every field a
//! plain string or collection, nothing validated. [`ResolvedConfiguration`]
//! is what validation produces: typed references, paths, and timestamps.
//! Resolution short-circuits on the first invalid value so the reported
//! field is always the one the user should fix first.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use gantry_engine::{BuildConfiguration, ContainerPath, ContainerizingMode, ImageReference};
use gantry_extensions::ExtensionDescriptor;
use gantry_host::Project;
use serde::Deserialize;

use crate::error::{BuildError, ConfigField, Result};

/// File name of the per-project configuration, relative to the project root.
pub const CONFIG_FILE_NAME: &str = "gantry.toml";

/// Creation-time keyword for the Unix epoch (reproducible builds).
pub const CREATION_TIME_EPOCH: &str = "EPOCH";
/// Creation-time keyword for the wall clock at build time.
pub const CREATION_TIME_NOW: &str = "USE_CURRENT_TIMESTAMP";
/// Modification-time keyword for one second past the epoch.
pub const MODIFICATION_TIME_EPOCH_PLUS_SECOND: &str = "EPOCH_PLUS_SECOND";
/// Default tarball location, relative to the project root.
pub const DEFAULT_TAR_PATH: &str = "build/gantry-image.tar";

/// `[image]` section: what to build from and where to publish.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImageSection {
    /// Image to build upon. Required for every build.
    pub base: Option<String>,
    /// Image reference to publish under.
    pub target: Option<String>,
    /// Runtime major version of the base image, when the tag does not
    /// start with one.
    pub base_runtime_major: Option<u32>,
}

/// `[container]` section: how the built image runs.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContainerSection {
    pub app_root: Option<String>,
    pub working_directory: Option<String>,
    pub user: Option<String>,
    #[serde(default)]
    pub volumes: Vec<String>,
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    pub entrypoint: Option<Vec<String>>,
    pub args: Option<Vec<String>>,
    #[serde(default)]
    pub ports: Vec<u16>,
    /// ISO 8601, `EPOCH`, or `USE_CURRENT_TIMESTAMP`.
    pub creation_time: Option<String>,
    /// ISO 8601 or `EPOCH_PLUS_SECOND`.
    pub files_modification_time: Option<String>,
    /// `exploded` or `packaged`. Compared as a raw string during wiring;
    /// validated when the build resolves.
    pub mode: Option<String>,
}

/// One `[[extensions]]` entry: an extension id plus its property map.
/// List order is pipeline order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExtensionSection {
    pub id: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// `[output]` section: on-disk artifacts.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OutputSection {
    /// Where `gantryBuildTar` writes its tarball.
    pub tar_path: Option<PathBuf>,
}

/// Per-project gantry configuration parsed from `gantry.toml`.
///
/// Every section is optional; an empty file is a valid configuration (it
/// just cannot build until `image.base` is set).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawConfiguration {
    #[serde(default)]
    pub image: ImageSection,
    #[serde(default)]
    pub container: ContainerSection,
    #[serde(default)]
    pub extensions: Vec<ExtensionSection>,
    #[serde(default)]
    pub output: OutputSection,
    /// Engine cache directory; defaults under the platform cache dir.
    pub cache_dir: Option<PathBuf>,
}

impl RawConfiguration {
    /// Parse a configuration from TOML content.
    ///
    /// # Example
    ///
    /// ```
    /// use gantry_core::config::RawConfiguration;
    ///
    /// let config = RawConfiguration::from_toml(r#"
    /// [image]
    /// base = "eclipse-temurin:17-jre"
    /// target = "registry.example.com/team/app:1.0"
    ///
    /// [container]
    /// ports = [8080]
    ///
    /// [[extensions]]
    /// id = "layer-filter"
    /// "#).unwrap();
    ///
    /// assert_eq!(config.image.base.as_deref(), Some("eclipse-temurin:17-jre"));
    /// assert_eq!(config.extensions.len(), 1);
    /// ```
    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load a configuration file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| BuildError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| BuildError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the project's `gantry.toml`, or defaults if the file is absent.
    pub fn load_for_project(project: &Project) -> Result<Self> {
        let path = project.root().join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Validated, typed configuration for one build of one project.
#[derive(Debug, Clone)]
pub struct ResolvedConfiguration {
    pub base_image: ImageReference,
    pub target_image: Option<ImageReference>,
    pub app_root: ContainerPath,
    pub working_directory: Option<ContainerPath>,
    pub user: Option<String>,
    pub volumes: BTreeSet<ContainerPath>,
    pub environment: BTreeMap<String, String>,
    pub labels: BTreeMap<String, String>,
    pub entrypoint: Option<Vec<String>>,
    pub program_arguments: Option<Vec<String>>,
    pub exposed_ports: BTreeSet<u16>,
    pub creation_time: DateTime<Utc>,
    pub files_modification_time: DateTime<Utc>,
    pub mode: ContainerizingMode,
    /// Runtime major of the base image: explicit setting, else the leading
    /// integer of the base tag, else unknown.
    pub base_runtime_major: Option<u32>,
    pub cache_dir: PathBuf,
    /// Absolute tarball location for tar builds.
    pub tar_path: PathBuf,
    /// Extension pipeline, in configured order.
    pub extensions: Vec<ExtensionDescriptor>,
}

impl ResolvedConfiguration {
    /// Validate a raw configuration against a project.
    ///
    /// Fails on the first invalid value, naming the configuration field
    /// and the offending literal.
    pub fn resolve(raw: &RawConfiguration, project: &Project) -> Result<Self> {
        let base_value =
            raw.image
                .base
                .as_deref()
                .ok_or_else(|| BuildError::InvalidConfigurationValue {
                    field: ConfigField::BaseImage,
                    value: String::new(),
                    reason: "no base image configured".to_string(),
                })?;
        let base_image = ImageReference::parse(base_value)?;
        let target_image = match raw.image.target.as_deref() {
            Some(target) => Some(ImageReference::parse(target)?),
            None => None,
        };

        let app_root = resolve_app_root(raw.container.app_root.as_deref())?;
        let working_directory = raw
            .container
            .working_directory
            .as_deref()
            .map(|dir| container_path(dir, ConfigField::WorkingDirectory))
            .transpose()?;
        let mut volumes = BTreeSet::new();
        for volume in &raw.container.volumes {
            volumes.insert(container_path(volume, ConfigField::Volume)?);
        }

        let creation_time = parse_creation_time(raw.container.creation_time.as_deref())?;
        let files_modification_time =
            parse_modification_time(raw.container.files_modification_time.as_deref())?;

        let mode = parse_mode(raw.container.mode.as_deref())?;

        let base_runtime_major = raw
            .image
            .base_runtime_major
            .or_else(|| tag_leading_major(&base_image));

        let cache_dir = raw.cache_dir.clone().unwrap_or_else(default_cache_dir);
        let tar_path = {
            let configured = raw
                .output
                .tar_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TAR_PATH));
            if configured.is_absolute() {
                configured
            } else {
                project.root().join(configured)
            }
        };

        let extensions = raw
            .extensions
            .iter()
            .map(|section| {
                let mut descriptor = ExtensionDescriptor::new(&section.id);
                for (key, value) in &section.properties {
                    descriptor = descriptor.with_property(key, value);
                }
                descriptor
            })
            .collect();

        Ok(Self {
            base_image,
            target_image,
            app_root,
            working_directory,
            user: raw.container.user.clone(),
            volumes,
            environment: raw.container.environment.clone(),
            labels: raw.container.labels.clone(),
            entrypoint: raw.container.entrypoint.clone(),
            program_arguments: raw.container.args.clone(),
            exposed_ports: raw.container.ports.iter().copied().collect(),
            creation_time,
            files_modification_time,
            mode,
            base_runtime_major,
            cache_dir,
            tar_path,
            extensions,
        })
    }

    /// Build the engine configuration these settings describe.
    pub fn to_build_configuration(&self) -> BuildConfiguration {
        let mut configuration = BuildConfiguration::from_base(self.base_image.clone())
            .with_app_root(self.app_root.clone())
            .with_creation_time(self.creation_time)
            .with_files_modification_time(self.files_modification_time)
            .with_containerizing_mode(self.mode);
        if let Some(dir) = &self.working_directory {
            configuration = configuration.with_working_directory(dir.clone());
        }
        if let Some(user) = &self.user {
            configuration = configuration.with_user(user);
        }
        for volume in &self.volumes {
            configuration = configuration.with_volume(volume.clone());
        }
        for (name, value) in &self.environment {
            configuration = configuration.with_environment_variable(name, value);
        }
        for (key, value) in &self.labels {
            configuration = configuration.with_label(key, value);
        }
        for port in &self.exposed_ports {
            configuration = configuration.with_exposed_port(*port);
        }
        if let Some(entrypoint) = &self.entrypoint {
            configuration = configuration.with_entrypoint(entrypoint.clone());
        }
        if let Some(arguments) = &self.program_arguments {
            configuration = configuration.with_program_arguments(arguments.clone());
        }
        configuration
    }
}

pub(crate) fn resolve_app_root(raw: Option<&str>) -> Result<ContainerPath> {
    container_path(
        raw.unwrap_or(BuildConfiguration::DEFAULT_APP_ROOT),
        ConfigField::AppRoot,
    )
}

pub(crate) fn parse_mode(raw: Option<&str>) -> Result<ContainerizingMode> {
    match raw {
        None => Ok(ContainerizingMode::default()),
        Some(text) => text
            .parse()
            .map_err(|_| BuildError::InvalidConfigurationValue {
                field: ConfigField::ContainerizingMode,
                value: text.to_string(),
                reason: "unknown containerizing mode".to_string(),
            }),
    }
}

fn container_path(value: &str, field: ConfigField) -> Result<ContainerPath> {
    ContainerPath::new(value).map_err(|_| BuildError::InvalidConfigurationValue {
        field,
        value: value.to_string(),
        reason: "not an absolute Unix-style path".to_string(),
    })
}

fn parse_creation_time(value: Option<&str>) -> Result<DateTime<Utc>> {
    match value {
        None | Some(CREATION_TIME_EPOCH) => Ok(DateTime::UNIX_EPOCH),
        Some(CREATION_TIME_NOW) => Ok(Utc::now()),
        Some(text) => parse_iso_instant(text, ConfigField::CreationTime),
    }
}

fn parse_modification_time(value: Option<&str>) -> Result<DateTime<Utc>> {
    match value {
        None | Some(MODIFICATION_TIME_EPOCH_PLUS_SECOND) => {
            Ok(DateTime::UNIX_EPOCH + TimeDelta::seconds(1))
        }
        Some(text) => parse_iso_instant(text, ConfigField::ModificationTime),
    }
}

fn parse_iso_instant(text: &str, field: ConfigField) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|e| BuildError::InvalidConfigurationValue {
            field,
            value: text.to_string(),
            reason: e.to_string(),
        })
}

/// The leading integer of the base tag, if it has one: `17-jre` -> 17.
fn tag_leading_major(image: &ImageReference) -> Option<u32> {
    let tag = image.tag()?;
    let digits: String = tag.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() { None } else { digits.parse().ok() }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("gantry")
}
