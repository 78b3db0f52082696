//! Absolute Unix-style in-container paths.

/// A path string was not an absolute Unix-style path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not an absolute Unix-style path: '{path}'")]
pub struct InvalidContainerPath {
    /// The offending literal, verbatim.
    pub path: String,
}

/// An absolute Unix-style path inside the container.
///
/// Host-style paths are rejected outright: a backslash or a drive-letter
/// prefix means the caller passed a host path where a container path
/// belongs, and silently converting would change which files end up where.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContainerPath(String);

impl ContainerPath {
    /// Validate and wrap a container path.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidContainerPath`] carrying the literal if the path is
    /// not absolute (`/`-rooted) or contains a backslash. Drive-letter paths
    /// fail the absolute check.
    pub fn new(path: impl Into<String>) -> Result<Self, InvalidContainerPath> {
        let path = path.into();
        if !path.starts_with('/') || path.contains('\\') {
            return Err(InvalidContainerPath { path });
        }
        Ok(Self(path))
    }

    /// Append a relative segment, inserting a single `/` separator.
    pub fn join(&self, segment: &str) -> Self {
        let segment = segment.trim_start_matches('/');
        if self.0.ends_with('/') {
            Self(format!("{}{segment}", self.0))
        } else {
            Self(format!("{}/{segment}", self.0))
        }
    }

    /// The path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContainerPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ContainerPath {
    type Err = InvalidContainerPath;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
