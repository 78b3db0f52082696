//! The engine execution contract.

use std::path::{Path, PathBuf};

use crate::config::BuildConfiguration;
use crate::error::Result;
use crate::log::LogSink;
use crate::reference::ImageReference;

/// Where a build's output goes.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildTarget {
    /// Push to a remote registry.
    Registry(ImageReference),
    /// Load into the local daemon.
    Daemon(ImageReference),
    /// Write an image tarball to disk, tagged with `name`.
    Tar { path: PathBuf, name: ImageReference },
}

impl BuildTarget {
    /// The image name the output is addressed by.
    pub fn image(&self) -> &ImageReference {
        match self {
            Self::Registry(image) | Self::Daemon(image) => image,
            Self::Tar { name, .. } => name,
        }
    }
}

/// Result of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltImage {
    /// The engine-assigned image id.
    pub image_id: String,
    /// The image digest.
    pub digest: String,
    /// Tags applied to the image.
    pub tags: Vec<String>,
}

/// A containerization engine.
///
/// `build` is a single synchronous call that may run for a long time and may
/// use threads internally; it reports progress only through `log`. `staging`
/// is a scratch directory the caller owns: it exists for the duration of the
/// call and is removed once the execution finishes, so the engine must not
/// keep anything it needs afterwards in there.
pub trait ContainerEngine {
    fn build(
        &self,
        configuration: &BuildConfiguration,
        target: &BuildTarget,
        staging: &Path,
        log: &dyn LogSink,
    ) -> Result<BuiltImage>;
}
