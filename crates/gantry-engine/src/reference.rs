//! Image reference parsing: `[registry/]repository[:tag][@digest]`.

use std::sync::LazyLock;

use regex::Regex;

/// Registry used when a reference names none.
pub const DEFAULT_REGISTRY: &str = "registry-1.docker.io";

/// Namespace prefixed onto single-segment repositories on the default
/// registry (`ubuntu` means `library/ubuntu`).
pub const OFFICIAL_REPOSITORY_PREFIX: &str = "library/";

/// Tag assumed when a reference carries neither tag nor digest.
pub const DEFAULT_TAG: &str = "latest";

static REGISTRY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9](?:[a-zA-Z0-9.-]*[a-zA-Z0-9])?(?::[0-9]{1,5})?$")
        .expect("Invalid registry regex")
});

static REPOSITORY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+(?:[._-][a-z0-9]+)*(?:/[a-z0-9]+(?:[._-][a-z0-9]+)*)*$")
        .expect("Invalid repository regex")
});

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_][a-zA-Z0-9._-]{0,127}$").expect("Invalid tag regex"));

static DIGEST_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^sha256:[0-9a-f]{64}$").expect("Invalid digest regex"));

/// An image coordinate string failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid image reference: '{reference}'")]
pub struct InvalidImageReference {
    /// The offending literal, verbatim.
    pub reference: String,
}

/// A parsed image reference.
///
/// Parsing fills in registry conventions: a missing registry becomes
/// [`DEFAULT_REGISTRY`], and a bare single-segment repository on the default
/// registry gains the [`OFFICIAL_REPOSITORY_PREFIX`]. The first path segment
/// counts as a registry only when it could be a hostname (contains `.` or a
/// port, or is `localhost`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    registry: String,
    repository: String,
    tag: Option<String>,
    digest: Option<String>,
}

impl ImageReference {
    /// Parse an image coordinate string.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidImageReference`] carrying the literal input if any
    /// component fails its grammar.
    pub fn parse(reference: &str) -> Result<Self, InvalidImageReference> {
        let invalid = || InvalidImageReference {
            reference: reference.to_string(),
        };
        if reference.is_empty() {
            return Err(invalid());
        }

        let (base, digest) = match reference.split_once('@') {
            Some((base, digest)) => {
                if !DIGEST_REGEX.is_match(digest) {
                    return Err(invalid());
                }
                (base, Some(digest.to_string()))
            }
            None => (reference, None),
        };

        // A colon after the last slash separates the tag; a colon before it
        // is a registry port.
        let (base, tag) = match base.rsplit_once(':') {
            Some((head, candidate)) if !candidate.contains('/') => {
                if !TAG_REGEX.is_match(candidate) {
                    return Err(invalid());
                }
                (head, Some(candidate.to_string()))
            }
            _ => (base, None),
        };

        let (registry, repository) = match base.split_once('/') {
            Some((first, rest))
                if first.contains('.') || first.contains(':') || first == "localhost" =>
            {
                (first.to_string(), rest.to_string())
            }
            _ => (DEFAULT_REGISTRY.to_string(), base.to_string()),
        };

        let repository = if registry == DEFAULT_REGISTRY && !repository.contains('/') {
            format!("{OFFICIAL_REPOSITORY_PREFIX}{repository}")
        } else {
            repository
        };

        if !REGISTRY_REGEX.is_match(&registry) || !REPOSITORY_REGEX.is_match(&repository) {
            return Err(invalid());
        }

        Ok(Self {
            registry,
            repository,
            tag,
            digest,
        })
    }

    /// The registry host (and optional port).
    pub fn registry(&self) -> &str {
        &self.registry
    }

    /// The repository path within the registry.
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// The tag, if the reference carried one.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// The tag, or [`DEFAULT_TAG`] when the reference is untagged and
    /// undigested. A digest-only reference has no meaningful tag.
    pub fn tag_or_default(&self) -> &str {
        match (&self.tag, &self.digest) {
            (Some(tag), _) => tag,
            (None, Some(_)) => "",
            (None, None) => DEFAULT_TAG,
        }
    }

    /// The digest, if the reference carried one.
    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }
}

impl std::fmt::Display for ImageReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.registry, self.repository)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{tag}")?;
        }
        if let Some(digest) = &self.digest {
            write!(f, "@{digest}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for ImageReference {
    type Err = InvalidImageReference;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
