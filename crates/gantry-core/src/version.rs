//! Tool version gate.
//!
//! Hosts can pin the gantry version a workspace expects by setting the
//! `gantry.requiredVersion` session property. The gate runs once, at plugin
//! apply time, before any task is registered.

use semver::Version;

use crate::error::{BuildError, ConfigField, Result};

/// Session property naming the minimum gantry version a workspace accepts.
pub const REQUIRED_VERSION_PROPERTY: &str = "gantry.requiredVersion";

/// Whether `actual` satisfies an optional minimum-version requirement.
///
/// An absent requirement always passes. Both strings accept `major.minor`
/// or `major.minor.patch`; an unparseable requirement is a configuration
/// error naming the literal.
pub fn compatible_version(required: Option<&str>, actual: &str) -> Result<bool> {
    let Some(required) = required else {
        return Ok(true);
    };

    let required_version =
        normalize_version(required).map_err(|reason| BuildError::InvalidConfigurationValue {
            field: ConfigField::RequiredVersion,
            value: required.trim().to_string(),
            reason,
        })?;
    let actual_version = normalize_version(actual).map_err(|reason| {
        BuildError::unexpected(
            format!("running gantry version '{actual}' is not a semantic version"),
            reason,
        )
    })?;

    Ok(actual_version >= required_version)
}

/// Normalize a version string to semver by appending `.0` for missing patch.
///
/// - `"2.1"` -> `"2.1.0"`
/// - `"2.1.3"` -> `"2.1.3"`
/// - `"2"` -> error
fn normalize_version(s: &str) -> std::result::Result<Version, String> {
    let s = s.trim();

    // Try direct parse first
    if let Ok(v) = Version::parse(s) {
        return Ok(v);
    }

    // Try appending .0 for major.minor format
    let with_patch = format!("{s}.0");
    Version::parse(&with_patch).map_err(|e| format!("invalid version '{s}': {e}"))
}
