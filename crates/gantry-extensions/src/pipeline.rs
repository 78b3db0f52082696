//! The pipeline runner: a strict left fold over the descriptor list.

use gantry_engine::{BuildConfiguration, LogEvent, LogSink};
use gantry_host::{Project, Session};
use tracing::debug;

use crate::descriptor::ExtensionDescriptor;
use crate::error::{ExtensionError, PipelineFailure, Result};
use crate::extension::ExtensionContext;
use crate::registry::ExtensionRegistry;

/// Apply every configured extension to `initial`, in list order.
///
/// The configuration is chained by value: descriptor `i` receives exactly
/// what descriptor `i - 1` returned, and the first failure stops the fold
/// with nothing after it run. An empty descriptor list returns `initial`
/// unchanged.
///
/// # Errors
///
/// Returns [`PipelineFailure`] naming the failing descriptor's position and
/// id, wrapping the extension's own error. An id with no registered
/// implementation fails the same way.
pub fn run_pipeline(
    registry: &ExtensionRegistry,
    descriptors: &[ExtensionDescriptor],
    initial: BuildConfiguration,
    project: &Project,
    session: &Session,
    log: &dyn LogSink,
) -> Result<BuildConfiguration> {
    let mut configuration = initial;
    for (position, descriptor) in descriptors.iter().enumerate() {
        debug!(extension = %descriptor.id, position, "running extension");
        log.accept(LogEvent::lifecycle(format!(
            "Running extension: {}",
            descriptor.id
        )));

        let extension = registry.get(&descriptor.id).ok_or_else(|| PipelineFailure {
            position,
            id: descriptor.id.clone(),
            source: ExtensionError::message("extension is not registered"),
        })?;

        let context = ExtensionContext::new(project, session, &descriptor.properties);
        configuration = extension
            .extend(configuration, &context, log)
            .map_err(|source| PipelineFailure {
                position,
                id: descriptor.id.clone(),
                source,
            })?;
    }
    Ok(configuration)
}
