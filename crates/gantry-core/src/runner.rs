//! The build runner facade: one image-build task execution, end to end.
//!
//! [`BuildRunner::execute`] drives a single build through a fixed state
//! sequence, releases its scoped resources on every exit path, and applies
//! the error translation exactly once, at its own boundary. Inside the
//! runner everything is a [`BuildError`]; callers only ever see a
//! [`HostFailure`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use gantry_engine::Error as EngineError;
use gantry_engine::{
    BuildTarget, BuiltImage, ContainerEngine, ImageReference, LogEvent, LogLevel, LogSink,
};
use gantry_extensions::{ExtensionRegistry, run_pipeline};
use gantry_host::{Project, ProjectId, Workspace};
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::config::{RawConfiguration, ResolvedConfiguration};
use crate::error::{BuildError, ConfigField, HostFailure, Result, translate};
use crate::tasks::ImageBuildKind;
use crate::wiring::RUNTIME_TARGET_PROPERTY;

/// Observable progress of one [`BuildRunner::execute`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    ConfigResolved,
    ExtensionsApplied,
    EngineInvoked,
    Succeeded,
    Failed,
}

/// Drives one image-build task execution against an engine.
pub struct BuildRunner<'a> {
    engine: &'a dyn ContainerEngine,
    registry: &'a ExtensionRegistry,
    state: RunnerState,
    staging: Option<PathBuf>,
}

impl<'a> BuildRunner<'a> {
    pub fn new(engine: &'a dyn ContainerEngine, registry: &'a ExtensionRegistry) -> Self {
        Self {
            engine,
            registry,
            state: RunnerState::Idle,
            staging: None,
        }
    }

    /// The state the current (or last) execution reached.
    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// The staging directory of the current (or last) execution.
    ///
    /// The directory is removed when the execution finishes, so once
    /// [`execute`](Self::execute) has returned this names a path that no
    /// longer exists.
    pub fn staging_path(&self) -> Option<&Path> {
        self.staging.as_deref()
    }

    fn transition(&mut self, state: RunnerState) {
        debug!(from = ?self.state, to = ?state, "runner transition");
        self.state = state;
    }

    /// Execute one image build for `project`.
    ///
    /// The staging directory and the log forwarder are released exactly
    /// once on every exit path; when both the build and the release fail,
    /// the build error wins and the release failure is logged.
    pub fn execute(
        &mut self,
        ws: &Workspace,
        project: ProjectId,
        config: &RawConfiguration,
        kind: ImageBuildKind,
    ) -> std::result::Result<BuiltImage, HostFailure> {
        self.transition(RunnerState::Idle);

        match self.acquire_and_run(ws, project, config, kind) {
            Ok(image) => {
                self.transition(RunnerState::Succeeded);
                Ok(image)
            }
            Err(error) => {
                self.transition(RunnerState::Failed);
                Err(translate(error))
            }
        }
    }

    fn acquire_and_run(
        &mut self,
        ws: &Workspace,
        project: ProjectId,
        config: &RawConfiguration,
        kind: ImageBuildKind,
    ) -> Result<BuiltImage> {
        let mut staging = TempDirProvider::create()?;
        let mut forwarder = LogForwarder::spawn()?;
        let sink = forwarder.sink();
        self.staging = Some(staging.root().to_path_buf());
        debug!(staging = %staging.root().display(), "staging directory ready");

        let staging_root = staging.root().to_path_buf();
        let built = self.run(ws, project, config, kind, &staging_root, &sink);

        // close the last sender so the forwarder can drain out and join
        drop(sink);
        let released = release(&mut staging, &mut forwarder);

        match (built, released) {
            (Ok(image), Ok(())) => Ok(image),
            (Ok(_), Err(cleanup)) => Err(cleanup),
            (Err(error), Ok(())) => Err(error),
            (Err(error), Err(cleanup)) => {
                warn!(error = %cleanup, "resource release failed after build error");
                Err(error)
            }
        }
    }

    fn run(
        &mut self,
        ws: &Workspace,
        project: ProjectId,
        config: &RawConfiguration,
        kind: ImageBuildKind,
        staging: &Path,
        sink: &dyn LogSink,
    ) -> Result<BuiltImage> {
        let model = ws.project(project);

        let resolved = ResolvedConfiguration::resolve(config, model)?;
        check_base_compatibility(&resolved, model)?;
        fs::create_dir_all(&resolved.cache_dir).map_err(|source| EngineError::CacheDirectory {
            path: resolved.cache_dir.clone(),
            source,
        })?;
        self.transition(RunnerState::ConfigResolved);

        let configuration = run_pipeline(
            self.registry,
            &resolved.extensions,
            resolved.to_build_configuration(),
            model,
            ws.session(),
            sink,
        )?;
        self.transition(RunnerState::ExtensionsApplied);

        let target = build_target(kind, &resolved, model)?;
        if let BuildTarget::Tar { path, .. } = &target {
            prepare_output_dir(path)?;
        }
        self.transition(RunnerState::EngineInvoked);
        sink.accept(LogEvent::lifecycle(format!(
            "Containerizing application to {}...",
            target.image()
        )));

        let image = self.engine.build(&configuration, &target, staging, sink)?;
        sink.accept(LogEvent::lifecycle(format!("Built image {}", image.digest)));
        Ok(image)
    }
}

/// Refuse builds whose base runtime is older than what the project targets.
/// Either side unknown means no check.
fn check_base_compatibility(resolved: &ResolvedConfiguration, project: &Project) -> Result<()> {
    let (Some(base_major), Some(target_major)) = (
        resolved.base_runtime_major,
        project
            .property(RUNTIME_TARGET_PROPERTY)
            .and_then(|value| value.trim().parse::<u32>().ok()),
    ) else {
        return Ok(());
    };

    if base_major < target_major {
        return Err(BuildError::IncompatibleBaseImage {
            base_major,
            target_major,
        });
    }
    Ok(())
}

fn build_target(
    kind: ImageBuildKind,
    resolved: &ResolvedConfiguration,
    project: &Project,
) -> Result<BuildTarget> {
    match kind {
        ImageBuildKind::Registry => {
            let image = resolved.target_image.clone().ok_or_else(|| {
                BuildError::InvalidConfigurationValue {
                    field: ConfigField::TargetImage,
                    value: String::new(),
                    reason: "registry builds need a target image".to_string(),
                }
            })?;
            Ok(BuildTarget::Registry(image))
        }
        ImageBuildKind::Daemon => Ok(BuildTarget::Daemon(fallback_image(resolved, project)?)),
        ImageBuildKind::Tar => Ok(BuildTarget::Tar {
            path: resolved.tar_path.clone(),
            name: fallback_image(resolved, project)?,
        }),
    }
}

/// Daemon and tar builds fall back to naming the image after the project.
fn fallback_image(
    resolved: &ResolvedConfiguration,
    project: &Project,
) -> Result<ImageReference> {
    match &resolved.target_image {
        Some(image) => Ok(image.clone()),
        None => Ok(ImageReference::parse(project.name())?),
    }
}

fn prepare_output_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| {
            BuildError::unexpected(
                format!("failed to create output directory {}", parent.display()),
                e,
            )
        })?;
    }
    Ok(())
}

fn release(staging: &mut TempDirProvider, forwarder: &mut LogForwarder) -> Result<()> {
    let staging_result = staging.close();
    let forwarder_result = forwarder.close();
    staging_result.and(forwarder_result)
}

/// Scoped staging directory for one execution.
struct TempDirProvider {
    dir: Option<TempDir>,
    root: PathBuf,
}

impl TempDirProvider {
    fn create() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("gantry-build-")
            .tempdir()
            .map_err(|e| BuildError::unexpected("failed to create the staging directory", e))?;
        let root = dir.path().to_path_buf();
        Ok(Self {
            dir: Some(dir),
            root,
        })
    }

    /// The staging path. Still valid to name after close; the directory
    /// itself is gone.
    fn root(&self) -> &Path {
        &self.root
    }

    /// Remove the directory. Idempotent; only the first call does work.
    fn close(&mut self) -> Result<()> {
        if let Some(dir) = self.dir.take() {
            dir.close().map_err(|e| {
                BuildError::unexpected("failed to remove the staging directory", e)
            })?;
        }
        Ok(())
    }
}

/// Background thread forwarding engine log events to `tracing`.
///
/// Events funnel through an unbounded channel, so an engine thread never
/// blocks on logging; sends after close are dropped on the floor.
struct LogForwarder {
    sender: Option<mpsc::Sender<LogEvent>>,
    handle: Option<JoinHandle<()>>,
}

impl LogForwarder {
    fn spawn() -> Result<Self> {
        let (sender, receiver) = mpsc::channel::<LogEvent>();
        let handle = thread::Builder::new()
            .name("gantry-log-forwarder".to_string())
            .spawn(move || {
                for event in receiver {
                    forward(&event);
                }
            })
            .map_err(|e| BuildError::unexpected("failed to start the log forwarder", e))?;
        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    /// A sink handle for the engine. All handles must be dropped before
    /// [`LogForwarder::close`] can join.
    fn sink(&self) -> ForwarderSink {
        ForwarderSink {
            sender: self.sender.clone().map(Mutex::new),
        }
    }

    /// Drain the channel and join the thread. Idempotent.
    fn close(&mut self) -> Result<()> {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            handle.join().map_err(|_| BuildError::Unexpected {
                message: "log forwarder thread panicked".to_string(),
                source: None,
            })?;
        }
        Ok(())
    }
}

impl Drop for LogForwarder {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

fn forward(event: &LogEvent) {
    match event.level {
        LogLevel::Error => tracing::error!("{}", event.message),
        LogLevel::Warn => tracing::warn!("{}", event.message),
        LogLevel::Lifecycle | LogLevel::Progress | LogLevel::Info => {
            tracing::info!("{}", event.message);
        }
        LogLevel::Debug => tracing::debug!("{}", event.message),
    }
}

/// Cloneable [`LogSink`] feeding the forwarder channel.
struct ForwarderSink {
    sender: Option<Mutex<mpsc::Sender<LogEvent>>>,
}

impl LogSink for ForwarderSink {
    fn accept(&self, event: LogEvent) {
        // advisory: an event sent after close is dropped, never blocked on
        if let Some(sender) = &self.sender
            && let Ok(sender) = sender.lock()
        {
            let _ = sender.send(event);
        }
    }
}
