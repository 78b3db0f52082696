//! Scripted [`ContainerEngine`] double and log capture.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use gantry_engine::{
    BuildConfiguration, BuildTarget, BuiltImage, ContainerEngine, LogEvent, LogSink,
};

type BuildScript = Box<
    dyn Fn(&BuildConfiguration, &BuildTarget, &Path) -> gantry_engine::Result<BuiltImage>
        + Send
        + Sync,
>;

/// One recorded [`ContainerEngine::build`] invocation.
#[derive(Clone)]
pub struct RecordedBuild {
    pub configuration: BuildConfiguration,
    pub target: BuildTarget,
    pub staging: PathBuf,
}

/// An engine double that records every invocation and answers from a
/// script.
///
/// # Example
///
/// ```rust
/// use gantry_test_utils::FakeEngine;
///
/// let engine = FakeEngine::succeeding();
/// assert_eq!(engine.invocations(), 0);
/// ```
pub struct FakeEngine {
    script: BuildScript,
    builds: Mutex<Vec<RecordedBuild>>,
}

impl FakeEngine {
    /// An engine whose builds succeed with a canned image.
    pub fn succeeding() -> Self {
        Self::with_script(|_, target, _| {
            Ok(BuiltImage {
                image_id: "sha256:4a1f0e6b".to_string(),
                digest: "sha256:b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
                    .to_string(),
                tags: vec![target.image().to_string()],
            })
        })
    }

    /// An engine whose builds fail with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::with_script(move |_, _, _| {
            Err(gantry_engine::Error::Build {
                message: message.clone(),
                source: None,
            })
        })
    }

    /// An engine answering from an arbitrary script.
    pub fn with_script(
        script: impl Fn(&BuildConfiguration, &BuildTarget, &Path) -> gantry_engine::Result<BuiltImage>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            script: Box::new(script),
            builds: Mutex::new(Vec::new()),
        }
    }

    /// Number of builds the engine ran.
    pub fn invocations(&self) -> usize {
        self.builds.lock().expect("FakeEngine: poisoned").len()
    }

    /// The most recent build, if any.
    pub fn last_build(&self) -> Option<RecordedBuild> {
        self.builds
            .lock()
            .expect("FakeEngine: poisoned")
            .last()
            .cloned()
    }
}

impl ContainerEngine for FakeEngine {
    fn build(
        &self,
        configuration: &BuildConfiguration,
        target: &BuildTarget,
        staging: &Path,
        log: &dyn LogSink,
    ) -> gantry_engine::Result<BuiltImage> {
        log.accept(LogEvent::lifecycle(format!("Building {}...", target.image())));
        log.accept(LogEvent::progress("layers 1/3"));
        self.builds
            .lock()
            .expect("FakeEngine: poisoned")
            .push(RecordedBuild {
                configuration: configuration.clone(),
                target: target.clone(),
                staging: staging.to_path_buf(),
            });
        (self.script)(configuration, target, staging)
    }
}

/// A [`LogSink`] capturing every event for assertion.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<LogEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything accepted so far.
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().expect("RecordingSink: poisoned").clone()
    }

    /// Messages only, in arrival order.
    pub fn messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .map(|event| event.message)
            .collect()
    }

    /// Whether any accepted message contains `needle`.
    pub fn saw(&self, needle: &str) -> bool {
        self.events()
            .iter()
            .any(|event| event.message.contains(needle))
    }
}

impl LogSink for RecordingSink {
    fn accept(&self, event: LogEvent) {
        self.events
            .lock()
            .expect("RecordingSink: poisoned")
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use gantry_engine::{ImageReference, LogLevel};

    use super::*;

    #[test]
    fn test_fake_engine_records_and_scripts() {
        let engine = FakeEngine::failing("no daemon");
        let configuration = BuildConfiguration::from_base(
            ImageReference::parse("alpine:3.20").unwrap(),
        );
        let target = BuildTarget::Daemon(ImageReference::parse("library/app").unwrap());
        let staging = tempfile::TempDir::new().unwrap();
        let sink = RecordingSink::new();

        let err = engine
            .build(&configuration, &target, staging.path(), &sink)
            .unwrap_err();

        assert_eq!(err.to_string(), "build failed: no daemon");
        assert_eq!(engine.invocations(), 1);
        let recorded = engine.last_build().unwrap();
        assert!(recorded.target == target);
        assert_eq!(recorded.staging, staging.path());
        assert!(sink.saw("Building"));
        assert_eq!(sink.events()[1].level, LogLevel::Progress);
    }
}
