//! Task names and the declarative registration table.
//!
//! The three public image-build tasks carry the "gantry" group so hosts list
//! them; the underscore-prefixed helpers are groupless and stay hidden.

/// Builds to a registry.
pub const BUILD_IMAGE_TASK: &str = "gantry";
/// Builds into the local daemon.
pub const BUILD_DAEMON_TASK: &str = "gantryDaemonBuild";
/// Builds to a tarball on disk.
pub const BUILD_TAR_TASK: &str = "gantryBuildTar";
/// Hidden: prints the dev-loop sync map.
pub const SYNC_MAP_TASK: &str = "_gantrySyncMap";
/// Hidden: prints the build's input files.
pub const FILES_TASK: &str = "_gantryFiles";
/// Hidden: prints the init report.
pub const INIT_TASK: &str = "_gantryInit";
/// Hidden: fails when the version gate does.
pub const FAIL_IF_OUT_OF_DATE_TASK: &str = "_gantryFailIfOutOfDate";

/// Group label shown by hosts for the public tasks.
pub const TASK_GROUP: &str = "gantry";

/// What a registered gantry task does when the host executes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    BuildImage,
    BuildDaemon,
    BuildTar,
    SyncMap,
    Files,
    Init,
    FailIfOutOfDate,
}

/// One row of the registration table.
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec {
    pub name: &'static str,
    pub kind: TaskKind,
    pub group: Option<&'static str>,
    pub description: &'static str,
}

/// Every task the plugin registers, in registration order.
pub const TASK_TABLE: [TaskSpec; 7] = [
    TaskSpec {
        name: BUILD_IMAGE_TASK,
        kind: TaskKind::BuildImage,
        group: Some(TASK_GROUP),
        description: "Builds a container image to a registry.",
    },
    TaskSpec {
        name: BUILD_DAEMON_TASK,
        kind: TaskKind::BuildDaemon,
        group: Some(TASK_GROUP),
        description: "Builds a container image to the local daemon.",
    },
    TaskSpec {
        name: BUILD_TAR_TASK,
        kind: TaskKind::BuildTar,
        group: Some(TASK_GROUP),
        description: "Builds a container image to a tarball.",
    },
    TaskSpec {
        name: SYNC_MAP_TASK,
        kind: TaskKind::SyncMap,
        group: None,
        description: "Prints the file sync map for the dev loop.",
    },
    TaskSpec {
        name: FILES_TASK,
        kind: TaskKind::Files,
        group: None,
        description: "Prints the files the image build depends on.",
    },
    TaskSpec {
        name: INIT_TASK,
        kind: TaskKind::Init,
        group: None,
        description: "Prints project and target image information.",
    },
    TaskSpec {
        name: FAIL_IF_OUT_OF_DATE_TASK,
        kind: TaskKind::FailIfOutOfDate,
        group: None,
        description: "Fails if the running gantry version is older than required.",
    },
];

/// The public image-build tasks, the targets of all wiring edges.
pub const IMAGE_TASKS: [&str; 3] = [BUILD_IMAGE_TASK, BUILD_DAEMON_TASK, BUILD_TAR_TASK];

/// The image-producing subset of [`TaskKind`], the only kinds the build
/// runner executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageBuildKind {
    Registry,
    Daemon,
    Tar,
}

impl ImageBuildKind {
    /// The registered task name this kind executes under.
    pub fn task_name(self) -> &'static str {
        match self {
            Self::Registry => BUILD_IMAGE_TASK,
            Self::Daemon => BUILD_DAEMON_TASK,
            Self::Tar => BUILD_TAR_TASK,
        }
    }
}
