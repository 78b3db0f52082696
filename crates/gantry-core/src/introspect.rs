//! Dev-loop introspection payloads behind the underscore-prefixed tasks.
//!
//! External watch-and-sync tooling consumes these as JSON: the sync map
//! tells it where changed files land in the container, the input files
//! tell it what to watch, and the init report seeds a fresh setup.

use std::collections::{BTreeSet, VecDeque};
use std::path::PathBuf;

use gantry_engine::ContainerizingMode;
use gantry_host::{ProjectId, Workspace};
use serde::Serialize;

use crate::config::{self, RawConfiguration};
use crate::error::{BuildError, ConfigField, Result};

/// One source root mapped into the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncMapEntry {
    pub source: PathBuf,
    pub destination: String,
}

/// Exploded-mode mapping of watchable source roots to container paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncMap {
    pub project: String,
    pub entries: Vec<SyncMapEntry>,
}

/// Everything an image build for a project reads from disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputFiles {
    pub files: Vec<PathBuf>,
}

/// Project identity and the image a fresh setup should target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitReport {
    pub project: String,
    pub image: String,
}

impl SyncMap {
    pub fn to_json(&self) -> Result<String> {
        to_json(self)
    }
}

impl InputFiles {
    pub fn to_json(&self) -> Result<String> {
        to_json(self)
    }
}

impl InitReport {
    pub fn to_json(&self) -> Result<String> {
        to_json(self)
    }
}

/// Map each source root of `project` to its in-container destination.
///
/// Synchronizing individual files only makes sense when the application is
/// laid out exploded; packaged mode is rejected.
pub fn sync_map(
    ws: &Workspace,
    project: ProjectId,
    config: &RawConfiguration,
) -> Result<SyncMap> {
    let mode = config::parse_mode(config.container.mode.as_deref())?;
    if mode == ContainerizingMode::Packaged {
        return Err(BuildError::InvalidConfigurationValue {
            field: ConfigField::ContainerizingMode,
            value: "packaged".to_string(),
            reason: "the sync map requires exploded mode".to_string(),
        });
    }
    let app_root = config::resolve_app_root(config.container.app_root.as_deref())?;

    let model = ws.project(project);
    let mut entries = Vec::new();
    for root in model.source_roots() {
        let Some(name) = root.file_name() else {
            continue;
        };
        entries.push(SyncMapEntry {
            source: root.clone(),
            destination: app_root.join(&name.to_string_lossy()).as_str().to_string(),
        });
    }

    Ok(SyncMap {
        project: model.name().to_string(),
        entries,
    })
}

/// Collect the build files and source roots of `project` and every
/// in-workspace dependency it can reach, deduplicated and sorted.
pub fn input_files(ws: &Workspace, project: ProjectId) -> InputFiles {
    let mut files = BTreeSet::new();
    let mut visited = BTreeSet::new();
    let mut queue = VecDeque::from([project]);

    while let Some(id) = queue.pop_front() {
        if !visited.insert(id) {
            continue;
        }
        let model = ws.project(id);
        files.insert(model.build_file().to_path_buf());
        files.extend(model.source_roots().iter().cloned());
        queue.extend(model.project_dependencies());
    }

    InputFiles {
        files: files.into_iter().collect(),
    }
}

/// Summarize `project` for setup tooling, suggesting a target image.
pub fn init_report(ws: &Workspace, project: ProjectId, config: &RawConfiguration) -> InitReport {
    let model = ws.project(project);
    let image = config
        .image
        .target
        .clone()
        .unwrap_or_else(|| model.name().to_string());

    InitReport {
        project: model.name().to_string(),
        image,
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| BuildError::unexpected("failed to serialize introspection output", e))
}

#[cfg(test)]
mod tests {
    use gantry_host::{Dependency, Session};

    use super::*;

    fn workspace() -> Workspace {
        Workspace::new(Session::new("0.0.0"))
    }

    #[test]
    fn test_sync_map_places_roots_under_the_app_root() {
        let mut ws = workspace();
        let app = ws.create_project("app", "/ws/app");
        ws.project_mut(app).add_source_root("/ws/app/src/classes");
        ws.project_mut(app).add_source_root("/ws/app/src/resources");

        let map = sync_map(&ws, app, &RawConfiguration::default()).unwrap();

        assert_eq!(map.project, "app");
        assert_eq!(
            map.entries,
            vec![
                SyncMapEntry {
                    source: PathBuf::from("/ws/app/src/classes"),
                    destination: "/app/classes".to_string(),
                },
                SyncMapEntry {
                    source: PathBuf::from("/ws/app/src/resources"),
                    destination: "/app/resources".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_sync_map_honors_a_custom_app_root() {
        let mut ws = workspace();
        let app = ws.create_project("app", "/ws/app");
        ws.project_mut(app).add_source_root("/ws/app/src/classes");

        let config =
            RawConfiguration::from_toml("[container]\napp_root = \"/srv/app\"").unwrap();
        let map = sync_map(&ws, app, &config).unwrap();

        assert_eq!(map.entries[0].destination, "/srv/app/classes");
    }

    #[test]
    fn test_sync_map_rejects_packaged_mode() {
        let mut ws = workspace();
        let app = ws.create_project("app", "/ws/app");

        let config = RawConfiguration::from_toml("[container]\nmode = \"packaged\"").unwrap();
        let err = sync_map(&ws, app, &config).unwrap_err();

        match err {
            BuildError::InvalidConfigurationValue { field, value, .. } => {
                assert_eq!(field, ConfigField::ContainerizingMode);
                assert_eq!(value, "packaged");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_sync_map_serializes_to_json() {
        let mut ws = workspace();
        let app = ws.create_project("app", "/ws/app");
        ws.project_mut(app).add_source_root("/ws/app/src/classes");

        let json = sync_map(&ws, app, &RawConfiguration::default())
            .unwrap()
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["project"], "app");
        assert_eq!(value["entries"][0]["destination"], "/app/classes");
    }

    #[test]
    fn test_input_files_walk_in_workspace_dependencies() {
        let mut ws = workspace();
        let app = ws.create_project("app", "/ws/app");
        let lib = ws.create_project("lib", "/ws/lib");
        ws.project_mut(app).add_source_root("/ws/app/src");
        ws.project_mut(lib).add_source_root("/ws/lib/src");
        ws.project_mut(app)
            .add_dependency("runtime", Dependency::Project(lib));
        ws.project_mut(app).add_dependency(
            "runtime",
            Dependency::External {
                coordinate: "org.example:thing:1.0".to_string(),
            },
        );

        let files = input_files(&ws, app).files;

        assert!(files.contains(&ws.project(app).build_file().to_path_buf()));
        assert!(files.contains(&ws.project(lib).build_file().to_path_buf()));
        assert!(files.contains(&PathBuf::from("/ws/app/src")));
        assert!(files.contains(&PathBuf::from("/ws/lib/src")));
    }

    #[test]
    fn test_input_files_visit_diamonds_once() {
        let mut ws = workspace();
        let app = ws.create_project("app", "/ws/app");
        let left = ws.create_project("left", "/ws/left");
        let right = ws.create_project("right", "/ws/right");
        let shared = ws.create_project("shared", "/ws/shared");
        ws.project_mut(shared).add_source_root("/ws/shared/src");
        for (from, to) in [(app, left), (app, right), (left, shared), (right, shared)] {
            ws.project_mut(from)
                .add_dependency("runtime", Dependency::Project(to));
        }

        let files = input_files(&ws, app).files;

        let shared_roots = files
            .iter()
            .filter(|path| *path == &PathBuf::from("/ws/shared/src"))
            .count();
        assert_eq!(shared_roots, 1);
        assert!(files.contains(&ws.project(shared).build_file().to_path_buf()));
    }

    #[test]
    fn test_init_report_prefers_the_configured_target() {
        let mut ws = workspace();
        let app = ws.create_project("app", "/ws/app");

        let config =
            RawConfiguration::from_toml("[image]\ntarget = \"registry.example.com/team/app\"")
                .unwrap();
        let report = init_report(&ws, app, &config);

        assert_eq!(report.project, "app");
        assert_eq!(report.image, "registry.example.com/team/app");
    }

    #[test]
    fn test_init_report_falls_back_to_the_project_name() {
        let mut ws = workspace();
        let app = ws.create_project("app", "/ws/app");

        let report = init_report(&ws, app, &RawConfiguration::default());

        assert_eq!(report.image, "app");
        let value: serde_json::Value =
            serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["image"], "app");
    }
}
