//! End-to-end build flow: from configuration on disk through plugin
//! application, evaluation wiring, task-graph ordering, and a runner
//! execution against a scripted engine.

use std::fs;

use gantry_core::wiring::{ARCHIVE_TASK, ASSEMBLE_TASK, COMPILE_TASK};
use gantry_core::{
    BUILD_IMAGE_TASK, BuildRunner, CONFIG_FILE_NAME, GantryPlugin, ImageBuildKind,
    RawConfiguration, REQUIRED_VERSION_PROPERTY, RunnerState, SYNC_MAP_TASK, translate,
};
use gantry_extensions::ExtensionRegistry;
use gantry_host::{Dependency, TaskRef};
use gantry_test_utils::{
    FakeEngine, LabelChainExtension, TestWorkspace, apply_host_plugin, init_tracing,
};

fn extension_registry() -> ExtensionRegistry {
    let mut registry = ExtensionRegistry::new();
    registry.register("chain", Box::new(LabelChainExtension));
    registry
}

#[test]
fn test_config_on_disk_drives_a_registry_build() {
    init_tracing();
    let mut fixture = TestWorkspace::new();
    let app = fixture.add_project("app");
    let cache = fixture.scratch_path("cache");

    {
        let ws = fixture.workspace_mut();
        apply_host_plugin(ws, app, "application").unwrap();
        let config_file = ws.project(app).root().join(CONFIG_FILE_NAME);
        fs::write(
            config_file,
            format!(
                r#"
cache_dir = "{}"

[image]
base = "alpine:3.20"
target = "registry.example.com/team/app:1.0"

[container]
labels = {{ team = "delivery" }}

[[extensions]]
id = "chain"
properties = {{ suffix = "r" }}
"#,
                cache.display()
            ),
        )
        .unwrap();
    }

    let ws = fixture.workspace_mut();
    let config = RawConfiguration::load_for_project(ws.project(app)).unwrap();
    GantryPlugin::apply(ws, app, &config).unwrap();
    GantryPlugin::evaluate_project(ws, app).unwrap();
    let graph = ws.task_graph().unwrap();

    // compile precedes every image consumer in the plan
    let compile = graph.position(&TaskRef::new(app, COMPILE_TASK)).unwrap();
    for consumer in [BUILD_IMAGE_TASK, SYNC_MAP_TASK] {
        let position = graph.position(&TaskRef::new(app, consumer)).unwrap();
        assert!(compile < position, "{consumer} must come after compile");
    }

    let engine = FakeEngine::succeeding();
    let registry = extension_registry();
    let mut runner = BuildRunner::new(&engine, &registry);
    let image = runner
        .execute(fixture.workspace(), app, &config, ImageBuildKind::Registry)
        .unwrap();

    assert_eq!(runner.state(), RunnerState::Succeeded);
    assert_eq!(
        image.tags,
        vec!["registry.example.com/team/app:1.0".to_string()]
    );
    let recorded = engine.last_build().unwrap();
    assert_eq!(recorded.configuration.labels()["team"], "delivery");
    assert_eq!(recorded.configuration.labels()["chain"], "r");
    assert_eq!(recorded.configuration.base_image().repository(), "library/alpine");
    assert_eq!(recorded.configuration.base_image().tag(), Some("3.20"));
}

#[test]
fn test_packaged_mode_survives_boot_repackaging() {
    init_tracing();
    let mut fixture = TestWorkspace::new();
    let app = fixture.add_project("app");
    let ws = fixture.workspace_mut();
    apply_host_plugin(ws, app, "application").unwrap();
    apply_host_plugin(ws, app, "boot").unwrap();

    let config = RawConfiguration::from_toml("[container]\nmode = \"packaged\"").unwrap();
    GantryPlugin::apply(ws, app, &config).unwrap();
    GantryPlugin::evaluate_project(ws, app).unwrap();
    ws.task_graph().unwrap();

    let archive = ws.project(app).tasks().get(ARCHIVE_TASK).unwrap();
    assert!(archive.enabled, "repackaged archive must be re-enabled");
    assert_eq!(archive.artifact_classifier.as_deref(), Some("original"));
    assert!(
        ws.project(app)
            .tasks()
            .get(BUILD_IMAGE_TASK)
            .unwrap()
            .depends_on_task(&TaskRef::new(app, ARCHIVE_TASK))
    );
}

#[test]
fn test_cross_project_assemble_ordering() {
    init_tracing();
    let mut fixture = TestWorkspace::new();
    let app = fixture.add_project("app");
    let lib = fixture.add_project("lib");
    let ws = fixture.workspace_mut();
    apply_host_plugin(ws, app, "application").unwrap();
    ws.project_mut(app)
        .add_dependency("implementation", Dependency::Project(lib));

    GantryPlugin::apply(ws, app, &RawConfiguration::default()).unwrap();
    GantryPlugin::evaluate_project(ws, app).unwrap();
    ws.evaluate(lib).unwrap();

    // capability arrives after evaluation; the queued listener wires it
    apply_host_plugin(ws, lib, "base").unwrap();
    let graph = ws.task_graph().unwrap();

    let assemble = graph.position(&TaskRef::new(lib, ASSEMBLE_TASK)).unwrap();
    let build_image = graph.position(&TaskRef::new(app, BUILD_IMAGE_TASK)).unwrap();
    assert!(
        assemble < build_image,
        "dependency assemble must be planned before the image build"
    );
}

#[test]
fn test_version_gate_stops_the_build() {
    init_tracing();
    let mut fixture = TestWorkspace::new();
    let app = fixture.add_project("app");
    let ws = fixture.workspace_mut();
    ws.session_mut()
        .set_property(REQUIRED_VERSION_PROPERTY, "99.0");

    let err = GantryPlugin::apply(ws, app, &RawConfiguration::default()).unwrap_err();
    let failure = translate(err);

    assert_eq!(
        failure.message(),
        format!(
            "gantry version is {} but is required to be at least 99.0",
            TestWorkspace::TOOL_VERSION
        )
    );
    assert!(
        failure
            .suggestion()
            .unwrap()
            .contains(REQUIRED_VERSION_PROPERTY)
    );
    assert!(ws.project(app).tasks().is_empty());
}

#[test]
fn test_introspection_reflects_the_model() {
    init_tracing();
    let mut fixture = TestWorkspace::new();
    let app = fixture.add_project("app");
    let lib = fixture.add_project("lib");
    let ws = fixture.workspace_mut();
    let app_src = ws.project(app).root().join("src");
    ws.project_mut(app).add_source_root(&app_src);
    ws.project_mut(app)
        .add_dependency("implementation", Dependency::Project(lib));

    let config = RawConfiguration::default();
    let map = gantry_core::sync_map(ws, app, &config).unwrap();
    let json: serde_json::Value = serde_json::from_str(&map.to_json().unwrap()).unwrap();
    assert_eq!(json["project"], "app");
    assert_eq!(json["entries"][0]["destination"], "/app/src");

    let files = gantry_core::input_files(ws, app).files;
    assert!(files.contains(&app_src));
    assert!(files.contains(&ws.project(lib).build_file().to_path_buf()));

    let report = gantry_core::init_report(ws, app, &config);
    assert_eq!(report.image, "app");
}
