//! Host-facing failure surfaces.
//!
//! Every failure that reaches the host is a translated `HostFailure`;
//! these tests pin the messages and remediation text users actually see.

use std::fs;

use gantry_core::{
    BuildError, BuildRunner, GantryPlugin, ImageBuildKind, RawConfiguration, RunnerState,
    translate, wiring,
};
use gantry_extensions::ExtensionRegistry;
use gantry_test_utils::{
    FailingExtension, FakeEngine, LabelChainExtension, TestWorkspace, apply_host_plugin,
    init_tracing,
};
use tempfile::TempDir;

fn extension_registry() -> ExtensionRegistry {
    let mut registry = ExtensionRegistry::new();
    registry.register("chain", Box::new(LabelChainExtension));
    registry.register("refuse", Box::new(FailingExtension));
    registry
}

fn registry_config(fixture: &TestWorkspace, extra: &str) -> RawConfiguration {
    let toml = format!(
        "cache_dir = \"{}\"\n\n[image]\nbase = \"alpine:3.20\"\ntarget = \"registry.example.com/team/app\"\n{extra}",
        fixture.scratch_path("cache").display()
    );
    RawConfiguration::from_toml(&toml).unwrap()
}

#[test]
fn test_missing_capability_names_the_plugin_to_apply() {
    init_tracing();
    let mut fixture = TestWorkspace::new();
    let app = fixture.add_project("app");
    let ws = fixture.workspace_mut();

    GantryPlugin::apply(ws, app, &RawConfiguration::default()).unwrap();
    let failure = GantryPlugin::evaluate_project(ws, app).unwrap_err();

    assert_eq!(
        failure.message(),
        "could not find task 'compile' on project 'app'"
    );
    assert_eq!(
        failure.suggestion(),
        Some("perhaps you did not apply the 'application' plugin?")
    );
}

#[test]
fn test_invalid_app_root_is_reported_with_its_field() {
    init_tracing();
    let mut fixture = TestWorkspace::new();
    let app = fixture.add_project("app");
    let config = registry_config(&fixture, "\n[container]\napp_root = \"app\"");
    let engine = FakeEngine::succeeding();
    let registry = extension_registry();
    let mut runner = BuildRunner::new(&engine, &registry);

    let failure = runner
        .execute(fixture.workspace(), app, &config, ImageBuildKind::Registry)
        .unwrap_err();

    assert!(failure.message().contains("invalid container.app_root: 'app'"));
    assert!(failure.suggestion().unwrap().contains("absolute Unix-style"));
    assert_eq!(engine.invocations(), 0);
}

#[test]
fn test_extension_failure_reports_its_position() {
    init_tracing();
    let mut fixture = TestWorkspace::new();
    let app = fixture.add_project("app");
    let config = registry_config(
        &fixture,
        "\n[[extensions]]\nid = \"chain\"\n\n[[extensions]]\nid = \"refuse\"\nproperties = { message = \"boom\" }",
    );
    let engine = FakeEngine::succeeding();
    let registry = extension_registry();
    let mut runner = BuildRunner::new(&engine, &registry);

    let failure = runner
        .execute(fixture.workspace(), app, &config, ImageBuildKind::Registry)
        .unwrap_err();

    assert_eq!(
        failure.message(),
        "extension 'refuse' at position 1 failed: boom"
    );
    assert!(failure.suggestion().unwrap().contains("[[extensions]]"));
    assert_eq!(runner.state(), RunnerState::Failed);
}

#[test]
fn test_unregistered_extension_id_fails_the_pipeline() {
    init_tracing();
    let mut fixture = TestWorkspace::new();
    let app = fixture.add_project("app");
    let config = registry_config(&fixture, "\n[[extensions]]\nid = \"ghost\"");
    let engine = FakeEngine::succeeding();
    let registry = extension_registry();
    let mut runner = BuildRunner::new(&engine, &registry);

    let failure = runner
        .execute(fixture.workspace(), app, &config, ImageBuildKind::Registry)
        .unwrap_err();

    assert!(failure.message().contains("'ghost'"));
    assert!(failure.message().contains("not registered"));
    assert_eq!(engine.invocations(), 0);
}

#[test]
fn test_engine_failure_passes_through_untranslated_underneath() {
    init_tracing();
    let mut fixture = TestWorkspace::new();
    let app = fixture.add_project("app");
    let config = registry_config(&fixture, "");
    let engine = FakeEngine::failing("blob upload rejected");
    let registry = extension_registry();
    let mut runner = BuildRunner::new(&engine, &registry);

    let failure = runner
        .execute(fixture.workspace(), app, &config, ImageBuildKind::Registry)
        .unwrap_err();

    assert_eq!(failure.message(), "build failed: blob upload rejected");
    assert_eq!(failure.suggestion(), None);
    assert!(matches!(failure.build_error(), BuildError::Engine(_)));
}

#[test]
fn test_incompatible_base_suggests_a_newer_image() {
    init_tracing();
    let mut fixture = TestWorkspace::new();
    let app = fixture.add_project("app");
    fixture
        .workspace_mut()
        .project_mut(app)
        .set_property(wiring::RUNTIME_TARGET_PROPERTY, "17");
    let config = RawConfiguration::from_toml("[image]\nbase = \"eclipse-temurin:11-jre\"")
        .unwrap();
    let engine = FakeEngine::succeeding();
    let registry = extension_registry();
    let mut runner = BuildRunner::new(&engine, &registry);

    let failure = runner
        .execute(fixture.workspace(), app, &config, ImageBuildKind::Daemon)
        .unwrap_err();

    assert_eq!(
        failure.suggestion(),
        Some("choose a base image at major version 17 or newer")
    );
}

#[test]
fn test_config_file_errors_point_at_the_file() {
    init_tracing();
    let temp = TempDir::new().unwrap();

    let missing = temp.path().join("gantry.toml");
    let err = RawConfiguration::load(&missing).unwrap_err();
    let failure = translate(err);
    assert!(failure.message().contains("failed to read gantry configuration"));
    assert_eq!(
        failure.suggestion(),
        Some("check that the file exists and is readable")
    );

    fs::write(&missing, "image = not toml").unwrap();
    let err = RawConfiguration::load(&missing).unwrap_err();
    let failure = translate(err);
    assert!(failure.message().contains("failed to parse gantry configuration"));
    assert_eq!(
        failure.suggestion(),
        Some("check the TOML syntax of the gantry configuration")
    );
}

#[test]
fn test_sync_map_refuses_packaged_mode() {
    init_tracing();
    let mut fixture = TestWorkspace::new();
    let app = fixture.add_project("app");
    let config = RawConfiguration::from_toml("[container]\nmode = \"packaged\"").unwrap();

    let err = gantry_core::sync_map(fixture.workspace(), app, &config).unwrap_err();
    let failure = translate(err);

    assert!(failure.message().contains("sync map requires exploded mode"));
}
