//! Host model lifecycle tests through the public API.

use pretty_assertions::assert_eq;

use gantry_host::{Dependency, Error, Session, TaskRef, Workspace};

fn workspace() -> Workspace {
    Workspace::new(Session::new("8.4"))
}

#[test]
fn test_capability_listener_wires_cross_project_prerequisite() {
    let mut ws = workspace();
    let app = ws.create_project("app", "/tmp/demo/app");
    let lib = ws.create_project("lib", "/tmp/demo/lib");
    ws.project_mut(app)
        .add_dependency("implementation", Dependency::Project(lib));

    ws.project_mut(lib).tasks_mut().register("assemble").unwrap();
    ws.project_mut(app).tasks_mut().register("image").unwrap();

    // The edge is only safe to add once lib can actually assemble; defer it
    // until the capability shows up.
    ws.when_plugin_applied(
        lib,
        "base",
        Box::new(move |ws| {
            let prereq = TaskRef::new(lib, "assemble");
            ws.project_mut(app)
                .tasks_mut()
                .configure("image", move |t| t.add_dependency(prereq))?;
            Ok(())
        }),
    )
    .unwrap();

    ws.apply_plugin(lib, "base").unwrap();
    ws.evaluate(app).unwrap();
    ws.evaluate(lib).unwrap();

    let graph = ws.task_graph().unwrap();
    assert_eq!(graph.len(), 2);
    let assemble = TaskRef::new(lib, "assemble");
    let image = TaskRef::new(app, "image");
    assert!(graph.position(&assemble).unwrap() < graph.position(&image).unwrap());
    assert!(ws
        .project(app)
        .tasks()
        .get("image")
        .unwrap()
        .depends_on_task(&assemble));
}

#[test]
fn test_after_evaluate_sees_final_project_state() {
    let mut ws = workspace();
    let app = ws.create_project("app", "/tmp/demo/app");
    ws.project_mut(app).set_property("runtime.target", "7");

    ws.project_mut(app)
        .after_evaluate(Box::new(|ws, id| {
            let target = ws
                .project(id)
                .property("runtime.target")
                .unwrap_or("unset")
                .to_string();
            ws.project_mut(id).tasks_mut().register("probe")?;
            ws.project_mut(id)
                .tasks_mut()
                .configure("probe", move |t| t.description = Some(target))?;
            Ok(())
        }))
        .unwrap();

    ws.evaluate(app).unwrap();
    ws.task_graph().unwrap();

    assert_eq!(
        ws.project(app).tasks().get("probe").unwrap().description.as_deref(),
        Some("7")
    );
}

#[test]
fn test_qualified_names_in_missing_dependency_errors() {
    let mut ws = workspace();
    let app = ws.create_project("app", "/tmp/demo/app");
    ws.project_mut(app).tasks_mut().register("image").unwrap();
    let ghost = TaskRef::new(app, "phantomAssemble");
    ws.project_mut(app)
        .tasks_mut()
        .configure("image", move |t| t.add_dependency(ghost))
        .unwrap();
    ws.evaluate(app).unwrap();

    let err = ws.task_graph().unwrap_err();
    assert_eq!(
        err.to_string(),
        "task 'app:image' depends on unknown task 'app:phantomAssemble'"
    );
}

#[test]
fn test_session_and_project_properties_are_separate() {
    let mut ws = workspace();
    let app = ws.create_project("app", "/tmp/demo/app");

    ws.session_mut().set_property("gantry.requiredVersion", "0.1.0");
    ws.project_mut(app).set_property("runtime.target", "11");

    assert_eq!(
        ws.session().property("gantry.requiredVersion"),
        Some("0.1.0")
    );
    assert_eq!(ws.project(app).property("gantry.requiredVersion"), None);
    assert_eq!(ws.project(app).property("runtime.target"), Some("11"));
}

#[test]
fn test_listener_failure_surfaces_as_plugin_callback_error() {
    let mut ws = workspace();
    let app = ws.create_project("app", "/tmp/demo/app");

    ws.when_plugin_applied(app, "web", Box::new(|_| Err("no such task".into())))
        .unwrap();
    let err = ws.apply_plugin(app, "web").unwrap_err();
    assert!(matches!(err, Error::PluginCallback { .. }));
    assert_eq!(
        err.to_string(),
        "capability listener for plugin 'web' on project 'app' failed: no such task"
    );
}
