use crate::helper::{Call, TestRuntime};
use dockertask::{ContainerSnapshot, ContainerState, Task, TaskConfiguration, TaskKind};
use std::sync::Arc;
use test_log::test;

fn generic(runtime: &Arc<TestRuntime>) -> Task {
    Task::new(
        TaskKind::Generic,
        "/tmp/test",
        TaskConfiguration::new().with_image("alpine"),
        runtime.controller(),
        "host",
    )
    .unwrap()
}

fn lifecycle(runtime: &TestRuntime) -> Vec<&'static str> {
    runtime
        .calls()
        .iter()
        .map(|c| match c {
            Call::Create(request) => {
                assert_eq!(request.name, "Task");
                "create"
            }
            Call::Connect { container_id, .. } => {
                assert_eq!(container_id, "Task-id");
                "connect"
            }
            Call::Start(id) => {
                assert_eq!(id, "Task-id");
                "start"
            }
            Call::Stop(id) => {
                assert_eq!(id, "Task-id");
                "stop"
            }
            Call::Inspect(id) => {
                assert_eq!(id, "Task-id");
                "inspect"
            }
            Call::Remove(id) => {
                assert_eq!(id, "Task-id");
                "remove"
            }
        })
        .collect()
}

#[test(tokio::test)]
async fn test_scoped_releases_container_after_body() {
    let runtime = TestRuntime::new();
    runtime.set_snapshot(ContainerSnapshot {
        status: Some(ContainerState::Running),
        exit_code: None,
    });

    let status = generic(&runtime)
        .scoped(|ctx| async move {
            assert_eq!(ctx.name(), "Task");
            assert_eq!(ctx.container_id(), "Task-id");
            assert!(ctx.report().is_complete());
            ctx.inspect().await.unwrap().status
        })
        .await
        .unwrap();

    assert_eq!(status, Some(ContainerState::Running));
    assert_eq!(
        lifecycle(&runtime),
        vec!["create", "start", "inspect", "stop", "remove"]
    );
}

#[test(tokio::test)]
async fn test_scoped_releases_container_when_body_panics() {
    let runtime = TestRuntime::new();
    let task = generic(&runtime);

    let result = tokio::spawn(task.scoped(|_ctx| async move {
        panic!("test body failure");
    }))
    .await;

    let err = result.unwrap_err();
    assert!(err.is_panic(), "panic in body should be resumed");
    assert_eq!(lifecycle(&runtime), vec!["create", "start", "stop", "remove"]);
}

// A container that never started is removed without being stopped.
#[test(tokio::test)]
async fn test_scoped_skips_stop_when_start_failed() {
    let runtime = TestRuntime::new();
    runtime.fail_start();

    let started = generic(&runtime)
        .scoped(|ctx| async move { ctx.report().is_started() })
        .await
        .unwrap();

    assert!(!started);
    assert_eq!(lifecycle(&runtime), vec!["create", "start", "remove"]);
}
