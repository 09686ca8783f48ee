use crate::helper::{Call, TestRuntime};
use dockertask::{Task, TaskConfiguration, TaskError, TaskKind, TaskState};
use std::net::Ipv4Addr;
use test_log::test;

fn task(runtime: &std::sync::Arc<TestRuntime>, net_mode: &str) -> Task {
    let config = TaskConfiguration::new()
        .with_image("alpine")
        .with_ip(Ipv4Addr::new(10, 0, 0, 5));
    Task::new(
        TaskKind::Generic,
        "/tmp/test",
        config,
        runtime.controller(),
        net_mode,
    )
    .unwrap()
}

#[test(tokio::test)]
async fn test_named_network_is_joined_with_static_ip() {
    let runtime = TestRuntime::new();
    let mut task = task(&runtime, "mynet");

    let report = task.run().await.unwrap();
    assert!(report.is_complete());

    let calls = runtime.calls();
    assert_eq!(calls.len(), 3);
    match &calls[0] {
        Call::Create(request) => assert_eq!(request.network_mode, "bridge"),
        other => panic!("expected create, got {:?}", other),
    }
    match &calls[1] {
        Call::Connect {
            network,
            container_id,
            ipv4,
        } => {
            assert_eq!(network, "mynet");
            assert_eq!(container_id, "Task-id");
            assert_eq!(*ipv4, Ipv4Addr::new(10, 0, 0, 5));
        }
        other => panic!("expected connect, got {:?}", other),
    }
    assert!(matches!(calls[2], Call::Start(_)));

    task.remove().await.unwrap();
}

// A failing connect is logged and reported, the container is still started.
#[test(tokio::test)]
async fn test_connect_failure_does_not_abort_run() {
    let runtime = TestRuntime::new();
    runtime.fail_connect();
    let mut task = task(&runtime, "mynet");

    let report = task.run().await.unwrap();
    assert!(report.is_started());
    assert!(!report.is_complete());
    assert!(matches!(report.connect, Some(TaskError::Daemon(_))));
    assert_eq!(task.state(), TaskState::Running);
    assert!(matches!(runtime.calls().last(), Some(Call::Start(_))));

    task.remove().await.unwrap();
}

#[test(tokio::test)]
async fn test_host_network_never_connects() {
    let runtime = TestRuntime::new();
    let mut task = task(&runtime, "host");

    task.run().await.unwrap();
    assert!(!runtime
        .calls()
        .iter()
        .any(|c| matches!(c, Call::Connect { .. })));

    task.remove().await.unwrap();
}

#[test(tokio::test)]
async fn test_connect_and_start_failures_are_both_reported() {
    let runtime = TestRuntime::new();
    runtime.fail_connect();
    runtime.fail_start();
    let mut task = task(&runtime, "mynet");

    let report = task.run().await.unwrap();
    assert!(report.connect.is_some());
    assert!(report.start.is_some());
    assert_eq!(task.state(), TaskState::Created);

    task.remove().await.unwrap();
}
