use async_trait::async_trait;
use dockertask::{ContainerRequest, ContainerRuntime, ContainerSnapshot, Controller, TaskError};
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::time::Instant;

#[derive(Clone, Debug)]
pub enum Call {
    Create(ContainerRequest),
    Connect {
        network: String,
        container_id: String,
        ipv4: Ipv4Addr,
    },
    Start(String),
    Stop(String),
    Inspect(String),
    Remove(String),
}

#[derive(Debug, Default)]
struct Failures {
    connect: bool,
    start: bool,
}

/// Runtime that records every call together with the instant it was made.
#[derive(Debug, Default)]
pub struct TestRuntime {
    calls: Mutex<Vec<(Instant, Call)>>,
    failures: Mutex<Failures>,
    snapshot: Mutex<ContainerSnapshot>,
}

impl TestRuntime {
    pub fn new() -> Arc<TestRuntime> {
        Arc::new(TestRuntime::default())
    }

    pub fn controller(self: &Arc<Self>) -> Controller {
        Controller::from_shared(self.clone())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, c)| c.clone())
            .collect()
    }

    pub fn timed_calls(&self) -> Vec<(Instant, Call)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_connect(&self) {
        self.failures.lock().unwrap().connect = true;
    }

    pub fn fail_start(&self) {
        self.failures.lock().unwrap().start = true;
    }

    pub fn set_snapshot(&self, snapshot: ContainerSnapshot) {
        *self.snapshot.lock().unwrap() = snapshot;
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push((Instant::now(), call));
    }
}

#[async_trait]
impl ContainerRuntime for TestRuntime {
    async fn create_container(&self, request: ContainerRequest) -> Result<String, TaskError> {
        let id = format!("{}-id", request.name);
        self.record(Call::Create(request));
        Ok(id)
    }

    async fn connect_network(
        &self,
        network: &str,
        container_id: &str,
        ipv4: Ipv4Addr,
    ) -> Result<(), TaskError> {
        self.record(Call::Connect {
            network: network.to_string(),
            container_id: container_id.to_string(),
            ipv4,
        });
        if self.failures.lock().unwrap().connect {
            return Err(TaskError::Daemon(format!("network {} not found", network)));
        }
        Ok(())
    }

    async fn start_container(&self, container_id: &str) -> Result<(), TaskError> {
        self.record(Call::Start(container_id.to_string()));
        if self.failures.lock().unwrap().start {
            return Err(TaskError::Daemon("failed to start container".to_string()));
        }
        Ok(())
    }

    async fn stop_container(&self, container_id: &str) -> Result<(), TaskError> {
        self.record(Call::Stop(container_id.to_string()));
        Ok(())
    }

    async fn inspect_container(&self, container_id: &str) -> Result<ContainerSnapshot, TaskError> {
        self.record(Call::Inspect(container_id.to_string()));
        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn remove_container(&self, container_id: &str) -> Result<(), TaskError> {
        self.record(Call::Remove(container_id.to_string()));
        Ok(())
    }
}
