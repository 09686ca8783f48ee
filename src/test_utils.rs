use crate::runtime::{ContainerRequest, ContainerRuntime, ContainerSnapshot};
use crate::TaskError;

use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A runtime call observed by `RecordingRuntime`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum RuntimeCall {
    Create(ContainerRequest),
    Connect,
    Start,
    Stop,
    Inspect,
    Remove,
}

// In-memory runtime recording every call, with switchable failures.
#[derive(Debug, Default)]
pub(crate) struct RecordingRuntime {
    calls: Mutex<Vec<RuntimeCall>>,
    snapshot: Mutex<ContainerSnapshot>,
    fail_create: AtomicBool,
    fail_start: AtomicBool,
    fail_remove: AtomicBool,
}

impl RecordingRuntime {
    pub(crate) fn calls(&self) -> Vec<RuntimeCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: RuntimeCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn count(&self, f: impl Fn(&RuntimeCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| f(c)).count()
    }

    pub(crate) fn creates(&self) -> usize {
        self.count(|c| matches!(c, RuntimeCall::Create(_)))
    }

    pub(crate) fn connects(&self) -> usize {
        self.count(|c| matches!(c, RuntimeCall::Connect))
    }

    pub(crate) fn removes(&self) -> usize {
        self.count(|c| matches!(c, RuntimeCall::Remove))
    }

    pub(crate) fn set_snapshot(&self, snapshot: ContainerSnapshot) {
        *self.snapshot.lock().unwrap() = snapshot;
    }

    pub(crate) fn fail_create(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_start(&self) {
        self.fail_start.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_remove(&self) {
        self.fail_remove.store(true, Ordering::SeqCst);
    }

    pub(crate) fn allow_remove(&self) {
        self.fail_remove.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContainerRuntime for RecordingRuntime {
    async fn create_container(&self, request: ContainerRequest) -> Result<String, TaskError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(TaskError::Daemon("failed to create container".to_string()));
        }
        let id = format!("{}-id", request.name);
        self.record(RuntimeCall::Create(request));
        Ok(id)
    }

    async fn connect_network(
        &self,
        _network: &str,
        _container_id: &str,
        _ipv4: Ipv4Addr,
    ) -> Result<(), TaskError> {
        self.record(RuntimeCall::Connect);
        Ok(())
    }

    async fn start_container(&self, _container_id: &str) -> Result<(), TaskError> {
        self.record(RuntimeCall::Start);
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(TaskError::Daemon("failed to start container".to_string()));
        }
        Ok(())
    }

    async fn stop_container(&self, _container_id: &str) -> Result<(), TaskError> {
        self.record(RuntimeCall::Stop);
        Ok(())
    }

    async fn inspect_container(&self, _container_id: &str) -> Result<ContainerSnapshot, TaskError> {
        self.record(RuntimeCall::Inspect);
        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn remove_container(&self, _container_id: &str) -> Result<(), TaskError> {
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(TaskError::Daemon("failed to remove container".to_string()));
        }
        self.record(RuntimeCall::Remove);
        Ok(())
    }
}
