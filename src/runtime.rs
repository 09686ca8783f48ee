//! The container runtime operations a task is built on.

use crate::TaskError;

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::net::Ipv4Addr;
use std::path::PathBuf;

/// All possible states a container can be in
#[derive(Debug, PartialEq, Eq, Clone, Copy, strum::Display)]
#[allow(missing_docs)]
pub enum ContainerState {
    Empty,
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
}

/// A host path bound into the container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindMount {
    /// Path on the host, must exist.
    pub host_path: PathBuf,
    /// Absolute path inside the container.
    pub container_path: String,
    /// Mount the path read-only.
    pub read_only: bool,
}

impl BindMount {
    /// A read-only bind of `host_path` at `container_path`.
    pub fn read_only<P: Into<PathBuf>, T: ToString>(host_path: P, container_path: T) -> BindMount {
        BindMount {
            host_path: host_path.into(),
            container_path: container_path.to_string(),
            read_only: true,
        }
    }

    /// The `HOST_PATH:CONTAINER_PATH[:ro]` form understood by the daemon.
    pub fn to_bind_string(&self) -> String {
        let mut bind = format!("{}:{}", self.host_path.display(), self.container_path);
        if self.read_only {
            bind.push_str(":ro");
        }
        bind
    }
}

/// Everything needed to create a task container.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContainerRequest {
    /// Name assigned to the container, must be unique on the daemon.
    pub name: String,
    /// Image reference to create the container from.
    pub image: String,
    /// Arguments handed to the image entrypoint.
    pub args: Vec<String>,
    /// Host paths bound into the container.
    pub binds: Vec<BindMount>,
    /// Container `port/proto` mapped to the host port it is published on.
    pub ports: HashMap<String, String>,
    /// Environment variables of the container.
    pub env: HashMap<String, String>,
    /// Network mode of the container, `host` or `bridge`.
    pub network_mode: String,
}

/// State of a container as last reported by the daemon.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContainerSnapshot {
    /// Status of the container, if reported.
    pub status: Option<ContainerState>,
    /// Exit code of the container, if reported.
    pub exit_code: Option<i64>,
}

/// Operations a container runtime must provide to drive a [Task](crate::Task).
///
/// Implemented by [Docker](crate::Docker) against a docker daemon.
#[async_trait]
pub trait ContainerRuntime: Debug + Send + Sync {
    /// Creates the container, returning its id.
    async fn create_container(&self, request: ContainerRequest) -> Result<String, TaskError>;

    /// Attaches the container to `network` with the static address `ipv4`.
    async fn connect_network(
        &self,
        network: &str,
        container_id: &str,
        ipv4: Ipv4Addr,
    ) -> Result<(), TaskError>;

    /// Starts a created container.
    async fn start_container(&self, container_id: &str) -> Result<(), TaskError>;

    /// Stops a running container.
    async fn stop_container(&self, container_id: &str) -> Result<(), TaskError>;

    /// Retrieves the current state of the container.
    async fn inspect_container(&self, container_id: &str) -> Result<ContainerSnapshot, TaskError>;

    /// Forcefully removes the container.
    async fn remove_container(&self, container_id: &str) -> Result<(), TaskError>;
}
