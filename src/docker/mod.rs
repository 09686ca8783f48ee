use crate::{
    runtime::{ContainerRequest, ContainerRuntime, ContainerSnapshot},
    utils::connect_with_local_or_tls_defaults,
    TaskError,
};

use async_trait::async_trait;
use std::net::Ipv4Addr;

mod container;
mod network;

/// Encapsulates all docker daemon operations
#[derive(Clone, Debug)]
pub struct Docker {
    client: bollard::Docker,
}

impl Docker {
    /// Connects to the docker daemon of the environment.
    ///
    /// See [connect_with_local_or_tls_defaults] for how the daemon is located.
    pub fn new() -> Result<Self, TaskError> {
        let client = connect_with_local_or_tls_defaults()?;

        Ok(Self { client })
    }

    /// Wraps an already configured client.
    pub fn with_client(client: bollard::Docker) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContainerRuntime for Docker {
    async fn create_container(&self, request: ContainerRequest) -> Result<String, TaskError> {
        self.create_task_container(request).await
    }

    async fn connect_network(
        &self,
        network: &str,
        container_id: &str,
        ipv4: Ipv4Addr,
    ) -> Result<(), TaskError> {
        self.connect_with_static_ip(network, container_id, ipv4).await
    }

    async fn start_container(&self, container_id: &str) -> Result<(), TaskError> {
        self.start(container_id).await
    }

    async fn stop_container(&self, container_id: &str) -> Result<(), TaskError> {
        self.stop(container_id).await
    }

    async fn inspect_container(&self, container_id: &str) -> Result<ContainerSnapshot, TaskError> {
        self.snapshot(container_id).await
    }

    async fn remove_container(&self, container_id: &str) -> Result<(), TaskError> {
        self.force_remove(container_id).await
    }
}
