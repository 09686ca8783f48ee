use super::Docker;
use crate::{
    runtime::{ContainerRequest, ContainerSnapshot, ContainerState},
    TaskError,
};
use bollard::{
    container::{
        Config, CreateContainerOptions, InspectContainerOptions, RemoveContainerOptions,
        StartContainerOptions, StopContainerOptions,
    },
    errors::Error,
    models::{ContainerStateStatusEnum, HostConfig, PortBinding},
};
use std::collections::HashMap;
use tracing::{event, trace, Level};

impl From<ContainerStateStatusEnum> for ContainerState {
    fn from(value: ContainerStateStatusEnum) -> Self {
        match value {
            ContainerStateStatusEnum::EMPTY => ContainerState::Empty,
            ContainerStateStatusEnum::CREATED => ContainerState::Created,
            ContainerStateStatusEnum::RUNNING => ContainerState::Running,
            ContainerStateStatusEnum::PAUSED => ContainerState::Paused,
            ContainerStateStatusEnum::RESTARTING => ContainerState::Restarting,
            ContainerStateStatusEnum::REMOVING => ContainerState::Removing,
            ContainerStateStatusEnum::EXITED => ContainerState::Exited,
            ContainerStateStatusEnum::DEAD => ContainerState::Dead,
        }
    }
}

/// Builds the create configuration of a task container.
pub(super) fn container_config(request: &ContainerRequest) -> Config<String> {
    let envs: Vec<String> = request
        .env
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();

    let binds: Vec<String> = request.binds.iter().map(|b| b.to_bind_string()).collect();

    let mut port_map: HashMap<String, Option<Vec<PortBinding>>> = HashMap::new();
    let mut exposed_ports: HashMap<String, HashMap<(), ()>> = HashMap::new();

    for (exposed, host) in &request.ports {
        let dest_port: Vec<PortBinding> = vec![PortBinding {
            host_ip: None,
            host_port: Some(host.clone()),
        }];
        port_map.insert(exposed.clone(), Some(dest_port));
        exposed_ports.insert(exposed.clone(), HashMap::new());
    }

    let host_config = HostConfig {
        network_mode: Some(request.network_mode.clone()),
        binds: Some(binds),
        port_bindings: Some(port_map),
        ..Default::default()
    };

    Config {
        image: Some(request.image.clone()),
        cmd: Some(request.args.clone()),
        env: Some(envs),
        exposed_ports: Some(exposed_ports),
        host_config: Some(host_config),
        ..Default::default()
    }
}

impl Docker {
    pub(super) async fn create_task_container(
        &self,
        request: ContainerRequest,
    ) -> Result<String, TaskError> {
        event!(Level::DEBUG, "creating container: {}", request.name);

        let options = Some(CreateContainerOptions {
            name: request.name.as_str(),
            platform: None,
        });
        let config = container_config(&request);

        trace!("creating container from options: {options:#?}, config: {config:#?}");

        self.client
            .create_container(options, config)
            .await
            .map(|info| info.id)
            .map_err(|e| TaskError::Daemon(format!("failed to create container: {}", e)))
    }

    pub(super) async fn start(&self, container_id: &str) -> Result<(), TaskError> {
        self.client
            .start_container(container_id, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| match e {
                Error::DockerResponseServerError {
                    message,
                    status_code,
                } => {
                    if status_code == 404 {
                        let json: Result<serde_json::Value, serde_json::error::Error> =
                            serde_json::from_str(message.as_str());
                        match json {
                            Ok(json) => TaskError::Daemon(format!(
                                "failed to start container due to `{}`",
                                json["message"].as_str().unwrap_or(message.as_str())
                            )),
                            Err(_) => TaskError::Daemon(format!(
                                "failed to start container: {}",
                                message
                            )),
                        }
                    } else {
                        TaskError::Daemon(format!("failed to start container: {}", message))
                    }
                }
                _ => TaskError::Daemon(format!("failed to start container: {}", e)),
            })
    }

    pub(super) async fn stop(&self, container_id: &str) -> Result<(), TaskError> {
        match self
            .client
            .stop_container(container_id, None::<StopContainerOptions>)
            .await
        {
            Ok(_) => Ok(()),
            // Not modified, the container was already stopped which is what we wanted anyway
            Err(Error::DockerResponseServerError {
                status_code: 304, ..
            }) => {
                event!(Level::DEBUG, "container already stopped: {}", container_id);
                Ok(())
            }
            Err(e) => Err(TaskError::Daemon(format!("failed to stop container: {}", e))),
        }
    }

    pub(super) async fn snapshot(&self, container_id: &str) -> Result<ContainerSnapshot, TaskError> {
        let state = self
            .client
            .inspect_container(container_id, None::<InspectContainerOptions>)
            .await
            .map_err(|e| TaskError::Daemon(format!("failed to inspect container: {}", e)))?
            .state
            .ok_or_else(|| TaskError::Daemon("container state was 'None'".to_string()))?;

        Ok(ContainerSnapshot {
            status: state.status.map(|s| s.into()),
            exit_code: state.exit_code,
        })
    }

    pub(super) async fn force_remove(&self, container_id: &str) -> Result<(), TaskError> {
        let options = Some(RemoveContainerOptions {
            force: true,
            ..Default::default()
        });

        match self.client.remove_container(container_id, options).await {
            Ok(_) => Ok(()),
            Err(Error::DockerResponseServerError {
                status_code: 404, ..
            }) => {
                event!(Level::DEBUG, "container already removed: {}", container_id);
                Ok(())
            }
            Err(e) => Err(TaskError::Daemon(format!("failed to remove container: {}", e))),
        }
    }
}
