//! Owner of the container runtime client shared by tasks.

use crate::docker::Docker;
use crate::runtime::ContainerRuntime;
use crate::TaskError;

use std::sync::Arc;

/// Supplies the container runtime client to every [Task](crate::Task) it is handed to.
///
/// Cloning a `Controller` is cheap, all clones share the same client.
#[derive(Clone, Debug)]
pub struct Controller {
    docker: Arc<dyn ContainerRuntime>,
}

impl Controller {
    /// Creates a controller connected to the docker daemon of the environment.
    pub fn new() -> Result<Controller, TaskError> {
        Ok(Controller::with_runtime(Docker::new()?))
    }

    /// Creates a controller driving tasks through the given runtime.
    pub fn with_runtime<R: ContainerRuntime + 'static>(runtime: R) -> Controller {
        Controller {
            docker: Arc::new(runtime),
        }
    }

    /// Creates a controller from a runtime that is shared with other owners.
    pub fn from_shared(docker: Arc<dyn ContainerRuntime>) -> Controller {
        Controller { docker }
    }

    /// The container runtime client.
    pub fn docker(&self) -> &Arc<dyn ContainerRuntime> {
        &self.docker
    }
}
