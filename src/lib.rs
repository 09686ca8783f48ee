#![deny(warnings)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![deny(rustdoc::broken_intra_doc_links)]

//! _dockertask_ drives single docker containers on behalf of a test harness.
//!
//! A [Task] maps a declarative [TaskConfiguration] (image, ports, mount point, network,
//! extra arguments) onto calls against a docker daemon, and walks the resulting container
//! through its lifecycle:
//!
//! `Pending` → `Created` → `Running` → `Stopped` → `Removed`
//!
//! The test directory of the harness is mounted read-only into every container at the
//! mount point of the task.
//!
//! # Task kinds
//!
//! Defaults such as the image, the mount point or the configuration file come from the
//! [TaskKind]. The [generic](TaskKind::Generic) kind requires the configuration to name an
//! image. Custom kinds implement [TaskProfile], which can also provide the arguments and
//! environment variables of the container.
//!
//! # Networking
//!
//! A task either shares the host network (`"host"`) or joins a user-defined network by
//! name. Containers on a named network are created in `bridge` mode and, when the
//! configuration provides a static `ip`, attached to the named network with that address
//! before they are started.
//!
//! # Failure handling
//!
//! Construction fails with [TaskError::Configuration] when the configuration cannot be
//! resolved. [Task::run] returns an error only if the container cannot be created; failures
//! to attach or start the container are logged and reported in the [RunReport].
//! [Task::remove] removes the container exactly once, and [Task::scoped] guarantees removal
//! on every exit path of a test body.
//!
//! # Environment variables
//!
//! The docker daemon is located through `DOCKER_HOST`. With the `tls` feature enabled and
//! `DOCKER_TLS_VERIFY` set, the connection is made with TLS using the certificates in
//! `DOCKER_CERT_PATH`.
//!
//! # Example
//!
//! ```rust,no_run
//! use dockertask::{Controller, Task, TaskConfiguration, TaskKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), dockertask::TaskError> {
//!     let controller = Controller::new()?;
//!     let config = TaskConfiguration::from_json(r#"{
//!         "name": "echo",
//!         "image": "alpine",
//!         "extra_params": "echo hello"
//!     }"#)?;
//!
//!     let task = Task::new(TaskKind::Generic, "/tmp/test", config, controller, "host")?;
//!     let exit_code = task
//!         .scoped(|ctx| async move {
//!             ctx.inspect().await.ok().and_then(|s| s.exit_code)
//!         })
//!         .await?;
//!
//!     println!("exit code: {:?}", exit_code);
//!     Ok(())
//! }
//! ```

mod configuration;
mod controller;
mod docker;
mod error;
mod kind;
mod network;
mod runtime;
mod task;
// We only make this public because a function is used in our integration test
#[doc(hidden)]
pub mod utils;

// Private module containing utility functions used for testing purposes
#[cfg(test)]
mod test_utils;

pub use crate::configuration::TaskConfiguration;
pub use crate::controller::Controller;
pub use crate::docker::Docker;
pub use crate::error::TaskError;
pub use crate::kind::{TaskKind, TaskProfile, DEFAULT_MOUNT_POINT};
pub use crate::network::NetMode;
pub use crate::runtime::{
    BindMount, ContainerRequest, ContainerRuntime, ContainerSnapshot, ContainerState,
};
pub use crate::task::{Removal, RunReport, Task, TaskContext, TaskState};
