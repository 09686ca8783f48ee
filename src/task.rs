//! A declaratively configured container lifecycle.

use crate::configuration::TaskConfiguration;
use crate::controller::Controller;
use crate::kind::TaskKind;
use crate::network::{NetMode, BRIDGE_MODE};
use crate::runtime::{
    BindMount, ContainerRequest, ContainerRuntime, ContainerSnapshot, ContainerState,
};
use crate::TaskError;

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, event, Level};

/// Lifecycle of the container owned by a [Task].
#[derive(Debug, PartialEq, Eq, Clone, Copy, strum::Display)]
pub enum TaskState {
    /// No container has been created yet.
    Pending,
    /// The container exists but has not been started.
    Created,
    /// The container has been started.
    Running,
    /// The container has been stopped or has exited.
    Stopped,
    /// The container has been removed from the daemon.
    Removed,
}

/// Outcome of [Task::run] once the container has been created.
///
/// Failing to attach the container to its network or to start it does not abort
/// [Task::run], the failures are reported here so the caller can decide whether to retry
/// or give up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Failure to attach the container to its user-defined network.
    pub connect: Option<TaskError>,
    /// Failure to start the container.
    pub start: Option<TaskError>,
}

impl RunReport {
    /// Returns true if the container was started.
    pub fn is_started(&self) -> bool {
        self.start.is_none()
    }

    /// Returns true if every step succeeded.
    pub fn is_complete(&self) -> bool {
        self.connect.is_none() && self.start.is_none()
    }

    /// Converts the report into the first failure it holds, if any.
    pub fn into_result(self) -> Result<(), TaskError> {
        match (self.connect, self.start) {
            (Some(e), _) | (None, Some(e)) => Err(e),
            (None, None) => Ok(()),
        }
    }
}

/// Outcome of [Task::remove].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The container was removed from the daemon.
    Released,
    /// The task did not own a container, nothing was done.
    AlreadyReleased,
}

/// One container lifecycle, configured from a [TaskConfiguration].
///
/// The test directory is mounted read-only at the mount point of the task. Construct the
/// task, [run](Task::run) it, and [remove](Task::remove) it once done. [Task::scoped]
/// bundles the three steps and releases the container on every exit path.
///
/// # Examples
/// ```rust,no_run
/// # use dockertask::{Controller, Task, TaskConfiguration, TaskKind};
/// # async fn example() -> Result<(), dockertask::TaskError> {
/// let controller = Controller::new()?;
/// let config = TaskConfiguration::new()
///     .with_image("alpine")
///     .with_extra_params("echo hello");
/// let mut task = Task::new(TaskKind::Generic, "/tmp/test", config, controller, "host")?;
///
/// let report = task.run().await?;
/// assert!(report.is_started());
///
/// task.update().await?;
/// println!("exit code: {:?}", task.exit_code());
/// task.remove().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Task {
    kind: TaskKind,
    controller: Controller,
    config: TaskConfiguration,
    test_dir: PathBuf,
    net_mode: NetMode,

    name: String,
    image: String,
    ip: Option<Ipv4Addr>,
    delay_start: Duration,
    mount_point: String,
    config_file: Option<String>,
    daemon: bool,
    ports: HashMap<String, String>,

    /// Id of the owned container, present between `run` and `remove`.
    container: Option<String>,
    state: TaskState,
    snapshot: Option<ContainerSnapshot>,
}

impl Task {
    /// Resolves the configuration against the defaults of `kind`.
    ///
    /// Fails with [TaskError::Configuration] if no image is available, if `delay_start` is
    /// negative, or if a port is not on the form `port/proto`.
    pub fn new<P: Into<PathBuf>, N: Into<NetMode>>(
        kind: TaskKind,
        test_dir: P,
        config: TaskConfiguration,
        controller: Controller,
        net_mode: N,
    ) -> Result<Task, TaskError> {
        let name = config.name.clone().unwrap_or_else(|| kind.name());

        let image = config
            .image
            .clone()
            .or_else(|| kind.default_image())
            .ok_or_else(|| {
                TaskError::Configuration(format!(
                    "task {} does not have an image available",
                    name
                ))
            })?;

        let delay_start = resolve_delay_start(&name, config.delay_start)?;
        let mount_point = config
            .mount_point
            .clone()
            .unwrap_or_else(|| kind.default_mount_point());
        let config_file = config
            .config_file
            .clone()
            .or_else(|| kind.default_config_file())
            .map(|f| resolve_config_file(&mount_point, &f));
        let daemon = config.daemon.unwrap_or_else(|| kind.default_daemon());
        let ports = resolve_ports(&name, config.ports.as_deref().unwrap_or_default())?;

        Ok(Task {
            ip: config.ip,
            kind,
            controller,
            config,
            test_dir: test_dir.into(),
            net_mode: net_mode.into(),
            name,
            image,
            delay_start,
            mount_point,
            config_file,
            daemon,
            ports,
            container: None,
            state: TaskState::Pending,
            snapshot: None,
        })
    }

    /// Name of the container.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Image the container is created from.
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Static address claimed on the user-defined network.
    pub fn ip(&self) -> Option<Ipv4Addr> {
        self.ip
    }

    /// Time waited between creating and starting the container.
    pub fn delay_start(&self) -> Duration {
        self.delay_start
    }

    /// Where the test directory is mounted inside the container.
    pub fn mount_point(&self) -> &str {
        &self.mount_point
    }

    /// Absolute in-container path of the task configuration file.
    pub fn config_file(&self) -> Option<&str> {
        self.config_file.as_deref()
    }

    /// The daemon flag, interpreted by the task kind.
    pub fn daemon(&self) -> bool {
        self.daemon
    }

    /// Host directory mounted into the container.
    pub fn test_dir(&self) -> &Path {
        &self.test_dir
    }

    /// The configuration the task was constructed from.
    pub fn configuration(&self) -> &TaskConfiguration {
        &self.config
    }

    /// The kind of the task.
    pub fn kind(&self) -> &TaskKind {
        &self.kind
    }

    /// The network the container joins.
    pub fn net_mode(&self) -> &NetMode {
        &self.net_mode
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Id of the owned container, if any.
    pub fn container_id(&self) -> Option<&str> {
        self.container.as_deref()
    }

    /// The `extra_params` configuration split on whitespace.
    ///
    /// Quoting is not supported, a quoted argument containing spaces is split as well.
    pub fn extra_params(&self) -> Vec<String> {
        self.config
            .extra_params
            .as_deref()
            .map(|p| p.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Container `port/proto` mapped to the host port it is published on.
    ///
    /// Every port is published on the host port with the same number.
    pub fn ports(&self) -> &HashMap<String, String> {
        &self.ports
    }

    /// Arguments of the task kind followed by the extra parameters.
    pub fn args(&self) -> Vec<String> {
        let mut args = self.kind.task_args(self);
        args.extend(self.extra_params());
        args
    }

    /// Environment variables provided by the task kind.
    pub fn task_env(&self) -> HashMap<String, String> {
        self.kind.task_env(self)
    }

    /// The network mode handed to the daemon, `host` or `bridge`.
    pub fn runtime_network_mode(&self) -> &'static str {
        self.net_mode.runtime_mode()
    }

    /// Last exit code observed by [update](Task::update).
    pub fn exit_code(&self) -> Option<i64> {
        self.snapshot.as_ref().and_then(|s| s.exit_code)
    }

    /// Last container state observed by [update](Task::update).
    pub fn snapshot(&self) -> Option<&ContainerSnapshot> {
        self.snapshot.as_ref()
    }

    fn docker(&self) -> &Arc<dyn ContainerRuntime> {
        self.controller.docker()
    }

    fn owned_container(&self) -> Result<&str, TaskError> {
        self.container.as_deref().ok_or_else(|| {
            TaskError::Lifecycle(format!(
                "task {} does not own a container ({})",
                self.name, self.state
            ))
        })
    }

    /// Creates the container, attaches it to its network and starts it.
    ///
    /// A failure to create the container is returned as an error and leaves the task
    /// pending. Once created, failures to connect or start are logged and reported
    /// through the returned [RunReport].
    pub async fn run(&mut self) -> Result<RunReport, TaskError> {
        if let Some(id) = &self.container {
            return Err(TaskError::Lifecycle(format!(
                "task {} already owns container {}",
                self.name, id
            )));
        }

        let args = self.args();
        let env = self.task_env();
        debug!("- Name: {}", self);
        debug!("- Image: {}", self.image);
        debug!("- Args: {:?}", args);
        debug!("- Env: {:?}", env);

        let request = ContainerRequest {
            name: self.name.clone(),
            image: self.image.clone(),
            args,
            binds: vec![BindMount::read_only(&self.test_dir, &self.mount_point)],
            ports: self.ports.clone(),
            env,
            network_mode: self.runtime_network_mode().to_string(),
        };

        let id = self.docker().create_container(request).await?;
        self.container = Some(id);
        self.state = TaskState::Created;
        self.snapshot = None;

        let mut report = RunReport::default();

        if self.runtime_network_mode() == BRIDGE_MODE {
            if let Err(e) = self.connect().await {
                event!(Level::ERROR, "task {} failed to connect: {}", self, e);
                report.connect = Some(e);
            }
        }

        if !self.delay_start.is_zero() {
            event!(
                Level::DEBUG,
                "delaying start of task {} by {:?}",
                self,
                self.delay_start
            );
            tokio::time::sleep(self.delay_start).await;
        }

        let id = self.owned_container()?;
        let started = self.docker().start_container(id).await;
        match started {
            Ok(()) => self.state = TaskState::Running,
            Err(e) => {
                event!(Level::ERROR, "task {} failed to start: {}", self, e);
                report.start = Some(e);
            }
        }

        Ok(report)
    }

    /// Attaches the container to the user-defined network with the configured address.
    ///
    /// Does nothing when no address is configured or the task shares the host network.
    pub async fn connect(&self) -> Result<(), TaskError> {
        let (ip, network) = match (self.ip, self.net_mode.network_name()) {
            (Some(ip), Some(network)) => (ip, network),
            _ => return Ok(()),
        };

        let id = self.owned_container()?;
        self.docker().connect_network(network, id, ip).await
    }

    /// Stops the owned container.
    pub async fn stop(&mut self) -> Result<(), TaskError> {
        let id = self.owned_container()?;
        self.docker().stop_container(id).await?;
        self.state = TaskState::Stopped;
        Ok(())
    }

    /// Refreshes the observed state of the container from the daemon.
    pub async fn update(&mut self) -> Result<&ContainerSnapshot, TaskError> {
        let id = self.owned_container()?;
        let snapshot = self.docker().inspect_container(id).await?;

        match snapshot.status {
            Some(ContainerState::Running) => self.state = TaskState::Running,
            Some(ContainerState::Exited) | Some(ContainerState::Dead) => {
                self.state = TaskState::Stopped
            }
            _ => {}
        }

        Ok(self.snapshot.insert(snapshot))
    }

    /// Removes the owned container from the daemon and releases the handle.
    ///
    /// The container is removed at most once, removing a task that does not own a
    /// container reports [Removal::AlreadyReleased]. On failure the handle is kept so the
    /// removal can be retried.
    pub async fn remove(&mut self) -> Result<Removal, TaskError> {
        let id = match &self.container {
            Some(id) => id,
            None => return Ok(Removal::AlreadyReleased),
        };

        self.docker().remove_container(id).await?;
        event!(Level::DEBUG, "removed container of task {}", self);

        self.container = None;
        self.state = TaskState::Removed;
        Ok(Removal::Released)
    }

    /// Stops a running container, then removes it.
    async fn release(&mut self) -> Result<Removal, TaskError> {
        if self.state == TaskState::Running {
            if let Err(e) = self.stop().await {
                event!(Level::ERROR, "failed to stop task {}: {}", self, e);
            }
        }
        self.remove().await
    }

    /// Runs the task, executes `body`, and releases the container afterwards.
    ///
    /// The container is stopped and removed whether `body` returns or panics. A panic in
    /// `body` is resumed once the container is released.
    pub async fn scoped<F, Fut, T>(mut self, body: F) -> Result<T, TaskError>
    where
        F: FnOnce(TaskContext) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let report = self.run().await?;
        let context = TaskContext {
            name: self.name.clone(),
            container_id: self.owned_container()?.to_string(),
            docker: self.docker().clone(),
            report,
        };

        let outcome = tokio::spawn(body(context)).await;
        let released = self.release().await;

        match outcome {
            Ok(value) => released.map(|_| value),
            Err(e) => {
                if let Err(r) = released {
                    event!(Level::ERROR, "failed to release task {}: {}", self, r);
                }
                if e.is_panic() {
                    std::panic::resume_unwind(e.into_panic());
                }
                Err(TaskError::Lifecycle(format!(
                    "body of task {} did not complete: {}",
                    self.name, e
                )))
            }
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Drop for Task {
    fn drop(&mut self) {
        if let Some(id) = &self.container {
            event!(
                Level::WARN,
                "task {} dropped while owning container {}, it is left on the daemon",
                self.name,
                id
            );
        }
    }
}

/// View of a running task handed to the body of [Task::scoped].
#[derive(Clone, Debug)]
pub struct TaskContext {
    name: String,
    container_id: String,
    docker: Arc<dyn ContainerRuntime>,
    report: RunReport,
}

impl TaskContext {
    /// Name of the container.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the container.
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// Outcome of running the task.
    pub fn report(&self) -> &RunReport {
        &self.report
    }

    /// Retrieves the current state of the container.
    pub async fn inspect(&self) -> Result<ContainerSnapshot, TaskError> {
        self.docker.inspect_container(&self.container_id).await
    }
}

fn resolve_delay_start(name: &str, seconds: Option<f64>) -> Result<Duration, TaskError> {
    let seconds = seconds.unwrap_or(0.0);
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(TaskError::Configuration(format!(
            "task {} has an invalid delay_start: {}",
            name, seconds
        )));
    }
    Duration::try_from_secs_f64(seconds).map_err(|e| {
        TaskError::Configuration(format!(
            "task {} has an invalid delay_start: {}: {}",
            name, seconds, e
        ))
    })
}

// Container paths are always unix paths, regardless of the host.
fn resolve_config_file(mount_point: &str, config_file: &str) -> String {
    if mount_point.is_empty() || config_file.is_empty() || config_file.starts_with('/') {
        config_file.to_string()
    } else if mount_point.ends_with('/') {
        format!("{}{}", mount_point, config_file)
    } else {
        format!("{}/{}", mount_point, config_file)
    }
}

fn resolve_ports(name: &str, ports: &[String]) -> Result<HashMap<String, String>, TaskError> {
    let mut mapping = HashMap::with_capacity(ports.len());
    for p in ports {
        let split: Vec<&str> = p.split('/').collect();
        // We expect "port/protocol" e.g. "8080/tcp"
        match split.as_slice() {
            [port, proto] if !port.is_empty() && !proto.is_empty() => {
                mapping.insert(p.clone(), port.to_string());
            }
            _ => {
                return Err(TaskError::Configuration(format!(
                    "task {} has a malformed port `{}`, expected `port/proto`",
                    name, p
                )))
            }
        }
    }
    Ok(mapping)
}
