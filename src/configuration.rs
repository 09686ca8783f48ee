//! The declarative key/value configuration a [Task] is constructed from.
//!
//! [Task]: crate::Task

use crate::TaskError;

use serde::Deserialize;
use std::collections::HashMap;
use std::net::Ipv4Addr;

/// Configuration mapping for a single task.
///
/// Every recognised key is optional; missing values are resolved against the defaults of
/// the [TaskKind](crate::TaskKind) when the [Task](crate::Task) is constructed.
/// Keys this structure does not recognise are kept in [settings](TaskConfiguration::setting)
/// so that task kinds can read their own configuration.
///
/// # Examples
/// ```rust
/// # use dockertask::TaskConfiguration;
/// let config = TaskConfiguration::from_json(r#"{
///     "image": "alpine",
///     "extra_params": "-v -n 3",
///     "ports": ["80/tcp"]
/// }"#).unwrap();
/// assert_eq!(config.image.as_deref(), Some("alpine"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TaskConfiguration {
    /// Name of the container, defaults to the name of the task kind.
    pub name: Option<String>,
    /// Image reference the container is created from.
    pub image: Option<String>,
    /// Static address to claim when joining a user-defined network.
    pub ip: Option<Ipv4Addr>,
    /// Seconds to wait between creating and starting the container.
    pub delay_start: Option<f64>,
    /// Where the test directory is mounted inside the container.
    pub mount_point: Option<String>,
    /// Task specific configuration file, relative paths are resolved against the mount point.
    pub config_file: Option<String>,
    /// Whether the task runs as a daemon, interpreted by the task kind.
    pub daemon: Option<bool>,
    /// Space separated arguments appended to the task arguments.
    pub extra_params: Option<String>,
    /// Container ports on the form `port/proto`.
    pub ports: Option<Vec<String>>,

    #[serde(flatten)]
    settings: HashMap<String, serde_json::Value>,
}

impl TaskConfiguration {
    /// Creates an empty configuration.
    pub fn new() -> TaskConfiguration {
        TaskConfiguration::default()
    }

    /// Parses a configuration from its JSON representation.
    pub fn from_json(json: &str) -> Result<TaskConfiguration, TaskError> {
        serde_json::from_str(json)
            .map_err(|e| TaskError::Configuration(format!("malformed task configuration: {}", e)))
    }

    /// Converts an already loaded JSON mapping into a configuration.
    pub fn from_value(value: serde_json::Value) -> Result<TaskConfiguration, TaskError> {
        serde_json::from_value(value)
            .map_err(|e| TaskError::Configuration(format!("malformed task configuration: {}", e)))
    }

    /// Returns a configuration key not recognised by this structure.
    pub fn setting(&self, key: &str) -> Option<&serde_json::Value> {
        self.settings.get(key)
    }

    /// Sets the name of the container.
    pub fn with_name<T: ToString>(self, name: T) -> TaskConfiguration {
        TaskConfiguration {
            name: Some(name.to_string()),
            ..self
        }
    }

    /// Sets the image the container is created from.
    pub fn with_image<T: ToString>(self, image: T) -> TaskConfiguration {
        TaskConfiguration {
            image: Some(image.to_string()),
            ..self
        }
    }

    /// Sets the static address used when joining a user-defined network.
    pub fn with_ip(self, ip: Ipv4Addr) -> TaskConfiguration {
        TaskConfiguration {
            ip: Some(ip),
            ..self
        }
    }

    /// Sets the number of seconds to wait between creating and starting the container.
    pub fn with_delay_start(self, seconds: f64) -> TaskConfiguration {
        TaskConfiguration {
            delay_start: Some(seconds),
            ..self
        }
    }

    /// Sets the in-container mount point of the test directory.
    pub fn with_mount_point<T: ToString>(self, mount_point: T) -> TaskConfiguration {
        TaskConfiguration {
            mount_point: Some(mount_point.to_string()),
            ..self
        }
    }

    /// Sets the task specific configuration file.
    pub fn with_config_file<T: ToString>(self, config_file: T) -> TaskConfiguration {
        TaskConfiguration {
            config_file: Some(config_file.to_string()),
            ..self
        }
    }

    /// Sets the daemon flag.
    pub fn with_daemon(self, daemon: bool) -> TaskConfiguration {
        TaskConfiguration {
            daemon: Some(daemon),
            ..self
        }
    }

    /// Sets the space separated extra arguments.
    pub fn with_extra_params<T: ToString>(self, extra_params: T) -> TaskConfiguration {
        TaskConfiguration {
            extra_params: Some(extra_params.to_string()),
            ..self
        }
    }

    /// Sets the container ports, each on the form `port/proto`.
    pub fn with_ports<T: ToString>(self, ports: Vec<T>) -> TaskConfiguration {
        TaskConfiguration {
            ports: Some(ports.iter().map(|p| p.to_string()).collect()),
            ..self
        }
    }

    /// Adds a setting interpreted by the task kind.
    pub fn with_setting<T: ToString>(
        mut self,
        key: T,
        value: serde_json::Value,
    ) -> TaskConfiguration {
        self.settings.insert(key.to_string(), value);
        self
    }
}
