//! Per-kind defaults and hooks of a [Task].
//!
//! Every task belongs to a [TaskKind]. The kind supplies the values a [TaskConfiguration]
//! falls back to, and decides which arguments and environment variables the container
//! receives. Custom kinds implement [TaskProfile] and are wrapped in [TaskKind::Profile].
//!
//! [TaskConfiguration]: crate::TaskConfiguration

use crate::task::Task;

use dyn_clone::DynClone;
use std::collections::HashMap;
use std::fmt::Debug;

/// Mount point used when neither the configuration nor the kind provide one.
pub const DEFAULT_MOUNT_POINT: &str = "/home";

/// Defaults and container hooks of a custom task kind.
///
/// Only [name](TaskProfile::name) is required, every other method has the same default as
/// the [generic](TaskKind::Generic) kind.
///
/// # Examples
/// ```rust
/// # use dockertask::{Task, TaskProfile};
/// #[derive(Clone, Debug)]
/// struct Resolver;
///
/// impl TaskProfile for Resolver {
///     fn name(&self) -> String {
///         "Resolver".to_string()
///     }
///
///     fn default_image(&self) -> Option<String> {
///         Some("internetsystemsconsortium/bind9:9.18".to_string())
///     }
///
///     fn task_args(&self, task: &Task) -> Vec<String> {
///         let mut args = vec!["-g".to_string()];
///         if let Some(config_file) = task.config_file() {
///             args.push("-c".to_string());
///             args.push(config_file.to_string());
///         }
///         args
///     }
/// }
/// ```
pub trait TaskProfile: Debug + Send + Sync + DynClone {
    /// Name of the kind, used as the container name when none is configured.
    fn name(&self) -> String;

    /// Image used when the configuration does not provide one.
    fn default_image(&self) -> Option<String> {
        None
    }

    /// Daemon flag used when the configuration does not provide one.
    fn default_daemon(&self) -> bool {
        false
    }

    /// Configuration file used when the configuration does not provide one.
    fn default_config_file(&self) -> Option<String> {
        None
    }

    /// Mount point used when the configuration does not provide one.
    fn default_mount_point(&self) -> String {
        DEFAULT_MOUNT_POINT.to_string()
    }

    /// Positional arguments passed to the container, before any extra parameters.
    fn task_args(&self, _task: &Task) -> Vec<String> {
        Vec::new()
    }

    /// Environment variables passed to the container.
    fn task_env(&self, _task: &Task) -> HashMap<String, String> {
        HashMap::new()
    }
}

dyn_clone::clone_trait_object!(TaskProfile);

/// The kind of a [Task], selecting its defaults and container hooks.
#[derive(Clone, Debug)]
pub enum TaskKind {
    /// No default image, no arguments and no environment.
    /// Everything must come from the configuration.
    Generic,
    /// A kind with its own defaults and hooks.
    Profile(Box<dyn TaskProfile>),
}

impl TaskKind {
    /// Wraps a custom profile.
    pub fn profile<P: TaskProfile + 'static>(profile: P) -> TaskKind {
        TaskKind::Profile(Box::new(profile))
    }

    /// Name of the kind.
    pub fn name(&self) -> String {
        match self {
            TaskKind::Generic => "Task".to_string(),
            TaskKind::Profile(p) => p.name(),
        }
    }

    pub(crate) fn default_image(&self) -> Option<String> {
        match self {
            TaskKind::Generic => None,
            TaskKind::Profile(p) => p.default_image(),
        }
    }

    pub(crate) fn default_daemon(&self) -> bool {
        match self {
            TaskKind::Generic => false,
            TaskKind::Profile(p) => p.default_daemon(),
        }
    }

    pub(crate) fn default_config_file(&self) -> Option<String> {
        match self {
            TaskKind::Generic => None,
            TaskKind::Profile(p) => p.default_config_file(),
        }
    }

    pub(crate) fn default_mount_point(&self) -> String {
        match self {
            TaskKind::Generic => DEFAULT_MOUNT_POINT.to_string(),
            TaskKind::Profile(p) => p.default_mount_point(),
        }
    }

    pub(crate) fn task_args(&self, task: &Task) -> Vec<String> {
        match self {
            TaskKind::Generic => Vec::new(),
            TaskKind::Profile(p) => p.task_args(task),
        }
    }

    pub(crate) fn task_env(&self, task: &Task) -> HashMap<String, String> {
        match self {
            TaskKind::Generic => HashMap::new(),
            TaskKind::Profile(p) => p.task_env(task),
        }
    }
}

impl Default for TaskKind {
    fn default() -> TaskKind {
        TaskKind::Generic
    }
}
