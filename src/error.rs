//! Errors that can arise from dockertask.

use thiserror::Error;

/// Public library error conditions.
#[derive(Error, Debug, PartialEq, Clone)]
#[allow(missing_docs)]
pub enum TaskError {
    /// The task is misconfigured and cannot be constructed.
    #[error("task misconfigured: {0}")]
    Configuration(String),
    /// The docker daemon rejected or failed an operation.
    #[error("docker daemon interaction error `{0}`")]
    Daemon(String),
    /// The operation is not valid in the current lifecycle state of the task.
    #[error("invalid task lifecycle transition: {0}")]
    Lifecycle(String),
}
