use std::time::Duration;
use thiserror::Error;
use vcp_core::{AggregateError, ClientError, PromptError};

/// Failure of one step of the registration workflow
#[derive(Error, Debug)]
pub enum RegisterError {
    #[error("couldn't find vcluster {name} in namespace {namespace}")]
    NotFound { name: String, namespace: String },

    #[error("failed to list vclusters: {0}")]
    ResolutionFailure(#[source] ClientError),

    #[error("failed to connect to vcluster: {0}")]
    ConnectionFailure(#[source] ClientError),

    #[error("failed to capture your response: {0}")]
    PromptFailure(#[source] PromptError),

    #[error("failed to get vcluster status: {0}")]
    StatusFailure(#[source] ClientError),

    #[error("failed to wake up vcluster {name}: {source}")]
    WakeCommandFailure { name: String, source: ClientError },

    #[error("timed out waiting for vcluster {name} to wake up")]
    WakeTimeout { name: String, timeout: Duration },

    #[error("failed to apply registration secret: {0}")]
    ApplyFailure(#[source] ClientError),

    #[error("delete vcluster workloads: {0}")]
    RestartFailure(#[source] ClientError),

    #[error("operation cancelled")]
    Cancelled,
}

/// Result of a whole `add vcluster` batch
#[derive(Error, Debug)]
pub enum AddVClusterError {
    /// Resolution or cancellation stopped the batch
    #[error(transparent)]
    Fatal(#[from] RegisterError),

    /// One or more targets failed; the rest were processed
    #[error(transparent)]
    Targets(#[from] AggregateError<RegisterError>),
}

impl AddVClusterError {
    /// Names of the targets that failed, empty for fatal errors
    pub fn failed_targets(&self) -> Vec<&str> {
        match self {
            AddVClusterError::Fatal(_) => Vec::new(),
            AddVClusterError::Targets(errors) => errors.targets(),
        }
    }
}
