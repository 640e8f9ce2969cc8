use std::path::PathBuf;
use thiserror::Error;
use vcp_core::{ClientError, PromptError};

/// Listing one catalogue kind failed; the scan carries on with the next kind
#[derive(Error, Debug)]
#[error("backup {kind}: {source}")]
pub struct CollectionError {
    pub kind: String,
    pub source: ClientError,
}

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Failed to serialize backup: {0}")]
    Serialization(#[from] serde_yaml::Error),

    #[error("Failed to write {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Failed to check the platform installation: {0}")]
    InstallCheck(#[source] ClientError),

    #[error("failed to capture your response: {0}")]
    PromptFailure(#[source] PromptError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}
