use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use vcp_core::{Prompt, PromptError, QuestionOptions, ResourceSource, SkipSet};

use crate::archive::{persist, to_yaml};
use crate::collector::collect;
use crate::error::{BackupError, CollectionError};

const CONTINUE: &str = "Yes";
const ABORT: &str = "No";

/// What a finished backup wrote
#[derive(Debug)]
pub struct BackupSummary {
    pub records: usize,
    pub warnings: Vec<CollectionError>,
    pub path: PathBuf,
}

#[derive(Debug)]
pub enum BackupOutcome {
    Written(BackupSummary),
    /// The operator declined to back up a namespace without the platform
    Declined,
}

/// Collects the platform resources and writes them to an archive file
pub struct BackupService {
    source: Arc<dyn ResourceSource>,
    prompt: Arc<dyn Prompt>,
    namespace: String,
    skip: SkipSet,
}

impl BackupService {
    pub fn new(
        source: Arc<dyn ResourceSource>,
        prompt: Arc<dyn Prompt>,
        namespace: impl Into<String>,
        skip: SkipSet,
    ) -> Self {
        Self {
            source,
            prompt,
            namespace: namespace.into(),
            skip,
        }
    }

    pub async fn run(&self, filename: &Path) -> Result<BackupOutcome, BackupError> {
        if !self.confirm_installation().await? {
            return Ok(BackupOutcome::Declined);
        }

        let (records, warnings) =
            collect(self.source.as_ref(), &self.skip, |msg| info!("{}", msg)).await;
        for warning in &warnings {
            warn!("{}", warning);
        }

        let bytes = to_yaml(&records)?;
        info!("Writing backup to {}...", filename.display());
        persist(&bytes, filename).await?;
        info!("Wrote backup to {}", filename.display());

        Ok(BackupOutcome::Written(BackupSummary {
            records: records.len(),
            warnings,
            path: filename.to_path_buf(),
        }))
    }

    async fn confirm_installation(&self) -> Result<bool, BackupError> {
        let installed = self
            .source
            .platform_installed(&self.namespace)
            .await
            .map_err(BackupError::InstallCheck)?;
        if installed {
            return Ok(true);
        }

        debug!("Platform deployment not found in namespace {}", self.namespace);
        let question = QuestionOptions::new(
            format!(
                "Seems like the platform was not installed into namespace {:?}, do you want to continue?",
                self.namespace
            ),
            CONTINUE,
        )
        .with_options([CONTINUE, ABORT]);
        let prompt = self.prompt.clone();

        let answer = tokio::task::spawn_blocking(move || prompt.question(&question))
            .await
            .map_err(|e| PromptError::Io(std::io::Error::other(e)))
            .and_then(|answer| answer)
            .map_err(BackupError::PromptFailure)?;
        Ok(answer == CONTINUE)
    }
}
