use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::{info, warn};
use vcp_backup::{kind_names, BackupOutcome, BackupService};
use vcp_core::SkipSet;

use super::{cancel_on_ctrl_c, operator_prompt, GlobalArgs};

const DEFAULT_NAMESPACE: &str = "loft";

#[derive(Args)]
pub struct BackupCommand {
    /// The filename to write the backup to
    #[arg(long, default_value = "backup.yaml")]
    filename: PathBuf,

    /// Resource kinds the backup should skip, e.g. users,teams
    #[arg(long, value_delimiter = ',')]
    skip: Vec<String>,
}

impl BackupCommand {
    pub fn execute(self, global: &GlobalArgs) -> anyhow::Result<()> {
        let namespace = global
            .namespace
            .clone()
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let (client, _) = global.host_client()?;
        let skip: SkipSet = self.skip.iter().map(|s| s.trim().to_string()).collect();
        info!(
            "Backing up platform in namespace {} (kinds: {})",
            namespace,
            kind_names().filter(|k| !skip.contains(k)).collect::<Vec<_>>().join(", ")
        );

        let service = BackupService::new(client, operator_prompt(), namespace, skip);

        let rt = tokio::runtime::Runtime::new()?;
        let cancel = cancel_on_ctrl_c(&rt);
        let outcome = rt.block_on(async {
            tokio::select! {
                outcome = service.run(&self.filename) => outcome.map_err(anyhow::Error::from),
                _ = cancel.cancelled() => Err(anyhow::anyhow!("backup cancelled")),
            }
        });
        rt.shutdown_background();
        let outcome = outcome?;

        match outcome {
            BackupOutcome::Written(summary) => {
                if !summary.warnings.is_empty() {
                    warn!(
                        "{} resource kinds could not be backed up",
                        summary.warnings.len()
                    );
                }
                println!(
                    "{} {} ({} resources)",
                    "✅ Wrote backup to".bright_green(),
                    summary.path.display().to_string().bright_white().bold(),
                    summary.records
                );
            }
            BackupOutcome::Declined => {
                println!("{}", "Backup aborted".bright_yellow());
            }
        }
        Ok(())
    }
}
