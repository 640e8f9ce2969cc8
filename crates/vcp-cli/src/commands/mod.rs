pub mod backup;
pub mod register;

pub use backup::BackupCommand;
pub use register::AddVClusterCommand;

use anyhow::Context as _;
use clap::Args;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use vcp_core::{DefaultAnswerPrompt, Prompt};
use vcp_kube::{load_credentials, ClusterCredentials, KubeClient};

use crate::prompt::TerminalPrompt;

/// Connection flags shared by every command
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to the kubeconfig file
    #[arg(long, env = "KUBECONFIG", global = true)]
    pub kubeconfig: Option<PathBuf>,

    /// Kube context to use instead of the current one
    #[arg(long, env = "VCP_CONTEXT", global = true)]
    pub context: Option<String>,

    /// Namespace to operate in
    #[arg(short, long, env = "VCP_NAMESPACE", global = true)]
    pub namespace: Option<String>,
}

impl GlobalArgs {
    /// Load credentials and build a client for the host cluster
    pub fn host_client(&self) -> anyhow::Result<(Arc<KubeClient>, ClusterCredentials)> {
        let credentials = load_credentials(self.kubeconfig.as_deref(), self.context.as_deref())
            .context(
                "there is an error loading your current kube config, please make sure you have access to a kubernetes cluster",
            )?;
        debug!("Using API server {}", credentials.server);
        let client = KubeClient::new(&credentials)?;
        Ok((Arc::new(client), credentials))
    }
}

/// Interactive prompt on a terminal, default answers otherwise
pub fn operator_prompt() -> Arc<dyn Prompt> {
    if std::io::stdin().is_terminal() {
        Arc::new(TerminalPrompt)
    } else {
        debug!("stdin is not a terminal, answering questions with their defaults");
        Arc::new(DefaultAnswerPrompt)
    }
}

/// Token cancelled on the first Ctrl+C
pub fn cancel_on_ctrl_c(rt: &tokio::runtime::Runtime) -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    rt.spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Received Ctrl+C, cancelling");
                trigger.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
        }
    });
    token
}
