use anyhow::bail;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::Args;
use colored::Colorize;
use std::sync::Arc;
use tracing::{error, info};
use vcp_core::{LifecycleConfig, RegistrationOptions};
use vcp_kube::KubeConnector;
use vcp_register::{AddVClusterError, RegistrationService, TargetSelector};

use super::{cancel_on_ctrl_c, operator_prompt, GlobalArgs};

#[derive(Args)]
pub struct AddVClusterCommand {
    /// Name of the virtual cluster to add
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    name: Option<String>,

    /// Add every virtual cluster found in every namespace
    #[arg(long)]
    all: bool,

    /// Platform project to add the virtual cluster to
    #[arg(long, env = "VCP_PROJECT", default_value = "")]
    project: String,

    /// Name the virtual cluster gets inside the platform
    #[arg(long, default_value = "")]
    import_name: String,

    /// Restart the virtual cluster workloads after writing the secret
    #[arg(
        long,
        default_value_t = true,
        action = clap::ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    restart: bool,

    /// Skip TLS verification when the agent talks to the platform
    #[arg(long, env = "VCP_INSECURE")]
    insecure: bool,

    /// Access key the agent uses to authenticate with the platform
    #[arg(long, env = "VCP_ACCESS_KEY")]
    access_key: String,

    /// Platform host URL
    #[arg(long, env = "VCP_HOST")]
    host: String,

    /// Base64 encoded CA certificate of the platform
    #[arg(long, env = "VCP_CA_DATA")]
    ca_data: Option<String>,
}

impl AddVClusterCommand {
    pub fn execute(self, global: &GlobalArgs) -> anyhow::Result<()> {
        let options = self.options()?;
        let (client, credentials) = global.host_client()?;

        let selector = match self.name {
            Some(name) if !self.all => {
                let namespace = global
                    .namespace
                    .clone()
                    .or(credentials.namespace)
                    .unwrap_or_else(|| "default".to_string());
                TargetSelector::named(name, namespace)
            }
            _ => TargetSelector::All,
        };

        let rt = tokio::runtime::Runtime::new()?;
        let cancel = cancel_on_ctrl_c(&rt);
        let service = RegistrationService::new(
            client.clone(),
            Arc::new(KubeConnector::new(client)),
            operator_prompt(),
            LifecycleConfig::from_env(),
        );

        info!("Adding vclusters to the platform at {}", options.host);
        let result = rt.block_on(service.add_vclusters(&selector, &options, &cancel));
        // A prompt left waiting on stdin must not keep the process alive
        rt.shutdown_background();

        match result {
            Ok(()) => {
                println!("{}", "✅ Done".bright_green());
                Ok(())
            }
            Err(AddVClusterError::Targets(errors)) => {
                for failure in errors.errors() {
                    error!("{}", failure);
                }
                println!(
                    "{} {}",
                    "❌ Failed to add:".bright_red().bold(),
                    errors.targets().join(", ").bright_white()
                );
                Err(errors.into())
            }
            Err(AddVClusterError::Fatal(e)) => Err(e.into()),
        }
    }

    fn options(&self) -> anyhow::Result<RegistrationOptions> {
        if self.host.is_empty() {
            bail!("--host must not be empty");
        }
        let certificate_authority_data = match &self.ca_data {
            Some(encoded) if !encoded.is_empty() => STANDARD
                .decode(encoded.trim())
                .map_err(|e| anyhow::anyhow!("Invalid --ca-data: {}", e))?,
            _ => Vec::new(),
        };

        Ok(RegistrationOptions {
            project: self.project.clone(),
            import_name: self.import_name.clone(),
            restart: self.restart,
            insecure: self.insecure,
            access_key: self.access_key.clone(),
            host: self.host.clone(),
            certificate_authority_data,
            all: self.all,
        })
    }
}
