use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use vcp_core::{
    ErrorAggregator, HostClient, Instance, InstanceConnector, LifecycleConfig, Prompt,
    RegistrationOptions,
};

use crate::apply::{apply_registration, ApplyOutcome};
use crate::error::{AddVClusterError, RegisterError};
use crate::lifecycle::WakeController;
use crate::resolver::{resolve_targets, TargetSelector};

/// Registers virtual clusters with the platform, one target at a time
pub struct RegistrationService {
    host: Arc<dyn HostClient>,
    connector: Arc<dyn InstanceConnector>,
    wake: WakeController,
}

impl RegistrationService {
    pub fn new(
        host: Arc<dyn HostClient>,
        connector: Arc<dyn InstanceConnector>,
        prompt: Arc<dyn Prompt>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            host,
            connector,
            wake: WakeController::new(prompt, config),
        }
    }

    /// Add every instance matched by `selector`.
    ///
    /// Per-target failures are collected and returned together once all
    /// targets were processed. Resolution failures and cancellation stop the
    /// batch immediately.
    pub async fn add_vclusters(
        &self,
        selector: &TargetSelector,
        options: &RegistrationOptions,
        cancel: &CancellationToken,
    ) -> Result<(), AddVClusterError> {
        let targets = resolve_targets(self.host.as_ref(), selector).await?;
        if targets.is_empty() {
            debug!("No vclusters to add");
            return Ok(());
        }

        let mut errors = ErrorAggregator::new("add vcluster");
        for target in targets.iter().cloned() {
            if cancel.is_cancelled() {
                return Err(RegisterError::Cancelled.into());
            }

            info!("adding {} vcluster to platform", target.name);
            match self.add_vcluster(&target, options, cancel).await {
                Err(RegisterError::Cancelled) => return Err(RegisterError::Cancelled.into()),
                Ok(outcome) if outcome.asleep => {
                    info!(
                        "vcluster {} will be added the next time it awakes",
                        target.qualified_name()
                    );
                    info!("{}", wakeup_hint(&target));
                }
                Ok(_) => info!("Successfully added vcluster {}", target.qualified_name()),
                Err(e) => errors.record(&target.qualified_name(), Err::<(), _>(e)),
            }
        }

        errors.combine()?;
        Ok(())
    }

    async fn add_vcluster(
        &self,
        instance: &Instance,
        options: &RegistrationOptions,
        cancel: &CancellationToken,
    ) -> Result<ApplyOutcome, RegisterError> {
        let connection = self
            .connector
            .connect(instance)
            .await
            .map_err(RegisterError::ConnectionFailure)?;

        let asleep = self
            .wake
            .resolve(connection.as_ref(), instance, cancel)
            .await?;

        apply_registration(connection.as_ref(), instance, options, asleep).await
    }
}

/// Tells the operator how to finish registering an instance left asleep
fn wakeup_hint(instance: &Instance) -> String {
    format!(
        "Run 'vcluster wakeup --help' to learn how to wake up vcluster {} to complete the add operation.",
        instance.qualified_name()
    )
}
