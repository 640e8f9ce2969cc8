use tracing::{debug, info};
use vcp_core::{
    workload_selector, Instance, InstanceConnection, RegistrationOptions, RegistrationRecord,
};

use crate::error::RegisterError;

/// What the applier did for one instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub asleep: bool,
    /// Pods deleted by the restart, `None` when no restart ran
    pub restarted_pods: Option<usize>,
}

/// Write the registration record for `instance`, then restart its workloads
/// if requested and the instance is awake.
///
/// A restart failure leaves the record in place.
pub async fn apply_registration(
    connection: &dyn InstanceConnection,
    instance: &Instance,
    options: &RegistrationOptions,
    asleep: bool,
) -> Result<ApplyOutcome, RegisterError> {
    let record = RegistrationRecord::for_instance(instance, options);
    debug!("Applying registration secret for vcluster {}", instance);
    connection
        .apply_registration(&record)
        .await
        .map_err(RegisterError::ApplyFailure)?;

    if !options.restart || asleep {
        return Ok(ApplyOutcome {
            asleep,
            restarted_pods: None,
        });
    }

    let deleted = connection
        .delete_pods(&instance.namespace, &workload_selector(&instance.name))
        .await
        .map_err(RegisterError::RestartFailure)?;
    info!("Restarted vcluster {} ({} pods deleted)", instance, deleted);

    Ok(ApplyOutcome {
        asleep,
        restarted_pods: Some(deleted),
    })
}
