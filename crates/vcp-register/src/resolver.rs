//! Selection of the virtual clusters a batch operates on

use tracing::{debug, info};
use vcp_core::{HostClient, Instance};

use crate::error::RegisterError;

/// Which instances a batch targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSelector {
    /// Every instance in every namespace visible to the credentials
    All,
    /// Exactly one instance
    Named { name: String, namespace: String },
}

impl TargetSelector {
    pub fn named(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        TargetSelector::Named {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

/// Resolve `selector` into an ordered target list.
///
/// For [`TargetSelector::All`] the result follows namespace listing order,
/// then instance listing order. Any listing failure aborts the resolution.
pub async fn resolve_targets(
    host: &dyn HostClient,
    selector: &TargetSelector,
) -> Result<Vec<Instance>, RegisterError> {
    match selector {
        TargetSelector::All => {
            let namespaces = host
                .list_namespaces()
                .await
                .map_err(RegisterError::ResolutionFailure)?;
            debug!("Looking for vclusters in {} namespaces", namespaces.len());

            let mut targets = Vec::new();
            for namespace in namespaces {
                let instances = host
                    .list_instances(&namespace)
                    .await
                    .map_err(RegisterError::ResolutionFailure)?;
                if instances.is_empty() {
                    info!("no vclusters found in namespace {}", namespace);
                    continue;
                }
                targets.extend(instances);
            }
            Ok(targets)
        }
        TargetSelector::Named { name, namespace } => {
            let instance = host
                .find_instance(name, namespace)
                .await
                .map_err(RegisterError::ResolutionFailure)?
                .ok_or_else(|| RegisterError::NotFound {
                    name: name.clone(),
                    namespace: namespace.clone(),
                })?;
            Ok(vec![instance])
        }
    }
}
