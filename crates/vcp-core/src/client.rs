//! Control-plane client ports
//!
//! These traits are the only way the orchestration crates reach a cluster.
//! `vcp-kube` implements them over the Kubernetes REST API; tests implement
//! them in memory.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::error::ClientResult;
use crate::instance::{Instance, InstanceStatus};
use crate::options::RegistrationRecord;
use crate::resource::ApiResource;

/// Discovery of virtual clusters on the host cluster
#[async_trait]
pub trait HostClient: Send + Sync {
    /// Every namespace visible to the current credentials
    async fn list_namespaces(&self) -> ClientResult<Vec<String>>;

    /// All virtual clusters in `namespace`, in listing order
    async fn list_instances(&self, namespace: &str) -> ClientResult<Vec<Instance>>;

    /// The virtual cluster `name` in `namespace`, if it exists
    async fn find_instance(&self, name: &str, namespace: &str) -> ClientResult<Option<Instance>>;
}

/// Factory producing a connection for one resolved instance
#[async_trait]
pub trait InstanceConnector: Send + Sync {
    async fn connect(&self, instance: &Instance) -> ClientResult<Arc<dyn InstanceConnection>>;
}

/// Operations against a single virtual cluster
#[async_trait]
pub trait InstanceConnection: Send + Sync {
    /// Re-query the current lifecycle state
    async fn status(&self) -> ClientResult<InstanceStatus>;

    /// Issue the resume command for a suspended instance
    async fn resume(&self) -> ClientResult<()>;

    /// Create or overwrite the registration record
    async fn apply_registration(&self, record: &RegistrationRecord) -> ClientResult<()>;

    /// Delete the pods matching `label_selector` in `namespace`, returning how many were removed
    async fn delete_pods(&self, namespace: &str, label_selector: &str) -> ClientResult<usize>;
}

/// Listing access used by the backup collector
#[async_trait]
pub trait ResourceSource: Send + Sync {
    /// All objects of `resource` across the cluster, in listing order
    async fn list(&self, resource: &ApiResource) -> ClientResult<Vec<Value>>;

    /// Whether the platform is installed into `namespace`
    async fn platform_installed(&self, namespace: &str) -> ClientResult<bool>;
}
