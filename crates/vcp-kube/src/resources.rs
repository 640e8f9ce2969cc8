use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use vcp_core::{ApiResource, ClientResult, ResourceSource};

use crate::client::KubeClient;

/// Name of the platform deployment checked before a backup
pub const PLATFORM_DEPLOYMENT: &str = "loft";

/// Cluster-wide list path of `resource`
pub(crate) fn resource_path(resource: &ApiResource) -> String {
    if resource.group.is_empty() {
        format!("/api/{}/{}", resource.version, resource.plural)
    } else {
        format!(
            "/apis/{}/{}/{}",
            resource.group, resource.version, resource.plural
        )
    }
}

#[async_trait]
impl ResourceSource for KubeClient {
    async fn list(&self, resource: &ApiResource) -> ClientResult<Vec<Value>> {
        let items = KubeClient::list(self, &resource_path(resource)).await?;
        debug!("Listed {} {}", items.len(), resource.plural);
        Ok(items)
    }

    async fn platform_installed(&self, namespace: &str) -> ClientResult<bool> {
        let deployment: Option<Value> = self
            .get_optional(&format!(
                "/apis/apps/v1/namespaces/{}/deployments/{}",
                namespace, PLATFORM_DEPLOYMENT
            ))
            .await?;
        Ok(deployment.is_some())
    }
}
