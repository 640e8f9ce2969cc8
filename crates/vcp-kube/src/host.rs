//! Virtual cluster discovery on the host cluster
//!
//! A helm-deployed virtual cluster is a StatefulSet labelled `app=vcluster`
//! with the helm release name in the `release` label. Pausing scales it to
//! zero and marks it with the `loft.sh/paused` annotation.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use vcp_core::{
    workload_selector, ClientResult, HostClient, Instance, InstanceStatus, PRODUCT_LABEL,
};

use crate::client::{object_name, with_selector, KubeClient};

pub const PAUSED_ANNOTATION: &str = "loft.sh/paused";
pub const PAUSED_REPLICAS_ANNOTATION: &str = "loft.sh/paused-replicas";

pub(crate) fn statefulsets_path(namespace: &str) -> String {
    format!("/apis/apps/v1/namespaces/{}/statefulsets", namespace)
}

pub(crate) fn instance_selector(name: Option<&str>) -> String {
    match name {
        Some(name) => workload_selector(name),
        None => format!("app={}", PRODUCT_LABEL),
    }
}

/// Whether a virtual cluster StatefulSet is currently paused
pub fn is_paused(statefulset: &Value) -> bool {
    let annotated = statefulset
        .pointer(&format!(
            "/metadata/annotations/{}",
            PAUSED_ANNOTATION.replace('/', "~1")
        ))
        .and_then(Value::as_str)
        == Some("true");
    let scaled_down = statefulset.pointer("/spec/replicas").and_then(Value::as_i64) == Some(0);
    annotated || scaled_down
}

/// Build an [`Instance`] from a virtual cluster StatefulSet
pub(crate) fn instance_from_statefulset(
    statefulset: &Value,
    namespace: &str,
    context: Option<&str>,
) -> Option<Instance> {
    let name = statefulset
        .pointer("/metadata/labels/release")
        .and_then(Value::as_str)
        .or_else(|| object_name(statefulset))?;
    let status = if is_paused(statefulset) {
        InstanceStatus::Suspended
    } else {
        InstanceStatus::Active
    };
    Some(
        Instance::new(name, namespace)
            .with_status(status)
            .with_context(context.map(str::to_string)),
    )
}

impl KubeClient {
    pub(crate) async fn instance_statefulsets(
        &self,
        name: Option<&str>,
        namespace: &str,
    ) -> ClientResult<Vec<Value>> {
        self.list(&with_selector(
            &statefulsets_path(namespace),
            &instance_selector(name),
        ))
        .await
    }
}

#[async_trait]
impl HostClient for KubeClient {
    async fn list_namespaces(&self) -> ClientResult<Vec<String>> {
        let items = self.list("/api/v1/namespaces").await?;
        Ok(items
            .iter()
            .filter_map(object_name)
            .map(str::to_string)
            .collect())
    }

    async fn list_instances(&self, namespace: &str) -> ClientResult<Vec<Instance>> {
        let statefulsets = self.instance_statefulsets(None, namespace).await?;
        debug!(
            "Found {} vcluster statefulsets in namespace {}",
            statefulsets.len(),
            namespace
        );
        Ok(statefulsets
            .iter()
            .filter_map(|sts| instance_from_statefulset(sts, namespace, self.context()))
            .collect())
    }

    async fn find_instance(&self, name: &str, namespace: &str) -> ClientResult<Option<Instance>> {
        let statefulsets = self.instance_statefulsets(Some(name), namespace).await?;
        Ok(statefulsets
            .iter()
            .find_map(|sts| instance_from_statefulset(sts, namespace, self.context())))
    }
}
