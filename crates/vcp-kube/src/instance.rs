//! Per-instance operations: status, resume, registration secret and workload restart

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Method;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, info};
use vcp_core::{
    ClientError, ClientResult, Instance, InstanceConnection, InstanceConnector, InstanceStatus,
    RegistrationRecord, REGISTRATION_SECRET_NAME,
};

use crate::client::{object_name, with_selector, KubeClient, ObjectList, JSON, MERGE_PATCH};
use crate::host::{
    instance_from_statefulset, statefulsets_path, PAUSED_ANNOTATION, PAUSED_REPLICAS_ANNOTATION,
};

/// Hands out connections backed by a shared host-cluster client
#[derive(Debug, Clone)]
pub struct KubeConnector {
    client: Arc<KubeClient>,
}

impl KubeConnector {
    pub fn new(client: Arc<KubeClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl InstanceConnector for KubeConnector {
    async fn connect(&self, instance: &Instance) -> ClientResult<Arc<dyn InstanceConnection>> {
        if instance.namespace.is_empty() {
            return Err(ClientError::configuration(format!(
                "vcluster {} has no namespace",
                instance.name
            )));
        }
        if let (Some(wanted), Some(actual)) = (instance.context.as_deref(), self.client.context())
        {
            if wanted != actual {
                return Err(ClientError::configuration(format!(
                    "vcluster {} was discovered through context {} but the client uses {}",
                    instance, wanted, actual
                )));
            }
        }

        Ok(Arc::new(KubeInstanceConnection {
            client: self.client.clone(),
            name: instance.name.clone(),
            namespace: instance.namespace.clone(),
        }))
    }
}

/// Connection to one helm-deployed virtual cluster through its host cluster
#[derive(Debug, Clone)]
pub struct KubeInstanceConnection {
    client: Arc<KubeClient>,
    name: String,
    namespace: String,
}

impl KubeInstanceConnection {
    async fn statefulsets(&self) -> ClientResult<Vec<Value>> {
        let statefulsets = self
            .client
            .instance_statefulsets(Some(&self.name), &self.namespace)
            .await?;
        if statefulsets.is_empty() {
            return Err(ClientError::not_found(format!(
                "vcluster {}/{}",
                self.namespace, self.name
            )));
        }
        Ok(statefulsets)
    }
}

/// Merge patch scaling a paused StatefulSet back up and clearing the pause markers
pub(crate) fn resume_patch(statefulset: &Value) -> Value {
    let replicas = statefulset
        .pointer(&format!(
            "/metadata/annotations/{}",
            PAUSED_REPLICAS_ANNOTATION.replace('/', "~1")
        ))
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse::<i64>().ok())
        .filter(|replicas| *replicas > 0)
        .unwrap_or(1);

    let mut annotations = Map::new();
    annotations.insert(PAUSED_ANNOTATION.to_string(), Value::Null);
    annotations.insert(PAUSED_REPLICAS_ANNOTATION.to_string(), Value::Null);

    json!({
        "metadata": {"annotations": annotations},
        "spec": {"replicas": replicas}
    })
}

/// The registration secret as a Kubernetes object
pub(crate) fn registration_secret(record: &RegistrationRecord) -> Value {
    let data: Map<String, Value> = record
        .entries()
        .into_iter()
        .map(|(key, value)| (key.to_string(), Value::String(STANDARD.encode(value))))
        .collect();

    json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {
            "name": REGISTRATION_SECRET_NAME,
            "namespace": record.namespace,
        },
        "type": "Opaque",
        "data": data
    })
}

#[async_trait]
impl InstanceConnection for KubeInstanceConnection {
    async fn status(&self) -> ClientResult<InstanceStatus> {
        let statefulsets = self.statefulsets().await?;
        let suspended = statefulsets
            .iter()
            .filter_map(|sts| instance_from_statefulset(sts, &self.namespace, None))
            .any(|instance| instance.is_suspended());
        Ok(if suspended {
            InstanceStatus::Suspended
        } else {
            InstanceStatus::Active
        })
    }

    async fn resume(&self) -> ClientResult<()> {
        for statefulset in self.statefulsets().await? {
            let Some(name) = object_name(&statefulset) else {
                continue;
            };
            let patch = resume_patch(&statefulset);
            debug!("Resuming statefulset {}/{}", self.namespace, name);
            let _: Value = self
                .client
                .api_request(
                    Method::PATCH,
                    &format!("{}/{}", statefulsets_path(&self.namespace), name),
                    Some(&patch),
                    MERGE_PATCH,
                )
                .await?;
        }
        info!("Resumed vcluster {}/{}", self.namespace, self.name);
        Ok(())
    }

    async fn apply_registration(&self, record: &RegistrationRecord) -> ClientResult<()> {
        let collection = format!("/api/v1/namespaces/{}/secrets", record.namespace);
        let item = format!("{}/{}", collection, REGISTRATION_SECRET_NAME);
        let mut secret = registration_secret(record);

        match self.client.get_optional::<Value>(&item).await? {
            Some(existing) => {
                if let Some(version) = existing.pointer("/metadata/resourceVersion") {
                    secret["metadata"]["resourceVersion"] = version.clone();
                }
                debug!("Replacing secret {}/{}", record.namespace, REGISTRATION_SECRET_NAME);
                let _: Value = self
                    .client
                    .api_request(Method::PUT, &item, Some(&secret), JSON)
                    .await?;
            }
            None => {
                debug!("Creating secret {}/{}", record.namespace, REGISTRATION_SECRET_NAME);
                let _: Value = self
                    .client
                    .api_request(Method::POST, &collection, Some(&secret), JSON)
                    .await?;
            }
        }
        Ok(())
    }

    async fn delete_pods(&self, namespace: &str, label_selector: &str) -> ClientResult<usize> {
        let path = with_selector(
            &format!("/api/v1/namespaces/{}/pods", namespace),
            label_selector,
        );
        let deleted: ObjectList = self
            .client
            .api_request(Method::DELETE, &path, None, JSON)
            .await?;
        debug!(
            "Deleted {} pods matching {} in {}",
            deleted.items.len(),
            label_selector,
            namespace
        );
        Ok(deleted.items.len())
    }
}
