use serde_json::Value;
use tracing::{debug, warn};
use vcp_core::{ApiResource, ResourceRecord, ResourceSource, SkipSet};

use crate::catalogue::{is_known_kind, CATALOGUE};
use crate::error::CollectionError;

/// Metadata fields the API server fills in and a restore must not carry
const SERVER_METADATA: &[&str] = &[
    "uid",
    "resourceVersion",
    "creationTimestamp",
    "generation",
    "managedFields",
    "selfLink",
];

/// Make a listed object self-describing and drop server-populated state
pub fn normalize(resource: &ApiResource, mut object: Value) -> Value {
    if let Some(map) = object.as_object_mut() {
        map.entry("apiVersion")
            .or_insert_with(|| Value::String(resource.api_version()));
        map.entry("kind")
            .or_insert_with(|| Value::String(resource.kind.to_string()));
        map.remove("status");

        if let Some(metadata) = map.get_mut("metadata").and_then(Value::as_object_mut) {
            for field in SERVER_METADATA {
                metadata.remove(*field);
            }
        }
    }
    object
}

/// Scan the catalogue, skipping the kinds in `skip`.
///
/// `progress` is told about each kind before it is listed. A kind that fails
/// to list yields one [`CollectionError`] and no records.
pub async fn collect<F>(
    source: &dyn ResourceSource,
    skip: &SkipSet,
    mut progress: F,
) -> (Vec<ResourceRecord>, Vec<CollectionError>)
where
    F: FnMut(&str),
{
    for unknown in skip.iter().filter(|name| !is_known_kind(name)) {
        warn!("Unknown resource kind {:?} in skip list, ignoring", unknown);
    }

    let mut records = Vec::new();
    let mut errors = Vec::new();

    for resource in CATALOGUE {
        let kind = resource.plural;
        if skip.contains(kind) {
            debug!("Skipping {}", kind);
            continue;
        }

        progress(&format!("Backing up {}...", kind));
        match source.list(resource).await {
            Ok(objects) => {
                debug!("Collected {} {}", objects.len(), kind);
                records.extend(
                    objects
                        .into_iter()
                        .map(|object| ResourceRecord::new(kind, normalize(resource, object))),
                );
            }
            Err(err) => errors.push(CollectionError {
                kind: kind.to_string(),
                source: err,
            }),
        }
    }

    (records, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSource;
    use serde_json::json;

    #[test]
    fn test_normalize_fills_type_and_strips_server_fields() {
        let users = CATALOGUE[6];
        let object = json!({
            "metadata": {
                "name": "admin",
                "uid": "1234",
                "resourceVersion": "99",
                "creationTimestamp": "2024-01-01T00:00:00Z",
                "managedFields": [],
                "labels": {"team": "core"}
            },
            "spec": {"username": "admin"},
            "status": {"teams": []}
        });

        let normalized = normalize(&users, object);
        assert_eq!(
            normalized,
            json!({
                "apiVersion": "storage.loft.sh/v1",
                "kind": "User",
                "metadata": {"name": "admin", "labels": {"team": "core"}},
                "spec": {"username": "admin"}
            })
        );
    }

    #[test]
    fn test_normalize_keeps_existing_type() {
        let users = CATALOGUE[6];
        let normalized = normalize(
            &users,
            json!({"apiVersion": "storage.loft.sh/v1beta1", "kind": "User"}),
        );
        assert_eq!(normalized["apiVersion"], json!("storage.loft.sh/v1beta1"));
    }

    #[tokio::test]
    async fn test_skip_users() {
        let source = FakeSource::new()
            .with("users", &["admin"])
            .with("teams", &["core"])
            .with("projects", &["default"]);
        let skip: SkipSet = ["users"].into_iter().collect();

        let (records, errors) = collect(&source, &skip, |_| {}).await;

        assert!(errors.is_empty());
        assert!(records.iter().all(|r| r.kind != "users"));
        let kinds: Vec<&str> = records.iter().map(|r| r.kind.as_str()).collect();
        assert_eq!(kinds, vec!["projects", "teams"]);
        assert!(!source.listed().contains(&"users".to_string()));
    }

    #[tokio::test]
    async fn test_failing_kind_is_collected_and_scan_continues() {
        let source = FakeSource::new()
            .with("apps", &["a"])
            .with("users", &["admin", "dev"])
            .failing("projects");

        let (records, errors) = collect(&source, &SkipSet::new(), |_| {}).await;

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, "projects");
        assert!(errors[0].to_string().starts_with("backup projects: "));
        let names: Vec<&str> = records.iter().filter_map(|r| r.name()).collect();
        assert_eq!(names, vec!["a", "admin", "dev"]);
        assert_eq!(source.listed().len(), CATALOGUE.len());
    }

    #[tokio::test]
    async fn test_progress_reported_per_processed_kind() {
        let source = FakeSource::new();
        let skip: SkipSet = ["users", "teams", "unknown"].into_iter().collect();
        let mut messages = Vec::new();

        collect(&source, &skip, |msg| messages.push(msg.to_string())).await;

        assert_eq!(messages.len(), CATALOGUE.len() - 2);
        assert_eq!(messages[0], "Backing up clusterroletemplates...");
        assert!(!messages.contains(&"Backing up users...".to_string()));
    }
}
