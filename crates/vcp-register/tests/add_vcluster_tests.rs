//! Registration batches driven through mocked client ports

use async_trait::async_trait;
use mockall::{mock, predicate::eq};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use vcp_core::{
    ClientError, ClientResult, DefaultAnswerPrompt, HostClient, Instance, InstanceConnection,
    InstanceConnector, InstanceStatus, LifecycleConfig, RegistrationOptions, RegistrationRecord,
};
use vcp_register::{AddVClusterError, RegistrationService, TargetSelector};

mock! {
    Host {}

    #[async_trait]
    impl HostClient for Host {
        async fn list_namespaces(&self) -> ClientResult<Vec<String>>;
        async fn list_instances(&self, namespace: &str) -> ClientResult<Vec<Instance>>;
        async fn find_instance(&self, name: &str, namespace: &str) -> ClientResult<Option<Instance>>;
    }
}

mock! {
    Connector {}

    #[async_trait]
    impl InstanceConnector for Connector {
        async fn connect(&self, instance: &Instance) -> ClientResult<Arc<dyn InstanceConnection>>;
    }
}

mock! {
    Connection {}

    #[async_trait]
    impl InstanceConnection for Connection {
        async fn status(&self) -> ClientResult<InstanceStatus>;
        async fn resume(&self) -> ClientResult<()>;
        async fn apply_registration(&self, record: &RegistrationRecord) -> ClientResult<()>;
        async fn delete_pods(&self, namespace: &str, label_selector: &str) -> ClientResult<usize>;
    }
}

fn options() -> RegistrationOptions {
    RegistrationOptions {
        project: "default".to_string(),
        import_name: "imported".to_string(),
        restart: true,
        access_key: "access-key".to_string(),
        host: "https://platform.example.com".to_string(),
        all: true,
        ..RegistrationOptions::default()
    }
}

fn registering_connection(namespace: &'static str, release: &'static str) -> MockConnection {
    let mut connection = MockConnection::new();
    connection
        .expect_status()
        .returning(|| Ok(InstanceStatus::Active));
    connection
        .expect_apply_registration()
        .withf(move |record| record.namespace == namespace && record.import_name == "imported")
        .times(1)
        .returning(|_| Ok(()));
    connection
        .expect_delete_pods()
        .with(
            eq(namespace),
            eq(format!("app=vcluster,release={}", release)),
        )
        .times(1)
        .returning(|_, _| Ok(2));
    connection
}

fn service(host: MockHost, connector: MockConnector) -> RegistrationService {
    RegistrationService::new(
        Arc::new(host),
        Arc::new(connector),
        Arc::new(DefaultAnswerPrompt),
        LifecycleConfig::new(Duration::from_millis(5), Duration::from_millis(50)),
    )
}

#[tokio::test]
async fn test_all_registers_healthy_target_and_reports_failing_one() {
    let mut host = MockHost::new();
    host.expect_list_namespaces()
        .returning(|| Ok(vec!["team-a".to_string(), "team-b".to_string()]));
    host.expect_list_instances()
        .with(eq("team-a"))
        .returning(|_| Ok(vec![Instance::new("healthy", "team-a")]));
    host.expect_list_instances()
        .with(eq("team-b"))
        .returning(|_| Ok(vec![Instance::new("unreachable", "team-b")]));

    let mut connector = MockConnector::new();
    let healthy: Arc<dyn InstanceConnection> =
        Arc::new(registering_connection("team-a", "healthy"));
    connector
        .expect_connect()
        .withf(|instance| instance.name == "healthy")
        .return_once(move |_| Ok(healthy));
    connector
        .expect_connect()
        .withf(|instance| instance.name == "unreachable")
        .returning(|_| Err(ClientError::Request("connection refused".to_string())));

    let err = service(host, connector)
        .add_vclusters(&TargetSelector::All, &options(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.failed_targets(), vec!["team-b/unreachable"]);
    assert_eq!(
        err.to_string(),
        "cannot add vcluster team-b/unreachable: failed to connect to vcluster: Request failed: connection refused"
    );
}

#[tokio::test]
async fn test_sleeping_target_defaults_to_leave_sleeping() {
    let mut host = MockHost::new();
    host.expect_find_instance()
        .with(eq("dev"), eq("team-a"))
        .returning(|name, ns| {
            Ok(Some(
                Instance::new(name, ns).with_status(InstanceStatus::Suspended),
            ))
        });

    let mut connection = MockConnection::new();
    connection
        .expect_status()
        .returning(|| Ok(InstanceStatus::Suspended));
    connection.expect_resume().never();
    connection
        .expect_apply_registration()
        .times(1)
        .returning(|_| Ok(()));
    connection.expect_delete_pods().never();

    let connection: Arc<dyn InstanceConnection> = Arc::new(connection);
    let mut connector = MockConnector::new();
    connector
        .expect_connect()
        .return_once(move |_| Ok(connection));

    service(host, connector)
        .add_vclusters(
            &TargetSelector::named("dev", "team-a"),
            &options(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_namespace_listing_failure_is_fatal() {
    let mut host = MockHost::new();
    host.expect_list_namespaces().returning(|| {
        Err(ClientError::Api {
            status: 403,
            message: "namespaces is forbidden".to_string(),
        })
    });
    let mut connector = MockConnector::new();
    connector.expect_connect().never();

    let err = service(host, connector)
        .add_vclusters(&TargetSelector::All, &options(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AddVClusterError::Fatal(_)));
    assert!(err.failed_targets().is_empty());
}
