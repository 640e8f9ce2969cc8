//! In-memory client ports for unit tests

use async_trait::async_trait;
use mockall::mock;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use vcp_core::{
    ClientError, ClientResult, HostClient, Instance, InstanceConnection, InstanceConnector,
    InstanceStatus, Prompt, PromptError, QuestionOptions, RegistrationRecord,
};

mock! {
    pub Prompt {}

    impl Prompt for Prompt {
        fn question(&self, options: &QuestionOptions) -> Result<String, PromptError>;
    }
}

#[derive(Default)]
pub struct FakeHost {
    namespaces: Vec<String>,
    instances: HashMap<String, Vec<Instance>>,
    failing_namespace: Option<String>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespaces.push(namespace.to_string());
        self
    }

    pub fn with_instances(mut self, namespace: &str, names: &[&str]) -> Self {
        self.namespaces.push(namespace.to_string());
        self.instances.insert(
            namespace.to_string(),
            names.iter().map(|n| Instance::new(*n, namespace)).collect(),
        );
        self
    }

    pub fn failing_namespace(mut self, namespace: &str) -> Self {
        self.failing_namespace = Some(namespace.to_string());
        self
    }
}

#[async_trait]
impl HostClient for FakeHost {
    async fn list_namespaces(&self) -> ClientResult<Vec<String>> {
        Ok(self.namespaces.clone())
    }

    async fn list_instances(&self, namespace: &str) -> ClientResult<Vec<Instance>> {
        if self.failing_namespace.as_deref() == Some(namespace) {
            return Err(ClientError::Api {
                status: 403,
                message: format!("statefulsets in {} is forbidden", namespace),
            });
        }
        Ok(self.instances.get(namespace).cloned().unwrap_or_default())
    }

    async fn find_instance(&self, name: &str, namespace: &str) -> ClientResult<Option<Instance>> {
        Ok(self
            .instances
            .get(namespace)
            .and_then(|all| all.iter().find(|i| i.name == name).cloned()))
    }
}

/// Scripted connection recording every call it receives
#[derive(Default)]
pub struct FakeConnection {
    statuses: Mutex<VecDeque<InstanceStatus>>,
    status_error: bool,
    status_delay: Option<Duration>,
    resume_error: bool,
    apply_error: bool,
    delete_error: bool,
    calls: Mutex<Vec<String>>,
    records: Mutex<Vec<RegistrationRecord>>,
}

impl FakeConnection {
    pub fn active() -> Self {
        Self::with_statuses(&[InstanceStatus::Active])
    }

    pub fn suspended() -> Self {
        Self::with_statuses(&[InstanceStatus::Suspended])
    }

    /// Statuses returned in order; the last one repeats forever
    pub fn with_statuses(statuses: &[InstanceStatus]) -> Self {
        Self {
            statuses: Mutex::new(statuses.iter().copied().collect()),
            ..Self::default()
        }
    }

    pub fn failing_status(mut self) -> Self {
        self.status_error = true;
        self
    }

    /// Every status query after the first one takes `delay` to answer
    pub fn slow_status(mut self, delay: Duration) -> Self {
        self.status_delay = Some(delay);
        self
    }

    pub fn failing_resume(mut self) -> Self {
        self.resume_error = true;
        self
    }

    pub fn failing_apply(mut self) -> Self {
        self.apply_error = true;
        self
    }

    pub fn failing_delete(mut self) -> Self {
        self.delete_error = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn records(&self) -> Vec<RegistrationRecord> {
        self.records.lock().unwrap().clone()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl InstanceConnection for FakeConnection {
    async fn status(&self) -> ClientResult<InstanceStatus> {
        let answered_before = self.calls().iter().any(|c| c == "status");
        self.log("status".to_string());
        if let Some(delay) = self.status_delay.filter(|_| answered_before) {
            tokio::time::sleep(delay).await;
        }
        if self.status_error {
            return Err(ClientError::Request("connection reset".to_string()));
        }
        let mut statuses = self.statuses.lock().unwrap();
        let status = if statuses.len() > 1 {
            statuses.pop_front()
        } else {
            statuses.front().copied()
        };
        status.ok_or_else(|| ClientError::not_found("vcluster"))
    }

    async fn resume(&self) -> ClientResult<()> {
        self.log("resume".to_string());
        if self.resume_error {
            return Err(ClientError::Api {
                status: 500,
                message: "patch rejected".to_string(),
            });
        }
        Ok(())
    }

    async fn apply_registration(&self, record: &RegistrationRecord) -> ClientResult<()> {
        self.log(format!("apply:{}", record.namespace));
        if self.apply_error {
            return Err(ClientError::Api {
                status: 403,
                message: "secrets is forbidden".to_string(),
            });
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn delete_pods(&self, namespace: &str, label_selector: &str) -> ClientResult<usize> {
        self.log(format!("delete:{}:{}", namespace, label_selector));
        if self.delete_error {
            return Err(ClientError::Api {
                status: 403,
                message: "pods is forbidden".to_string(),
            });
        }
        Ok(1)
    }
}

/// Connects by instance name; unknown names fail to connect
#[derive(Default)]
pub struct FakeConnector {
    connections: HashMap<String, Arc<FakeConnection>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, connection: Arc<FakeConnection>) -> Self {
        self.connections.insert(name.to_string(), connection);
        self
    }
}

#[async_trait]
impl InstanceConnector for FakeConnector {
    async fn connect(&self, instance: &Instance) -> ClientResult<Arc<dyn InstanceConnection>> {
        match self.connections.get(&instance.name) {
            Some(connection) => Ok(connection.clone()),
            None => Err(ClientError::Request(format!(
                "dial tcp: connection refused for {}",
                instance.name
            ))),
        }
    }
}
