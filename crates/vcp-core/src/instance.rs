use serde::{Deserialize, Serialize};
use std::fmt;

/// Observed lifecycle state of a virtual cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    Active,
    Suspended,
}

impl InstanceStatus {
    pub fn is_suspended(&self) -> bool {
        matches!(self, InstanceStatus::Suspended)
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceStatus::Active => write!(f, "active"),
            InstanceStatus::Suspended => write!(f, "suspended"),
        }
    }
}

/// One managed virtual cluster discovered on the host cluster.
///
/// Instances are discovered fresh on every invocation. `status` is the
/// snapshot taken at discovery time; the lifecycle code re-queries it through
/// the instance connection instead of trusting this value while polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    pub namespace: String,
    /// Kube context the instance was discovered through
    pub context: Option<String>,
    pub status: InstanceStatus,
}

impl Instance {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            context: None,
            status: InstanceStatus::Active,
        }
    }

    pub fn with_status(mut self, status: InstanceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }

    pub fn is_suspended(&self) -> bool {
        self.status.is_suspended()
    }

    /// `namespace/name`, the form used in operator-facing messages
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
