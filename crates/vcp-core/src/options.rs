use std::fmt;

use crate::instance::Instance;
use crate::utils::mask_sensitive;

/// Name of the secret the platform agent inside a virtual cluster reads on startup
pub const REGISTRATION_SECRET_NAME: &str = "vcluster-platform-api-key";

/// Product label used to select virtual cluster workloads
pub const PRODUCT_LABEL: &str = "vcluster";

/// Input bundle for a registration invocation. Read-only once built.
#[derive(Clone, Default)]
pub struct RegistrationOptions {
    pub project: String,
    pub import_name: String,
    pub restart: bool,
    pub insecure: bool,
    pub access_key: String,
    pub host: String,
    pub certificate_authority_data: Vec<u8>,
    pub all: bool,
}

impl fmt::Debug for RegistrationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationOptions")
            .field("project", &self.project)
            .field("import_name", &self.import_name)
            .field("restart", &self.restart)
            .field("insecure", &self.insecure)
            .field("access_key", &mask_sensitive(&self.access_key))
            .field("host", &self.host)
            .field(
                "certificate_authority_data",
                &format!("{} bytes", self.certificate_authority_data.len()),
            )
            .field("all", &self.all)
            .finish()
    }
}

/// The credential artifact linking one instance to the control plane
#[derive(Clone, PartialEq, Eq)]
pub struct RegistrationRecord {
    pub namespace: String,
    pub import_name: String,
    pub project: String,
    pub access_key: String,
    pub host: String,
    pub insecure: bool,
    pub certificate_authority_data: Vec<u8>,
}

impl RegistrationRecord {
    /// Build the record for `instance`, scoped to the instance namespace
    pub fn for_instance(instance: &Instance, options: &RegistrationOptions) -> Self {
        Self {
            namespace: instance.namespace.clone(),
            import_name: options.import_name.clone(),
            project: options.project.clone(),
            access_key: options.access_key.clone(),
            host: options.host.clone(),
            insecure: options.insecure,
            certificate_authority_data: options.certificate_authority_data.clone(),
        }
    }

    /// Key/value pairs stored in the registration secret
    pub fn entries(&self) -> Vec<(&'static str, Vec<u8>)> {
        vec![
            ("accessKey", self.access_key.as_bytes().to_vec()),
            ("host", self.host.as_bytes().to_vec()),
            ("insecure", self.insecure.to_string().into_bytes()),
            ("name", self.import_name.as_bytes().to_vec()),
            ("project", self.project.as_bytes().to_vec()),
            (
                "certificateAuthorityData",
                self.certificate_authority_data.clone(),
            ),
        ]
    }
}

impl fmt::Debug for RegistrationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRecord")
            .field("namespace", &self.namespace)
            .field("import_name", &self.import_name)
            .field("project", &self.project)
            .field("access_key", &mask_sensitive(&self.access_key))
            .field("host", &self.host)
            .field("insecure", &self.insecure)
            .finish()
    }
}

/// Label selector matching the workload pods of one virtual cluster
pub fn workload_selector(instance_name: &str) -> String {
    format!("app={},release={}", PRODUCT_LABEL, instance_name)
}
