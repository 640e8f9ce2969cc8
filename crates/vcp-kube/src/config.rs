//! Kubeconfig discovery
//!
//! Only the subset needed to reach the API server is understood: the server
//! URL, the cluster CA, `insecure-skip-tls-verify` and bearer tokens. Lookup
//! order is an explicit path, then `KUBECONFIG`, then `~/.kube/config`, then
//! the in-cluster service account.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use url::Url;

const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

#[derive(Error, Debug)]
pub enum KubeConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid kubeconfig: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Context not found: {0}")]
    ContextNotFound(String),

    #[error("Cluster not found: {0}")]
    ClusterNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("No current context set in kubeconfig")]
    NoCurrentContext,

    #[error("Invalid server URL {server}: {message}")]
    InvalidServer { server: String, message: String },

    #[error("Invalid certificate data: {0}")]
    InvalidCertificate(String),

    #[error("No kubeconfig found and not running inside a cluster")]
    NotFound,
}

/// Everything needed to open a connection to one API server
#[derive(Clone, PartialEq, Eq)]
pub struct ClusterCredentials {
    pub server: String,
    pub token: Option<String>,
    /// PEM encoded cluster CA
    pub certificate_authority: Option<Vec<u8>>,
    pub insecure: bool,
    /// Default namespace of the selected context
    pub namespace: Option<String>,
    /// Name of the selected context, if loaded from a kubeconfig
    pub context: Option<String>,
}

impl ClusterCredentials {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            token: None,
            certificate_authority: None,
            insecure: false,
            namespace: None,
            context: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl std::fmt::Debug for ClusterCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterCredentials")
            .field("server", &self.server)
            .field(
                "token",
                &self.token.as_deref().map(vcp_core::mask_sensitive),
            )
            .field("insecure", &self.insecure)
            .field("namespace", &self.namespace)
            .field("context", &self.context)
            .finish()
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct KubeConfig {
    #[serde(default)]
    pub clusters: Vec<NamedCluster>,
    #[serde(default)]
    pub contexts: Vec<NamedContext>,
    #[serde(default)]
    pub users: Vec<NamedUser>,
    pub current_context: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    pub cluster: Cluster,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Cluster {
    pub server: String,
    pub certificate_authority: Option<String>,
    pub certificate_authority_data: Option<String>,
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
}

#[derive(Debug, Deserialize)]
pub struct NamedContext {
    pub name: String,
    pub context: Context,
}

#[derive(Debug, Deserialize)]
pub struct Context {
    pub cluster: String,
    pub user: String,
    pub namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NamedUser {
    pub name: String,
    #[serde(default)]
    pub user: User,
}

#[derive(Debug, Deserialize, Default)]
pub struct User {
    pub token: Option<String>,
    #[serde(rename = "tokenFile")]
    pub token_file: Option<String>,
}

impl KubeConfig {
    pub fn from_yaml(content: &str) -> Result<Self, KubeConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn read(path: &Path) -> Result<Self, KubeConfigError> {
        let content = read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Resolve the credentials of `context`, or of the current context.
    /// Relative file references are resolved against `base_dir`.
    pub fn credentials(
        &self,
        context: Option<&str>,
        base_dir: &Path,
    ) -> Result<ClusterCredentials, KubeConfigError> {
        let context_name = context
            .map(str::to_string)
            .or_else(|| self.current_context.clone())
            .filter(|name| !name.is_empty())
            .ok_or(KubeConfigError::NoCurrentContext)?;

        let ctx = self
            .contexts
            .iter()
            .find(|c| c.name == context_name)
            .ok_or_else(|| KubeConfigError::ContextNotFound(context_name.clone()))?;
        let cluster = self
            .clusters
            .iter()
            .find(|c| c.name == ctx.context.cluster)
            .ok_or_else(|| KubeConfigError::ClusterNotFound(ctx.context.cluster.clone()))?;
        let user = self
            .users
            .iter()
            .find(|u| u.name == ctx.context.user)
            .ok_or_else(|| KubeConfigError::UserNotFound(ctx.context.user.clone()))?;

        validate_server(&cluster.cluster.server)?;

        let certificate_authority = match (
            &cluster.cluster.certificate_authority_data,
            &cluster.cluster.certificate_authority,
        ) {
            (Some(data), _) => Some(
                STANDARD
                    .decode(data.trim())
                    .map_err(|e| KubeConfigError::InvalidCertificate(e.to_string()))?,
            ),
            (None, Some(file)) => Some(read_bytes(&base_dir.join(file))?),
            (None, None) => None,
        };

        let token = match (&user.user.token, &user.user.token_file) {
            (Some(token), _) => Some(token.clone()),
            (None, Some(file)) => Some(read_to_string(&base_dir.join(file))?.trim().to_string()),
            (None, None) => None,
        };

        Ok(ClusterCredentials {
            server: cluster.cluster.server.trim_end_matches('/').to_string(),
            token,
            certificate_authority,
            insecure: cluster.cluster.insecure_skip_tls_verify,
            namespace: ctx.context.namespace.clone(),
            context: Some(context_name),
        })
    }
}

/// Locate and load credentials following the standard lookup order
pub fn load_credentials(
    kubeconfig: Option<&Path>,
    context: Option<&str>,
) -> Result<ClusterCredentials, KubeConfigError> {
    if let Some(path) = kubeconfig_path(kubeconfig) {
        debug!("Loading kubeconfig from {}", path.display());
        let config = KubeConfig::read(&path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        return config.credentials(context, base_dir);
    }

    debug!("No kubeconfig found, trying in-cluster configuration");
    in_cluster_credentials(Path::new(SERVICE_ACCOUNT_DIR))
}

fn kubeconfig_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(value) = std::env::var("KUBECONFIG") {
        // Only the first entry of a merged KUBECONFIG list is used
        if let Some(first) = std::env::split_paths(&value).find(|p| !p.as_os_str().is_empty()) {
            return Some(first);
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".kube").join("config"))
        .filter(|path| path.exists())
}

/// Credentials of the pod service account mounted at `dir`
pub fn in_cluster_credentials(dir: &Path) -> Result<ClusterCredentials, KubeConfigError> {
    let host = std::env::var("KUBERNETES_SERVICE_HOST").map_err(|_| KubeConfigError::NotFound)?;
    let port = std::env::var("KUBERNETES_SERVICE_PORT").unwrap_or_else(|_| "443".to_string());

    let token_path = dir.join("token");
    if !token_path.exists() {
        return Err(KubeConfigError::NotFound);
    }
    let token = read_to_string(&token_path)?.trim().to_string();
    let ca_path = dir.join("ca.crt");
    let certificate_authority = if ca_path.exists() {
        Some(read_bytes(&ca_path)?)
    } else {
        None
    };
    let namespace = read_to_string(&dir.join("namespace"))
        .ok()
        .map(|ns| ns.trim().to_string());

    let host = if host.contains(':') {
        format!("[{}]", host)
    } else {
        host
    };

    Ok(ClusterCredentials {
        server: format!("https://{}:{}", host, port),
        token: Some(token),
        certificate_authority,
        insecure: false,
        namespace,
        context: None,
    })
}

fn validate_server(server: &str) -> Result<(), KubeConfigError> {
    let url = Url::parse(server).map_err(|e| KubeConfigError::InvalidServer {
        server: server.to_string(),
        message: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(KubeConfigError::InvalidServer {
            server: server.to_string(),
            message: format!("unsupported scheme {}", other),
        }),
    }
}

fn read_to_string(path: &Path) -> Result<String, KubeConfigError> {
    fs::read_to_string(path).map_err(|source| KubeConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, KubeConfigError> {
    fs::read(path).map_err(|source| KubeConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
current-context: dev
clusters:
  - name: dev-cluster
    cluster:
      server: https://127.0.0.1:6443/
      certificate-authority-data: Y2EtcGVt
  - name: lab-cluster
    cluster:
      server: http://10.0.0.1:8080
      insecure-skip-tls-verify: true
contexts:
  - name: dev
    context:
      cluster: dev-cluster
      user: dev-user
      namespace: team-a
  - name: lab
    context:
      cluster: lab-cluster
      user: lab-user
users:
  - name: dev-user
    user:
      token: dev-token-123456
  - name: lab-user
    user:
      tokenFile: lab-token
"#;

    #[test]
    fn test_current_context_credentials() {
        let config = KubeConfig::from_yaml(KUBECONFIG).unwrap();
        let creds = config.credentials(None, Path::new("/nonexistent")).unwrap();

        assert_eq!(creds.server, "https://127.0.0.1:6443");
        assert_eq!(creds.token.as_deref(), Some("dev-token-123456"));
        assert_eq!(creds.certificate_authority.as_deref(), Some(&b"ca-pem"[..]));
        assert_eq!(creds.namespace.as_deref(), Some("team-a"));
        assert_eq!(creds.context.as_deref(), Some("dev"));
        assert!(!creds.insecure);
    }

    #[test]
    fn test_context_override_with_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut token_file = fs::File::create(dir.path().join("lab-token")).unwrap();
        writeln!(token_file, "lab-token-value").unwrap();

        let config = KubeConfig::from_yaml(KUBECONFIG).unwrap();
        let creds = config.credentials(Some("lab"), dir.path()).unwrap();

        assert_eq!(creds.server, "http://10.0.0.1:8080");
        assert_eq!(creds.token.as_deref(), Some("lab-token-value"));
        assert!(creds.insecure);
        assert!(creds.certificate_authority.is_none());
        assert!(creds.namespace.is_none());
    }

    #[test]
    fn test_unknown_context() {
        let config = KubeConfig::from_yaml(KUBECONFIG).unwrap();
        let err = config
            .credentials(Some("missing"), Path::new("."))
            .unwrap_err();
        assert!(matches!(err, KubeConfigError::ContextNotFound(name) if name == "missing"));
    }

    #[test]
    fn test_no_current_context() {
        let config = KubeConfig::from_yaml("clusters: []\n").unwrap();
        let err = config.credentials(None, Path::new(".")).unwrap_err();
        assert!(matches!(err, KubeConfigError::NoCurrentContext));
    }

    #[test]
    fn test_invalid_server_scheme() {
        let yaml = KUBECONFIG.replace("https://127.0.0.1:6443/", "ftp://127.0.0.1");
        let config = KubeConfig::from_yaml(&yaml).unwrap();
        let err = config.credentials(None, Path::new(".")).unwrap_err();
        assert!(matches!(err, KubeConfigError::InvalidServer { .. }));
    }

    #[test]
    fn test_load_credentials_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, KUBECONFIG).unwrap();

        let creds = load_credentials(Some(&path), None).unwrap();
        assert_eq!(creds.context.as_deref(), Some("dev"));
    }

    #[test]
    fn test_debug_masks_token() {
        let creds = ClusterCredentials::new("https://k8s").with_token("secret-token-value");
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("secret-token-value"));
    }
}
