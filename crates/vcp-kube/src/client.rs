//! Thin JSON client over the Kubernetes REST API

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use vcp_core::{ClientError, ClientResult};

use crate::config::ClusterCredentials;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) const JSON: &str = "application/json";
pub(crate) const MERGE_PATCH: &str = "application/merge-patch+json";

/// Kubernetes `Status` body returned with failed requests
#[derive(Debug, Deserialize)]
struct StatusResponse {
    message: Option<String>,
    reason: Option<String>,
}

/// Generic list envelope; only the items are of interest
#[derive(Debug, Deserialize)]
pub(crate) struct ObjectList {
    #[serde(default)]
    pub items: Vec<Value>,
}

/// Authenticated client for one API server
#[derive(Clone)]
pub struct KubeClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    context: Option<String>,
}

impl std::fmt::Debug for KubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_deref().map(vcp_core::mask_sensitive))
            .field("context", &self.context)
            .finish()
    }
}

impl KubeClient {
    pub fn new(credentials: &ClusterCredentials) -> ClientResult<Self> {
        let mut builder = Client::builder().timeout(REQUEST_TIMEOUT);

        if let Some(ca) = &credentials.certificate_authority {
            let certificate = reqwest::Certificate::from_pem(ca).map_err(|e| {
                ClientError::configuration(format!("Invalid cluster CA certificate: {}", e))
            })?;
            builder = builder.add_root_certificate(certificate);
        }
        if credentials.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(|e| {
            ClientError::configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: credentials.server.trim_end_matches('/').to_string(),
            token: credentials.token.clone(),
            context: credentials.context.clone(),
        })
    }

    /// Name of the kube context this client was built from
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Make an authenticated request and decode the JSON response
    pub(crate) async fn api_request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        content_type: &str,
    ) -> ClientResult<T> {
        let url = format!("{}{}", self.base_url, path);

        debug!("Kubernetes API request: {} {}", method, path);

        let mut request = self
            .client
            .request(method, &url)
            .header("Accept", JSON);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request
                .header("Content-Type", content_type)
                .body(serde_json::to_vec(body)?);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Request(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<StatusResponse>(&error_body) {
                Ok(StatusResponse {
                    message: Some(message),
                    ..
                }) => message,
                Ok(StatusResponse {
                    reason: Some(reason),
                    ..
                }) => reason,
                _ if error_body.is_empty() => status.to_string(),
                _ => error_body,
            };
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| ClientError::Request(format!("Failed to read response: {}", e)))?;

        if response_text.is_empty() {
            return Ok(serde_json::from_str("{}")?);
        }

        Ok(serde_json::from_str(&response_text)?)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.api_request(Method::GET, path, None, JSON).await
    }

    /// GET that maps a 404 to `None`
    pub(crate) async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> ClientResult<Option<T>> {
        match self.get(path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub(crate) async fn list(&self, path: &str) -> ClientResult<Vec<Value>> {
        let list: ObjectList = self.get(path).await?;
        Ok(list.items)
    }
}

/// Append an encoded `labelSelector` query to `path`
pub(crate) fn with_selector(path: &str, selector: &str) -> String {
    format!("{}?labelSelector={}", path, urlencoding::encode(selector))
}

/// `metadata.name` of an API object
pub(crate) fn object_name(object: &Value) -> Option<&str> {
    object.pointer("/metadata/name").and_then(Value::as_str)
}
