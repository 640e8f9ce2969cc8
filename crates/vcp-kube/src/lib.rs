//! Kubernetes implementation of the vcp client ports
//!
//! Talks to the API server over plain REST with `reqwest`. Credentials come
//! from a kubeconfig or the in-cluster service account.

pub mod client;
pub mod config;
pub mod host;
pub mod instance;
pub mod resources;

pub use client::KubeClient;
pub use config::{
    in_cluster_credentials, load_credentials, ClusterCredentials, KubeConfig, KubeConfigError,
};
pub use host::{is_paused, PAUSED_ANNOTATION, PAUSED_REPLICAS_ANNOTATION};
pub use instance::{KubeConnector, KubeInstanceConnection};
pub use resources::PLATFORM_DEPLOYMENT;
