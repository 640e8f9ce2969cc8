//! Core types shared across all vcp crates
//!
//! Holds the data model (instances, registration options, resource records),
//! the ports the orchestration crates talk through (host client, instance
//! connections, resource sources, interactive prompts) and the error
//! aggregator used by every batch operation.

pub mod aggregate;
pub mod client;
pub mod config;
pub mod error;
pub mod instance;
pub mod options;
pub mod prompt;
pub mod resource;
pub mod utils;

// Re-export commonly used types
pub use aggregate::*;
pub use client::*;
pub use config::*;
pub use error::*;
pub use instance::*;
pub use options::*;
pub use prompt::*;
pub use resource::*;
pub use utils::*;

// Re-export external dependencies
pub use async_trait;
pub use serde_json;
