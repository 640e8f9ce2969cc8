//! Registration of virtual clusters with the platform
//!
//! Resolves the target instances, wakes (or leaves asleep) suspended ones,
//! writes the registration secret and optionally restarts the workloads.
//! Failures of individual targets are aggregated so one broken instance never
//! stops the rest of an `--all` run.

pub mod apply;
pub mod error;
pub mod lifecycle;
pub mod resolver;
pub mod service;

#[cfg(test)]
mod testing;

pub use apply::{apply_registration, ApplyOutcome};
pub use error::{AddVClusterError, RegisterError};
pub use lifecycle::{WakeController, WakeState, LEAVE_SLEEPING, WAKE_NOW};
pub use resolver::{resolve_targets, TargetSelector};
pub use service::RegistrationService;
