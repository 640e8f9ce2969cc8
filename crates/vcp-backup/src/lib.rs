//! Platform management plane backup
//!
//! Lists every resource kind in the catalogue, strips server-populated
//! fields and writes the objects to a multi-document YAML file. Kinds that
//! fail to list are reported as warnings and do not stop the backup.

pub mod archive;
pub mod catalogue;
pub mod collector;
pub mod error;
pub mod service;

#[cfg(test)]
mod testing;

pub use archive::{parse, persist, to_yaml};
pub use catalogue::{is_known_kind, kind_names, CATALOGUE};
pub use collector::{collect, normalize};
pub use error::{ArchiveError, BackupError, CollectionError};
pub use service::{BackupOutcome, BackupService, BackupSummary};
