//! Multi-document YAML archive of collected resources

use serde::Deserialize;
use serde_json::Value;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use vcp_core::ResourceRecord;

use crate::error::ArchiveError;

const DOCUMENT_SEPARATOR: &str = "---\n";

/// Serialize `records` as one YAML document each, in order
pub fn to_yaml(records: &[ResourceRecord]) -> Result<Vec<u8>, ArchiveError> {
    let documents = records
        .iter()
        .map(|record| serde_yaml::to_string(&record.object))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(documents.join(DOCUMENT_SEPARATOR).into_bytes())
}

/// Read every object back out of an archive
pub fn parse(bytes: &[u8]) -> Result<Vec<Value>, ArchiveError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let mut objects = Vec::new();
    for document in serde_yaml::Deserializer::from_slice(bytes) {
        let value = Value::deserialize(document)?;
        if !value.is_null() {
            objects.push(value);
        }
    }
    Ok(objects)
}

/// Write the archive to `path`, replacing any existing file.
///
/// The bytes land in a sibling file first and are renamed over `path` once
/// fully written, so an interrupted write leaves the previous archive intact.
pub async fn persist(bytes: &[u8], path: &Path) -> Result<(), ArchiveError> {
    let to_error = |source: std::io::Error| ArchiveError::Persist {
        path: path.to_path_buf(),
        source,
    };

    let partial = partial_path(path).map_err(to_error)?;
    if let Err(err) = write_file(bytes, &partial).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(to_error(err));
    }
    tokio::fs::rename(&partial, path).await.map_err(to_error)
}

fn partial_path(path: &Path) -> std::io::Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file path")
    })?;
    let mut partial = OsString::from(".");
    partial.push(name);
    partial.push(".partial");
    Ok(path.with_file_name(partial))
}

async fn write_file(bytes: &[u8], path: &Path) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o644);

    let mut file = options.open(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}
