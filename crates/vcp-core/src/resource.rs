use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Identifies a listable control-plane resource by API group, version and plural
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiResource {
    pub group: &'static str,
    pub version: &'static str,
    pub kind: &'static str,
    pub plural: &'static str,
}

impl ApiResource {
    /// `group/version`, or the bare version for the core group
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.to_string()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

/// One collected object from a backup scan.
///
/// `kind` is the catalogue name the object was collected under (e.g.
/// `users`); `object` is the self-describing payload carrying its own
/// `apiVersion` and `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub kind: String,
    pub object: Value,
}

impl ResourceRecord {
    pub fn new(kind: impl Into<String>, object: Value) -> Self {
        Self {
            kind: kind.into(),
            object,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.object
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
    }
}

/// Resource kind names to leave out of a backup.
///
/// Names are matched case-sensitively; a name that matches no catalogue entry
/// simply skips nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipSet(BTreeSet<String>);

impl SkipSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.0.contains(kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SkipSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        SkipSet(iter.into_iter().map(Into::into).collect())
    }
}
