//! Purpose: Value types for one folder-location lookup and the path assembled from it.
//! Exports: `LogicalId`, `FolderLocation`, `assemble_path`.
//! Role: Pure data + formatting; no I/O and no session state.
//! Invariants: A `LogicalId` is never empty; any other value is kept verbatim.
//! Invariants: Assembled paths always start with one separator and contain the label.
//! Invariants: Segment order is preserved exactly; no sorting or deduplication.
use std::fmt;

use super::error::{Error, ErrorKind};

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct LogicalId(String);

impl LogicalId {
    pub fn new(value: impl Into<String>) -> Result<Self, Error> {
        let value = value.into();
        if value.is_empty() {
            return Err(Error::new(ErrorKind::InvalidInput)
                .with_message("logical id must not be empty")
                .with_hint("Pass the LogicalId of a publication output, e.g. GUID-412E3A98."));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LogicalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Folder location as reported by the remote service for one logical id.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FolderLocation {
    /// Base folder category, e.g. `Data`.
    pub base_folder: String,
    /// Folder names beneath the base folder, root to leaf.
    pub folder_path: Vec<String>,
}

impl FolderLocation {
    pub fn new(base_folder: impl Into<String>, folder_path: Vec<String>) -> Self {
        Self {
            base_folder: base_folder.into(),
            folder_path,
        }
    }
}

pub fn assemble_path(separator: &str, label: &str, segments: &[String]) -> String {
    let mut path = String::with_capacity(
        separator.len() * (segments.len() + 1)
            + label.len()
            + segments.iter().map(String::len).sum::<usize>(),
    );
    path.push_str(separator);
    path.push_str(label);
    for segment in segments {
        path.push_str(separator);
        path.push_str(segment);
    }
    path
}
