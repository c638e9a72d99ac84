//! Purpose: Read-only session context handed to the resolver.
//! Exports: `Session`, `DEFAULT_FOLDER_PATH_SEPARATOR`.
//! Role: Bundles the remote lookup handle with separator and label configuration.
//! Invariants: The separator is never empty.
//! Invariants: Nothing in the resolver mutates a session; reuse across calls is safe.
use super::error::{Error, ErrorKind};
use super::labels::BaseFolderLabels;
use super::lookup::FolderLookup;

pub const DEFAULT_FOLDER_PATH_SEPARATOR: &str = "\\";

#[derive(Debug)]
pub struct Session<L> {
    name: String,
    separator: String,
    labels: BaseFolderLabels,
    lookup: L,
}

impl<L: FolderLookup> Session<L> {
    pub fn new(name: impl Into<String>, lookup: L) -> Self {
        Self {
            name: name.into(),
            separator: DEFAULT_FOLDER_PATH_SEPARATOR.to_string(),
            labels: BaseFolderLabels::default(),
            lookup,
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Result<Self, Error> {
        let separator = separator.into();
        if separator.is_empty() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("folder path separator must not be empty")
                .with_hint("Use a separator such as \\ or /."));
        }
        self.separator = separator;
        Ok(self)
    }

    pub fn with_labels(mut self, labels: BaseFolderLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn labels(&self) -> &BaseFolderLabels {
        &self.labels
    }

    pub fn label_for(&self, category: &str) -> Result<&str, Error> {
        self.labels.label_for(category)
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }
}
