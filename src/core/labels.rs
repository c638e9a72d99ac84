//! Purpose: Session-scoped table translating base-folder categories into display labels.
//! Exports: `BaseFolderLabels`, `DEFAULT_BASE_FOLDER_LABELS`.
//! Invariants: Lookups are exact, case-sensitive matches on the category name.
//! Invariants: An unknown category is an `UnmappedCategory` error, never a silent fallback.
use std::collections::BTreeMap;

use super::error::{Error, ErrorKind};

/// Categories the repository reports out of the box, with their stock labels.
pub const DEFAULT_BASE_FOLDER_LABELS: [(&str, &str); 4] = [
    ("Data", "General"),
    ("System", "System"),
    ("Favorites", "Favorites"),
    ("EditorTemplate", "Editor Template"),
];

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BaseFolderLabels {
    labels: BTreeMap<String, String>,
}

impl BaseFolderLabels {
    /// Empty table; every lookup fails until entries are inserted.
    pub fn empty() -> Self {
        Self {
            labels: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, category: impl Into<String>, label: impl Into<String>) {
        self.labels.insert(category.into(), label.into());
    }

    pub fn with_label(mut self, category: impl Into<String>, label: impl Into<String>) -> Self {
        self.insert(category, label);
        self
    }

    pub fn label_for(&self, category: &str) -> Result<&str, Error> {
        self.labels
            .get(category)
            .map(String::as_str)
            .ok_or_else(|| {
                Error::new(ErrorKind::UnmappedCategory)
                    .with_message(format!("base folder category '{category}' has no label"))
                    .with_hint("Add a label with --label CATEGORY=LABEL or in base_folder_labels.")
            })
    }
}

impl Default for BaseFolderLabels {
    fn default() -> Self {
        DEFAULT_BASE_FOLDER_LABELS
            .iter()
            .fold(Self::empty(), |labels, (category, label)| {
                labels.with_label(*category, *label)
            })
    }
}

impl<K, V> FromIterator<(K, V)> for BaseFolderLabels
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut labels = Self::empty();
        for (category, label) in iter {
            labels.insert(category, label);
        }
        labels
    }
}
