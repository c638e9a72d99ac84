//! Purpose: Object handles that carry a logical id into the resolver.
//! Exports: `ObjectHandle`, `PublicationOutputHandle`.
//! Role: Lets callers pass richer objects; only the logical id reaches the lookup.
//! Invariants: Extra handle fields feed diagnostics only and never change the result.
use serde::Deserialize;

pub trait ObjectHandle {
    fn logical_id(&self) -> &str;

    /// Short label for debug logging; defaults to the logical id.
    fn describe(&self) -> String {
        self.logical_id().to_string()
    }
}

/// A publication output object as it travels through a pipeline.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicationOutputHandle {
    #[serde(alias = "ishRef", alias = "logical_id")]
    pub logical_id: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, alias = "lng_ref")]
    pub lng_ref: Option<u64>,
}

impl PublicationOutputHandle {
    pub fn new(logical_id: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            ..Self::default()
        }
    }
}

impl ObjectHandle for PublicationOutputHandle {
    fn logical_id(&self) -> &str {
        &self.logical_id
    }

    fn describe(&self) -> String {
        let mut label = self.logical_id.clone();
        if let Some(version) = &self.version {
            label.push_str(&format!(" version[{version}]"));
        }
        if let Some(language) = &self.language {
            label.push_str(&format!(" language[{language}]"));
        }
        if let Some(lng_ref) = self.lng_ref {
            label.push_str(&format!(" lngRef[{lng_ref}]"));
        }
        label
    }
}
