//! Purpose: Load the session profile (base url, token, separator, labels) from JSON.
//! Exports: `SessionConfig`, `default_config_path`.
//! Role: Single place that turns file + CLI overrides into a connected `Session`.
//! Invariants: Default profile lives at `~/.folderloc/session.json`; absence is not an error.
//! Invariants: Label entries merge over the stock table; they never remove stock labels.
#![allow(clippy::result_large_err)]

use std::collections::BTreeMap;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::remote::RemoteClient;
use crate::core::error::{Error, ErrorKind};
use crate::core::labels::BaseFolderLabels;
use crate::core::session::{DEFAULT_FOLDER_PATH_SEPARATOR, Session};

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ws_base_url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub folder_path_separator: Option<String>,
    #[serde(default)]
    pub base_folder_labels: BTreeMap<String, String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

pub fn default_config_path() -> PathBuf {
    let home = std::env::var_os("HOME").unwrap_or_default();
    PathBuf::from(home).join(".folderloc").join("session.json")
}

impl SessionConfig {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("failed to read config {}", path.display()))
                .with_source(err)
        })?;
        Self::parse(&text).map_err(|err| {
            err.with_message(format!("invalid config {}", path.display()))
        })
    }

    /// Like `load`, but a missing file yields the empty profile.
    pub fn load_optional(path: &Path) -> Result<Self, Error> {
        match std::fs::metadata(path) {
            Ok(_) => Self::load(path),
            Err(err) if err.kind() == IoErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(Error::new(ErrorKind::Usage)
                .with_message(format!("failed to stat config {}", path.display()))
                .with_source(err)),
        }
    }

    pub fn parse(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message("invalid config json")
                .with_hint("Expected keys: ws_base_url, token, folder_path_separator, base_folder_labels, timeout_ms.")
                .with_source(err)
        })
    }

    /// Fields set in `overrides` win; label maps are merged key by key.
    pub fn merge(mut self, overrides: SessionConfig) -> Self {
        if overrides.name.is_some() {
            self.name = overrides.name;
        }
        if overrides.ws_base_url.is_some() {
            self.ws_base_url = overrides.ws_base_url;
        }
        if overrides.token.is_some() {
            self.token = overrides.token;
        }
        if overrides.folder_path_separator.is_some() {
            self.folder_path_separator = overrides.folder_path_separator;
        }
        if overrides.timeout_ms.is_some() {
            self.timeout_ms = overrides.timeout_ms;
        }
        self.base_folder_labels.extend(overrides.base_folder_labels);
        self
    }

    pub fn labels(&self) -> BaseFolderLabels {
        let mut labels = BaseFolderLabels::default();
        for (category, label) in &self.base_folder_labels {
            labels.insert(category.clone(), label.clone());
        }
        labels
    }

    pub fn separator(&self) -> &str {
        self.folder_path_separator
            .as_deref()
            .unwrap_or(DEFAULT_FOLDER_PATH_SEPARATOR)
    }

    pub fn session_name(&self) -> String {
        match (&self.name, &self.ws_base_url) {
            (Some(name), _) => name.clone(),
            (None, Some(url)) => url.clone(),
            (None, None) => "default".to_string(),
        }
    }

    pub fn remote_client(&self) -> Result<RemoteClient, Error> {
        let base_url = self.ws_base_url.as_deref().ok_or_else(|| {
            Error::new(ErrorKind::Usage)
                .with_message("no repository base url configured")
                .with_hint("Pass --base-url, set FOLDERLOC_BASE_URL, or add ws_base_url to the config.")
        })?;
        let mut client = RemoteClient::new(base_url)?;
        if let Some(token) = &self.token {
            client = client.with_token(token.clone());
        }
        if let Some(timeout_ms) = self.timeout_ms {
            client = client.with_timeout(Duration::from_millis(timeout_ms));
        }
        Ok(client)
    }

    pub fn connect(&self) -> Result<Session<RemoteClient>, Error> {
        let client = self.remote_client()?;
        Session::new(self.session_name(), client)
            .with_separator(self.separator())
            .map(|session| session.with_labels(self.labels()))
    }
}
