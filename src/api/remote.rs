//! Purpose: Blocking HTTP/JSON client for the repository's publication output folder lookup.
//! Exports: `RemoteClient`.
//! Role: `FolderLookup` implementation used by the CLI; one GET per logical id.
//! Invariants: Base URLs keep their path prefix (e.g. `/InfoShareWS/`) and end with `/`.
//! Invariants: Every failure (transport, status, body) surfaces as `ErrorKind::RemoteLookup`.
//! Invariants: An absent or null `folderPath` decodes to zero segments.
#![allow(clippy::result_large_err)]

use crate::core::error::{Error, ErrorKind};
use crate::core::location::{FolderLocation, LogicalId};
use crate::core::lookup::FolderLookup;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

type ApiResult<T> = Result<T, Error>;

#[derive(Clone)]
pub struct RemoteClient {
    inner: Arc<RemoteClientInner>,
}

struct RemoteClientInner {
    base_url: Url,
    token: Option<String>,
    agent: ureq::Agent,
}

impl fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &self.inner.token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct FolderLocationEnvelope {
    #[serde(rename = "baseFolder")]
    base_folder: String,
    #[serde(rename = "folderPath", default)]
    folder_path: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: RemoteError,
}

#[derive(Deserialize)]
struct RemoteError {
    kind: String,
    message: Option<String>,
    hint: Option<String>,
}

impl RemoteClient {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        let agent = ureq::AgentBuilder::new().build();
        Ok(Self {
            inner: Arc::new(RemoteClientInner {
                base_url,
                token: None,
                agent,
            }),
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.token = Some(token.into());
        } else {
            self.inner = Arc::new(RemoteClientInner {
                base_url: self.inner.base_url.clone(),
                token: Some(token.into()),
                agent: self.inner.agent.clone(),
            });
        }
        self
    }

    /// Applies one overall deadline to every request made by this client.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        self.with_agent(agent)
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub fn folder_location(&self, logical_id: &LogicalId) -> ApiResult<FolderLocation> {
        let url = build_url(
            &self.inner.base_url,
            &["publicationoutputs", logical_id.as_str(), "folderlocation"],
        )?;
        debug!(url = %url, "requesting folder location");
        let envelope: FolderLocationEnvelope = self.get_json(&url)?;
        Ok(FolderLocation::new(
            envelope.base_folder,
            envelope.folder_path.unwrap_or_default(),
        ))
    }

    fn get_json<R>(&self, url: &Url) -> ApiResult<R>
    where
        R: DeserializeOwned,
    {
        let response = self
            .request("GET", url)
            .set("Accept", "application/json")
            .call();

        match response {
            Ok(resp) => read_json_response(resp),
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Err(parse_error_response(code, &body))
            }
            Err(ureq::Error::Transport(err)) => Err(Error::new(ErrorKind::RemoteLookup)
                .with_message("request failed")
                .with_hint("Check the base url and that the repository service is reachable.")
                .with_source(err)),
        }
    }

    fn request(&self, method: &str, url: &Url) -> ureq::Request {
        let mut request = self.inner.agent.request(method, url.as_str());
        if let Some(token) = &self.inner.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        request
    }

    fn with_agent(mut self, agent: ureq::Agent) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.agent = agent;
        } else {
            self.inner = Arc::new(RemoteClientInner {
                base_url: self.inner.base_url.clone(),
                token: self.inner.token.clone(),
                agent,
            });
        }
        self
    }
}

impl FolderLookup for RemoteClient {
    fn folder_location(&self, logical_id: &LogicalId) -> Result<FolderLocation, Error> {
        RemoteClient::folder_location(self, logical_id)
    }
}

fn normalize_base_url(raw: String) -> ApiResult<Url> {
    let mut url = Url::parse(&raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid remote base url")
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("remote base url must use http or https scheme"));
    }
    if url.cannot_be_a_base() {
        return Err(Error::new(ErrorKind::Usage).with_message("remote base url cannot be a base"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn build_url(base_url: &Url, segments: &[&str]) -> ApiResult<Url> {
    let mut url = base_url.clone();
    {
        let mut path = url.path_segments_mut().map_err(|_| {
            Error::new(ErrorKind::Usage).with_message("remote base url cannot be a base")
        })?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}

fn read_json_response<R>(response: ureq::Response) -> ApiResult<R>
where
    R: DeserializeOwned,
{
    let body = response.into_string().map_err(|err| {
        Error::new(ErrorKind::RemoteLookup)
            .with_message("failed to read response body")
            .with_source(err)
    })?;
    decode_json(&body)
}

fn decode_json<R>(body: &str) -> ApiResult<R>
where
    R: DeserializeOwned,
{
    serde_json::from_str(body).map_err(|err| {
        Error::new(ErrorKind::RemoteLookup)
            .with_message("invalid folder location response json")
            .with_source(err)
    })
}

fn parse_error_response(status: u16, body: &str) -> Error {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return error_from_remote(envelope.error).with_status(status);
    }
    Error::new(ErrorKind::RemoteLookup)
        .with_message(format!("remote error status {status}"))
        .with_status(status)
}

fn error_from_remote(remote: RemoteError) -> Error {
    let message = match remote.message {
        Some(message) => format!("remote rejected lookup ({}): {message}", remote.kind),
        None => format!("remote rejected lookup ({})", remote.kind),
    };
    let mut err = Error::new(ErrorKind::RemoteLookup).with_message(message);
    if let Some(hint) = remote.hint {
        err = err.with_hint(hint);
    }
    err
}
