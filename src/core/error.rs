//! Purpose: Discriminated error type shared by the resolver, remote client, and CLI.
//! Exports: `Error`, `ErrorKind`, `to_exit_code`.
//! Invariants: Every failure carries exactly one `ErrorKind`; context fields are additive.
//! Invariants: Exit codes per kind are stable once published.
use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    InvalidInput,
    RemoteLookup,
    UnmappedCategory,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    logical_id: Option<String>,
    index: Option<usize>,
    status: Option<u16>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            logical_id: None,
            index: None,
            status: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Logical id of the item that failed, when the failure is item-scoped.
    pub fn logical_id(&self) -> Option<&str> {
        self.logical_id.as_deref()
    }

    /// Zero-based position of the failing item within its batch.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// HTTP status returned by the remote service, if any.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_logical_id(mut self, logical_id: impl Into<String>) -> Self {
        self.logical_id = Some(logical_id.into());
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(logical_id) = &self.logical_id {
            write!(f, " (logical_id: {logical_id})")?;
        }
        if let Some(index) = self.index {
            write!(f, " (index: {index})")?;
        }
        if let Some(status) = self.status {
            write!(f, " (status: {status})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::InvalidInput => 3,
        ErrorKind::RemoteLookup => 4,
        ErrorKind::UnmappedCategory => 5,
    }
}
