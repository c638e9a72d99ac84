//! Purpose: Define the stable public Rust API boundary for folderloc.
//! Exports: Resolver, session, label, and error types plus the HTTP lookup client.
//! Role: Public, additive-only surface used by the CLI and integration tests.
//! Invariants: This module is the only public path the binary uses into `core`.

mod config;
mod remote;

pub use crate::core::error::{Error, ErrorKind, to_exit_code};
pub use crate::core::handle::{ObjectHandle, PublicationOutputHandle};
pub use crate::core::labels::{BaseFolderLabels, DEFAULT_BASE_FOLDER_LABELS};
pub use crate::core::location::{FolderLocation, LogicalId, assemble_path};
pub use crate::core::lookup::FolderLookup;
pub use crate::core::resolver::{BatchPolicy, FolderLocationResolver};
pub use crate::core::session::{DEFAULT_FOLDER_PATH_SEPARATOR, Session};
pub use config::{SessionConfig, default_config_path};
pub use remote::RemoteClient;
