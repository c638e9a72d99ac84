//! Purpose: Port for the remote folder-location lookup.
//! Exports: `FolderLookup`.
//! Role: Seam between the resolver and whatever transport talks to the repository.
//! Invariants: One call resolves exactly one logical id; implementations do not cache.
//! Invariants: Implementations report failures as `ErrorKind::RemoteLookup`.
use super::error::Error;
use super::location::{FolderLocation, LogicalId};

pub trait FolderLookup: Send + Sync {
    fn folder_location(&self, logical_id: &LogicalId) -> Result<FolderLocation, Error>;
}

impl<T: FolderLookup + ?Sized> FolderLookup for &T {
    fn folder_location(&self, logical_id: &LogicalId) -> Result<FolderLocation, Error> {
        (**self).folder_location(logical_id)
    }
}
