//! Purpose: Library crate behind the `folderloc` CLI and its tests.
//! Exports: `core` (resolution, labels, errors) and `api` (stable surface, remote client, config).
//! Role: Resolves publication output logical ids into repository folder paths.
//! Invariants: Core modules do no I/O; transports plug in through `core::lookup::FolderLookup`.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
