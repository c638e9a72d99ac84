//! Purpose: Read publication output handles piped into `folderloc resolve`.
//! Exports: `read_handles`.
//! Role: Turns stdin lines into handles; the resolver only sees their logical ids.
//! Invariants: Blank lines are skipped; every other line yields at least one handle.
//! Invariants: Lines starting with `{`, `[`, or `"` are JSON; anything else is a bare id.
use std::io::BufRead;

use folderloc::api::{Error, ErrorKind, PublicationOutputHandle};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum HandleLine {
    One(PublicationOutputHandle),
    Many(Vec<PublicationOutputHandle>),
    Id(String),
}

pub(crate) fn read_handles<R: BufRead>(reader: R) -> Result<Vec<PublicationOutputHandle>, Error> {
    let mut handles = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message("failed to read stdin")
                .with_source(err)
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !trimmed.starts_with(['{', '[', '"']) {
            handles.push(PublicationOutputHandle::new(trimmed));
            continue;
        }
        let parsed: HandleLine = serde_json::from_str(trimmed).map_err(|err| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("invalid handle json on stdin line {}", index + 1))
                .with_hint("Each object needs a logicalId (or ishRef) string field.")
                .with_source(err)
        })?;
        match parsed {
            HandleLine::One(handle) => handles.push(handle),
            HandleLine::Many(many) => handles.extend(many),
            HandleLine::Id(id) => handles.push(PublicationOutputHandle::new(id)),
        }
    }
    Ok(handles)
}
