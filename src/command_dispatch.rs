//! Purpose: Hold top-level CLI command dispatch for `folderloc`.
//! Exports: `GlobalArgs`, `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Fail-fast runs print nothing to stdout when any item fails.
//! Invariants: `--keep-going` prints every success in input order, errors go to stderr.
use std::io::Write;

use tracing::{debug, info};

use super::*;
use crate::handles_input::read_handles;
use folderloc::api::{
    FolderLocationResolver, ObjectHandle, PublicationOutputHandle, SessionConfig,
    default_config_path,
};

pub(super) struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub color_mode: ColorMode,
}

pub(super) fn dispatch_command(command: Command, globals: GlobalArgs) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "folderloc", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            println!("folderloc {}", env!("CARGO_PKG_VERSION"));
            Ok(RunOutcome::ok())
        }
        Command::Resolve {
            logical_ids,
            stdin,
            separator,
            labels,
            keep_going,
            jobs,
            json,
        } => {
            let mut overrides = SessionConfig {
                folder_path_separator: separator,
                ..SessionConfig::default()
            };
            for raw in &labels {
                let (category, label) = parse_label_override(raw)?;
                overrides.base_folder_labels.insert(category, label);
            }
            let config = load_config(&globals)?.merge(overrides);

            let mut handles = logical_ids
                .into_iter()
                .map(PublicationOutputHandle::new)
                .collect::<Vec<_>>();
            if stdin || (handles.is_empty() && !io::stdin().is_terminal()) {
                let stdin = io::stdin();
                handles.extend(read_handles(stdin.lock())?);
            }
            if handles.is_empty() {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("no logical ids given")
                    .with_hint("Pass LOGICAL_ID arguments or pipe ids into stdin."));
            }

            let session = config.connect()?;
            debug!(
                "Using session[{}] with separator[{}]",
                session.name(),
                session.separator()
            );
            let resolver = FolderLocationResolver::new(&session).with_parallelism(jobs);

            if keep_going {
                let results = resolver.resolve_objects_each(&handles);
                let mut first_failure = None;
                let mut resolved = 0usize;
                let mut out = io::stdout().lock();
                for (handle, result) in handles.iter().zip(results) {
                    match result {
                        Ok(path) => {
                            write_path(&mut out, handle, &path, json)?;
                            resolved += 1;
                        }
                        Err(err) => {
                            emit_error(&err, globals.color_mode);
                            if first_failure.is_none() {
                                first_failure = Some(err.kind());
                            }
                        }
                    }
                }
                info!("returned folderlocation count[{resolved}]");
                return Ok(match first_failure {
                    Some(kind) => RunOutcome::with_code(to_exit_code(kind)),
                    None => RunOutcome::ok(),
                });
            }

            let paths = resolver.resolve_objects(&handles)?;
            info!("returned folderlocation count[{}]", paths.len());
            let mut out = io::stdout().lock();
            for (handle, path) in handles.iter().zip(&paths) {
                write_path(&mut out, handle, path, json)?;
            }
            Ok(RunOutcome::ok())
        }
    }
}

fn load_config(globals: &GlobalArgs) -> Result<SessionConfig, Error> {
    let file = match &globals.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::load_optional(&default_config_path())?,
    };
    let env = SessionConfig {
        ws_base_url: non_empty_env("FOLDERLOC_BASE_URL"),
        token: non_empty_env("FOLDERLOC_TOKEN"),
        ..SessionConfig::default()
    };
    let cli = SessionConfig {
        ws_base_url: globals.base_url.clone(),
        token: globals.token.clone(),
        ..SessionConfig::default()
    };
    Ok(file.merge(env).merge(cli))
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

fn parse_label_override(raw: &str) -> Result<(String, String), Error> {
    match raw.split_once('=') {
        Some((category, label)) if !category.is_empty() && !label.is_empty() => {
            Ok((category.to_string(), label.to_string()))
        }
        _ => Err(Error::new(ErrorKind::Usage)
            .with_message(format!("invalid --label value '{raw}'"))
            .with_hint("Use CATEGORY=LABEL, e.g. --label Data=General.")),
    }
}

fn write_path(
    out: &mut impl Write,
    handle: &PublicationOutputHandle,
    path: &str,
    json: bool,
) -> Result<(), Error> {
    let written = if json {
        let value = json!({ "logical_id": handle.logical_id(), "path": path });
        writeln!(out, "{value}")
    } else {
        writeln!(out, "{path}")
    };
    written.map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to write output")
            .with_source(err)
    })
}
