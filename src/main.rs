//! Purpose: `folderloc` CLI entry point.
//! Role: Binary crate root; parses args, sets up logging, runs commands.
//! Invariants: Resolved paths go to stdout, one per line (or one JSON object per line).
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
#![allow(clippy::result_large_err)]
use std::error::Error as StdError;
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap::error::ErrorKind as ClapErrorKind;
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod handles_input;

use folderloc::api::{Error, ErrorKind, to_exit_code};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse_from(std::env::args_os().collect::<Vec<OsString>>()) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Internal)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Run `folderloc --help` for usage."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    init_tracing(cli.verbose);

    let color_mode = cli.color;
    let globals = command_dispatch::GlobalArgs {
        config: cli.config,
        base_url: cli.base_url,
        token: cli.token,
        color_mode,
    };
    command_dispatch::dispatch_command(cli.command, globals).map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "folderloc",
    version,
    about = "Resolve the repository folder location of publication outputs",
    long_about = None,
    after_help = r#"EXAMPLES
  $ folderloc --base-url https://example.com/InfoShareWS/ resolve GUID-412E3A98-9AA8-484E-A1AA-3DE3B58947BD
  \General\Folder1\Folder2

  $ printf 'GUID-1\nGUID-2\n' | folderloc resolve --keep-going --json

NOTES
  - Session profile: ~/.folderloc/session.json (override with --config)
  - FOLDERLOC_BASE_URL and FOLDERLOC_TOKEN override the profile; flags override both"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        help = "Session profile JSON (default: ~/.folderloc/session.json)",
        value_hint = ValueHint::FilePath
    )]
    config: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "Repository web service base url",
        value_hint = ValueHint::Url
    )]
    base_url: Option<String>,
    #[arg(long, global = true, help = "Bearer token for the repository web service")]
    token: Option<String>,
    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        action = ArgAction::Count,
        help = "Log progress to stderr (-v info, -vv debug)"
    )]
    verbose: u8,
    #[arg(
        long,
        global = true,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Print the folder location of publication outputs",
        long_about = r#"Print the folder location of one or more publication outputs.

Logical ids come from arguments, or from stdin as one id or JSON object per line
(objects need a logicalId/ishRef field). Stdin is read when no ids are given and
stdin is not a terminal, or when --stdin is passed."#,
        after_help = r#"EXAMPLES
  $ folderloc resolve GUID-1 GUID-2
  $ folderloc resolve --separator / --label Data=General GUID-1
  $ cat outputs.jsonl | folderloc resolve --stdin --jobs 4"#
    )]
    Resolve {
        #[arg(value_name = "LOGICAL_ID", help = "Publication output logical ids")]
        logical_ids: Vec<String>,
        #[arg(long, help = "Also read ids/handles from stdin")]
        stdin: bool,
        #[arg(long, help = "Folder path separator (default: \\)")]
        separator: Option<String>,
        #[arg(
            long = "label",
            value_name = "CATEGORY=LABEL",
            help = "Base folder label override (repeatable)"
        )]
        labels: Vec<String>,
        #[arg(long, help = "Resolve every item and report failures per item")]
        keep_going: bool,
        #[arg(long, default_value_t = 1, help = "Concurrent lookups")]
        jobs: usize,
        #[arg(long, help = "Emit one JSON object per line")]
        json: bool,
    },
    #[command(about = "Generate shell completion scripts")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
    #[command(about = "Print version info")]
    Version,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    rendered
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.trim_start_matches("error:").trim().to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::InvalidInput => "invalid input".to_string(),
        ErrorKind::RemoteLookup => "remote lookup failed".to_string(),
        ErrorKind::UnmappedCategory => "unmapped base folder category".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(logical_id) = err.logical_id() {
        inner.insert("logical_id".to_string(), json!(logical_id));
    }
    if let Some(index) = err.index() {
        inner.insert("index".to_string(), json!(index));
    }
    if let Some(status) = err.status() {
        inner.insert("status".to_string(), json!(status));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

#[derive(Copy, Clone)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, use_color: bool, color: AnsiColor) -> String {
    if !use_color {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\x1b[1;{code}m{label}\x1b[0m")
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(logical_id) = err.logical_id() {
        lines.push(format!(
            "{} {logical_id}",
            colorize_label("logical id:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(status) = err.status() {
        lines.push(format!(
            "{} {status}",
            colorize_label("status:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}
