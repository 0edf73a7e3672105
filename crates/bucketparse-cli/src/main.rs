use std::fs;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use bucketparse_core::{ParseOutcome, ParseStatus, ParserOptions, Record, parse_records};
use clap::{Args, Parser, Subcommand};
use glob::glob;
use tracing_subscriber::EnvFilter;

const EXAMPLES: &str = "Examples:\n  bucketparse parse uplink.json -o parsed.json\n  cat uplink.json | bucketparse parse - --stdout --pretty\n  bucketparse parse uplink.json --stdout --config parser.json";

#[derive(Parser, Debug)]
#[command(name = "bucketparse")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUCKETPARSE_BUILD_COMMIT"), ")"))]
#[command(
    about = "Decode LoRaWAN bucket payloads and append the decoded variables.",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    /// Log filter (e.g. "warn", "debug", "bucketparse_core=trace"); defaults to RUST_LOG, then "warn"
    #[arg(long, global = true, env = "BUCKETPARSE_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the payload parser over a JSON array of records.
    #[command(after_help = EXAMPLES)]
    Parse(ParseArgs),
}

#[derive(Args, Debug)]
struct ParseArgs {
    /// Path to a .json file with an array of records, or "-" for stdin
    input: PathBuf,

    /// Output path for the parsed records (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    output: Option<PathBuf>,

    /// Write parsed records to stdout
    #[arg(long, conflicts_with = "output")]
    stdout: bool,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,

    /// Parser options file (JSON)
    #[arg(long, env = "BUCKETPARSE_CONFIG")]
    config: Option<PathBuf>,

    /// Copy the payload record's time onto decoded variables
    #[arg(long)]
    copy_time: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code if the payload could not be parsed
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = init_logging(cli.log_level.as_deref()).and_then(|()| match cli.command {
        Commands::Parse(args) => cmd_parse(args),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn init_logging(level: Option<&str>) -> Result<(), CliError> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).map_err(|err| {
            CliError::new(
                format!("invalid log filter '{}'", level),
                Some(format!("filter error: {}", err)),
            )
        })?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
    Ok(())
}

fn cmd_parse(args: ParseArgs) -> Result<(), CliError> {
    if args.pretty && args.compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    let options = load_options(args.config.as_deref(), args.copy_time)?;

    let input = if is_stdin(&args.input) {
        None
    } else {
        let resolved = resolve_input_path(&args.input)?;
        validate_input_file(&resolved)?;
        Some(resolved)
    };

    let output = match (args.stdout, args.output) {
        (true, _) => None,
        (false, Some(path)) => Some(path),
        (false, None) => {
            return Err(CliError::new(
                "missing output path",
                Some("use -o/--output or --stdout".to_string()),
            ));
        }
    };

    if let (Some(input), Some(output)) = (input.as_ref(), output.as_ref()) {
        ensure_distinct_paths(input, output)?;
    }

    let records = read_records(input.as_deref())?;
    tracing::info!(records = records.len(), "records loaded");
    let outcome = parse_records(records, &options);
    let json = serialize_records(&outcome.records, args.pretty)?;

    match output {
        None => print!("{}", json),
        Some(path) => {
            write_output(&path, &json)?;
            if !args.quiet {
                eprintln!("OK: records written -> {}", path.display());
            }
        }
    }

    if args.strict {
        strict_check(&outcome)?;
    }
    Ok(())
}

fn load_options(config: Option<&Path>, copy_time: bool) -> Result<ParserOptions, CliError> {
    let mut options = match config {
        Some(path) => ParserOptions::from_json_file(path).map_err(|err| {
            CliError::new(
                err.to_string(),
                Some("expected a JSON object such as {\"copy_time\": true}".to_string()),
            )
        })?,
        None => ParserOptions::default(),
    };
    if copy_time {
        options.copy_time = true;
    }
    tracing::debug!(?options, "parser options");
    Ok(options)
}

fn read_records(input: Option<&Path>) -> Result<Vec<Record>, CliError> {
    let (json, origin) = match input {
        Some(path) => (
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file: {}", path.display()))?,
            path.display().to_string(),
        ),
        None => {
            let mut json = String::new();
            std::io::stdin()
                .read_to_string(&mut json)
                .context("Failed to read records from stdin")?;
            (json, "stdin".to_string())
        }
    };

    serde_json::from_str(&json).map_err(|err| {
        CliError::new(
            format!("invalid records in {}: {}", origin, err),
            Some("expected a JSON array such as [{\"variable\": \"data\", \"value\": \"0109611395\"}]".to_string()),
        )
    })
}

fn serialize_records(records: &[Record], pretty: bool) -> Result<String, CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(records)
    } else {
        serde_json::to_string(records)
    };
    json.context("JSON serialization failed").map_err(Into::into)
}

fn write_output(path: &Path, json: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(path, json)
        .with_context(|| format!("Failed to write output: {}", path.display()))?;
    Ok(())
}

fn strict_check(outcome: &ParseOutcome) -> Result<(), CliError> {
    match &outcome.status {
        ParseStatus::Failed { kind, message } => Err(CliError::new(
            format!("payload parse failed ({} error): {}", kind, message),
            Some("the output holds a single parse_error record".to_string()),
        )),
        ParseStatus::NoPayload | ParseStatus::Decoded { .. } => Ok(()),
    }
}

fn ensure_distinct_paths(input: &Path, output: &Path) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let output_dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // A missing output directory cannot contain the input.
    let Ok(output_dir) = fs::canonicalize(output_dir) else {
        return Ok(());
    };
    let Some(file_name) = output.file_name() else {
        return Err(CliError::new(
            format!("invalid output path: {}", output.display()),
            Some("pass a file path, not a directory".to_string()),
        ));
    };
    if output_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!("output path must differ from input: {}", output.display()),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn is_stdin(input: &Path) -> bool {
    input.as_os_str() == "-"
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .json file or - for stdin".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .json file or - for stdin".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "json" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .json file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected a .json file".to_string()),
        ));
    }
    if matches.len() > 1 {
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let more = if matches.len() > 3 { ", ..." } else { "" };
        return Err(CliError::new(
            format!(
                "multiple files match pattern '{}' ({} matches); matches: {}{}",
                pattern,
                matches.len(),
                listed,
                more
            ),
            Some("pass a single records file, or run once per file".to_string()),
        ));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
