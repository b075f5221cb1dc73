//! Treasure Log Parser CLI Application
//!
//! This is the command-line interface for the treasure log parser.
//! It uses the treasure-log-parser library and adds:
//! - Input/output path resolution (output lands next to the log)
//! - TOML configuration with command-line overrides
//! - Subject labelling from the input file name
//! - Optional timing marker trace

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use treasure_log_parser::{EventCorrelator, OutputFormat, TimingTrace};

mod config;
mod report;

/// Default log file name when a session directory is given
const DEFAULT_LOG_NAME: &str = "log.txt";

/// Treasure Log Parser - Convert treasure hunt session logs into event tables
#[derive(Parser, Debug)]
#[command(name = "treasure-log")]
#[command(about = "Convert treasure hunt session logs into per-event tables", long_about = None)]
#[command(version)]
struct Args {
    /// Session log to convert (a directory means <dir>/log.txt)
    #[arg(value_name = "LOG")]
    input: PathBuf,

    /// Output file (default: treasure.par next to the log)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Append a subject column (default value: derived from the log path)
    #[arg(long, value_name = "ID", num_args = 0..=1)]
    subject: Option<Option<String>>,

    /// Leave out the isRecFromStartSide column
    #[arg(long)]
    no_start_side: bool,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Also write the timing marker trace
    #[arg(long)]
    timing: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Tsv,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Tsv => OutputFormat::Tsv,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Treasure Log Parser CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using parser library v{}", treasure_log_parser::VERSION);

    convert(&args)
}

/// Correlate one session log and write its tables
fn convert(args: &Args) -> Result<()> {
    let mut app_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => config::AppConfig::default(),
    };

    let input = resolve_input(&args.input);
    apply_overrides(&mut app_config, args, &input);
    let parser_config = app_config.parser_config();
    parser_config.validate()?;

    let text = fs::read_to_string(&input)
        .with_context(|| format!("Failed to read session log: {:?}", input))?;

    let mut correlator = EventCorrelator::new(parser_config.vocabulary.clone());
    correlator
        .process_text(&text)
        .with_context(|| format!("Failed to convert {:?}", input))?;
    let stats = correlator.stats();
    let table = correlator.finish();

    // Both views are built before any file is created
    let markers = if app_config.timing.enabled {
        let mut trace = TimingTrace::new(parser_config.vocabulary.clone());
        trace
            .process_text(&text)
            .with_context(|| format!("Failed to build timing trace for {:?}", input))?;
        Some(trace.finish())
    } else {
        None
    };

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| session_dir(&input).join(&app_config.output.file_name));
    report::write_records(&output, &table, &parser_config.output)?;

    if let Some(markers) = markers {
        let timing_path = session_dir(&output).join(&app_config.timing.file_name);
        report::write_timing(&timing_path, &markers, &parser_config.output.missing_token)?;
    }

    if !args.quiet {
        println!("✓ {:?} → {:?}", input, output);
        println!(
            "  {} chests ({} empty), {} recalls, {} blocks",
            stats.chests, stats.empty_chests, stats.recalls, stats.blocks
        );
    }

    Ok(())
}

/// Command-line flags win over the config file
fn apply_overrides(app_config: &mut config::AppConfig, args: &Args, input: &Path) {
    let schema = &mut app_config.output.schema;

    if args.no_start_side {
        schema.include_start_side = false;
    }
    if let Some(format) = args.format {
        schema.format = format.into();
    }
    match &args.subject {
        Some(Some(subject)) => schema.subject = Some(subject.clone()),
        Some(None) => schema.subject = Some(subject_from_path(input)),
        None => {}
    }
    if args.timing {
        app_config.timing.enabled = true;
    }
}

fn resolve_input(input: &Path) -> PathBuf {
    if input.is_dir() {
        input.join(DEFAULT_LOG_NAME)
    } else {
        input.to_path_buf()
    }
}

/// Directory holding a file; the current directory for bare file names
fn session_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Subject id from the log path
///
/// Uses the file stem, or the directory name when the log carries the
/// generic name (`.../R1001P/log.txt` → `R1001P`).
fn subject_from_path(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let generic = Path::new(DEFAULT_LOG_NAME)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    if stem == generic || stem.is_empty() {
        if let Some(dir) = input.parent().and_then(Path::file_name) {
            return dir.to_string_lossy().into_owned();
        }
    }
    stem
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
